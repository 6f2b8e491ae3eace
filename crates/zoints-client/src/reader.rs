//! Typed account reads and instruction submission over caller transports.

use dashmap::DashMap;
use tracing::{debug, info, warn};

use zoints_core::accounts::{Beneficiary, Community, Endpoint, Settings, Stake};
use zoints_core::address::Address;
use zoints_core::codec::AccountLayout;
use zoints_core::error::{SourceError, SubmitError};
use zoints_core::instruction::Instruction;
use zoints_core::program_error::{extract_error_code, ProgramErrorCode};
use zoints_core::traits::{AccountSource, Confirmation, InstructionSubmitter};

use crate::builder::InstructionBuilder;
use crate::error::ClientError;

/// Decodes staking accounts fetched from an [`AccountSource`].
///
/// Account data may be allocated larger than the record, so reads use the
/// lenient prefix decode.
pub struct StakingReader<S> {
    source: S,
    builder: InstructionBuilder,
}

impl<S: AccountSource> StakingReader<S> {
    pub fn new(source: S, builder: InstructionBuilder) -> Self {
        Self { source, builder }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn builder(&self) -> &InstructionBuilder {
        &self.builder
    }

    fn load<T: AccountLayout>(&self, kind: &'static str, address: &Address) -> Result<T, ClientError> {
        let data = self
            .source
            .fetch(address)?
            .ok_or(ClientError::AccountNotFound(*address))?;
        debug!(kind, %address, len = data.len(), "fetched account");
        T::decode_prefix(&data).map_err(|source| ClientError::Decode {
            kind,
            address: *address,
            source,
        })
    }

    pub fn settings(&self) -> Result<Settings, ClientError> {
        let address = self.builder.settings_address()?;
        self.load("settings", &address)
    }

    pub fn community(&self, address: &Address) -> Result<Community, ClientError> {
        self.load("community", address)
    }

    pub fn endpoint(&self, address: &Address) -> Result<Endpoint, ClientError> {
        self.load("endpoint", address)
    }

    /// Beneficiary account of `authority`.
    pub fn beneficiary(&self, authority: &Address) -> Result<Beneficiary, ClientError> {
        let address = self.builder.beneficiary_address(authority)?;
        self.load("beneficiary", &address)
    }

    /// Stake account of `owner` in `community`.
    pub fn stake(&self, community: &Address, owner: &Address) -> Result<Stake, ClientError> {
        let address = self.builder.stake_address(community, owner)?;
        self.load("stake", &address)
    }
}

/// Forwards built instructions to an [`InstructionSubmitter`].
pub struct StakingClient<T> {
    submitter: T,
}

impl<T: InstructionSubmitter> StakingClient<T> {
    pub fn new(submitter: T) -> Self {
        Self { submitter }
    }

    /// Submit one instruction. Rejections are logged with the program's
    /// error name when the code is known.
    pub fn submit(&self, instruction: &Instruction) -> Result<Confirmation, ClientError> {
        let op = instruction
            .decode_data()
            .map(|ix| ix.name())
            .unwrap_or("unknown");
        match self.submitter.submit(instruction) {
            Ok(confirmation) => {
                info!(op, id = %confirmation.id, "instruction confirmed");
                Ok(confirmation)
            }
            Err(err) => {
                let code = match &err {
                    SubmitError::Rejected { code: Some(code), .. } => Some(*code),
                    SubmitError::Rejected { message, .. } => extract_error_code(message),
                    SubmitError::Transport(_) => None,
                };
                let reason = code
                    .and_then(ProgramErrorCode::from_code)
                    .map_or("unknown", ProgramErrorCode::name);
                warn!(op, ?code, reason, error = %err, "instruction rejected");
                Err(err.into())
            }
        }
    }
}

/// Account data held in memory, e.g. a captured snapshot.
#[derive(Debug, Default)]
pub struct MemorySource {
    accounts: DashMap<Address, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, address: Address, data: Vec<u8>) {
        self.accounts.insert(address, data);
    }

    pub fn remove(&self, address: &Address) -> Option<Vec<u8>> {
        self.accounts.remove(address).map(|(_, data)| data)
    }
}

impl AccountSource for MemorySource {
    fn fetch(&self, address: &Address) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self.accounts.get(address).map(|data| data.clone()))
    }
}
