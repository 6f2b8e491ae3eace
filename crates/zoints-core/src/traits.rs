//! Trait interfaces between the staking crates.
//!
//! - [`RewardCalculator`]: reward accounting (zoints-reward implements)
//! - [`AccountSource`]: raw account reads (the caller's transport implements)
//! - [`InstructionSubmitter`]: instruction submission (the caller's transport implements)

use serde::{Deserialize, Serialize};

use crate::accounts::{Beneficiary, Settings};
use crate::address::Address;
use crate::error::{RewardError, SourceError, SubmitError};
use crate::instruction::Instruction;
use crate::time::UnixTimestamp;

/// Off-ledger replica of the program's reward-per-share accounting.
///
/// All arithmetic is integer and must match the program to the last unit.
pub trait RewardCalculator: Send + Sync {
    /// Accumulator value the program would compute if settled at `now`.
    fn project_accumulator(
        &self,
        settings: &Settings,
        now: UnixTimestamp,
    ) -> Result<u128, RewardError>;

    /// `floor(staked * accumulator / PRECISION) - reward_debt`, unclamped.
    fn harvestable(
        &self,
        beneficiary: &Beneficiary,
        accumulator: u128,
    ) -> Result<i128, RewardError>;

    /// Harvestable amount at `now`.
    ///
    /// Default implementation projects the accumulator and then applies
    /// [`harvestable`](Self::harvestable).
    fn harvestable_at(
        &self,
        settings: &Settings,
        beneficiary: &Beneficiary,
        now: UnixTimestamp,
    ) -> Result<i128, RewardError> {
        let acc = self.project_accumulator(settings, now)?;
        self.harvestable(beneficiary, acc)
    }
}

/// Read access to raw account data.
pub trait AccountSource: Send + Sync {
    /// Raw bytes at `address`. `None` if no account exists there.
    fn fetch(&self, address: &Address) -> Result<Option<Vec<u8>>, SourceError>;
}

/// Acknowledgement of an accepted instruction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    /// Transport-specific identifier, e.g. a transaction signature.
    pub id: String,
}

/// Hands a built instruction to the network.
pub trait InstructionSubmitter: Send + Sync {
    fn submit(&self, instruction: &Instruction) -> Result<Confirmation, SubmitError>;
}
