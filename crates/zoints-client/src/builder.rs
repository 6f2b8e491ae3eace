//! Instruction builder for the staking program.
//!
//! Each method returns a complete [`Instruction`]: the fixed, ordered account
//! list the program expects plus the packed payload. Account order is
//! positional. The program reads accounts by index, so a misordered list
//! fails at execution rather than here.

use std::sync::Arc;

use zoints_core::accounts::{Community, Settings};
use zoints_core::address::{Address, SYSTEM_PROGRAM, SYSVAR_CLOCK, SYSVAR_RENT, TOKEN_PROGRAM};
use zoints_core::constants::{
    BENEFICIARY_SEED, POOL_AUTHORITY_SEED, REWARD_POOL_SEED, SETTINGS_SEED, STAKE_POOL_SEED,
    STAKE_SEED,
};
use zoints_core::instruction::{AccountMeta, Instruction, StakingInstruction};
use zoints_core::time::UnixTimestamp;

use crate::cache::AddressCache;
use crate::error::ClientError;

/// Which community beneficiary is claiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRole {
    Primary,
    Secondary,
}

impl ClaimRole {
    fn instruction(self) -> StakingInstruction {
        match self {
            Self::Primary => StakingInstruction::ClaimPrimary,
            Self::Secondary => StakingInstruction::ClaimSecondary,
        }
    }
}

/// Caller-supplied accounts for a stake change.
#[derive(Debug, Clone, Copy)]
pub struct StakeAccounts {
    pub funder: Address,
    pub staker: Address,
    /// Staker's token account that funds or receives the change.
    pub staker_token_account: Address,
    pub community: Address,
    /// Primary beneficiary authority of the community.
    pub primary: Address,
    /// Secondary beneficiary authority, zero if none.
    pub secondary: Address,
    /// `Settings::fee_recipient`.
    pub fee_recipient: Address,
}

impl StakeAccounts {
    /// Fill the community and fee fields from decoded records.
    pub fn from_records(
        funder: Address,
        staker: Address,
        staker_token_account: Address,
        community_address: Address,
        community: &Community,
        settings: &Settings,
    ) -> Self {
        Self {
            funder,
            staker,
            staker_token_account,
            community: community_address,
            primary: community.primary,
            secondary: community.secondary,
            fee_recipient: settings.fee_recipient,
        }
    }
}

/// Builds staking instructions for one program deployment.
///
/// # Example
/// ```ignore
/// let builder = InstructionBuilder::new(program_id);
/// let ix = builder.stake(&accounts, 5_000)?;
/// submitter.submit(&ix)?;
/// ```
#[derive(Debug, Clone)]
pub struct InstructionBuilder {
    program_id: Address,
    cache: Arc<AddressCache>,
}

impl InstructionBuilder {
    /// Create a builder with its own address cache.
    pub fn new(program_id: Address) -> Self {
        Self::with_cache(program_id, Arc::new(AddressCache::new()))
    }

    /// Create a builder sharing an existing address cache.
    pub fn with_cache(program_id: Address, cache: Arc<AddressCache>) -> Self {
        Self { program_id, cache }
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn cache(&self) -> &Arc<AddressCache> {
        &self.cache
    }

    fn derive(&self, seeds: &[&[u8]]) -> Result<Address, ClientError> {
        Ok(self.cache.find(seeds, &self.program_id)?.0)
    }

    pub fn settings_address(&self) -> Result<Address, ClientError> {
        self.derive(&[SETTINGS_SEED])
    }

    pub fn pool_authority_address(&self) -> Result<Address, ClientError> {
        self.derive(&[POOL_AUTHORITY_SEED])
    }

    pub fn reward_pool_address(&self) -> Result<Address, ClientError> {
        self.derive(&[REWARD_POOL_SEED])
    }

    pub fn stake_pool_address(&self) -> Result<Address, ClientError> {
        self.derive(&[STAKE_POOL_SEED])
    }

    pub fn stake_address(&self, community: &Address, owner: &Address) -> Result<Address, ClientError> {
        self.derive(&[STAKE_SEED, community.as_bytes(), owner.as_bytes()])
    }

    pub fn beneficiary_address(&self, authority: &Address) -> Result<Address, ClientError> {
        self.derive(&[BENEFICIARY_SEED, authority.as_bytes()])
    }

    fn instruction(&self, op: StakingInstruction, accounts: Vec<AccountMeta>) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts,
            data: op.pack(),
        }
    }

    /// One-time program setup.
    pub fn initialize(
        &self,
        funder: &Address,
        mint: &Address,
        fee_recipient: &Address,
        start_time: UnixTimestamp,
        unbonding_duration: u64,
    ) -> Result<Instruction, ClientError> {
        let accounts = vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new(self.settings_address()?, false),
            AccountMeta::new_readonly(self.pool_authority_address()?, false),
            AccountMeta::new(self.stake_pool_address()?, false),
            AccountMeta::new(self.reward_pool_address()?, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*fee_recipient, false),
            AccountMeta::new_readonly(*SYSVAR_RENT, false),
            AccountMeta::new_readonly(*TOKEN_PROGRAM, false),
            AccountMeta::new_readonly(*SYSTEM_PROGRAM, false),
        ];
        let op = StakingInstruction::Initialize {
            start_time,
            unbonding_duration,
        };
        Ok(self.instruction(op, accounts))
    }

    /// Create a community account. The community key signs its own creation.
    pub fn register_community(
        &self,
        funder: &Address,
        owner: &Address,
        community: &Address,
        primary: &Address,
        secondary: Option<&Address>,
    ) -> Instruction {
        let accounts = vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(*community, true),
            AccountMeta::new_readonly(*primary, false),
            AccountMeta::new_readonly(secondary.copied().unwrap_or(Address::ZERO), false),
            AccountMeta::new_readonly(*SYSVAR_RENT, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(*SYSTEM_PROGRAM, false),
        ];
        self.instruction(StakingInstruction::RegisterCommunity, accounts)
    }

    /// Create the stake account of `owner` in `community`.
    pub fn initialize_stake(
        &self,
        funder: &Address,
        owner: &Address,
        community: &Address,
    ) -> Result<Instruction, ClientError> {
        let accounts = vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new_readonly(*community, false),
            AccountMeta::new(self.stake_address(community, owner)?, false),
            AccountMeta::new_readonly(*SYSVAR_RENT, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(*SYSTEM_PROGRAM, false),
        ];
        Ok(self.instruction(StakingInstruction::InitializeStake, accounts))
    }

    /// Change a stake by `amount`. Negative begins unbonding, zero harvests.
    pub fn stake(&self, accts: &StakeAccounts, amount: i64) -> Result<Instruction, ClientError> {
        let secondary_beneficiary = if accts.secondary.is_zero() {
            Address::ZERO
        } else {
            self.beneficiary_address(&accts.secondary)?
        };
        let accounts = vec![
            AccountMeta::new(accts.funder, true),
            AccountMeta::new_readonly(accts.staker, true),
            AccountMeta::new(accts.staker_token_account, false),
            AccountMeta::new(accts.community, false),
            AccountMeta::new_readonly(self.pool_authority_address()?, false),
            AccountMeta::new(self.stake_pool_address()?, false),
            AccountMeta::new(self.reward_pool_address()?, false),
            AccountMeta::new(self.settings_address()?, false),
            AccountMeta::new(self.beneficiary_address(&accts.staker)?, false),
            AccountMeta::new(self.beneficiary_address(&accts.primary)?, false),
            AccountMeta::new(secondary_beneficiary, false),
            AccountMeta::new(self.beneficiary_address(&accts.fee_recipient)?, false),
            AccountMeta::new(self.stake_address(&accts.community, &accts.staker)?, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(*TOKEN_PROGRAM, false),
        ];
        Ok(self.instruction(StakingInstruction::Stake { amount }, accounts))
    }

    /// Release an unbonded amount whose lock has expired.
    pub fn withdraw_unbond(
        &self,
        funder: &Address,
        staker: &Address,
        staker_token_account: &Address,
        community: &Address,
    ) -> Result<Instruction, ClientError> {
        let accounts = vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(*staker, true),
            AccountMeta::new(*staker_token_account, false),
            AccountMeta::new(*community, false),
            AccountMeta::new(self.settings_address()?, false),
            AccountMeta::new_readonly(self.pool_authority_address()?, false),
            AccountMeta::new(self.stake_pool_address()?, false),
            AccountMeta::new(self.stake_address(community, staker)?, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(*TOKEN_PROGRAM, false),
        ];
        Ok(self.instruction(StakingInstruction::WithdrawUnbond, accounts))
    }

    /// Pay out a community beneficiary's rewards. `authority` signs.
    pub fn claim(
        &self,
        role: ClaimRole,
        funder: &Address,
        authority: &Address,
        authority_token_account: &Address,
        community: &Address,
    ) -> Result<Instruction, ClientError> {
        let accounts = vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*authority_token_account, false),
            AccountMeta::new(*community, false),
            AccountMeta::new(self.beneficiary_address(authority)?, false),
            AccountMeta::new(self.settings_address()?, false),
            AccountMeta::new_readonly(self.pool_authority_address()?, false),
            AccountMeta::new(self.reward_pool_address()?, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(*TOKEN_PROGRAM, false),
        ];
        Ok(self.instruction(role.instruction(), accounts))
    }

    pub fn claim_primary(
        &self,
        funder: &Address,
        authority: &Address,
        authority_token_account: &Address,
        community: &Address,
    ) -> Result<Instruction, ClientError> {
        self.claim(ClaimRole::Primary, funder, authority, authority_token_account, community)
    }

    pub fn claim_secondary(
        &self,
        funder: &Address,
        authority: &Address,
        authority_token_account: &Address,
        community: &Address,
    ) -> Result<Instruction, ClientError> {
        self.claim(ClaimRole::Secondary, funder, authority, authority_token_account, community)
    }
}
