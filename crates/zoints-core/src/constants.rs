//! Protocol constants shared with the on-chain staking program.
//!
//! Every value here is part of the byte- or value-level contract with the
//! remote program. Changing one silently breaks interoperability.

/// Fixed-point scale of the reward-per-share accumulator.
pub const PRECISION: u128 = 1_000_000_000_000;

/// Length of one emission epoch (365 days, no leap handling).
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Numerator of the emission decay ratio applied at each annual boundary.
pub const EMISSION_DECAY_NUMERATOR: u64 = 3;

/// Denominator of the emission decay ratio applied at each annual boundary.
pub const EMISSION_DECAY_DENOMINATOR: u64 = 4;

/// Emission rate of the first epoch, in base token units per year.
pub const BASE_REWARD: u64 = 900_000_000_000;

/// Smallest non-zero stake the program accepts.
pub const MINIMUM_STAKE: u64 = 1_000;

/// Seed of the global settings account.
pub const SETTINGS_SEED: &[u8] = b"settings";

/// Seed of the authority that signs for both token pools.
pub const POOL_AUTHORITY_SEED: &[u8] = b"poolauthority";

/// Seed of the token account holding undistributed rewards.
pub const REWARD_POOL_SEED: &[u8] = b"rewardpool";

/// Seed of the token account holding staked funds.
pub const STAKE_POOL_SEED: &[u8] = b"stakepool";

/// Seed prefix of a per-(community, owner) stake account.
pub const STAKE_SEED: &[u8] = b"stake";

/// Seed prefix of a per-authority beneficiary account.
pub const BENEFICIARY_SEED: &[u8] = b"beneficiary";

/// Domain-separation suffix appended to every program-address hash.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds, bump included, in one derivation.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Base58 identifier of the rent sysvar.
pub const SYSVAR_RENT_ID: &str = "SysvarRent111111111111111111111111111111111";

/// Base58 identifier of the clock sysvar.
pub const SYSVAR_CLOCK_ID: &str = "SysvarC1ock11111111111111111111111111111111";

/// Base58 identifier of the SPL token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Base58 identifier of the system program (the all-zero address).
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";
