//! # zoints-client
//! Instruction building, cached address derivation and typed account reads
//! for the Zoints staking program.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod reader;

pub use builder::{ClaimRole, InstructionBuilder, StakeAccounts};
pub use cache::AddressCache;
pub use config::{ClientConfig, LogFormat};
pub use error::ClientError;
pub use reader::{MemorySource, StakingClient, StakingReader};
