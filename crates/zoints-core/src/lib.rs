//! # zoints-core
//! Account layouts, address derivation and shared contracts for the Zoints
//! staking program client.

pub mod accounts;
pub mod address;
pub mod codec;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod pda;
pub mod program_error;
pub mod time;
pub mod traits;
