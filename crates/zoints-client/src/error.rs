//! Client error types.

use thiserror::Error;
use zoints_core::address::Address;
use zoints_core::error::{
    AddressError, DecodeError, DerivationError, RewardError, SourceError, SubmitError,
};

/// Errors that can occur in client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No account exists at the address.
    #[error("account not found: {0}")]
    AccountNotFound(Address),

    /// Account data does not match the expected layout.
    #[error("decode {kind} at {address}: {source}")]
    Decode {
        /// Record type being decoded.
        kind: &'static str,
        /// Address the data was read from.
        address: Address,
        source: DecodeError,
    },

    /// Invalid configuration value.
    #[error("config: {0}")]
    Config(String),

    /// Address derivation failure.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Address parsing failure.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Reward projection failure.
    #[error(transparent)]
    Reward(#[from] RewardError),

    /// Account source failure.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Submission failure.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}
