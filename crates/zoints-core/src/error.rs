//! Error types for the staking client core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated: need {expected} bytes, got {actual}")] Truncated { expected: usize, actual: usize },
    #[error("invalid {field} tag: {value}")] InvalidEnum { field: &'static str, value: u8 },
    #[error("trailing bytes: layout is {expected} bytes, got {actual}")] TrailingBytes { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("no off-curve address for any bump seed")] NoCanonicalAddress,
    #[error("too many seeds: {count} > {max}")] TooManySeeds { count: usize, max: usize },
    #[error("seed {index} is {len} bytes, max {max}")] MaxSeedLengthExceeded { index: usize, len: usize, max: usize },
    #[error("derived address lies on the curve")] OnCurve,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")] InvalidBase58(String),
    #[error("invalid length: {0} bytes")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("time before unix epoch: {0}")] BeforeEpoch(i64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("account source unavailable: {0}")] Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("rejected: {message}")] Rejected { code: Option<u32>, message: String },
    #[error("transport: {0}")] Transport(String),
}

#[derive(Error, Debug)]
pub enum ZointsError {
    #[error(transparent)] Decode(#[from] DecodeError),
    #[error(transparent)] Derivation(#[from] DerivationError),
    #[error(transparent)] Address(#[from] AddressError),
    #[error(transparent)] Time(#[from] TimeError),
    #[error(transparent)] Reward(#[from] RewardError),
    #[error(transparent)] Source(#[from] SourceError),
    #[error(transparent)] Submit(#[from] SubmitError),
}
