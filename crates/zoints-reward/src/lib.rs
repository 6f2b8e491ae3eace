//! # zoints-reward: off-ledger reward projection.
//!
//! All calculations use integer arithmetic only, truncating in the same order
//! as the staking program so projections match settlement exactly.
//!
//! - **Accumulator projection**: reward-per-share grows linearly with time
//!   within an emission epoch, divided across the total stake.
//! - **Emission decay**: the annual emission drops to 3/4 at every yearly
//!   boundary.
//! - **Harvestable**: a beneficiary's share of accumulator growth since its
//!   last settlement, reported signed and unclamped.

pub mod engine;

pub use engine::{EmissionSchedule, HarvestPreview, RewardEngine};
