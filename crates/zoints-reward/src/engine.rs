//! Reward engine implementing the [`RewardCalculator`] trait.
//!
//! Replays the program's settlement arithmetic off-ledger: the global
//! reward-per-share accumulator grows linearly within an emission epoch and
//! the annual emission decays to 3/4 (floored) at every epoch boundary.
//! All arithmetic is integer-only and checked; overflow is an error, never a wrap.

use serde::Serialize;
use tracing::{trace, warn};

use zoints_core::accounts::{Beneficiary, Settings};
use zoints_core::constants::{
    EMISSION_DECAY_DENOMINATOR, EMISSION_DECAY_NUMERATOR, PRECISION, SECONDS_PER_YEAR,
};
use zoints_core::error::RewardError;
use zoints_core::time::UnixTimestamp;
use zoints_core::traits::RewardCalculator;

/// The production reward calculator.
#[derive(Debug, Clone, Default)]
pub struct RewardEngine;

impl RewardEngine {
    /// Create a new RewardEngine.
    pub fn new() -> Self {
        Self
    }

    /// Emission rate in force at `now`, after walking elapsed boundaries.
    pub fn emission_schedule(
        &self,
        settings: &Settings,
        now: UnixTimestamp,
    ) -> Result<EmissionSchedule, RewardError> {
        let mut rate = settings.emission;
        let mut boundary = settings.next_emission_change.as_secs();
        let mut epochs_elapsed = 0u64;
        while now.as_secs() >= boundary {
            rate = decay_emission(rate)?;
            boundary = boundary
                .checked_add(SECONDS_PER_YEAR)
                .ok_or(RewardError::ArithmeticOverflow)?;
            epochs_elapsed += 1;
        }
        Ok(EmissionSchedule {
            emission: rate,
            next_change: UnixTimestamp(boundary),
            epochs_elapsed,
        })
    }

    /// Everything a wallet shows for one beneficiary at `now`.
    pub fn preview_harvest(
        &self,
        settings: &Settings,
        beneficiary: &Beneficiary,
        now: UnixTimestamp,
    ) -> Result<HarvestPreview, RewardError> {
        let accumulator = self.project_accumulator(settings, now)?;
        let harvestable = self.harvestable(beneficiary, accumulator)?;
        Ok(HarvestPreview {
            at: now,
            accumulator,
            harvestable,
            holding: beneficiary.holding,
        })
    }
}

/// Emission in force at a point in time.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmissionSchedule {
    /// Annual emission at that time.
    pub emission: u64,
    /// When it next decays.
    pub next_change: UnixTimestamp,
    /// Boundaries crossed since the snapshot.
    pub epochs_elapsed: u64,
}

/// Projected reward position of one beneficiary.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarvestPreview {
    pub at: UnixTimestamp,
    pub accumulator: u128,
    /// Newly accrued since the last settlement. May be negative.
    pub harvestable: i128,
    /// Already settled, unclaimed.
    pub holding: u64,
}

impl HarvestPreview {
    /// What a claim would pay out. Negative accruals count as zero.
    pub fn claimable(&self) -> u128 {
        let accrued = u128::try_from(self.harvestable).unwrap_or(0);
        accrued.saturating_add(u128::from(self.holding))
    }
}

fn decay_emission(rate: u64) -> Result<u64, RewardError> {
    let scaled = u128::from(rate) * u128::from(EMISSION_DECAY_NUMERATOR);
    u64::try_from(scaled / u128::from(EMISSION_DECAY_DENOMINATOR))
        .map_err(|_| RewardError::ArithmeticOverflow)
}

/// Accumulator growth over `elapsed` seconds at `rate` with `total_staked` staked.
///
/// `((PRECISION * rate) / SECONDS_PER_YEAR / total_staked) * elapsed`, truncating
/// in exactly this order.
fn epoch_term(rate: u64, total_staked: u64, elapsed: u64) -> Result<u128, RewardError> {
    let per_second = PRECISION
        .checked_mul(u128::from(rate))
        .ok_or(RewardError::ArithmeticOverflow)?
        / u128::from(SECONDS_PER_YEAR)
        / u128::from(total_staked);
    per_second
        .checked_mul(u128::from(elapsed))
        .ok_or(RewardError::ArithmeticOverflow)
}

impl RewardCalculator for RewardEngine {
    fn project_accumulator(
        &self,
        settings: &Settings,
        now: UnixTimestamp,
    ) -> Result<u128, RewardError> {
        let now = now.as_secs();
        let mut cursor = settings.last_reward.as_secs();
        if now <= cursor {
            return Ok(settings.reward_per_share);
        }
        // Nothing to distribute to. The gap is spread over the next staker.
        if settings.total_staked == 0 {
            return Ok(settings.reward_per_share);
        }

        let mut rate = settings.emission;
        let mut boundary = settings.next_emission_change.as_secs();
        let mut sum: u128 = 0;

        while now >= boundary {
            let elapsed = boundary.saturating_sub(cursor);
            let term = epoch_term(rate, settings.total_staked, elapsed)?;
            sum = sum.checked_add(term).ok_or(RewardError::ArithmeticOverflow)?;
            trace!(boundary, rate, term, "crossed emission boundary");

            // A boundary already behind the last update only decays the rate.
            cursor = cursor.max(boundary);
            boundary = boundary
                .checked_add(SECONDS_PER_YEAR)
                .ok_or(RewardError::ArithmeticOverflow)?;
            rate = decay_emission(rate)?;
        }

        let partial = epoch_term(rate, settings.total_staked, now - cursor)?;
        sum = sum.checked_add(partial).ok_or(RewardError::ArithmeticOverflow)?;

        settings
            .reward_per_share
            .checked_add(sum)
            .ok_or(RewardError::ArithmeticOverflow)
    }

    fn harvestable(
        &self,
        beneficiary: &Beneficiary,
        accumulator: u128,
    ) -> Result<i128, RewardError> {
        let earned = u128::from(beneficiary.staked)
            .checked_mul(accumulator)
            .ok_or(RewardError::ArithmeticOverflow)?
            / PRECISION;
        let earned = i128::try_from(earned).map_err(|_| RewardError::ArithmeticOverflow)?;
        let result = earned - i128::from(beneficiary.reward_debt);
        if result < 0 {
            warn!(
                authority = %beneficiary.authority,
                harvestable = result,
                "reward debt exceeds accrued reward"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use zoints_core::address::Address;
    use zoints_core::constants::BASE_REWARD;

    const T: u64 = 1_635_315_080;
    const DAY: u64 = 86_400;
    const MONTH: u64 = 30 * DAY;

    fn engine() -> RewardEngine {
        RewardEngine::new()
    }

    fn settings(total_staked: u64) -> Settings {
        Settings {
            emission: BASE_REWARD,
            total_staked,
            reward_per_share: 8_216_152_930_430,
            last_reward: UnixTimestamp(T),
            next_emission_change: UnixTimestamp(T + SECONDS_PER_YEAR),
            ..Settings::default()
        }
    }

    fn per_second(rate: u64, staked: u64) -> u128 {
        PRECISION * rate as u128 / SECONDS_PER_YEAR as u128 / staked as u128
    }

    // --- project_accumulator ---

    #[test]
    fn no_time_elapsed_is_unchanged() {
        let s = settings(1_283_747);
        assert_eq!(engine().project_accumulator(&s, UnixTimestamp(T)).unwrap(), s.reward_per_share);
        assert_eq!(
            engine().project_accumulator(&s, UnixTimestamp(T - 10)).unwrap(),
            s.reward_per_share
        );
    }

    #[test]
    fn zero_stake_is_unchanged() {
        let s = settings(0);
        let far = UnixTimestamp(T + 5 * SECONDS_PER_YEAR);
        assert_eq!(engine().project_accumulator(&s, far).unwrap(), s.reward_per_share);
    }

    #[test]
    fn one_day_within_epoch() {
        let s = settings(1_283_747);
        let got = engine().project_accumulator(&s, UnixTimestamp(T + DAY)).unwrap();
        let expected = s.reward_per_share + per_second(BASE_REWARD, 1_283_747) * DAY as u128;
        assert_eq!(got, expected);
    }

    #[test]
    fn exactly_one_boundary() {
        let s = settings(1_000_000);
        let got = engine()
            .project_accumulator(&s, UnixTimestamp(T + SECONDS_PER_YEAR))
            .unwrap();
        let full = per_second(BASE_REWARD, 1_000_000) * SECONDS_PER_YEAR as u128;
        assert_eq!(got, s.reward_per_share + full);
    }

    #[test]
    fn one_boundary_plus_a_month() {
        let s = settings(1_000_000);
        let got = engine()
            .project_accumulator(&s, UnixTimestamp(T + SECONDS_PER_YEAR + MONTH))
            .unwrap();
        let reduced = BASE_REWARD * 3 / 4;
        let expected = s.reward_per_share
            + per_second(BASE_REWARD, 1_000_000) * SECONDS_PER_YEAR as u128
            + per_second(reduced, 1_000_000) * MONTH as u128;
        assert_eq!(got, expected);
    }

    #[test]
    fn mid_epoch_start_counts_only_remaining_time() {
        let mut s = settings(1_000_000);
        s.last_reward = UnixTimestamp(T + SECONDS_PER_YEAR - DAY);
        let got = engine()
            .project_accumulator(&s, UnixTimestamp(T + SECONDS_PER_YEAR + DAY))
            .unwrap();
        let expected = s.reward_per_share
            + per_second(BASE_REWARD, 1_000_000) * DAY as u128
            + per_second(BASE_REWARD * 3 / 4, 1_000_000) * DAY as u128;
        assert_eq!(got, expected);
    }

    #[test]
    fn stale_boundary_decays_without_rewinding() {
        let mut s = settings(1_000_000);
        let boundary = T + SECONDS_PER_YEAR;
        s.last_reward = UnixTimestamp(boundary + 100);
        let got = engine()
            .project_accumulator(&s, UnixTimestamp(boundary + 110))
            .unwrap();
        let expected = s.reward_per_share + per_second(BASE_REWARD * 3 / 4, 1_000_000) * 10;
        assert_eq!(got, expected);
    }

    #[test]
    fn truncation_order_is_rate_first() {
        // Large stake makes the per-second term truncate to a small integer.
        let s = settings(u64::MAX);
        let got = engine().project_accumulator(&s, UnixTimestamp(T + DAY)).unwrap();
        let per_sec = PRECISION * BASE_REWARD as u128 / SECONDS_PER_YEAR as u128 / u64::MAX as u128;
        assert_eq!(per_sec, 0);
        assert_eq!(got, s.reward_per_share);
    }

    #[test]
    fn accumulator_overflow_is_reported() {
        let mut s = settings(1);
        s.reward_per_share = u128::MAX;
        assert_eq!(
            engine().project_accumulator(&s, UnixTimestamp(T + DAY)),
            Err(RewardError::ArithmeticOverflow)
        );
    }

    // --- harvestable ---

    #[test]
    fn harvestable_multiplies_first() {
        let b = Beneficiary {
            authority: Address([1u8; 32]),
            staked: 3,
            reward_debt: 0,
            holding: 0,
        };
        // 3 * (PRECISION / 2) / PRECISION = 1 (floor of 1.5)
        assert_eq!(engine().harvestable(&b, PRECISION / 2).unwrap(), 1);
    }

    #[test]
    fn harvestable_fixture_values() {
        let b = Beneficiary {
            authority: Address([1u8; 32]),
            staked: 1_799_775,
            reward_debt: 81_569_425,
            holding: 0,
        };
        let acc = 8_216_152_930_430u128;
        let expected = (1_799_775u128 * acc / PRECISION) as i128 - 81_569_425;
        assert_eq!(engine().harvestable(&b, acc).unwrap(), expected);
    }

    #[test]
    fn negative_harvestable_is_not_clamped() {
        // Open accounting question: debt above accrual yields a negative result.
        let b = Beneficiary {
            authority: Address([1u8; 32]),
            staked: 10,
            reward_debt: 100,
            holding: 5,
        };
        assert_eq!(engine().harvestable(&b, PRECISION).unwrap(), -90);
    }

    #[test]
    fn harvestable_at_combines_projection() {
        let s = settings(1_000_000);
        let b = Beneficiary {
            authority: Address([1u8; 32]),
            staked: 1_000,
            reward_debt: 0,
            holding: 0,
        };
        let now = UnixTimestamp(T + DAY);
        let acc = engine().project_accumulator(&s, now).unwrap();
        assert_eq!(
            engine().harvestable_at(&s, &b, now).unwrap(),
            engine().harvestable(&b, acc).unwrap()
        );
    }

    // --- emission_schedule / preview ---

    #[test]
    fn schedule_before_boundary() {
        let s = settings(1);
        let sched = engine().emission_schedule(&s, UnixTimestamp(T + DAY)).unwrap();
        assert_eq!(sched.emission, BASE_REWARD);
        assert_eq!(sched.next_change, s.next_emission_change);
        assert_eq!(sched.epochs_elapsed, 0);
    }

    #[test]
    fn schedule_after_two_boundaries() {
        let s = settings(1);
        let now = UnixTimestamp(T + 2 * SECONDS_PER_YEAR);
        let sched = engine().emission_schedule(&s, now).unwrap();
        assert_eq!(sched.emission, BASE_REWARD * 3 / 4 * 3 / 4);
        assert_eq!(sched.next_change, UnixTimestamp(T + 3 * SECONDS_PER_YEAR));
        assert_eq!(sched.epochs_elapsed, 2);
    }

    #[test]
    fn preview_bundles_values() {
        let s = settings(1_000_000);
        let b = Beneficiary {
            authority: Address([1u8; 32]),
            staked: 500_000,
            reward_debt: 10,
            holding: 7,
        };
        let now = UnixTimestamp(T + MONTH);
        let p = engine().preview_harvest(&s, &b, now).unwrap();
        assert_eq!(p.accumulator, engine().project_accumulator(&s, now).unwrap());
        assert_eq!(p.harvestable, engine().harvestable(&b, p.accumulator).unwrap());
        assert_eq!(p.holding, 7);
        assert_eq!(p.claimable(), p.harvestable as u128 + 7);
    }

    #[test]
    fn claimable_ignores_negative_accrual() {
        let p = HarvestPreview {
            at: UnixTimestamp(0),
            accumulator: 0,
            harvestable: -50,
            holding: 3,
        };
        assert_eq!(p.claimable(), 3);
    }

    proptest! {
        #[test]
        fn projection_is_monotonic(
            staked in 1u64..=u64::MAX / 2,
            emission in 0u64..=BASE_REWARD * 4,
            a in 0u64..10 * SECONDS_PER_YEAR,
            b in 0u64..10 * SECONDS_PER_YEAR,
        ) {
            let mut s = settings(staked);
            s.emission = emission;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let e = engine();
            let p1 = e.project_accumulator(&s, UnixTimestamp(T + lo)).unwrap();
            let p2 = e.project_accumulator(&s, UnixTimestamp(T + hi)).unwrap();
            prop_assert!(p1 <= p2);
            prop_assert!(p1 >= s.reward_per_share);
        }
    }
}
