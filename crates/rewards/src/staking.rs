// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Staking-cycle reward estimation.
//!
//! The staking contract only advances its cycle counter when a transaction touches it, so the
//! on-chain `currentCycle` lags behind wall-clock time. The estimate here extrapolates whole
//! cycles elapsed since `lastUpdateTimestamp`, which lets it run ahead of the confirmed value.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::snapshot::lenient;

/// One whole token in an 18-decimal fixed point amount.
pub const WEI_PER_TOKEN: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// PW points accrued per whole staked token per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsRate {
    pub numerator: u64,
    pub denominator: u64,
}

/// Half a point per staked token per cycle: $10 staked earns 5 points a day.
pub const DEFAULT_POINTS_RATE: PointsRate = PointsRate { numerator: 1, denominator: 2 };

impl Default for PointsRate {
    fn default() -> Self {
        DEFAULT_POINTS_RATE
    }
}

/// A single staking position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeRecord {
    /// Principal, 18-decimal fixed point.
    #[serde(default, deserialize_with = "lenient::to_u256")]
    pub staked_amount: U256,
    #[serde(default, deserialize_with = "lenient::to_address")]
    pub stable_coin: Address,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub last_claimed_cycle: u64,
    /// Points confirmed on-chain but not yet claimed.
    #[serde(default, deserialize_with = "lenient::to_u256")]
    pub pending_pw_points: U256,
}

/// The staking contract's global cycle counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleClock {
    /// Last cycle confirmed on-chain.
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub current_cycle: u64,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub last_update_timestamp: u64,
    /// Seconds per cycle.
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub cycle_duration: u64,
}

impl CycleClock {
    /// Whole cycles elapsed since the last on-chain update.
    ///
    /// Zero when `now` is before the last update or the cycle duration is unknown.
    pub fn elapsed_cycles(&self, now: u64) -> u64 {
        if self.cycle_duration == 0 {
            return 0;
        }
        now.saturating_sub(self.last_update_timestamp) / self.cycle_duration
    }

    /// Cycle the contract will report once its counter catches up with `now`.
    pub fn extrapolated_cycle(&self, now: u64) -> u64 {
        self.current_cycle.saturating_add(self.elapsed_cycles(now))
    }

    /// Timestamp of the first cycle boundary strictly after `now`.
    pub fn next_boundary(&self, now: u64) -> Option<u64> {
        if self.cycle_duration == 0 {
            return None;
        }
        let next = self.elapsed_cycles(now).checked_add(1)?;
        next.checked_mul(self.cycle_duration)?.checked_add(self.last_update_timestamp)
    }

    /// Seconds left until the next cycle boundary.
    pub fn seconds_until_next_cycle(&self, now: u64) -> Option<u64> {
        self.next_boundary(now).map(|boundary| boundary.saturating_sub(now))
    }
}

/// Cycles the stake has accrued for since its last claim, including cycles the contract has not
/// confirmed yet. Negative if the record claims a cycle ahead of the clock.
pub fn cycles_passed(stake: &StakeRecord, clock: &CycleClock, now: u64) -> i128 {
    i128::from(clock.current_cycle) - i128::from(stake.last_claimed_cycle)
        + i128::from(clock.elapsed_cycles(now))
}

/// Estimate the PW points claimable for `stake` at `now` using [DEFAULT_POINTS_RATE].
pub fn estimate_pending_rewards(stake: &StakeRecord, clock: &CycleClock, now: u64) -> U256 {
    estimate_pending_rewards_with_rate(stake, clock, now, DEFAULT_POINTS_RATE)
}

/// Estimate the PW points claimable for `stake` at `now`.
///
/// The staked amount is truncated to whole tokens. This is a display estimate; the contract
/// computes the claim with full precision.
pub fn estimate_pending_rewards_with_rate(
    stake: &StakeRecord,
    clock: &CycleClock,
    now: u64,
    rate: PointsRate,
) -> U256 {
    if stake.staked_amount.is_zero() {
        return U256::ZERO;
    }
    let passed = cycles_passed(stake, clock, now);
    if passed <= 0 || rate.denominator == 0 {
        return stake.pending_pw_points;
    }

    let whole_tokens = stake.staked_amount / WEI_PER_TOKEN;
    let additional = whole_tokens
        .saturating_mul(U256::from(passed as u128))
        .saturating_mul(U256::from(rate.numerator))
        / U256::from(rate.denominator);
    stake.pending_pw_points.saturating_add(additional)
}

/// Estimate for one staking position, together with where the cycle clock stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakePreview {
    pub index: u64,
    pub stake: StakeRecord,
    pub cycles_passed: i128,
    pub extrapolated_cycle: u64,
    pub seconds_until_next_cycle: Option<u64>,
    pub pending_pw_points: U256,
}

impl StakePreview {
    pub fn new(index: u64, stake: StakeRecord, clock: &CycleClock, now: u64) -> Self {
        Self {
            index,
            pending_pw_points: estimate_pending_rewards(&stake, clock, now),
            cycles_passed: cycles_passed(&stake, clock, now),
            extrapolated_cycle: clock.extrapolated_cycle(now),
            seconds_until_next_cycle: clock.seconds_until_next_cycle(now),
            stake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;
    const T: u64 = 1_700_000_000;

    fn tokens(n: u64) -> U256 {
        U256::from(n) * WEI_PER_TOKEN
    }

    fn clock(current_cycle: u64) -> CycleClock {
        CycleClock { current_cycle, last_update_timestamp: T, cycle_duration: DAY }
    }

    fn stake(amount: U256, last_claimed_cycle: u64, pending: u64) -> StakeRecord {
        StakeRecord {
            staked_amount: amount,
            stable_coin: Address::repeat_byte(0xaa),
            last_claimed_cycle,
            pending_pw_points: U256::from(pending),
        }
    }

    #[test]
    fn extrapolates_elapsed_cycles() {
        let clock = clock(5);
        let now = T + DAY * 5 / 2;
        assert_eq!(clock.elapsed_cycles(now), 2);
        assert_eq!(cycles_passed(&stake(tokens(1), 3, 0), &clock, now), 4);
        assert_eq!(clock.extrapolated_cycle(now), 7);
    }

    #[test]
    fn zero_stake_is_zero() {
        for (current, claimed, now) in [(5, 3, T + DAY * 10), (0, 0, T), (100, 1, 0)] {
            let stake = stake(U256::ZERO, claimed, 1234);
            assert_eq!(estimate_pending_rewards(&stake, &clock(current), now), U256::ZERO);
        }
    }

    #[test]
    fn ten_tokens_earn_five_points_per_cycle() {
        let stake = stake(tokens(10), 5, 0);
        assert_eq!(estimate_pending_rewards(&stake, &clock(5), T + DAY), U256::from(5));
        assert_eq!(estimate_pending_rewards(&stake, &clock(6), T + DAY), U256::from(10));
    }

    #[test]
    fn adds_to_pending_baseline() {
        let stake = stake(tokens(10), 3, 100);
        // 10 tokens * 0.5 * 4 cycles on top of 100.
        assert_eq!(estimate_pending_rewards(&stake, &clock(5), T + DAY * 5 / 2), U256::from(120));
    }

    #[test]
    fn odd_products_are_floored() {
        let stake = stake(tokens(3), 4, 7);
        // 3 * 0.5 * 1 = 1.5
        assert_eq!(estimate_pending_rewards(&stake, &clock(5), T), U256::from(8));
    }

    #[test]
    fn fractional_tokens_are_truncated() {
        let amount = tokens(2) + WEI_PER_TOKEN / U256::from(2) + U256::from(1);
        let stake = stake(amount, 0, 0);
        // 2 whole tokens over 3 cycles.
        assert_eq!(estimate_pending_rewards(&stake, &clock(3), T), U256::from(3));

        // Less than one whole token accrues nothing on top of the baseline.
        let stake = StakeRecord { staked_amount: U256::from(1), ..stake };
        assert_eq!(estimate_pending_rewards(&stake, &clock(3), T), U256::ZERO);
    }

    #[test]
    fn no_cycles_passed_returns_baseline() {
        let stake = stake(tokens(10), 5, 42);
        assert_eq!(estimate_pending_rewards(&stake, &clock(5), T + DAY - 1), U256::from(42));

        // Claimed cycle ahead of the clock.
        let stake = StakeRecord { last_claimed_cycle: 9, ..stake };
        assert_eq!(cycles_passed(&stake, &clock(5), T + DAY), -3);
        assert_eq!(estimate_pending_rewards(&stake, &clock(5), T + DAY), U256::from(42));
    }

    #[test]
    fn clock_behind_last_update_adds_nothing() {
        let clock = clock(5);
        assert_eq!(clock.elapsed_cycles(T - DAY * 3), 0);
        assert_eq!(clock.extrapolated_cycle(T - DAY * 3), 5);
    }

    #[test]
    fn custom_rate() {
        let stake = stake(tokens(10), 0, 0);
        let rate = PointsRate { numerator: 3, denominator: 1 };
        assert_eq!(estimate_pending_rewards_with_rate(&stake, &clock(2), T, rate), U256::from(60));

        let broken = PointsRate { numerator: 1, denominator: 0 };
        assert_eq!(estimate_pending_rewards_with_rate(&stake, &clock(2), T, broken), U256::ZERO);
    }

    #[test]
    fn countdown_to_next_boundary() {
        let clock = clock(5);
        assert_eq!(clock.seconds_until_next_cycle(T), Some(DAY));
        assert_eq!(clock.seconds_until_next_cycle(T + DAY * 5 / 2), Some(DAY / 2));
        assert_eq!(clock.next_boundary(T + DAY * 5 / 2), Some(T + DAY * 3));
        // Exactly on a boundary, the next one is a full cycle away.
        assert_eq!(clock.seconds_until_next_cycle(T + DAY), Some(DAY));

        let unknown = CycleClock { cycle_duration: 0, ..clock };
        assert_eq!(unknown.seconds_until_next_cycle(T), None);
    }

    #[test]
    fn preview_combines_estimates() {
        let preview = StakePreview::new(2, stake(tokens(10), 3, 100), &clock(5), T + DAY * 5 / 2);
        assert_eq!(preview.index, 2);
        assert_eq!(preview.cycles_passed, 4);
        assert_eq!(preview.extrapolated_cycle, 7);
        assert_eq!(preview.seconds_until_next_cycle, Some(DAY / 2));
        assert_eq!(preview.pending_pw_points, U256::from(120));
    }
}
