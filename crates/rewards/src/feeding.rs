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

//! Feeding-cycle reward estimation.
//!
//! Mirrors the claim computation performed by the feeding manager contract so that the amount
//! shown before a claim matches what the claim transaction pays out. A fed NFT accrues one cycle
//! per `seconds_per_cycle` while it still has feeding hours banked. Once the banked hours run out
//! it is starving and accrues nothing until it is fed again.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::snapshot::lenient;

/// Feeding hours are banked in hours, independently of the cycle length.
pub const SECONDS_PER_FEEDING_HOUR: u64 = 3600;

/// NFT quality tier. Determines the per-cycle reward rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

impl Quality {
    pub const ALL: [Quality; 5] =
        [Quality::Common, Quality::Uncommon, Quality::Rare, Quality::Epic, Quality::Legendary];

    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Feeding state of a single NFT, as stored by the feeding manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingRecord {
    /// Hours of feeding banked at the last claim.
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub feeding_hours: u64,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub last_claim_time: u64,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub last_feed_time: u64,
    /// Raw quality index, see [Quality].
    #[serde(default, deserialize_with = "lenient::to_u8")]
    pub quality: u8,
    #[serde(default, deserialize_with = "lenient::to_bool")]
    pub is_active: bool,
    /// Cycles carried over from before the last claim.
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub accumulated_cycles: u64,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub level: u64,
    #[serde(default, deserialize_with = "lenient::to_u256")]
    pub accumulated_food: U256,
}

impl FeedingRecord {
    pub fn quality(&self) -> Option<Quality> {
        Quality::from_raw(self.quality)
    }

    /// Time at which the banked feeding hours run out, counted from the last claim.
    pub fn starvation_time(&self) -> u64 {
        self.last_claim_time.saturating_add(self.fed_seconds())
    }

    fn fed_seconds(&self) -> u64 {
        self.feeding_hours.saturating_mul(SECONDS_PER_FEEDING_HOUR)
    }
}

/// Per-cycle rewards for one quality tier, in the smallest unit of each reward token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRate {
    #[serde(default, deserialize_with = "lenient::to_u256")]
    pub primary: U256,
    #[serde(default, deserialize_with = "lenient::to_u256")]
    pub secondary: U256,
}

impl RewardRate {
    pub fn new(primary: U256, secondary: U256) -> Self {
        Self { primary, secondary }
    }
}

/// Rewards a claim would pay out right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimableRewards {
    pub primary_reward: U256,
    pub secondary_reward: U256,
    pub cycles: u64,
}

impl ClaimableRewards {
    pub fn is_zero(&self) -> bool {
        self.cycles == 0 && self.primary_reward.is_zero() && self.secondary_reward.is_zero()
    }
}

impl std::ops::AddAssign for ClaimableRewards {
    fn add_assign(&mut self, rhs: Self) {
        self.primary_reward = self.primary_reward.saturating_add(rhs.primary_reward);
        self.secondary_reward = self.secondary_reward.saturating_add(rhs.secondary_reward);
        self.cycles = self.cycles.saturating_add(rhs.cycles);
    }
}

/// Number of reward cycles a claim at `now` would pay for.
///
/// Starts from the carried-over `accumulated_cycles`. If the NFT stayed fed for the whole time
/// since the last claim, every full cycle in that window counts, with no upper limit. Otherwise
/// the NFT counts one cycle per banked feeding hour up to the point it starved, plus the full
/// cycles since it was fed again (if it was), the latter capped at the hours currently banked.
///
/// Inactive records accrue nothing. A zero cycle length is read as "no time-based accrual".
pub fn claimable_cycles(record: &FeedingRecord, now: u64, seconds_per_cycle: u64) -> u64 {
    if !record.is_active {
        return 0;
    }

    let baseline = record.accumulated_cycles;
    // Nothing elapsed (or no usable cycle length): only the carried-over cycles are claimable.
    if now <= record.last_claim_time || seconds_per_cycle == 0 {
        return baseline;
    }

    let elapsed = now - record.last_claim_time;
    if record.fed_seconds() >= elapsed {
        // NOTE: Uncapped. The contract no longer limits the cycles claimable at once.
        return baseline.saturating_add(elapsed / seconds_per_cycle);
    }

    // Starved before `now`. Each banked hour counts as one cycle.
    let mut total = baseline.saturating_add(record.feeding_hours);
    if record.last_feed_time > record.starvation_time() {
        let refed_cycles = now.saturating_sub(record.last_feed_time) / seconds_per_cycle;
        total = total.saturating_add(refed_cycles.min(record.feeding_hours));
    }
    total
}

/// Estimate the rewards a claim for `record` would pay at `now`.
///
/// Never fails: inactive records and records with nothing elapsed yield zero.
pub fn estimate_claimable(
    record: &FeedingRecord,
    now: u64,
    seconds_per_cycle: u64,
    rate: &RewardRate,
) -> ClaimableRewards {
    let cycles = claimable_cycles(record, now, seconds_per_cycle);
    if cycles == 0 {
        return ClaimableRewards::default();
    }
    let cycles_u256 = U256::from(cycles);
    ClaimableRewards {
        primary_reward: cycles_u256.saturating_mul(rate.primary),
        secondary_reward: cycles_u256.saturating_mul(rate.secondary),
        cycles,
    }
}

/// Claimable rewards for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenClaim {
    pub token_id: U256,
    pub record: FeedingRecord,
    pub rate: RewardRate,
    pub rewards: ClaimableRewards,
}

/// Claimable rewards over a set of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimPreview {
    pub seconds_per_cycle: u64,
    pub now: u64,
    pub tokens: Vec<TokenClaim>,
    pub total: ClaimableRewards,
}

impl ClaimPreview {
    /// Token IDs with something to claim.
    pub fn claimable_token_ids(&self) -> Vec<U256> {
        self.tokens.iter().filter(|t| !t.rewards.is_zero()).map(|t| t.token_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3600;

    fn rate(primary: u64, secondary: u64) -> RewardRate {
        RewardRate::new(U256::from(primary), U256::from(secondary))
    }

    fn fed_record(feeding_hours: u64, last_claim_time: u64) -> FeedingRecord {
        FeedingRecord {
            feeding_hours,
            last_claim_time,
            last_feed_time: last_claim_time,
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn inactive_record_is_zero() {
        let record = FeedingRecord {
            is_active: false,
            accumulated_cycles: 42,
            ..fed_record(168, 1000)
        };
        let rewards = estimate_claimable(&record, 1000 + 100 * HOUR, HOUR, &rate(5, 5));
        assert_eq!(rewards, ClaimableRewards::default());
    }

    #[test]
    fn nothing_elapsed_is_zero() {
        let record = fed_record(168, 1000);
        let rewards = estimate_claimable(&record, 1000, HOUR, &rate(2, 1));
        assert!(rewards.is_zero());

        // A clock behind the last claim is treated the same way.
        let rewards = estimate_claimable(&record, 500, HOUR, &rate(2, 1));
        assert!(rewards.is_zero());
    }

    #[test]
    fn baseline_is_claimable_without_elapsed_time() {
        let record = FeedingRecord { accumulated_cycles: 7, ..fed_record(168, 1000) };
        let rewards = estimate_claimable(&record, 1000, HOUR, &rate(3, 1));
        assert_eq!(rewards.cycles, 7);
        assert_eq!(rewards.primary_reward, U256::from(21));
        assert_eq!(rewards.secondary_reward, U256::from(7));
    }

    #[test]
    fn fed_window_end_to_end() {
        let record = FeedingRecord { quality: Quality::Common.as_raw(), ..fed_record(168, 1000) };
        let rewards = estimate_claimable(&record, 1000 + HOUR * 50, HOUR, &rate(2, 1));
        assert_eq!(rewards.cycles, 50);
        assert_eq!(rewards.primary_reward, U256::from(100));
        assert_eq!(rewards.secondary_reward, U256::from(50));
    }

    #[test]
    fn partial_cycles_are_floored() {
        let record = fed_record(168, 0);
        assert_eq!(claimable_cycles(&record, HOUR * 3 - 1, HOUR), 2);
        assert_eq!(claimable_cycles(&record, HOUR * 3, HOUR), 3);
    }

    #[test]
    fn fed_window_is_not_capped() {
        // Fed for the whole window: ten thousand cycles, no maximum applied.
        let record = fed_record(10_000, 0);
        assert_eq!(claimable_cycles(&record, 10_000 * HOUR, HOUR), 10_000);

        // Shorter cycles than feeding hours still accrue every full cycle.
        let record = fed_record(168, 0);
        assert_eq!(claimable_cycles(&record, 168 * HOUR, 60), 168 * 60);
    }

    #[test]
    fn starved_without_refeed_counts_banked_hours() {
        let record = FeedingRecord { last_feed_time: 0, ..fed_record(10, 0) };
        assert_eq!(claimable_cycles(&record, 100_000, HOUR), 10);
    }

    #[test]
    fn starvation_split_with_refeed() {
        let record = FeedingRecord { last_feed_time: 50_000, ..fed_record(10, 0) };
        // 10 before starving, then min(floor(50_000 / 3600), 10) = min(13, 10).
        assert_eq!(claimable_cycles(&record, 100_000, HOUR), 10 + 10);

        // With more hours banked the refeed window is no longer the limit.
        let record = FeedingRecord { last_feed_time: 80_000, ..fed_record(10, 0) };
        assert_eq!(claimable_cycles(&record, 100_000, HOUR), 10 + 5);
    }

    #[test]
    fn feed_before_starvation_adds_no_second_window() {
        // Fed again at 20_000, before the 36_000 starvation point.
        let record = FeedingRecord { last_feed_time: 20_000, ..fed_record(10, 0) };
        assert_eq!(claimable_cycles(&record, 100_000, HOUR), 10);
    }

    #[test]
    fn refeed_after_now_adds_nothing() {
        let record = FeedingRecord { last_feed_time: 200_000, ..fed_record(10, 0) };
        assert_eq!(claimable_cycles(&record, 100_000, HOUR), 10);
    }

    #[test]
    fn accrual_is_monotonic_in_time() {
        let records = [
            fed_record(168, 1000),
            FeedingRecord { last_feed_time: 50_000, ..fed_record(10, 0) },
            FeedingRecord { accumulated_cycles: 3, last_feed_time: 0, ..fed_record(2, 0) },
        ];
        for record in records {
            let mut previous = 0;
            for now in (0..400 * HOUR).step_by(997) {
                let cycles = claimable_cycles(&record, now, HOUR);
                assert!(cycles >= previous, "{record:?} decreased at {now}");
                previous = cycles;
            }
        }
    }

    #[test]
    fn zero_cycle_length_keeps_baseline() {
        let record = FeedingRecord { accumulated_cycles: 4, ..fed_record(168, 0) };
        assert_eq!(claimable_cycles(&record, 100 * HOUR, 0), 4);
    }

    #[test]
    fn huge_values_saturate() {
        let record = FeedingRecord { accumulated_cycles: u64::MAX, ..fed_record(u64::MAX, 0) };
        let rate = RewardRate::new(U256::MAX, U256::from(1));
        let rewards = estimate_claimable(&record, u64::MAX, 1, &rate);
        assert_eq!(rewards.cycles, u64::MAX);
        assert_eq!(rewards.primary_reward, U256::MAX);
    }

    #[test]
    fn quality_from_raw() {
        assert_eq!(Quality::from_raw(0), Some(Quality::Common));
        assert_eq!(Quality::from_raw(4), Some(Quality::Legendary));
        assert_eq!(Quality::from_raw(5), None);
    }

    #[test]
    fn claimable_token_ids_skip_empty() {
        let preview = ClaimPreview {
            tokens: vec![
                TokenClaim {
                    token_id: U256::from(1),
                    record: FeedingRecord::default(),
                    rate: RewardRate::default(),
                    rewards: ClaimableRewards::default(),
                },
                TokenClaim {
                    token_id: U256::from(2),
                    record: FeedingRecord::default(),
                    rate: RewardRate::default(),
                    rewards: ClaimableRewards { cycles: 1, ..Default::default() },
                },
            ],
            ..Default::default()
        };
        assert_eq!(preview.claimable_token_ids(), vec![U256::from(2)]);
    }
}
