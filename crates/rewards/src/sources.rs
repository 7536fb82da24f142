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

//! Fetching snapshots of on-chain state for the estimators.
//!
//! Reads that do not depend on each other are issued concurrently and joined, in chunks of at
//! most [CHUNK_SIZE] requests.

use std::collections::{BTreeSet, HashMap};

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use futures_util::{future::try_join_all, try_join};
use petworld_contracts::contracts::{INFTFeedingManager, IStableStaking};

use crate::{
    feeding::{
        estimate_claimable, ClaimPreview, ClaimableRewards, FeedingRecord, RewardRate, TokenClaim,
    },
    staking::{CycleClock, StakePreview, StakeRecord},
};

/// Most requests in flight at once when fetching many records.
pub const CHUNK_SIZE: usize = 16;

/// Most staking positions previewed for a single account.
pub const MAX_STAKES: u64 = 1024;

/// Read access to the feeding manager's state.
#[async_trait]
pub trait FeedingSource: Send + Sync {
    async fn feeding_record(&self, token_id: U256) -> Result<FeedingRecord>;
    async fn reward_rate(&self, quality: u8) -> Result<RewardRate>;
    async fn seconds_per_cycle(&self) -> Result<u64>;
}

/// Read access to the stable staking contract's state.
#[async_trait]
pub trait StakingSource: Send + Sync {
    async fn cycle_clock(&self) -> Result<CycleClock>;
    async fn stake_count(&self, user: Address) -> Result<u64>;
    async fn stake_record(&self, user: Address, index: u64) -> Result<StakeRecord>;
}

/// Convert an on-chain integer that the estimators treat as `u64`. Values that do not fit are
/// read as zero.
fn to_u64_or_zero(field: &str, value: U256) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| {
        tracing::warn!("{field} value {value} does not fit in u64; reading it as zero");
        0
    })
}

/// [FeedingSource] backed by the [INFTFeedingManager] contract.
pub struct ContractFeedingSource<P> {
    manager: INFTFeedingManager::INFTFeedingManagerInstance<P>,
}

impl<P: Provider> ContractFeedingSource<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self { manager: INFTFeedingManager::new(address, provider) }
    }
}

#[async_trait]
impl<P: Provider> FeedingSource for ContractFeedingSource<P> {
    async fn feeding_record(&self, token_id: U256) -> Result<FeedingRecord> {
        let raw = self
            .manager
            .nftFeeding(token_id)
            .call()
            .await
            .with_context(|| format!("failed to fetch feeding record of token {token_id}"))?;
        Ok(FeedingRecord {
            feeding_hours: to_u64_or_zero("feedingHours", raw.feedingHours),
            last_claim_time: to_u64_or_zero("lastClaimTime", raw.lastClaimTime),
            last_feed_time: to_u64_or_zero("lastFeedTime", raw.lastFeedTime),
            quality: raw.quality,
            is_active: raw.isActive,
            accumulated_cycles: to_u64_or_zero("accumulatedCycles", raw.accumulatedCycles),
            level: to_u64_or_zero("level", raw.level),
            accumulated_food: raw.accumulatedFood,
        })
    }

    async fn reward_rate(&self, quality: u8) -> Result<RewardRate> {
        let raw = self
            .manager
            .rewardConfigs(quality)
            .call()
            .await
            .with_context(|| format!("failed to fetch reward config for quality {quality}"))?;
        Ok(RewardRate {
            primary: raw.primaryRewardPerCycle,
            secondary: raw.secondaryRewardPerCycle,
        })
    }

    async fn seconds_per_cycle(&self) -> Result<u64> {
        let value = self
            .manager
            .SECONDS_PER_CYCLE()
            .call()
            .await
            .context("failed to fetch SECONDS_PER_CYCLE")?;
        Ok(to_u64_or_zero("SECONDS_PER_CYCLE", value))
    }
}

/// [StakingSource] backed by the [IStableStaking] contract.
pub struct ContractStakingSource<P> {
    staking: IStableStaking::IStableStakingInstance<P>,
}

impl<P: Provider> ContractStakingSource<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self { staking: IStableStaking::new(address, provider) }
    }
}

#[async_trait]
impl<P: Provider> StakingSource for ContractStakingSource<P> {
    async fn cycle_clock(&self) -> Result<CycleClock> {
        let (current_cycle, last_update, duration) = try_join!(
            async { self.staking.currentCycle().call().await },
            async { self.staking.lastUpdateTimestamp().call().await },
            async { self.staking.CYCLE_DURATION().call().await },
        )
        .context("failed to fetch staking cycle clock")?;
        Ok(CycleClock {
            current_cycle: to_u64_or_zero("currentCycle", current_cycle),
            last_update_timestamp: to_u64_or_zero("lastUpdateTimestamp", last_update),
            cycle_duration: to_u64_or_zero("CYCLE_DURATION", duration),
        })
    }

    async fn stake_count(&self, user: Address) -> Result<u64> {
        let count = self
            .staking
            .userStakingCount(user)
            .call()
            .await
            .with_context(|| format!("failed to fetch staking count of {user}"))?;
        Ok(to_u64_or_zero("userStakingCount", count))
    }

    async fn stake_record(&self, user: Address, index: u64) -> Result<StakeRecord> {
        let raw = self
            .staking
            .userStakingInfo(user, U256::from(index))
            .call()
            .await
            .with_context(|| format!("failed to fetch staking info {index} of {user}"))?;
        Ok(StakeRecord {
            staked_amount: raw.stakedAmount,
            stable_coin: raw.stableCoin,
            last_claimed_cycle: to_u64_or_zero("lastClaimedCycle", raw.lastClaimedCycle),
            pending_pw_points: raw.pendingPwPoints,
        })
    }
}

/// Fetch the feeding records of all `token_ids` concurrently, in the order given.
pub async fn fetch_feeding_records(
    source: &impl FeedingSource,
    token_ids: &[U256],
) -> Result<Vec<(U256, FeedingRecord)>> {
    let mut records = Vec::with_capacity(token_ids.len());
    for chunk in token_ids.chunks(CHUNK_SIZE) {
        records.extend(
            try_join_all(chunk.iter().map(|&token_id| async move {
                Ok::<_, anyhow::Error>((token_id, source.feeding_record(token_id).await?))
            }))
            .await?,
        );
    }
    Ok(records)
}

/// Fetch the reward rate of every distinct quality among `records`.
async fn fetch_reward_rates<'a>(
    source: &impl FeedingSource,
    records: impl IntoIterator<Item = &'a FeedingRecord>,
) -> Result<HashMap<u8, RewardRate>> {
    let qualities: BTreeSet<u8> = records.into_iter().map(|record| record.quality).collect();
    let rates = try_join_all(qualities.into_iter().map(|quality| async move {
        Ok::<_, anyhow::Error>((quality, source.reward_rate(quality).await?))
    }))
    .await?;
    Ok(rates.into_iter().collect())
}

/// Estimate the rewards claimable at `now` for each of `token_ids`, and their total.
pub async fn preview_claimable(
    source: &impl FeedingSource,
    token_ids: &[U256],
    now: u64,
) -> Result<ClaimPreview> {
    let (seconds_per_cycle, records) =
        try_join!(source.seconds_per_cycle(), fetch_feeding_records(source, token_ids))?;
    let rates = fetch_reward_rates(source, records.iter().map(|(_, record)| record)).await?;

    let mut total = ClaimableRewards::default();
    let tokens = records
        .into_iter()
        .map(|(token_id, record)| {
            let rate = rates.get(&record.quality).copied().unwrap_or_default();
            let rewards = estimate_claimable(&record, now, seconds_per_cycle, &rate);
            total += rewards;
            TokenClaim { token_id, record, rate, rewards }
        })
        .collect();

    Ok(ClaimPreview { seconds_per_cycle, now, tokens, total })
}

/// Estimate the pending points of one staking position.
pub async fn preview_stake(
    source: &impl StakingSource,
    user: Address,
    index: u64,
    now: u64,
) -> Result<StakePreview> {
    let (clock, stake) = try_join!(source.cycle_clock(), source.stake_record(user, index))?;
    Ok(StakePreview::new(index, stake, &clock, now))
}

/// Estimate the pending points of every staking position of `user`.
///
/// Fails without fetching any position if the contract reports more than [MAX_STAKES].
pub async fn preview_stakes(
    source: &impl StakingSource,
    user: Address,
    now: u64,
) -> Result<Vec<StakePreview>> {
    let (clock, count) = try_join!(source.cycle_clock(), source.stake_count(user))?;
    ensure!(
        count <= MAX_STAKES,
        "{user} has {count} staking positions; at most {MAX_STAKES} can be previewed"
    );

    let indices: Vec<u64> = (0..count).collect();
    let mut previews = Vec::with_capacity(indices.len());
    for chunk in indices.chunks(CHUNK_SIZE) {
        let stakes = try_join_all(chunk.iter().map(|&index| source.stake_record(user, index)))
            .await?;
        previews.extend(
            chunk
                .iter()
                .zip(stakes)
                .map(|(&index, stake)| StakePreview::new(index, stake, &clock, now)),
        );
    }
    Ok(previews)
}
