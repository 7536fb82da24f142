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

//! Reward estimation for Pet World feeding and stable staking.
//!
//! The estimators are pure functions over a snapshot of on-chain state. They preview what a claim
//! transaction would pay before it is sent; the contracts remain the source of truth.

pub mod feeding;
pub mod snapshot;
pub mod sources;
pub mod staking;

pub use feeding::{
    claimable_cycles, estimate_claimable, ClaimPreview, ClaimableRewards, FeedingRecord, Quality,
    RewardRate, TokenClaim, SECONDS_PER_FEEDING_HOUR,
};

pub use snapshot::{FeedingSnapshot, SnapshotError, StakingSnapshot};

pub use sources::{
    fetch_feeding_records, preview_claimable, preview_stake, preview_stakes,
    ContractFeedingSource, ContractStakingSource, FeedingSource, StakingSource,
};

pub use staking::{
    cycles_passed, estimate_pending_rewards, estimate_pending_rewards_with_rate, CycleClock,
    PointsRate, StakePreview, StakeRecord, DEFAULT_POINTS_RATE, WEI_PER_TOKEN,
};
