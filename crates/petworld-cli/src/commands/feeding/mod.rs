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

//! Commands of the Pet World CLI for NFT feeding.

mod claim;
mod claimable;
mod estimate;
mod feed;
mod status;

pub use claim::{claim_rewards, FeedingClaim};
pub use claimable::FeedingClaimable;
pub use estimate::FeedingEstimate;
pub use feed::{feed_many, feed_one, FeedingFeed, FeedingFeedMany};
pub use status::FeedingStatus;

use clap::Subcommand;
use petworld_rewards::FeedingRecord;

use crate::config::GlobalConfig;

/// Commands for NFT feeding.
#[derive(Subcommand, Clone, Debug)]
pub enum FeedingCommands {
    /// Show the feeding records of NFTs.
    Status(FeedingStatus),
    /// Estimate the rewards claimable now for NFTs.
    Claimable(FeedingClaimable),
    /// Estimate claimable rewards offline from a snapshot file.
    Estimate(FeedingEstimate),
    /// Feed one NFT.
    Feed(FeedingFeed),
    /// Feed several NFTs the same number of hours.
    FeedMany(FeedingFeedMany),
    /// Claim the rewards of NFTs.
    Claim(FeedingClaim),
}

impl FeedingCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Status(cmd) => cmd.run(global_config).await,
            Self::Claimable(cmd) => cmd.run(global_config).await,
            Self::Estimate(cmd) => cmd.run(global_config).await,
            Self::Feed(cmd) => cmd.run(global_config).await,
            Self::FeedMany(cmd) => cmd.run(global_config).await,
            Self::Claim(cmd) => cmd.run(global_config).await,
        }
    }
}

fn quality_name(record: &FeedingRecord) -> String {
    match record.quality() {
        Some(quality) => quality.to_string(),
        None => format!("unknown quality {}", record.quality),
    }
}
