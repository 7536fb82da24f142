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

use alloy::primitives::U256;
use clap::Args;
use petworld_rewards::{preview_claimable, ClaimPreview};

use super::quality_name;
use crate::{config::GlobalConfig, context::unix_now};

/// Command to estimate the rewards claimable now for NFTs.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct FeedingClaimable {
    /// Token IDs of the NFTs.
    #[clap(required = true, num_args = 1..)]
    pub token_ids: Vec<U256>,

    /// Unix timestamp to estimate for, instead of the current time.
    #[clap(long)]
    pub now: Option<u64>,

    /// Print the preview as JSON.
    #[clap(long)]
    pub json: bool,
}

impl FeedingClaimable {
    /// Run the [FeedingClaimable] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let ctx = global_config.build_context().await?;
        let source = &ctx.feeding_source();
        let token_ids = &self.token_ids[..];
        let now = self.now.unwrap_or_else(unix_now);
        let preview = ctx
            .with_retry(|_| async move { preview_claimable(source, token_ids, now).await })
            .await?;

        if self.json {
            tracing::info!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            log_preview(&preview);
        }
        Ok(())
    }
}

pub(super) fn log_preview(preview: &ClaimPreview) {
    for token in &preview.tokens {
        tracing::info!(
            "Token {} ({}{}): {} cycles, primary reward {}, secondary reward {}",
            token.token_id,
            quality_name(&token.record),
            if token.record.is_active { "" } else { ", inactive" },
            token.rewards.cycles,
            token.rewards.primary_reward,
            token.rewards.secondary_reward,
        );
    }
    tracing::info!(
        "Total: {} cycles, primary reward {}, secondary reward {}",
        preview.total.cycles,
        preview.total.primary_reward,
        preview.total.secondary_reward,
    );
}
