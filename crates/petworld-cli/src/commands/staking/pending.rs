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

use alloy::primitives::Address;
use anyhow::Context;
use clap::Args;
use petworld_rewards::{preview_stake, preview_stakes};

use super::log_stake_preview;
use crate::{config::GlobalConfig, context::unix_now};

/// Command to estimate the pending PW points of staking positions.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingPending {
    /// Owner of the positions. Defaults to the address of the private key.
    #[clap(long)]
    pub account: Option<Address>,

    /// Only show the position at this index.
    #[clap(long)]
    pub index: Option<u64>,

    /// Unix timestamp to estimate for, instead of the current time.
    #[clap(long)]
    pub now: Option<u64>,
}

impl StakingPending {
    /// Run the [StakingPending] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let account = self
            .account
            .or_else(|| global_config.private_key.as_ref().map(|key| key.address()))
            .context("No account given; please set --account or --private-key")?;
        let ctx = global_config.build_context().await?;
        let source = &ctx.staking_source();
        let now = self.now.unwrap_or_else(unix_now);

        let previews = match self.index {
            Some(index) => vec![
                ctx.with_retry(|_| async move { preview_stake(source, account, index, now).await })
                    .await?,
            ],
            None => {
                ctx.with_retry(|_| async move { preview_stakes(source, account, now).await })
                    .await?
            }
        };

        if previews.is_empty() {
            tracing::info!("No staking positions for {account}");
        }
        for preview in &previews {
            log_stake_preview(preview);
        }
        Ok(())
    }
}
