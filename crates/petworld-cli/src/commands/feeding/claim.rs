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
use anyhow::{ensure, Context};
use clap::Args;
use petworld_contracts::contracts::{extract_tx_log, DecodeRevert, INFTFeedingManager};
use petworld_rewards::preview_claimable;
use serde_json::json;

use super::claimable::log_preview;
use crate::{
    config::GlobalConfig,
    context::{unix_now, PetWorldContext},
    outcome::{Submitted, TxOutcome},
};

/// Command to claim the rewards of NFTs.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct FeedingClaim {
    /// Token IDs of the NFTs to claim for. Tokens with nothing claimable are skipped.
    #[clap(required = true, num_args = 1..)]
    pub token_ids: Vec<U256>,
}

impl FeedingClaim {
    /// Run the [FeedingClaim] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let result = async {
            let ctx = global_config.build_context_with_signer().await?;
            claim_rewards(&ctx, &self.token_ids).await
        };
        TxOutcome::from_result(result.await).report()
    }
}

/// Claim the rewards of those `token_ids` that have something to claim.
///
/// The claim is previewed first; the amounts actually paid are read back from the
/// `RewardsClaimed` event.
pub async fn claim_rewards(ctx: &PetWorldContext, token_ids: &[U256]) -> anyhow::Result<Submitted> {
    let source = &ctx.feeding_source();
    let now = unix_now();
    let preview = ctx
        .with_retry(|_| async move { preview_claimable(source, token_ids, now).await })
        .await?;
    log_preview(&preview);

    let claimable = preview.claimable_token_ids();
    ensure!(!claimable.is_empty(), "No rewards to claim for tokens {token_ids:?}");

    let pending = ctx
        .feeding_manager()
        .claimRewards(claimable.clone())
        .send()
        .await
        .maybe_decode_revert::<INFTFeedingManager::INFTFeedingManagerErrors>()
        .context("Failed to send claimRewards transaction")?;
    let receipt = ctx.confirm("claimRewards", pending).await?;

    let log = extract_tx_log::<INFTFeedingManager::RewardsClaimed>(&receipt)?;
    let claimed = log.data();
    if claimed.primaryReward != preview.total.primary_reward
        || claimed.secondaryReward != preview.total.secondary_reward
    {
        // Blocks mined after the preview can add cycles.
        tracing::warn!(
            "Claimed rewards differ from the estimate: primary {} (estimated {}), secondary {} (estimated {})",
            claimed.primaryReward,
            preview.total.primary_reward,
            claimed.secondaryReward,
            preview.total.secondary_reward,
        );
    }
    tracing::info!(
        "Claimed {} cycles: primary reward {}, secondary reward {}",
        claimed.totalCycles,
        claimed.primaryReward,
        claimed.secondaryReward
    );

    Ok(Submitted::new(
        receipt.transaction_hash,
        json!({
            "tokenIds": claimed.tokenIds,
            "primaryReward": claimed.primaryReward,
            "secondaryReward": claimed.secondaryReward,
            "totalCycles": claimed.totalCycles,
            "estimated": preview.total,
        }),
    ))
}
