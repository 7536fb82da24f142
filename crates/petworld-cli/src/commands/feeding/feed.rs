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
use anyhow::{bail, ensure, Context};
use clap::Args;
use futures_util::try_join;
use petworld_contracts::contracts::{extract_tx_logs, DecodeRevert, INFTFeedingManager};
use petworld_rewards::{fetch_feeding_records, FeedingRecord};
use serde_json::json;

use crate::{
    config::GlobalConfig,
    context::PetWorldContext,
    outcome::{Submitted, TxOutcome},
    token::ensure_allowance,
};

/// Command to feed one NFT.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct FeedingFeed {
    /// Token ID of the NFT to feed.
    pub token_id: U256,

    /// Number of feeding hours to buy.
    #[clap(long)]
    pub hours: u64,
}

impl FeedingFeed {
    /// Run the [FeedingFeed] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let result = async {
            let ctx = global_config.build_context_with_signer().await?;
            feed_one(&ctx, self.token_id, self.hours).await
        };
        TxOutcome::from_result(result.await).report()
    }
}

/// Command to feed several NFTs the same number of hours in one transaction.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct FeedingFeedMany {
    /// Token IDs of the NFTs to feed.
    #[clap(required = true, num_args = 1..)]
    pub token_ids: Vec<U256>,

    /// Number of feeding hours to buy for each NFT.
    #[clap(long)]
    pub hours: u64,
}

impl FeedingFeedMany {
    /// Run the [FeedingFeedMany] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let result = async {
            let ctx = global_config.build_context_with_signer().await?;
            feed_many(&ctx, &self.token_ids, self.hours).await
        };
        TxOutcome::from_result(result.await).report()
    }
}

/// Feed one NFT, approving the food token first if needed.
pub async fn feed_one(
    ctx: &PetWorldContext,
    token_id: U256,
    hours: u64,
) -> anyhow::Result<Submitted> {
    let food_amount = prepare_feeding(ctx, &[token_id], hours).await?;

    let pending = ctx
        .feeding_manager()
        .feedNFT(token_id, U256::from(hours))
        .send()
        .await
        .maybe_decode_revert::<INFTFeedingManager::INFTFeedingManagerErrors>()
        .context("Failed to send feedNFT transaction")?;
    let receipt = ctx.confirm("feedNFT", pending).await?;

    let fed = fed_events(&receipt)?;
    tracing::info!("Fed token {token_id} for {hours} hours using {food_amount} food");
    Ok(Submitted::new(receipt.transaction_hash, json!({ "foodAmount": food_amount, "fed": fed })))
}

/// Feed several NFTs `hours` each in a single transaction, approving the food token first if
/// needed.
///
/// Every token is checked before anything is sent: if any is inactive or would exceed the
/// maximum banked hours, nothing is fed.
pub async fn feed_many(
    ctx: &PetWorldContext,
    token_ids: &[U256],
    hours: u64,
) -> anyhow::Result<Submitted> {
    ensure!(!token_ids.is_empty(), "No tokens to feed");
    let food_amount = prepare_feeding(ctx, token_ids, hours).await?;

    let pending = ctx
        .feeding_manager()
        .feedMultipleNFTs(token_ids.to_vec(), U256::from(hours))
        .send()
        .await
        .maybe_decode_revert::<INFTFeedingManager::INFTFeedingManagerErrors>()
        .context("Failed to send feedMultipleNFTs transaction")?;
    let receipt = ctx.confirm("feedMultipleNFTs", pending).await?;

    let fed = fed_events(&receipt)?;
    tracing::info!("Fed {} tokens for {hours} hours each using {food_amount} food", fed.len());
    Ok(Submitted::new(receipt.transaction_hash, json!({ "foodAmount": food_amount, "fed": fed })))
}

/// Check that every token can take `hours` more feeding, then make sure the feeding manager
/// may spend the food. Returns the food cost.
async fn prepare_feeding(
    ctx: &PetWorldContext,
    token_ids: &[U256],
    hours: u64,
) -> anyhow::Result<U256> {
    ensure!(hours > 0, "Feeding hours must be positive");
    let manager = &ctx.feeding_manager();
    let source = &ctx.feeding_source();

    let (records, max_hours, food_per_hour) = ctx
        .with_retry(|_| async move {
            try_join!(
                fetch_feeding_records(source, token_ids),
                async {
                    manager.MAX_FEEDING_HOURS().call().await.context("failed to fetch max hours")
                },
                async {
                    manager.FOOD_PER_HOUR().call().await.context("failed to fetch food per hour")
                },
            )
        })
        .await?;

    check_feedable(&records, hours, max_hours)?;

    let food_amount = food_per_hour
        .checked_mul(U256::from(hours))
        .and_then(|per_token| per_token.checked_mul(U256::from(token_ids.len())))
        .context("food cost overflows")?;
    let food_token = ctx.food_token().await?;
    ensure_allowance(ctx, food_token, *manager.address(), food_amount).await?;
    Ok(food_amount)
}

/// Refuse to feed inactive tokens, or tokens that would bank more than `max_hours`.
fn check_feedable(
    records: &[(U256, FeedingRecord)],
    hours: u64,
    max_hours: U256,
) -> anyhow::Result<()> {
    let inactive: Vec<String> = records
        .iter()
        .filter(|(_, record)| !record.is_active)
        .map(|(token_id, _)| token_id.to_string())
        .collect();
    if !inactive.is_empty() {
        bail!("Cannot feed inactive tokens: {}", inactive.join(", "));
    }

    let over: Vec<String> = records
        .iter()
        .filter(|(_, record)| U256::from(record.feeding_hours.saturating_add(hours)) > max_hours)
        .map(|(token_id, record)| format!("{token_id} ({} banked)", record.feeding_hours))
        .collect();
    if !over.is_empty() {
        bail!(
            "Feeding {hours} more hours would exceed the maximum of {max_hours} for tokens: {}",
            over.join(", ")
        );
    }
    Ok(())
}

fn fed_events(
    receipt: &alloy::rpc::types::TransactionReceipt,
) -> anyhow::Result<Vec<serde_json::Value>> {
    Ok(extract_tx_logs::<INFTFeedingManager::NFTFed>(receipt)?
        .into_iter()
        .map(|log| {
            let event = log.data();
            json!({
                "tokenId": event.tokenId,
                "foodAmount": event.foodAmount,
                "newFeedingHours": event.newFeedingHours,
            })
        })
        .collect())
}
