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
use anyhow::Context;
use clap::Args;
use petworld_contracts::contracts::{extract_tx_log, DecodeRevert, IStableStaking};
use serde_json::json;

use crate::{
    config::GlobalConfig,
    context::PetWorldContext,
    outcome::{Submitted, TxOutcome},
};

/// Command to withdraw a staking position.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingWithdraw {
    /// Index of the staking position.
    #[clap(long)]
    pub index: u64,
}

impl StakingWithdraw {
    /// Run the [StakingWithdraw] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let result = async {
            let ctx = global_config.build_context_with_signer().await?;
            withdraw(&ctx, self.index).await
        };
        TxOutcome::from_result(result.await).report()
    }
}

/// Withdraw the staking position at `index` of the context's account.
pub async fn withdraw(ctx: &PetWorldContext, index: u64) -> anyhow::Result<Submitted> {
    let staking = IStableStaking::new(ctx.deployment.stable_staking_address, ctx.provider.clone());
    let pending = staking
        .withdraw(U256::from(index))
        .send()
        .await
        .maybe_decode_revert::<IStableStaking::IStableStakingErrors>()
        .context("Failed to send withdraw transaction")?;
    let receipt = ctx.confirm("withdraw", pending).await?;

    let log = extract_tx_log::<IStableStaking::Withdrawn>(&receipt)?;
    let withdrawn = log.data();
    tracing::info!(
        "Withdrew {} of {} from index {}",
        withdrawn.amount,
        withdrawn.stableCoin,
        withdrawn.stakingIndex
    );

    Ok(Submitted::new(
        receipt.transaction_hash,
        json!({
            "stableCoin": withdrawn.stableCoin,
            "amount": withdrawn.amount,
            "stakingIndex": withdrawn.stakingIndex,
        }),
    ))
}
