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

use alloy::primitives::{Address, U256};
use anyhow::{ensure, Context};
use clap::Args;
use petworld_contracts::contracts::{extract_tx_log, DecodeRevert, IStableStaking};
use serde_json::json;

use crate::{
    config::GlobalConfig,
    context::PetWorldContext,
    outcome::{Submitted, TxOutcome},
    token::{ensure_allowance, format_amount, parse_amount, token_decimals},
};

/// Command to stake a stable coin.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingStake {
    /// Address of the stable coin to stake.
    #[clap(long)]
    pub stable_coin: Address,

    /// Amount to stake, in whole tokens (e.g. `100` or `12.5`).
    #[clap(long)]
    pub amount: String,
}

impl StakingStake {
    /// Run the [StakingStake] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let result = async {
            let ctx = global_config.build_context_with_signer().await?;
            let decimals = token_decimals(&ctx, self.stable_coin).await?;
            let amount = parse_amount(&self.amount, decimals)?;
            stake(&ctx, self.stable_coin, amount).await
        };
        TxOutcome::from_result(result.await).report()
    }
}

/// Stake `amount` base units of `stable_coin`, approving the staking contract first if needed.
pub async fn stake(
    ctx: &PetWorldContext,
    stable_coin: Address,
    amount: U256,
) -> anyhow::Result<Submitted> {
    ensure!(!amount.is_zero(), "Stake amount must be positive");
    let staking_address = ctx.deployment.stable_staking_address;
    ensure_allowance(ctx, stable_coin, staking_address, amount).await?;

    let staking = IStableStaking::new(staking_address, ctx.provider.clone());
    let pending = staking
        .stake(stable_coin, amount)
        .send()
        .await
        .maybe_decode_revert::<IStableStaking::IStableStakingErrors>()
        .context("Failed to send stake transaction")?;
    let receipt = ctx.confirm("stake", pending).await?;

    let log = extract_tx_log::<IStableStaking::Staked>(&receipt)?;
    let staked = log.data();
    let amount = match token_decimals(ctx, stable_coin).await {
        Ok(decimals) => format_amount(staked.amount, decimals),
        Err(_) => staked.amount.to_string(),
    };
    tracing::info!("Staked {amount} of {} at index {}", staked.stableCoin, staked.stakingIndex);

    Ok(Submitted::new(
        receipt.transaction_hash,
        json!({
            "stableCoin": staked.stableCoin,
            "amount": staked.amount,
            "stakingIndex": staked.stakingIndex,
        }),
    ))
}
