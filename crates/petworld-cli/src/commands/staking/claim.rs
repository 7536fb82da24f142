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
use petworld_contracts::contracts::{extract_tx_log, DecodeRevert, IStableStaking};
use petworld_rewards::{preview_stake, StakePreview};
use serde_json::json;

use crate::{
    config::GlobalConfig,
    context::{unix_now, PetWorldContext},
    outcome::{Submitted, TxOutcome},
};

/// Command to claim the PW points of a staking position.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingClaim {
    /// Index of the staking position.
    #[clap(long)]
    pub index: u64,
}

impl StakingClaim {
    /// Run the [StakingClaim] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let result = async {
            let ctx = global_config.build_context_with_signer().await?;
            claim_points(&ctx, self.index).await
        };
        TxOutcome::from_result(result.await).report()
    }
}

/// Claim the PW points of the staking position at `index` of the context's account.
pub async fn claim_points(ctx: &PetWorldContext, index: u64) -> anyhow::Result<Submitted> {
    let account = ctx.require_account()?;
    let source = &ctx.staking_source();
    let now = unix_now();
    let preview = ctx
        .with_retry(|_| async move { preview_stake(source, account, index, now).await })
        .await?;
    let estimated = claim_estimate(&preview)?;
    tracing::info!("Estimated PW points: {estimated}");

    let staking = IStableStaking::new(ctx.deployment.stable_staking_address, ctx.provider.clone());
    let pending = staking
        .claimRewards(U256::from(index))
        .send()
        .await
        .maybe_decode_revert::<IStableStaking::IStableStakingErrors>()
        .context("Failed to send claimRewards transaction")?;
    let receipt = ctx.confirm("claimRewards", pending).await?;

    let log = extract_tx_log::<IStableStaking::RewardsClaimed>(&receipt)?;
    let claimed = log.data();
    if claimed.pwPoints != estimated {
        tracing::warn!(
            "Claimed PW points differ from the estimate: {} (estimated {estimated})",
            claimed.pwPoints,
        );
    }
    tracing::info!("Claimed {} PW points from staking position {index}", claimed.pwPoints);

    Ok(Submitted::new(
        receipt.transaction_hash,
        json!({
            "stakingIndex": claimed.stakingIndex,
            "pwPoints": claimed.pwPoints,
            "estimatedPwPoints": estimated,
        }),
    ))
}

/// Points a claim on `preview` is expected to pay out.
///
/// The stored pending points stay claimable after the principal is withdrawn, even though the
/// estimate for an empty position is zero. Fails only when nothing is pending and no cycle has
/// passed since the last claim.
fn claim_estimate(preview: &StakePreview) -> anyhow::Result<U256> {
    let estimated = preview.pending_pw_points.max(preview.stake.pending_pw_points);
    ensure!(
        !estimated.is_zero() || preview.cycles_passed > 0,
        "No PW points to claim for staking position {}",
        preview.index
    );
    Ok(estimated)
}

#[cfg(test)]
mod tests {
    use petworld_rewards::{CycleClock, StakeRecord, WEI_PER_TOKEN};

    use super::*;

    const T: u64 = 1_700_000_000;
    const DAY: u64 = 86_400;

    fn preview(tokens: u64, last_claimed_cycle: u64, pending: u64, now: u64) -> StakePreview {
        let stake = StakeRecord {
            staked_amount: U256::from(tokens) * WEI_PER_TOKEN,
            last_claimed_cycle,
            pending_pw_points: U256::from(pending),
            ..Default::default()
        };
        let clock = CycleClock { current_cycle: 5, last_update_timestamp: T, cycle_duration: DAY };
        StakePreview::new(3, stake, &clock, now)
    }

    #[test]
    fn withdrawn_stake_keeps_pending_points() {
        let preview = preview(0, 5, 50, T);
        assert_eq!(preview.pending_pw_points, U256::ZERO);
        assert_eq!(claim_estimate(&preview).unwrap(), U256::from(50));
    }

    #[test]
    fn active_stake_uses_extrapolated_points() {
        // 10 tokens, 2 cycles since the last claim, at half a point per token per cycle.
        let preview = preview(10, 4, 7, T + DAY);
        assert_eq!(claim_estimate(&preview).unwrap(), U256::from(17));
    }

    #[test]
    fn passed_cycles_allow_a_claim_without_an_estimate() {
        let preview = preview(0, 4, 0, T);
        assert_eq!(preview.cycles_passed, 1);
        assert_eq!(claim_estimate(&preview).unwrap(), U256::ZERO);
    }

    #[test]
    fn nothing_to_claim() {
        let err = claim_estimate(&preview(10, 5, 0, T)).unwrap_err();
        assert!(err.to_string().contains("No PW points to claim for staking position 3"));
    }
}
