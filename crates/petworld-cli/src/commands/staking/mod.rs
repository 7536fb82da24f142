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

//! Commands of the Pet World CLI for stable-coin staking.

mod claim;
mod countdown;
mod estimate;
mod pending;
mod stake;
mod withdraw;

pub use claim::{claim_points, StakingClaim};
pub use countdown::StakingCountdown;
pub use estimate::StakingEstimate;
pub use pending::StakingPending;
pub use stake::{stake, StakingStake};
pub use withdraw::{withdraw, StakingWithdraw};

use clap::Subcommand;
use petworld_rewards::StakePreview;

use crate::{config::GlobalConfig, countdown::format_countdown};

/// Commands for stable-coin staking.
#[derive(Subcommand, Clone, Debug)]
pub enum StakingCommands {
    /// Estimate the pending PW points of staking positions.
    Pending(StakingPending),
    /// Estimate pending PW points offline from a snapshot file.
    Estimate(StakingEstimate),
    /// Show the time left until the next staking cycle.
    Countdown(StakingCountdown),
    /// Stake a stable coin.
    Stake(StakingStake),
    /// Withdraw a staking position.
    Withdraw(StakingWithdraw),
    /// Claim the PW points of a staking position.
    Claim(StakingClaim),
}

impl StakingCommands {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Pending(cmd) => cmd.run(global_config).await,
            Self::Estimate(cmd) => cmd.run(global_config).await,
            Self::Countdown(cmd) => cmd.run(global_config).await,
            Self::Stake(cmd) => cmd.run(global_config).await,
            Self::Withdraw(cmd) => cmd.run(global_config).await,
            Self::Claim(cmd) => cmd.run(global_config).await,
        }
    }
}

fn log_stake_preview(preview: &StakePreview) {
    tracing::info!(
        "Stake {}: {} of {}, last claimed cycle {}, current cycle {} ({} cycles passed)",
        preview.index,
        preview.stake.staked_amount,
        preview.stake.stable_coin,
        preview.stake.last_claimed_cycle,
        preview.extrapolated_cycle,
        preview.cycles_passed,
    );
    tracing::info!("Pending PW points: {}", preview.pending_pw_points);
    match preview.seconds_until_next_cycle {
        Some(secs) => tracing::info!("Next cycle in {}", format_countdown(secs)),
        None => tracing::info!("Next cycle: unknown (cycle duration is zero)"),
    }
}
