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

use std::time::Duration;

use clap::Args;
use petworld_rewards::{CycleClock, StakingSource};

use crate::{
    config::GlobalConfig,
    context::unix_now,
    countdown::{format_countdown, RepeatingTimer},
};

/// Command to show the time left until the next staking cycle.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingCountdown {
    /// Keep printing the countdown every second until interrupted with Ctrl-C.
    #[clap(long)]
    pub watch: bool,
}

impl StakingCountdown {
    /// Run the [StakingCountdown] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let ctx = global_config.build_context().await?;
        let source = &ctx.staking_source();
        let clock = ctx.with_retry(|_| async move { source.cycle_clock().await }).await?;

        if !self.watch {
            log_countdown(&clock, unix_now());
            return Ok(());
        }

        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.start(move || log_countdown(&clock, unix_now()));
        ctx.cancel.cancelled().await;
        timer.stop();
        Ok(())
    }
}

fn log_countdown(clock: &CycleClock, now: u64) {
    match clock.seconds_until_next_cycle(now) {
        Some(secs) => tracing::info!(
            "Cycle {} ends in {}",
            clock.extrapolated_cycle(now),
            format_countdown(secs)
        ),
        None => tracing::warn!("Cycle duration is zero; there is no next cycle"),
    }
}
