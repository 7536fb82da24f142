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

use std::path::PathBuf;

use clap::Args;
use petworld_rewards::StakingSnapshot;

use super::log_stake_preview;
use crate::{config::GlobalConfig, context::unix_now};

/// Command to estimate pending PW points from a snapshot file, without an RPC connection.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingEstimate {
    /// Path to a JSON staking snapshot.
    #[clap(long)]
    pub snapshot: PathBuf,

    /// Unix timestamp to estimate for. Defaults to the snapshot's `now`, then the current time.
    #[clap(long)]
    pub now: Option<u64>,
}

impl StakingEstimate {
    /// Run the [StakingEstimate] command.
    pub async fn run(&self, _global_config: &GlobalConfig) -> anyhow::Result<()> {
        let snapshot = StakingSnapshot::load(&self.snapshot)?;
        let now = self.now.or(snapshot.now).unwrap_or_else(unix_now);
        log_stake_preview(&snapshot.preview(now));
        Ok(())
    }
}
