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

//! Commands of the Pet World CLI.

pub mod feeding;
pub mod staking;

use clap::Subcommand;

use crate::config::GlobalConfig;

pub use feeding::FeedingCommands;
pub use staking::StakingCommands;

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Feed NFTs and claim their cycle rewards.
    #[command(subcommand)]
    Feeding(FeedingCommands),
    /// Stake stable coins and claim PW points.
    #[command(subcommand)]
    Staking(StakingCommands),
}

impl Command {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Feeding(cmd) => cmd.run(global_config).await,
            Self::Staking(cmd) => cmd.run(global_config).await,
        }
    }
}
