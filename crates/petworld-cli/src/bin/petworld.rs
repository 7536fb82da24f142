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

use clap::Parser;
use petworld_cli::{commands::Command, config::GlobalConfig};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(author, version, about = "CLI for the Pet World feeding and staking contracts")]
struct MainArgs {
    #[command(subcommand)]
    command: Command,

    #[clap(flatten)]
    config: GlobalConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = MainArgs::parse();
    args.config.init_tracing();
    tokio::spawn(cancel_on_interrupt(args.config.cancel.clone()));

    if let Err(err) = args.command.run(&args.config).await {
        tracing::error!("Command failed: {err:?}");
        return Err(err);
    }
    Ok(())
}

/// Cancel `cancel` on the first Ctrl-C, and exit on the second.
///
/// Retried reads and watches stop at the first interrupt. A transaction that is waiting for its
/// receipt keeps waiting until the second.
async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to listen for Ctrl-C");
        return;
    }
    tracing::warn!("Interrupted; press Ctrl-C again to exit immediately");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}
