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

//! Common configuration options for commands in the Pet World CLI.

use std::{num::ParseIntError, path::PathBuf, time::Duration};

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Args;
use petworld_contracts::{Deployment, ResolverChain};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::{context::PetWorldContext, retry::RetryConfig};

fn parse_secs(arg: &str) -> Result<Duration, ParseIntError> {
    Ok(Duration::from_secs(arg.parse()?))
}

fn parse_millis(arg: &str) -> Result<Duration, ParseIntError> {
    Ok(Duration::from_millis(arg.parse()?))
}

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// URL of the Ethereum RPC endpoint
    #[clap(short, long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<Url>,

    /// Private key of the wallet (without 0x prefix)
    #[clap(long, env = "PRIVATE_KEY", global = true, hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Ethereum transaction timeout in seconds.
    #[clap(long, env = "TX_TIMEOUT", global = true, value_parser = parse_secs)]
    pub tx_timeout: Option<Duration>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "info")]
    pub log_level: LevelFilter,

    /// Whether to log in JSON format.
    #[clap(long, env = "LOG_JSON", global = true, default_value_t = false)]
    pub log_json: bool,

    /// Number of attempts for RPC reads before giving up.
    #[clap(long, env = "RPC_RETRIES", global = true, default_value_t = 3)]
    pub retries: u32,

    /// Delay between RPC read attempts, in milliseconds.
    #[clap(long, env = "RPC_RETRY_DELAY", global = true, default_value = "1000", value_parser = parse_millis)]
    pub retry_delay: Duration,

    /// Overall timeout for a retried RPC read, in seconds.
    #[clap(long, env = "RPC_TIMEOUT", global = true, default_value = "30", value_parser = parse_secs)]
    pub rpc_timeout: Duration,

    /// JSON file mapping chain IDs to deployments, consulted when no deployment is given
    /// explicitly.
    #[clap(long, env = "PETWORLD_DEPLOYMENTS", global = true)]
    pub deployments_file: Option<PathBuf>,

    /// Wait for the deployment's contracts to have code before running the command.
    #[clap(long, env = "WAIT_FOR_CONTRACTS", global = true)]
    pub wait_for_contracts: bool,

    /// Configuration for the Pet World deployment to use.
    #[clap(flatten, next_help_heading = "Pet World Deployment")]
    pub deployment: Option<Deployment>,

    /// Cancelled when the user interrupts the process. Contexts built from this config stop
    /// retrying reads and watching once it fires.
    #[clap(skip)]
    pub cancel: CancellationToken,
}

impl GlobalConfig {
    /// Access [Self::rpc_url] or return an error that can be shown to the user.
    pub fn require_rpc_url(&self) -> Result<Url> {
        self.rpc_url
            .clone()
            .context("Blockchain RPC URL not provided; please set --rpc-url or the RPC_URL env var")
    }

    /// Access [Self::private_key] or return an error that can be shown to the user.
    pub fn require_private_key(&self) -> Result<PrivateKeySigner> {
        self.private_key.clone().context(
            "Private key not provided; please set --private-key or the PRIVATE_KEY env var",
        )
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig { attempts: self.retries, delay: self.retry_delay, timeout: self.rpc_timeout }
    }

    /// Resolvers for the deployment, in priority order: explicit flags, the deployments file,
    /// then the built-in table.
    pub fn resolver_chain(&self) -> ResolverChain {
        ResolverChain::standard(self.deployment.clone(), self.deployments_file.as_deref())
    }

    /// Build a [PetWorldContext] that can read the Pet World contracts.
    ///
    /// Requires [Self::rpc_url] to be set.
    pub async fn build_context(&self) -> Result<PetWorldContext> {
        PetWorldContext::connect(self, None).await
    }

    /// Build a [PetWorldContext] that can also sign and send transactions.
    ///
    /// Requires [Self::rpc_url] and [Self::private_key] to be set.
    pub async fn build_context_with_signer(&self) -> Result<PetWorldContext> {
        PetWorldContext::connect(self, Some(self.require_private_key()?)).await
    }

    /// Install the global tracing subscriber.
    pub fn init_tracing(&self) {
        let filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(self.log_level.into())
            .from_env_lossy();

        if self.log_json {
            tracing_subscriber::fmt().with_ansi(false).json().with_env_filter(filter).init();
        } else {
            tracing_subscriber::fmt().with_ansi(false).with_env_filter(filter).init();
        }
    }
}
