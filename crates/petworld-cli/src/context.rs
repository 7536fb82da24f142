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

//! Session state shared by every command.

use std::{future::Future, time::Duration};

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
};
use anyhow::{ensure, Context, Result};
use petworld_contracts::{contracts::INFTFeedingManager, Deployment};
use petworld_rewards::{ContractFeedingSource, ContractStakingSource};
use tokio_util::sync::CancellationToken;

use crate::{
    config::GlobalConfig,
    retry::{retry_with_timeout, RetryConfig},
};

/// Connection to the chain and the resolved Pet World deployment.
///
/// Built once per invocation and passed to every operation.
#[derive(Clone)]
pub struct PetWorldContext {
    pub provider: DynProvider,
    pub chain_id: u64,
    pub deployment: Deployment,
    /// Address of the signer, when the context can send transactions.
    pub account: Option<Address>,
    pub tx_timeout: Option<Duration>,
    pub retry: RetryConfig,
    pub cancel: CancellationToken,
}

impl PetWorldContext {
    /// Connect to [GlobalConfig::rpc_url], optionally with a wallet, and resolve the deployment
    /// for the chain the node reports.
    pub async fn connect(config: &GlobalConfig, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let rpc_url = config.require_rpc_url()?;
        let account = signer.as_ref().map(|signer| signer.address());

        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(signer)
                .connect(rpc_url.as_str())
                .await
                .with_context(|| format!("failed to connect provider to {rpc_url}"))?
                .erased(),
            None => ProviderBuilder::new()
                .connect(rpc_url.as_str())
                .await
                .with_context(|| format!("failed to connect provider to {rpc_url}"))?
                .erased(),
        };

        let retry = config.retry_config();
        let cancel = config.cancel.child_token();
        let chain_id = {
            let provider = &provider;
            retry_with_timeout(&retry, &cancel, |_| async move {
                provider.get_chain_id().await.context("failed to fetch chain ID")
            })
            .await?
        };
        let deployment = config.resolver_chain().resolve(chain_id)?;
        tracing::debug!(chain_id, ?deployment, "Resolved Pet World deployment");

        let ctx = Self {
            provider,
            chain_id,
            deployment,
            account,
            tx_timeout: config.tx_timeout,
            retry,
            cancel,
        };
        if config.wait_for_contracts {
            ctx.wait_for_contract(ctx.deployment.nft_feeding_address).await?;
            ctx.wait_for_contract(ctx.deployment.stable_staking_address).await?;
        }
        Ok(ctx)
    }

    /// Address of the signer, or an error if the context was built without one.
    pub fn require_account(&self) -> Result<Address> {
        self.account.context(
            "Private key not provided; please set --private-key or the PRIVATE_KEY env var",
        )
    }

    pub fn feeding_manager(&self) -> INFTFeedingManager::INFTFeedingManagerInstance<DynProvider> {
        INFTFeedingManager::new(self.deployment.nft_feeding_address, self.provider.clone())
    }

    pub fn feeding_source(&self) -> ContractFeedingSource<DynProvider> {
        ContractFeedingSource::new(self.deployment.nft_feeding_address, self.provider.clone())
    }

    pub fn staking_source(&self) -> ContractStakingSource<DynProvider> {
        ContractStakingSource::new(self.deployment.stable_staking_address, self.provider.clone())
    }

    /// Address of the food token, from the deployment if set, else from the feeding manager.
    pub async fn food_token(&self) -> Result<Address> {
        if let Some(address) = self.deployment.food_token_address {
            return Ok(address);
        }
        let manager = &self.feeding_manager();
        self.with_retry(|_| async move {
            manager.foodToken().call().await.context("failed to fetch food token")
        })
        .await
    }

    /// Run a read under this session's retry policy.
    pub async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        Ok(retry_with_timeout(&self.retry, &self.cancel, op).await?)
    }

    /// Wait until `address` has contract code, under the retry policy.
    pub async fn wait_for_contract(&self, address: Address) -> Result<()> {
        let provider = &self.provider;
        self.with_retry(|attempt| async move {
            let code = provider
                .get_code_at(address)
                .await
                .with_context(|| format!("failed to fetch code at {address}"))?;
            ensure!(!code.is_empty(), "no contract code at {address} (attempt {attempt})");
            Ok(())
        })
        .await
        .with_context(|| format!("contract at {address} is not available"))
    }

    /// Wait for a sent transaction to be mined and check that it succeeded.
    pub async fn confirm(
        &self,
        label: &str,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt> {
        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, "Sent transaction for {label}");

        let timeout = self.tx_timeout.or(pending.timeout());
        tracing::debug!(?timeout, %tx_hash, "Waiting for transaction receipt");
        let receipt = pending
            .with_timeout(timeout)
            .get_receipt()
            .await
            .with_context(|| format!("Failed to receive receipt for {label} transaction"))?;

        ensure!(
            receipt.status(),
            "{label} transaction failed: tx_hash = {}",
            receipt.transaction_hash
        );
        Ok(receipt)
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

#[cfg(test)]
impl PetWorldContext {
    /// Context over a mocked transport that makes a single attempt per read.
    pub(crate) fn mocked(
        asserter: alloy::transports::mock::Asserter,
        account: Option<Address>,
    ) -> Self {
        Self {
            provider: ProviderBuilder::new().connect_mocked_client(asserter).erased(),
            chain_id: 31337,
            deployment: petworld_contracts::deployments::ANVIL,
            account,
            tx_timeout: None,
            retry: RetryConfig { attempts: 1, ..Default::default() },
            cancel: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::retry::RetryError;

    #[derive(Parser)]
    struct Cli {
        #[clap(flatten)]
        config: GlobalConfig,
    }

    #[tokio::test]
    async fn interrupted_config_cancels_connect() {
        let cli = Cli::parse_from(["petworld", "--rpc-url", "http://127.0.0.1:1"]);
        cli.config.cancel.cancel();

        let err = PetWorldContext::connect(&cli.config, None).await.err().unwrap();
        assert!(matches!(err.downcast_ref::<RetryError>(), Some(RetryError::Cancelled)), "{err:#}");
    }

    #[tokio::test]
    async fn http_url_builds_a_provider() {
        for url in ["http://127.0.0.1:8545", "https://rpc.example.com"] {
            let provider = ProviderBuilder::new().connect(url).await;
            assert!(provider.is_ok(), "{url}: {:#}", provider.err().unwrap());
        }
    }

    #[tokio::test]
    async fn unreachable_http_node_fails_the_chain_id_read() {
        let cli = Cli::parse_from([
            "petworld",
            "--rpc-url",
            "http://127.0.0.1:1",
            "--retries",
            "2",
            "--retry-delay",
            "10",
            "--rpc-timeout",
            "10",
        ]);

        let err = PetWorldContext::connect(&cli.config, None).await.err().unwrap();
        assert!(!format!("{err:#}").contains("IPC"), "{err:#}");
        match err.downcast_ref::<RetryError>() {
            Some(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(*attempts, 2);
                assert!(last.to_string().contains("failed to fetch chain ID"), "{last:#}");
            }
            Some(RetryError::TimedOut(_)) => {}
            _ => panic!("expected a failed chain ID read, got {err:#}"),
        }
    }

    #[tokio::test]
    async fn cancelled_context_stops_reads() {
        let ctx = PetWorldContext::mocked(Default::default(), None);
        ctx.cancel.cancel();

        let err = ctx.with_retry(|_| async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<RetryError>(), Some(RetryError::Cancelled)), "{err:#}");
    }

    #[tokio::test]
    async fn missing_account_is_reported() {
        let ctx = PetWorldContext::mocked(Default::default(), None);
        assert!(ctx.require_account().unwrap_err().to_string().contains("Private key not provided"));

        let account = Address::repeat_byte(0x11);
        let ctx = PetWorldContext::mocked(Default::default(), Some(account));
        assert_eq!(ctx.require_account().unwrap(), account);
    }
}
