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

use alloy::primitives::{address, Address};
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

pub use alloy_chains::NamedChain;

/// Configuration for a deployment of the Pet World contracts.
// NOTE: See https://github.com/clap-rs/clap/issues/5092#issuecomment-1703980717 about clap usage.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Builder, Args, Serialize, Deserialize)]
#[group(requires = "nft_feeding_address", requires = "stable_staking_address")]
pub struct Deployment {
    /// EIP-155 chain ID of the network.
    #[clap(long, env)]
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Address of the [INFTFeedingManager] contract.
    ///
    /// [INFTFeedingManager]: crate::contracts::INFTFeedingManager
    #[clap(long, env, required = false, long_help = "Address of the NFTFeedingManager contract")]
    #[builder(setter(into))]
    pub nft_feeding_address: Address,

    /// Address of the [IStableStaking] contract.
    ///
    /// [IStableStaking]: crate::contracts::IStableStaking
    #[clap(long, env, required = false, long_help = "Address of the StableStaking contract")]
    #[builder(setter(into))]
    pub stable_staking_address: Address,

    /// Address of the ERC-20 food token spent when feeding.
    ///
    /// When unset, the address is read from the feeding manager.
    #[clap(long, env)]
    #[builder(setter(strip_option), default)]
    #[serde(default)]
    pub food_token_address: Option<Address>,
}

impl Deployment {
    /// Create a new [DeploymentBuilder].
    pub fn builder() -> DeploymentBuilder {
        Default::default()
    }

    /// Lookup the [Deployment] for a named chain.
    pub const fn from_chain(chain: NamedChain) -> Option<Deployment> {
        match chain {
            NamedChain::AnvilHardhat => Some(ANVIL),
            _ => None,
        }
    }

    /// Lookup the [Deployment] by chain ID.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Option<Deployment> {
        let chain = NamedChain::try_from(chain_id.into()).ok()?;
        Self::from_chain(chain)
    }
}

/// [Deployment] for a local Anvil node, using the addresses the first three contract creations
/// from the default Anvil account land on.
pub const ANVIL: Deployment = Deployment {
    chain_id: Some(NamedChain::AnvilHardhat as u64),
    nft_feeding_address: address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
    stable_staking_address: address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
    food_token_address: Some(address!("0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0")),
};
