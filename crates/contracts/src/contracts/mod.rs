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

//! Smart contract interfaces for the Pet World contracts.

use std::fmt::Debug;

use alloy::{
    rpc::types::{Log, TransactionReceipt},
    sol_types::{SolEvent, SolInterface},
};
use anyhow::{anyhow, Context, Result};

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/INFTFeedingManager.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IStableStaking.sol"
);

alloy::sol!(
    #![sol(rpc, all_derives)]
    "src/contracts/artifacts/IERC20.sol"
);

/// Decode every log on the receipt matching the event `E`.
pub fn extract_tx_logs<E: SolEvent + Debug + Clone>(
    receipt: &TransactionReceipt,
) -> Result<Vec<Log<E>>, anyhow::Error> {
    receipt
        .inner
        .logs()
        .iter()
        .filter_map(|log| {
            if log.topic0().map(|topic| E::SIGNATURE_HASH == *topic).unwrap_or(false) {
                Some(
                    log.log_decode::<E>()
                        .with_context(|| format!("failed to decode event {}", E::SIGNATURE)),
                )
            } else {
                tracing::debug!(
                    "skipping log on receipt; does not match {}: {log:?}",
                    E::SIGNATURE
                );
                None
            }
        })
        .collect::<Result<Vec<_>>>()
}

/// Decode the single log on the receipt matching the event `E`.
///
/// Fails if the transaction emitted zero or more than one such event.
pub fn extract_tx_log<E: SolEvent + Debug + Clone>(
    receipt: &TransactionReceipt,
) -> Result<Log<E>, anyhow::Error> {
    let logs = extract_tx_logs::<E>(receipt)?;

    match &logs[..] {
        [log] => Ok(log.clone()),
        [] => Err(anyhow!(
            "transaction 0x{:x} did not emit event {}",
            receipt.transaction_hash,
            E::SIGNATURE
        )),
        _ => Err(anyhow!(
            "transaction emitted more than one event with signature {}, {:#?}",
            E::SIGNATURE,
            logs
        )),
    }
}

/// Maps a failed contract call to an error naming the custom revert, when the revert data
/// matches one of the errors declared on the interface `E`.
pub trait DecodeRevert<T> {
    fn maybe_decode_revert<E: SolInterface + Debug>(self) -> Result<T, anyhow::Error>;
}

impl<T> DecodeRevert<T> for Result<T, alloy::contract::Error> {
    fn maybe_decode_revert<E: SolInterface + Debug>(self) -> Result<T, anyhow::Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => match err.as_decoded_interface_error::<E>() {
                Some(decoded) => Err(anyhow!("contract reverted with {decoded:?}")),
                None => Err(err.into()),
            },
        }
    }
}
