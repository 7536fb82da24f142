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

use alloy::primitives::B256;
use serde::Serialize;
use serde_json::Value;

/// A confirmed transaction and the details decoded from its receipt.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub tx_hash: B256,
    pub details: Value,
}

impl Submitted {
    pub fn new(tx_hash: B256, details: Value) -> Self {
        Self { tx_hash, details }
    }
}

/// Result of a write operation, reported as data instead of an error so that callers can branch
/// on `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl TxOutcome {
    pub fn from_result(result: anyhow::Result<Submitted>) -> Self {
        match result {
            Ok(Submitted { tx_hash, details }) => Self {
                success: true,
                tx_hash: Some(tx_hash),
                error: None,
                details: (!details.is_null()).then_some(details),
            },
            Err(err) => {
                Self { success: false, tx_hash: None, error: Some(format!("{err:#}")), details: None }
            }
        }
    }

    /// Log the outcome as JSON, then convert a failure back into an error for the exit status.
    pub fn report(self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self)?;
        if self.success {
            tracing::info!("{json}");
            Ok(())
        } else {
            tracing::error!("{json}");
            Err(anyhow::anyhow!(self.error.unwrap_or_else(|| "transaction failed".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use serde_json::json;

    use super::*;

    #[test]
    fn success_carries_hash_and_details() {
        let hash = B256::repeat_byte(0xab);
        let outcome =
            TxOutcome::from_result(Ok(Submitted::new(hash, json!({ "primaryReward": "100" }))));

        assert!(outcome.success);
        assert_eq!(outcome.tx_hash, Some(hash));
        assert_eq!(outcome.error, None);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["txHash"], json!(format!("{hash}")));
        assert_eq!(value["details"]["primaryReward"], json!("100"));
        assert!(outcome.report().is_ok());
    }

    #[test]
    fn null_details_are_omitted() {
        let outcome = TxOutcome::from_result(Ok(Submitted::new(B256::ZERO, Value::Null)));
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value.get("details").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_keeps_error_chain() {
        let err: anyhow::Result<Submitted> =
            Err(anyhow::anyhow!("insufficient allowance")).context("Failed to send feedNFT");
        let outcome = TxOutcome::from_result(err);

        assert!(!outcome.success);
        assert_eq!(outcome.tx_hash, None);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Failed to send feedNFT: insufficient allowance")
        );

        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value.get("txHash").is_none());

        let err = outcome.report().unwrap_err();
        assert_eq!(err.to_string(), "Failed to send feedNFT: insufficient allowance");
    }
}
