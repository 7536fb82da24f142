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

//! ERC-20 helpers for the tokens spent by feeding and staking.

use alloy::primitives::{
    utils::{format_units, parse_units},
    Address, B256, U256,
};
use anyhow::{ensure, Context, Result};
use futures_util::try_join;
use petworld_contracts::contracts::IERC20;

use crate::context::PetWorldContext;

/// Make sure `spender` may move `amount` of `token` from the context's account, sending an
/// approval for exactly `amount` when the current allowance is short.
///
/// Fails if the account's balance is below `amount`. Returns the approval's transaction hash,
/// if one was sent.
pub async fn ensure_allowance(
    ctx: &PetWorldContext,
    token: Address,
    spender: Address,
    amount: U256,
) -> Result<Option<B256>> {
    let owner = ctx.require_account()?;
    let erc20 = &IERC20::new(token, ctx.provider.clone());

    let (balance, allowance) = ctx
        .with_retry(|_| async move {
            try_join!(
                async { erc20.balanceOf(owner).call().await },
                async { erc20.allowance(owner, spender).call().await },
            )
            .with_context(|| format!("failed to fetch balance and allowance of token {token}"))
        })
        .await?;

    ensure!(
        balance >= amount,
        "insufficient balance of token {token}: have {balance}, need {amount}"
    );
    if allowance >= amount {
        tracing::debug!(%token, %spender, %allowance, "Allowance already sufficient");
        return Ok(None);
    }

    tracing::info!("Approving {spender} to spend {amount} of token {token}");
    let pending = erc20
        .approve(spender, amount)
        .send()
        .await
        .context("Failed to send approve transaction")?;
    let receipt = ctx.confirm("approve", pending).await?;
    Ok(Some(receipt.transaction_hash))
}

/// Read the decimals of `token`.
pub async fn token_decimals(ctx: &PetWorldContext, token: Address) -> Result<u8> {
    let erc20 = &IERC20::new(token, ctx.provider.clone());
    ctx.with_retry(|_| async move {
        erc20.decimals().call().await.with_context(|| format!("failed to fetch decimals of {token}"))
    })
    .await
}

/// Parse a human-readable token amount such as `12.5` into base units.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = parse_units(amount.trim(), decimals)
        .with_context(|| format!("invalid token amount {amount:?}"))?;
    ensure!(!parsed.is_negative(), "token amount must not be negative: {amount}");
    Ok(parsed.get_absolute())
}

/// Format base units of a token with `decimals` as a decimal string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}

#[cfg(test)]
mod tests {
    use alloy::{primitives::Bytes, sol_types::SolCall, transports::mock::Asserter};

    use super::*;

    const OWNER: Address = Address::new([0x11; 20]);
    const SPENDER: Address = Address::new([0x22; 20]);
    const TOKEN: Address = Address::new([0x44; 20]);

    /// Queue the balance and allowance reads, in the order they are issued.
    fn push_holdings(asserter: &Asserter, balance: u64, allowance: u64) {
        asserter.push_success(&Bytes::from(IERC20::balanceOfCall::abi_encode_returns(
            &U256::from(balance),
        )));
        asserter.push_success(&Bytes::from(IERC20::allowanceCall::abi_encode_returns(
            &U256::from(allowance),
        )));
    }

    #[tokio::test]
    async fn sufficient_allowance_skips_approval() {
        let asserter = Asserter::new();
        let ctx = PetWorldContext::mocked(asserter.clone(), Some(OWNER));
        push_holdings(&asserter, 1000, 500);

        let approval = ensure_allowance(&ctx, TOKEN, SPENDER, U256::from(500)).await.unwrap();
        assert_eq!(approval, None);
    }

    #[tokio::test]
    async fn short_allowance_sends_approval() {
        let asserter = Asserter::new();
        let ctx = PetWorldContext::mocked(asserter.clone(), Some(OWNER));
        push_holdings(&asserter, 1000, 10);

        // Nothing is queued for the approval itself, so sending it fails.
        let err = ensure_allowance(&ctx, TOKEN, SPENDER, U256::from(100)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to send approve transaction");
    }

    #[tokio::test]
    async fn insufficient_balance_is_an_error() {
        let asserter = Asserter::new();
        let ctx = PetWorldContext::mocked(asserter.clone(), Some(OWNER));
        push_holdings(&asserter, 50, 50);

        let err = ensure_allowance(&ctx, TOKEN, SPENDER, U256::from(100)).await.unwrap_err();
        assert!(err.to_string().contains("insufficient balance"), "{err}");
        assert!(err.to_string().contains("have 50, need 100"), "{err}");
    }

    #[tokio::test]
    async fn allowance_requires_an_account() {
        let ctx = PetWorldContext::mocked(Asserter::new(), None);
        let err = ensure_allowance(&ctx, TOKEN, SPENDER, U256::from(1)).await.unwrap_err();
        assert!(err.to_string().contains("Private key not provided"));
    }

    #[tokio::test]
    async fn reads_token_decimals() {
        let asserter = Asserter::new();
        let ctx = PetWorldContext::mocked(asserter.clone(), None);
        asserter.push_success(&Bytes::from(IERC20::decimalsCall::abi_encode_returns(&6u8)));
        assert_eq!(token_decimals(&ctx, TOKEN).await.unwrap(), 6);

        asserter.push_failure_msg("execution reverted");
        let err = token_decimals(&ctx, TOKEN).await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to fetch decimals"), "{err:#}");
    }

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount("1", 18).unwrap(), U256::from(10u64.pow(18)));
        assert_eq!(parse_amount("12.5", 6).unwrap(), U256::from(12_500_000));
        assert_eq!(parse_amount(" 0.000001 ", 6).unwrap(), U256::from(1));
        assert!(parse_amount("ten", 6).is_err());
        assert!(parse_amount("-1", 6).is_err());
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(U256::from(12_500_000), 6), "12.500000");
        assert_eq!(format_amount(U256::from(10u64.pow(18)), 18), "1.000000000000000000");
    }
}
