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

//! Bounded retries for remote reads.

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts before giving up. Zero is treated as one.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
    /// Upper bound on the whole operation, pauses included.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { attempts: 3, delay: Duration::from_secs(1), timeout: Duration::from_secs(30) }
    }
}

#[derive(Error, Debug)]
pub enum RetryError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("operation failed after {attempts} attempts: {last:#}")]
    Exhausted { attempts: u32, last: anyhow::Error },
}

/// Run `op` until it succeeds, it has failed `config.attempts` times, `config.timeout` has
/// elapsed, or `cancel` is triggered, whichever comes first.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with_timeout<T, F, Fut>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let max_attempts = config.attempts.max(1);
    let attempts = async {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= max_attempts => {
                    return Err(RetryError::Exhausted { attempts: attempt, last })
                }
                Err(err) => {
                    tracing::warn!(
                        "Attempt {attempt}/{max_attempts} failed: {err:#}; retrying in {:?}",
                        config.delay
                    );
                    tokio::time::sleep(config.delay).await;
                }
            }
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RetryError::Cancelled),
        result = tokio::time::timeout(config.timeout, attempts) => {
            result.unwrap_or(Err(RetryError::TimedOut(config.timeout)))
        }
    }
}
