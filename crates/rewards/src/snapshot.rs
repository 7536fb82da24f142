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

//! Snapshot documents of on-chain state, for estimating offline.
//!
//! Snapshots are decoded leniently: a field that is missing, `null`, non-numeric or out of range
//! is read as zero, so that a stale or partial snapshot still produces a (zero) estimate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    feeding::{estimate_claimable, ClaimableRewards, FeedingRecord, RewardRate},
    staking::{CycleClock, StakePreview, StakeRecord},
};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid snapshot document: {0}")]
    Json(#[from] serde_json::Error),
}

fn read(path: &Path) -> Result<String, SnapshotError> {
    std::fs::read_to_string(path)
        .map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })
}

/// A feeding record together with the contract parameters needed to estimate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingSnapshot {
    #[serde(default)]
    pub record: FeedingRecord,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub seconds_per_cycle: u64,
    #[serde(default)]
    pub reward_rate: RewardRate,
    /// Time the estimate is for. Callers fall back to the current time when unset.
    #[serde(default, deserialize_with = "lenient::to_opt_u64")]
    pub now: Option<u64>,
}

impl FeedingSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Self::from_json(&read(path.as_ref())?)
    }

    pub fn estimate(&self, now: u64) -> ClaimableRewards {
        estimate_claimable(&self.record, now, self.seconds_per_cycle, &self.reward_rate)
    }
}

/// A staking position together with the contract's cycle clock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingSnapshot {
    #[serde(default)]
    pub stake: StakeRecord,
    #[serde(default)]
    pub clock: CycleClock,
    #[serde(default, deserialize_with = "lenient::to_u64")]
    pub index: u64,
    #[serde(default, deserialize_with = "lenient::to_opt_u64")]
    pub now: Option<u64>,
}

impl StakingSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Self::from_json(&read(path.as_ref())?)
    }

    pub fn preview(&self, now: u64) -> StakePreview {
        StakePreview::new(self.index, self.stake.clone(), &self.clock, now)
    }
}

/// Deserializers that read malformed values as zero instead of failing.
///
/// Numbers are parsed from their JSON text, so integers wider than 64 bits keep every digit.
pub(crate) mod lenient {
    use std::str::FromStr;

    use alloy::primitives::{Address, U256};
    use serde::{Deserialize, Deserializer};
    use serde_json::value::RawValue;

    /// Decimal digits in `U256::MAX`.
    const MAX_DIGITS: usize = 78;

    /// Parse JSON number text such as `42`, `3600.0` or `1e18` as an exact unsigned integer.
    ///
    /// Negative, fractional and out of range values are rejected.
    pub(crate) fn parse_integer(text: &str) -> Option<U256> {
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(at) => (&text[..at], text[at + 1..].parse::<i64>().ok()?),
            None => (text, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty() || !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut digits = format!("{int}{frac}");
        let scale = exponent.checked_sub(i64::try_from(frac.len()).ok()?)?;
        if scale < 0 {
            let drop =
                usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX).min(digits.len());
            let (kept, dropped) = digits.split_at(digits.len() - drop);
            if dropped.bytes().any(|b| b != b'0') {
                return None;
            }
            digits = kept.to_string();
        } else if scale > 0 && digits.bytes().any(|b| b != b'0') {
            let scale = usize::try_from(scale).ok()?;
            if digits.trim_start_matches('0').len().saturating_add(scale) > MAX_DIGITS {
                return None;
            }
            digits.extend(std::iter::repeat('0').take(scale));
        }
        if digits.is_empty() {
            return Some(U256::ZERO);
        }
        U256::from_str_radix(&digits, 10).ok()
    }

    fn as_string(raw: &RawValue) -> Option<String> {
        raw.get().starts_with('"').then(|| serde_json::from_str::<String>(raw.get()).ok()).flatten()
    }

    fn parse_u256(raw: &RawValue) -> Option<U256> {
        match as_string(raw) {
            Some(s) => {
                let s = s.trim();
                U256::from_str(s).ok().or_else(|| parse_integer(s))
            }
            None => parse_integer(raw.get()),
        }
    }

    fn or_zero<T: Default>(field: &RawValue, parsed: Option<T>) -> T {
        parsed.unwrap_or_else(|| {
            if field.get() != "null" {
                tracing::warn!("malformed snapshot value {}; reading it as zero", field.get());
            }
            T::default()
        })
    }

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Box<RawValue>, D::Error> {
        Box::<RawValue>::deserialize(deserializer)
    }

    pub fn to_u256<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let value = raw(deserializer)?;
        Ok(or_zero(&value, parse_u256(&value)))
    }

    pub fn to_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = raw(deserializer)?;
        Ok(or_zero(&value, parse_u256(&value).and_then(|v| u64::try_from(v).ok())))
    }

    pub fn to_opt_u64<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        let value = raw(deserializer)?;
        Ok(parse_u256(&value).and_then(|v| u64::try_from(v).ok()))
    }

    pub fn to_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = raw(deserializer)?;
        Ok(or_zero(&value, parse_u256(&value).and_then(|v| u8::try_from(v).ok())))
    }

    pub fn to_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = raw(deserializer)?;
        let parsed = match (value.get(), as_string(&value)) {
            ("true", _) => Some(true),
            ("false", _) => Some(false),
            (_, Some(s)) if s.trim().eq_ignore_ascii_case("true") => Some(true),
            (_, Some(s)) if s.trim().eq_ignore_ascii_case("false") => Some(false),
            _ => parse_u256(&value).map(|v| !v.is_zero()),
        };
        Ok(or_zero(&value, parsed))
    }

    pub fn to_address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let value = raw(deserializer)?;
        let parsed = as_string(&value).and_then(|s| Address::from_str(s.trim()).ok());
        Ok(or_zero(&value, parsed))
    }
}
