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

//! Integration tests for the commands that run without a chain.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};
use tempfile::TempDir;

// NOTE: Tests in this file print the CLI output. Run `cargo test -- --nocapture --test-threads=1` to see it.

fn petworld() -> Command {
    let mut cmd = Command::cargo_bin("petworld").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("RUST_LOG", "info")
        .env_remove("RPC_URL")
        .env_remove("PRIVATE_KEY")
        .env_remove("LOG_JSON")
        .env_remove("PETWORLD_DEPLOYMENTS")
        .env_remove("NFT_FEEDING_ADDRESS")
        .env_remove("STABLE_STAKING_ADDRESS");
    cmd
}

fn write_snapshot(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_help() {
    petworld()
        .args(["feeding", "--help"])
        .assert()
        .success()
        .stdout(contains("Usage:"))
        .stdout(contains("feed-many"))
        .stderr("");
}

#[test]
fn feeding_estimate_from_snapshot() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let snapshot = write_snapshot(
        dir.path(),
        "feeding.json",
        r#"{
            "record": {
                "feedingHours": 168,
                "lastClaimTime": 1000,
                "lastFeedTime": 1000,
                "quality": 0,
                "isActive": true,
                "accumulatedCycles": 0
            },
            "secondsPerCycle": 3600,
            "rewardRate": { "primary": 2, "secondary": 1 },
            "now": 181000
        }"#,
    );

    petworld()
        .args(["feeding", "estimate", "--snapshot", snapshot.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Common NFT"))
        .stdout(contains("Claimable cycles: 50"))
        .stdout(contains("Primary reward: 100"))
        .stdout(contains("Secondary reward: 50"));
    Ok(())
}

#[test]
fn feeding_estimate_now_overrides_snapshot() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let snapshot = write_snapshot(
        dir.path(),
        "starved.json",
        r#"{
            "record": {
                "feedingHours": "10",
                "lastClaimTime": 0,
                "lastFeedTime": 50000,
                "quality": 2,
                "isActive": true
            },
            "secondsPerCycle": "3600",
            "rewardRate": { "primary": "3", "secondary": "0x1" },
            "now": 1
        }"#,
    );

    petworld()
        .args(["feeding", "estimate", "--snapshot", snapshot.to_str().unwrap(), "--now", "100000"])
        .assert()
        .success()
        .stdout(contains("Claimable cycles: 20"))
        .stdout(contains("Primary reward: 60"))
        .stdout(contains("Secondary reward: 20"));
    Ok(())
}

#[test]
fn staking_estimate_from_snapshot() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let snapshot = write_snapshot(
        dir.path(),
        "staking.json",
        r#"{
            "stake": {
                "stakedAmount": "10000000000000000000",
                "stableCoin": "0x5555555555555555555555555555555555555555",
                "lastClaimedCycle": 3,
                "pendingPwPoints": 0
            },
            "clock": { "currentCycle": 5, "lastUpdateTimestamp": 1000, "cycleDuration": 86400 },
            "now": 217000
        }"#,
    );

    petworld()
        .args(["staking", "estimate", "--snapshot", snapshot.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("4 cycles passed"))
        .stdout(contains("Pending PW points: 20"))
        .stdout(contains("Next cycle in 12:00:00"));
    Ok(())
}

#[test]
fn missing_snapshot_fails() {
    petworld()
        .args(["staking", "estimate", "--snapshot", "/nonexistent/petworld/snapshot.json"])
        .assert()
        .failure()
        .stderr(contains("failed to read snapshot"));
}

#[test]
fn read_without_rpc_url_fails() {
    petworld()
        .args(["feeding", "status", "1"])
        .assert()
        .failure()
        .stderr(contains("RPC URL not provided"));
}

#[test]
fn write_failure_is_reported_as_outcome() {
    petworld()
        .args(["feeding", "feed", "1", "--hours", "24"])
        .assert()
        .failure()
        .stdout(contains("\"success\": false"))
        .stdout(contains("Private key not provided"));
}

#[test]
fn unreachable_rpc_url_fails_on_first_read() {
    petworld()
        .args(["feeding", "status", "1", "--rpc-url", "http://127.0.0.1:1"])
        .args(["--retries", "1", "--rpc-timeout", "10"])
        .assert()
        .failure()
        .stderr(contains("failed to fetch chain ID"))
        .stderr(contains("IPC").not());
}
