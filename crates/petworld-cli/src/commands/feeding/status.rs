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

use alloy::primitives::U256;
use clap::Args;
use petworld_rewards::fetch_feeding_records;

use super::quality_name;
use crate::{config::GlobalConfig, context::unix_now, countdown::format_countdown};

/// Command to show the feeding records of NFTs.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct FeedingStatus {
    /// Token IDs of the NFTs.
    #[clap(required = true, num_args = 1..)]
    pub token_ids: Vec<U256>,
}

impl FeedingStatus {
    /// Run the [FeedingStatus] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let ctx = global_config.build_context().await?;
        let source = &ctx.feeding_source();
        let token_ids = &self.token_ids[..];
        let records =
            ctx.with_retry(|_| async move { fetch_feeding_records(source, token_ids).await }).await?;

        let now = unix_now();
        for (token_id, record) in records {
            let starves_at = record.starvation_time();
            let fed_for = if record.feeding_hours == 0 || starves_at <= now {
                "starving".to_string()
            } else {
                format!("fed for {}", format_countdown(starves_at - now))
            };
            tracing::info!(
                "Token {token_id}: {}, {}, level {}, {} feeding hours ({fed_for}), last claim {}, last feed {}, {} accumulated cycles",
                quality_name(&record),
                if record.is_active { "active" } else { "inactive" },
                record.level,
                record.feeding_hours,
                record.last_claim_time,
                record.last_feed_time,
                record.accumulated_cycles,
            );
        }
        Ok(())
    }
}
