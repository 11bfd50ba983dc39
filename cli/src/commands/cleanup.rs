// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Administrative purge of collector records

use anyhow::{Context, Result};
use colored::Colorize;

use fsmon_sdk::MonitorClient;

/// Purge everything, or only instances created more than `days` days ago.
pub async fn execute(days: Option<i64>, url: &str) -> Result<()> {
    let client = MonitorClient::new(url);

    match days {
        Some(days) => {
            client
                .clear_older_than(days)
                .await
                .context("Failed to purge old records")?;
            println!("{}", format!("✓ Removed instances older than {} days", days).green());
        }
        None => {
            client.clean_up().await.context("Failed to reset collector")?;
            println!("{}", "✓ All instances and transfers removed".green());
        }
    }

    Ok(())
}
