// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use fsmon_sdk::{FileTransfer, InstanceId, MonitorClient};

#[derive(Subcommand)]
pub enum TransferCommand {
    /// List reported file transfers
    List {
        /// Only transfers of this instance
        #[arg(short, long, value_name = "INSTANCE_ID")]
        instance: Option<String>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: TransferCommand, url: &str) -> Result<()> {
    let client = MonitorClient::new(url);

    match command {
        TransferCommand::List { instance, json } => {
            let transfers = match instance {
                Some(id) => client
                    .list_file_transfers_for_instance(&InstanceId::from(id))
                    .await
                    .context("Failed to list transfers for instance")?,
                None => client
                    .list_file_transfers()
                    .await
                    .context("Failed to list transfers")?,
            };
            print_transfers(&transfers, json)
        }
    }
}

fn print_transfers(transfers: &[FileTransfer], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(transfers)?);
        return Ok(());
    }

    if transfers.is_empty() {
        println!("{}", "No transfers reported".yellow());
        return Ok(());
    }

    println!("{} transfers:", transfers.len());
    println!(
        "{:<38} {:<5} {:>12} {:>7} {:<4} {}",
        "INSTANCE", "MODE", "BYTES", "BLOCKS", "SEQ", "PATH"
    );

    for transfer in transfers {
        println!(
            "{:<38} {:<5} {:>12} {:>7} {:<4} {}",
            transfer.instance_id,
            transfer.file_open_mode,
            transfer.transfer_size,
            transfer.transfer_block_count,
            if transfer.sequential_access { "yes" } else { "no" },
            transfer.file_path.bold()
        );
    }

    Ok(())
}
