// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::instance::InstanceId;

/// One contiguous I/O extent within a file session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlock {
    pub offset: i64,
    pub length: i64,
    pub access_time: DateTime<Utc>,
}

/// A completed file I/O session reported by a client.
///
/// Stored append-only under its owning instance; never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTransfer {
    pub instance_id: InstanceId,

    pub file_path: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub file_open_mode: String,

    #[serde(default, deserialize_with = "blocks_or_empty")]
    pub transfer_blocks: Vec<FileBlock>,
    #[serde(default)]
    pub transfer_size: i64,
    #[serde(default)]
    pub largest_block_size: i64,
    #[serde(default)]
    pub smallest_block_size: i64,
    #[serde(default)]
    pub transfer_block_count: i64,
    #[serde(default)]
    pub sequential_access: bool,

    pub file_open_time: DateTime<Utc>,
    pub file_close_time: DateTime<Utc>,
}

/// Clients encode a session without I/O as `"transfer_blocks": null`.
fn blocks_or_empty<'de, D>(deserializer: D) -> Result<Vec<FileBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FileBlock>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FileTransfer {
    /// True when blocks were reported but the aggregate fields were left empty.
    pub fn needs_stats(&self) -> bool {
        self.transfer_block_count == 0 && !self.transfer_blocks.is_empty()
    }

    /// Overwrite the aggregate fields with values derived from `transfer_blocks`.
    pub fn apply_stats(&mut self) {
        let stats = TransferStats::from_blocks(&self.transfer_blocks);
        self.transfer_size = stats.transfer_size;
        self.largest_block_size = stats.largest_block_size;
        self.smallest_block_size = stats.smallest_block_size;
        self.transfer_block_count = stats.transfer_block_count;
        self.sequential_access = stats.sequential_access;
    }
}

/// Aggregates derived from a block sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferStats {
    pub transfer_size: i64,
    pub largest_block_size: i64,
    pub smallest_block_size: i64,
    pub transfer_block_count: i64,
    pub sequential_access: bool,
}

impl TransferStats {
    /// Access is sequential when every block starts where the previous one ended.
    /// Zero or one block is trivially sequential. An end offset that overflows
    /// `i64` never matches, and the total size saturates at `i64::MAX`.
    pub fn from_blocks(blocks: &[FileBlock]) -> Self {
        let sequential_access = blocks
            .windows(2)
            .all(|pair| pair[0].offset.checked_add(pair[0].length) == Some(pair[1].offset));

        Self {
            transfer_size: blocks.iter().fold(0i64, |total, b| total.saturating_add(b.length)),
            largest_block_size: blocks.iter().map(|b| b.length).max().unwrap_or(0),
            smallest_block_size: blocks.iter().map(|b| b.length).min().unwrap_or(0),
            transfer_block_count: blocks.len() as i64,
            sequential_access,
        }
    }
}
