// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Accumulates the I/O extents of one open file and turns them into a
//! [`FileTransfer`] report when the file is closed.

use chrono::{DateTime, Utc};

use fsmon_core::domain::instance::InstanceId;
use fsmon_core::domain::transfer::{FileBlock, FileTransfer};

pub struct TransferRecorder {
    instance_id: InstanceId,
    file_path: String,
    file_size: i64,
    file_open_mode: String,
    file_open_time: DateTime<Utc>,
    blocks: Vec<FileBlock>,
}

impl TransferRecorder {
    pub fn open(
        instance_id: InstanceId,
        file_path: impl Into<String>,
        file_size: i64,
        file_open_mode: impl Into<String>,
    ) -> Self {
        Self::open_at(instance_id, file_path, file_size, file_open_mode, Utc::now())
    }

    pub fn open_at(
        instance_id: InstanceId,
        file_path: impl Into<String>,
        file_size: i64,
        file_open_mode: impl Into<String>,
        file_open_time: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id,
            file_path: file_path.into(),
            file_size,
            file_open_mode: file_open_mode.into(),
            file_open_time,
            blocks: Vec::new(),
        }
    }

    pub fn record(&mut self, offset: i64, length: i64) {
        self.record_at(offset, length, Utc::now());
    }

    pub fn record_at(&mut self, offset: i64, length: i64, access_time: DateTime<Utc>) {
        self.blocks.push(FileBlock { offset, length, access_time });
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn close(self) -> FileTransfer {
        self.close_at(Utc::now())
    }

    pub fn close_at(self, file_close_time: DateTime<Utc>) -> FileTransfer {
        let mut transfer = FileTransfer {
            instance_id: self.instance_id,
            file_path: self.file_path,
            file_size: self.file_size,
            file_open_mode: self.file_open_mode,
            transfer_blocks: self.blocks,
            transfer_size: 0,
            largest_block_size: 0,
            smallest_block_size: 0,
            transfer_block_count: 0,
            sequential_access: true,
            file_open_time: self.file_open_time,
            file_close_time,
        };
        transfer.apply_stats();
        transfer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_close_derives_aggregates() {
        let opened = Utc::now();
        let mut recorder = TransferRecorder::open_at(InstanceId::from("abc"), "/zone/f.bin", 10_000, "r", opened);
        recorder.record_at(0, 4096, opened);
        recorder.record_at(4096, 4096, opened + Duration::milliseconds(5));
        recorder.record_at(8192, 1808, opened + Duration::milliseconds(9));
        assert_eq!(recorder.block_count(), 3);

        let transfer = recorder.close_at(opened + Duration::seconds(1));

        assert_eq!(transfer.transfer_size, 10_000);
        assert_eq!(transfer.largest_block_size, 4096);
        assert_eq!(transfer.smallest_block_size, 1808);
        assert_eq!(transfer.transfer_block_count, 3);
        assert!(transfer.sequential_access);
        assert_eq!(transfer.file_close_time - transfer.file_open_time, Duration::seconds(1));
    }

    #[test]
    fn test_random_access_is_flagged() {
        let mut recorder = TransferRecorder::open(InstanceId::from("abc"), "/zone/f.bin", 10_000, "r");
        recorder.record(8192, 100);
        recorder.record(0, 100);

        assert!(!recorder.close().sequential_access);
    }

    #[test]
    fn test_close_without_io() {
        let transfer = TransferRecorder::open(InstanceId::from("abc"), "/zone/empty", 0, "w").close();
        assert_eq!(transfer.transfer_block_count, 0);
        assert_eq!(transfer.transfer_size, 0);
    }
}
