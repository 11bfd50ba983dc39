// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Registry Repository Interface
//!
//! Storage contract for the two record kinds the collector keeps: instances and
//! the file transfers they own. Defined here, implemented in
//! `crate::infrastructure::repositories`.
//!
//! Every operation is a single critical section over the whole registry. Writes
//! (`add_instance`, `add_file_transfer`) first run the retention sweep as a
//! separate critical section, so another writer may interleave between the
//! sweep and the insert.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::instance::{Instance, InstanceId};
use crate::domain::transfer::FileTransfer;

/// Default age, in days, after which the implicit sweep drops an instance.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// Instant before which an instance counts as older than `days` days.
///
/// Saturates instead of overflowing: a window reaching past the earliest
/// representable time keeps everything, one reaching past the latest purges
/// everything.
pub fn retention_cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let saturated = if days >= 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    };

    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(saturated)
}

#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Insert or overwrite the instance keyed by its id.
    async fn add_instance(&self, instance: Instance) -> Result<(), RegistryError>;

    /// Point lookup. `None` means no such live instance.
    async fn get_instance(&self, id: &InstanceId) -> Option<Instance>;

    /// All live instances, oldest `creation_time` first, ties by id.
    async fn list_instances(&self) -> Vec<Instance>;

    /// Set `last_activity_time` to now.
    async fn update_instance_last_activity_time(&self, id: &InstanceId) -> Result<(), RegistryError>;

    /// Mark the instance terminated and stamp termination/activity times.
    async fn terminate_instance(&self, id: &InstanceId) -> Result<(), RegistryError>;

    /// Append a transfer to its owning instance. The owner must already exist.
    async fn add_file_transfer(&self, transfer: FileTransfer) -> Result<(), RegistryError>;

    /// Every stored transfer. Order across instances is unspecified.
    async fn list_file_transfers(&self) -> Vec<FileTransfer>;

    /// Transfers of one instance in insertion order; empty if unknown.
    async fn list_file_transfers_for_instance(&self, id: &InstanceId) -> Vec<FileTransfer>;

    /// Drop every instance and transfer.
    async fn clean_up(&self);

    /// Drop instances created more than `days` days ago together with their
    /// transfers. Returns how many instances were removed.
    async fn clear_older_than(&self, days: i64) -> usize;

    /// Record counts for health reporting.
    async fn stats(&self) -> RegistryStats;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub instances: usize,
    pub terminated_instances: usize,
    pub transfers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unable to find an instance for ID {0}")]
    NotFound(InstanceId),

    #[error("instance ID must not be empty")]
    InvalidInstanceId,
}
