// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Collector Service
//!
//! Sits between the HTTP routes and the registry. It fills in every field the
//! server owns before a record reaches the store:
//!
//! - a generated `instance_id` when the client sent none,
//! - `client_hostname` from the local host when the client sent none,
//! - `client_host_ip` from the observed peer, always overwriting the client,
//! - `creation_time` / `last_activity_time` / `terminated` on registration,
//! - transfer aggregates when only blocks were reported.
//!
//! ## Transfer ingestion is two store calls
//!
//! [`CollectorService::record_transfer`] appends the transfer and then bumps the
//! owner's activity time. The store offers no combined transaction, so a sweep
//! or purge can run between the two calls. When that happens the second call
//! fails with [`CollectorError::ActivityUpdateFailed`]; the cascade delete has
//! already removed the transfer along with its instance.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::instance::{Instance, InstanceId, InstanceReport};
use crate::domain::repository::{RegistryError, RegistryRepository};
use crate::domain::transfer::FileTransfer;

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("unable to find an instance for ID {0}")]
    UnknownInstance(InstanceId),

    #[error("instance {0} disappeared before its activity time could be updated")]
    ActivityUpdateFailed(InstanceId),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub uptime_seconds: u64,
    pub instances: usize,
    pub transfers: usize,
}

pub struct CollectorService {
    registry: Arc<dyn RegistryRepository>,
    local_hostname: String,
    started_at: Instant,
}

impl CollectorService {
    pub fn new(registry: Arc<dyn RegistryRepository>) -> Self {
        let local_hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_default();

        Self::with_local_hostname(registry, local_hostname)
    }

    pub fn with_local_hostname(registry: Arc<dyn RegistryRepository>, local_hostname: impl Into<String>) -> Self {
        Self {
            registry,
            local_hostname: local_hostname.into(),
            started_at: Instant::now(),
        }
    }

    /// Register (or re-register) a client session and return its id.
    pub async fn register_instance(
        &self,
        report: InstanceReport,
        client_host_ip: String,
    ) -> Result<InstanceId, CollectorError> {
        let instance_id = report.requested_id().cloned().unwrap_or_else(InstanceId::generate);
        let client_hostname = report
            .requested_hostname()
            .map(str::to_string)
            .unwrap_or_else(|| self.local_hostname.clone());

        let instance = report.into_instance(instance_id.clone(), client_hostname, client_host_ip, Utc::now());
        info!(
            instance_id = %instance.instance_id,
            client_host_ip = %instance.client_host_ip,
            "Registering instance"
        );

        self.registry.add_instance(instance).await?;
        Ok(instance_id)
    }

    pub async fn list_instances(&self) -> Vec<Instance> {
        self.registry.list_instances().await
    }

    pub async fn get_instance(&self, id: &InstanceId) -> Option<Instance> {
        self.registry.get_instance(id).await
    }

    pub async fn terminate_instance(&self, id: &InstanceId) -> Result<(), CollectorError> {
        self.registry.terminate_instance(id).await?;
        info!(instance_id = %id, "Instance terminated");
        Ok(())
    }

    /// Store a transfer, then bump the owning instance's activity time.
    pub async fn record_transfer(&self, mut transfer: FileTransfer) -> Result<(), CollectorError> {
        if transfer.needs_stats() {
            transfer.apply_stats();
        }

        let instance_id = transfer.instance_id.clone();
        self.registry
            .add_file_transfer(transfer)
            .await
            .map_err(|err| match err {
                RegistryError::NotFound(id) => CollectorError::UnknownInstance(id),
                other => CollectorError::Registry(other),
            })?;

        self.registry
            .update_instance_last_activity_time(&instance_id)
            .await
            .map_err(|err| {
                warn!(instance_id = %instance_id, error = %err, "Instance removed between transfer insert and activity update");
                match err {
                    RegistryError::NotFound(id) => CollectorError::ActivityUpdateFailed(id),
                    other => CollectorError::Registry(other),
                }
            })
    }

    pub async fn list_transfers(&self) -> Vec<FileTransfer> {
        self.registry.list_file_transfers().await
    }

    pub async fn list_transfers_for_instance(&self, id: &InstanceId) -> Vec<FileTransfer> {
        self.registry.list_file_transfers_for_instance(id).await
    }

    pub async fn clean_up(&self) {
        self.registry.clean_up().await;
    }

    pub async fn clear_older_than(&self, days: i64) -> usize {
        self.registry.clear_older_than(days).await
    }

    pub async fn health(&self) -> HealthReport {
        let stats = self.registry.stats().await;
        HealthReport {
            status: "healthy".to_string(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            instances: stats.instances,
            transfers: stats.transfers,
        }
    }
}
