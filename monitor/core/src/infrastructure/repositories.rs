// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::instance::{Instance, InstanceId};
use crate::domain::repository::{
    retention_cutoff, RegistryError, RegistryRepository, RegistryStats, DEFAULT_RETENTION_DAYS,
};
use crate::domain::transfer::FileTransfer;

/// Both maps live behind one lock: cascades and sweeps touch them together.
#[derive(Default)]
struct Registry {
    instances: HashMap<InstanceId, Instance>,
    transfers: HashMap<InstanceId, Vec<FileTransfer>>,
}

impl Registry {
    fn remove_created_before(&mut self, cutoff: chrono::DateTime<Utc>) -> usize {
        let expired: Vec<InstanceId> = self
            .instances
            .values()
            .filter(|instance| instance.created_before(cutoff))
            .map(|instance| instance.instance_id.clone())
            .collect();

        for id in &expired {
            self.transfers.remove(id);
            self.instances.remove(id);
        }

        expired.len()
    }
}

/// Process-lifetime registry. Cloning shares the same underlying state.
#[derive(Clone)]
pub struct InMemoryRegistry {
    inner: Arc<Mutex<Registry>>,
    retention_days: i64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::with_retention_days(DEFAULT_RETENTION_DAYS)
    }

    pub fn with_retention_days(retention_days: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::default())),
            retention_days,
        }
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    fn sweep(&self) -> usize {
        let cutoff = retention_cutoff(Utc::now(), self.retention_days);
        let removed = self.inner.lock().remove_created_before(cutoff);
        if removed > 0 {
            debug!(removed, retention_days = self.retention_days, "Retention sweep dropped expired instances");
        }
        removed
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryRepository for InMemoryRegistry {
    async fn add_instance(&self, instance: Instance) -> Result<(), RegistryError> {
        if instance.instance_id.is_empty() {
            return Err(RegistryError::InvalidInstanceId);
        }

        self.sweep();

        let mut registry = self.inner.lock();
        registry.instances.insert(instance.instance_id.clone(), instance);
        Ok(())
    }

    async fn get_instance(&self, id: &InstanceId) -> Option<Instance> {
        self.inner.lock().instances.get(id).cloned()
    }

    async fn list_instances(&self) -> Vec<Instance> {
        let mut instances: Vec<Instance> = {
            let registry = self.inner.lock();
            registry.instances.values().cloned().collect()
        };

        instances.sort_by(|a, b| {
            a.creation_time
                .cmp(&b.creation_time)
                .then_with(|| a.instance_id.cmp(&b.instance_id))
        });
        instances
    }

    async fn update_instance_last_activity_time(&self, id: &InstanceId) -> Result<(), RegistryError> {
        let mut registry = self.inner.lock();
        let instance = registry
            .instances
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        instance.touch(Utc::now());
        Ok(())
    }

    async fn terminate_instance(&self, id: &InstanceId) -> Result<(), RegistryError> {
        let mut registry = self.inner.lock();
        let instance = registry
            .instances
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        instance.terminate(Utc::now());
        Ok(())
    }

    async fn add_file_transfer(&self, transfer: FileTransfer) -> Result<(), RegistryError> {
        self.sweep();

        let mut registry = self.inner.lock();
        if !registry.instances.contains_key(&transfer.instance_id) {
            return Err(RegistryError::NotFound(transfer.instance_id));
        }

        registry
            .transfers
            .entry(transfer.instance_id.clone())
            .or_default()
            .push(transfer);
        Ok(())
    }

    async fn list_file_transfers(&self) -> Vec<FileTransfer> {
        let registry = self.inner.lock();
        registry.transfers.values().flatten().cloned().collect()
    }

    async fn list_file_transfers_for_instance(&self, id: &InstanceId) -> Vec<FileTransfer> {
        let registry = self.inner.lock();
        registry.transfers.get(id).cloned().unwrap_or_default()
    }

    async fn clean_up(&self) {
        let mut registry = self.inner.lock();
        *registry = Registry::default();
        info!("Cleaned up registry");
    }

    async fn clear_older_than(&self, days: i64) -> usize {
        let cutoff = retention_cutoff(Utc::now(), days);
        let removed = self.inner.lock().remove_created_before(cutoff);
        info!(removed, days, "Cleaned up instances older than {} days", days);
        removed
    }

    async fn stats(&self) -> RegistryStats {
        let registry = self.inner.lock();
        RegistryStats {
            instances: registry.instances.len(),
            terminated_instances: registry.instances.values().filter(|i| i.terminated).count(),
            transfers: registry.transfers.values().map(Vec::len).sum(),
        }
    }
}
