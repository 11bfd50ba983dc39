// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::timestamp;

// ============================================================================
// Value Objects
// ============================================================================

/// Identifier of a filesystem-client session.
///
/// Clients may pick their own id; the collector generates a UUID v4 string when
/// a registration arrives without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection and cache settings the client was started with.
///
/// The registry never interprets these; they are stored and served back as-is
/// so dashboards can show how each client was configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    pub host: String,
    pub port: i64,
    pub zone: String,
    pub client_user: String,
    pub proxy_user: String,
    pub auth_scheme: String,
    pub read_ahead_max: i64,
    pub operation_timeout: String,
    pub connection_idle_timeout: String,
    pub connection_max: i64,
    pub metadata_cache_timeout: String,
    pub metadata_cache_cleanup_time: String,
    pub buffer_size_max: i64,
    pub pool_address: String,
}

// ============================================================================
// Aggregate
// ============================================================================

/// A registered filesystem-client session.
///
/// # Invariants
///
/// - `instance_id` is never empty once stored.
/// - `creation_time <= last_activity_time` whenever the latter is set.
/// - `terminated` never goes back to `false` through [`Instance::terminate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: InstanceId,

    #[serde(flatten)]
    pub config: InstanceConfig,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_hostname: String,

    /// Observed by the collector, never taken from the client.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_host_ip: String,

    pub creation_time: DateTime<Utc>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_optional"
    )]
    pub last_activity_time: Option<DateTime<Utc>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_optional"
    )]
    pub termination_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub terminated: bool,
}

impl Instance {
    /// Record activity at `now`, clamped so it never precedes `creation_time`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_time = Some(now.max(self.creation_time));
    }

    /// Mark the session terminated. Repeated calls only refresh the timestamps.
    pub fn terminate(&mut self, now: DateTime<Utc>) {
        self.terminated = true;
        self.termination_time = Some(now);
        self.touch(now);
    }

    /// True when `creation_time` falls strictly before `cutoff`.
    pub fn created_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.creation_time < cutoff
    }
}

// ============================================================================
// Inbound registration
// ============================================================================

/// Body of `POST /instances`.
///
/// Only the fields a client is allowed to supply are declared; anything else
/// in the payload (`client_host_ip`, `terminated`, ...) is dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<InstanceId>,

    #[serde(flatten)]
    pub config: InstanceConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_hostname: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_optional"
    )]
    pub creation_time: Option<DateTime<Utc>>,
}

impl InstanceReport {
    /// Client-chosen id, if one was given and it is non-empty.
    pub fn requested_id(&self) -> Option<&InstanceId> {
        self.instance_id.as_ref().filter(|id| !id.is_empty())
    }

    /// Client-reported hostname, if non-empty.
    pub fn requested_hostname(&self) -> Option<&str> {
        self.client_hostname.as_deref().filter(|h| !h.is_empty())
    }

    /// Build the record that gets stored for a fresh registration.
    pub fn into_instance(
        self,
        instance_id: InstanceId,
        client_hostname: String,
        client_host_ip: String,
        now: DateTime<Utc>,
    ) -> Instance {
        let mut instance = Instance {
            instance_id,
            config: self.config,
            client_hostname,
            client_host_ip,
            creation_time: self.creation_time.unwrap_or(now),
            last_activity_time: None,
            termination_time: None,
            terminated: false,
        };
        instance.touch(now);
        instance
    }
}
