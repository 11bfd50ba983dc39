// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Collector Configuration
//
// YAML-backed settings for the collector process:
// - Listen address and port
// - Retention window of the implicit sweep
// - Request body size limit
//
// Discovery order and environment overrides mirror the other fsmon binaries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::repository::DEFAULT_RETENTION_DAYS;

pub const DEFAULT_SERVICE_PORT: u16 = 12021;
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
/// Upper bound accepted for `retention_days` (about a century).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interface the HTTP listener binds to
    pub bind_address: String,

    /// HTTP listener port
    pub service_port: u16,

    /// Instances created longer ago than this are dropped on the next write
    pub retention_days: i64,

    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            service_port: DEFAULT_SERVICE_PORT,
            retention_days: DEFAULT_RETENTION_DAYS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. FSMON_CONFIG_PATH environment variable
    /// 2. ./fsmon-config.yaml (working directory)
    /// 3. ~/.fsmon/config.yaml (user home)
    /// 4. /etc/fsmon/config.yaml (system, Unix) or C:\ProgramData\fsmon\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("FSMON_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./fsmon-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".fsmon").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/fsmon/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\fsmon\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load from an explicit path (fails if missing), else discovery, else defaults.
    /// Environment overrides are applied last in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable values are
    /// logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("FSMON_BIND_ADDRESS") {
            tracing::info!("Environment override: FSMON_BIND_ADDRESS={}", val);
            self.bind_address = val;
        }

        if let Some(val) = lookup("FSMON_SERVICE_PORT") {
            match val.parse() {
                Ok(port) => self.service_port = port,
                Err(_) => tracing::warn!("Invalid value for FSMON_SERVICE_PORT: '{}'. Ignoring.", val),
            }
        }

        if let Some(val) = lookup("FSMON_RETENTION_DAYS") {
            match val.parse() {
                Ok(days) => self.retention_days = days,
                Err(_) => tracing::warn!("Invalid value for FSMON_RETENTION_DAYS: '{}'. Ignoring.", val),
            }
        }

        if let Some(val) = lookup("FSMON_MAX_BODY_BYTES") {
            match val.parse() {
                Ok(bytes) => self.max_body_bytes = bytes,
                Err(_) => tracing::warn!("Invalid value for FSMON_MAX_BODY_BYTES: '{}'. Ignoring.", val),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_address.is_empty() {
            anyhow::bail!("bind_address cannot be empty");
        }

        if self.service_port == 0 {
            anyhow::bail!("service_port must be non-zero");
        }

        if !(1..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
            anyhow::bail!(
                "retention_days must be between 1 and {}, got {}",
                MAX_RETENTION_DAYS,
                self.retention_days
            );
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be non-zero");
        }

        Ok(())
    }

    /// `address:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.service_port)
    }
}
