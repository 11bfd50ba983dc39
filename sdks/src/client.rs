// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::Utc;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::error;

use fsmon_core::domain::instance::{Instance, InstanceId, InstanceReport};
use fsmon_core::domain::transfer::FileTransfer;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error returned - {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid instance id")]
    InvalidInstanceId,

    #[error("invalid collector URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Client for the fsmon collector API.
pub struct MonitorClient {
    api_root_url: String,
    client: Client,
}

impl MonitorClient {
    /// Create a client rooted at `api_root_url` (with or without a trailing slash).
    pub fn new(api_root_url: impl Into<String>) -> Self {
        Self::with_http_client(api_root_url, Client::new())
    }

    pub fn with_http_client(api_root_url: impl Into<String>, client: Client) -> Self {
        Self {
            api_root_url: api_root_url.into(),
            client,
        }
    }

    /// Append `segments` to the root URL, percent-encoding each one.
    fn api_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: self.api_root_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.api_root_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::ACCEPTED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(%status, %body, "fsmon service returned an error");
        Err(ClientError::Status { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let response = self.client.get(self.api_url(segments)?).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), ClientError> {
        let response = self.client.delete(self.api_url(segments)?).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Register an instance.
    ///
    /// Missing hostname, id and creation time are filled in on `report` before
    /// it is sent, so the caller ends up holding exactly what was registered.
    pub async fn add_instance(&self, report: &mut InstanceReport) -> Result<InstanceId, ClientError> {
        if report.requested_hostname().is_none() {
            if let Some(hostname) = hostname::get().ok().and_then(|h| h.into_string().ok()) {
                report.client_hostname = Some(hostname);
            }
        }

        let instance_id = report.requested_id().cloned().unwrap_or_else(InstanceId::generate);
        report.instance_id = Some(instance_id.clone());

        if report.creation_time.is_none() {
            report.creation_time = Some(Utc::now());
        }

        let response = self
            .client
            .post(self.api_url(&["instances"])?)
            .json(report)
            .send()
            .await?;
        Self::check(response).await?;

        Ok(instance_id)
    }

    pub async fn list_instances(&self) -> Result<Vec<Instance>, ClientError> {
        self.get_json(&["instances"]).await
    }

    pub async fn get_instance(&self, instance_id: &InstanceId) -> Result<Instance, ClientError> {
        self.get_json(&["instances", instance_id.as_str()]).await
    }

    pub async fn terminate_instance(&self, instance_id: &InstanceId) -> Result<(), ClientError> {
        self.delete(&["instances", instance_id.as_str()]).await
    }

    pub async fn add_file_transfer(&self, transfer: &FileTransfer) -> Result<(), ClientError> {
        if transfer.instance_id.is_empty() {
            return Err(ClientError::InvalidInstanceId);
        }

        let response = self
            .client
            .post(self.api_url(&["transfers"])?)
            .json(transfer)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn list_file_transfers(&self) -> Result<Vec<FileTransfer>, ClientError> {
        self.get_json(&["transfers"]).await
    }

    pub async fn list_file_transfers_for_instance(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<FileTransfer>, ClientError> {
        self.get_json(&["transfers", instance_id.as_str()]).await
    }

    /// Drop every record on the collector.
    pub async fn clean_up(&self) -> Result<(), ClientError> {
        self.delete(&["cleanup"]).await
    }

    /// Drop records created more than `days` days ago.
    pub async fn clear_older_than(&self, days: i64) -> Result<(), ClientError> {
        let days = days.to_string();
        self.delete(&["cleanup", days.as_str()]).await
    }
}
