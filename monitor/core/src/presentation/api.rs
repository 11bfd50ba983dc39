// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Collector HTTP routes.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET | `/health` | 200 JSON |
//! | POST | `/instances` | 202, `Location: /instances/{id}` |
//! | GET | `/instances` | 200 JSON array, oldest first |
//! | GET | `/instances/{instance_id}` | 200 JSON, 404 if unknown |
//! | DELETE | `/instances/{instance_id}` | 202 |
//! | POST | `/transfers` | 202 |
//! | GET | `/transfers` | 200 JSON array |
//! | GET | `/transfers/{instance_id}` | 200 JSON array |
//! | DELETE | `/cleanup` | 202 |
//! | DELETE | `/cleanup/{days}` | 202 |
//!
//! Errors are returned as plain text.

use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info_span, warn, Level, Span};

use crate::application::collector::{CollectorError, CollectorService};
use crate::domain::config::DEFAULT_MAX_BODY_BYTES;
use crate::domain::instance::{InstanceId, InstanceReport};
use crate::domain::transfer::FileTransfer;
use crate::presentation::client_ip;

pub struct AppState {
    pub collector: Arc<CollectorService>,
    pub max_body_bytes: usize,
}

pub fn app(collector: Arc<CollectorService>) -> Router {
    app_with_body_limit(collector, DEFAULT_MAX_BODY_BYTES)
}

pub fn app_with_body_limit(collector: Arc<CollectorService>, max_body_bytes: usize) -> Router {
    let state = Arc::new(AppState { collector, max_body_bytes });

    Router::new()
        .route("/health", get(health))
        .route("/instances", get(list_instances).post(add_instance))
        .route("/instances/{instance_id}", get(get_instance).delete(terminate_instance))
        .route("/transfers", get(list_transfers).post(add_transfer))
        .route("/transfers/{instance_id}", get(list_transfers_for_instance))
        .route("/cleanup", delete(clean_up))
        .route("/cleanup/{days}", delete(clean_up_days_old))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Every request is logged at info with its method, path and resolved peer.
fn request_span(request: &Request) -> Span {
    let peer = client_ip::resolve(request.headers(), peer_of(request));
    info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        peer = %peer
    )
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadInput(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CollectorError> for ApiError {
    fn from(err: CollectorError) -> Self {
        match err {
            // A transfer for an unknown or vanished instance is a bad report.
            CollectorError::UnknownInstance(_) | CollectorError::ActivityUpdateFailed(_) => {
                ApiError::BadInput(err.to_string())
            }
            CollectorError::Registry(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(message) => error!(%status, "{}", message),
            ApiError::BadInput(message) | ApiError::NotFound(message) => warn!(%status, "{}", message),
        }
        (status, self.to_string()).into_response()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn json_response<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn read_json<T: DeserializeOwned>(request: Request, limit: usize) -> Result<T, ApiError> {
    let bytes = axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| ApiError::BadInput(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadInput(e.to_string()))
}

fn peer_of(request: &Request) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    json_response(&state.collector.health().await)
}

async fn add_instance(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ApiError> {
    let client_host_ip = client_ip::resolve(request.headers(), peer_of(&request));
    let report: InstanceReport = read_json(request, state.max_body_bytes).await?;

    let instance_id = state.collector.register_instance(report, client_host_ip).await?;

    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, format!("/instances/{}", instance_id))],
    )
        .into_response())
}

async fn list_instances(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    json_response(&state.collector.list_instances().await)
}

async fn get_instance(
    State(state): State<Arc<AppState>>,
    Path(instance_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = InstanceId::from(instance_id);
    match state.collector.get_instance(&id).await {
        Some(instance) => json_response(&instance),
        None => Err(ApiError::NotFound(format!("unable to find an instance for ID {}", id))),
    }
}

async fn terminate_instance(
    State(state): State<Arc<AppState>>,
    Path(instance_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .collector
        .terminate_instance(&InstanceId::from(instance_id))
        .await?;
    Ok(StatusCode::ACCEPTED)
}

async fn add_transfer(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    let transfer: FileTransfer = read_json(request, state.max_body_bytes).await?;
    state.collector.record_transfer(transfer).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn list_transfers(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    json_response(&state.collector.list_transfers().await)
}

async fn list_transfers_for_instance(
    State(state): State<Arc<AppState>>,
    Path(instance_id): Path<String>,
) -> Result<Response, ApiError> {
    let transfers = state
        .collector
        .list_transfers_for_instance(&InstanceId::from(instance_id))
        .await;
    json_response(&transfers)
}

async fn clean_up(State(state): State<Arc<AppState>>) -> StatusCode {
    state.collector.clean_up().await;
    StatusCode::ACCEPTED
}

async fn clean_up_days_old(
    State(state): State<Arc<AppState>>,
    Path(days): Path<String>,
) -> Result<StatusCode, ApiError> {
    let days: i64 = days
        .parse()
        .map_err(|_| ApiError::BadInput("days is not number".to_string()))?;
    state.collector.clear_older_than(days).await;
    Ok(StatusCode::ACCEPTED)
}
