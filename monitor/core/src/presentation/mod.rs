// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Presentation Layer
//!
//! HTTP surface of the collector.

pub mod api;
pub mod client_ip;

pub use api::{app, ApiError, AppState};
