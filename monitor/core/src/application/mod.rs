// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application Layer
//!
//! Use cases the HTTP routes delegate to.

pub mod collector;

pub use collector::{CollectorError, CollectorService, HealthReport};
