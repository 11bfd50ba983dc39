// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `fsmon-core` — Filesystem Client Telemetry Registry
//!
//! Owns the in-memory record set that the fsmon collector builds from
//! filesystem-client reports: one [`Instance`](domain::instance::Instance) per
//! client session and an append-only list of
//! [`FileTransfer`](domain::transfer::FileTransfer)s per instance.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | Wire types, `RegistryRepository` trait, `MonitorConfig` |
//! | [`infrastructure`] | Infrastructure | `InMemoryRegistry` |
//! | [`application`] | Application | `CollectorService` |
//! | [`presentation`] | Presentation | axum router for the collector HTTP API |
//!
//! Nothing here persists across restarts. Records are purged by an age-based
//! sweep that runs ahead of every write.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
