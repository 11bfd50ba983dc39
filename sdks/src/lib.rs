// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! fsmon Rust SDK
//!
//! Lets a filesystem client register itself with the fsmon collector, report
//! finished file transfers, and terminate its session.

pub mod client;
pub mod recorder;

pub use client::{ClientError, MonitorClient};
pub use recorder::TransferRecorder;

pub use fsmon_core::domain::instance::{Instance, InstanceConfig, InstanceId, InstanceReport};
pub use fsmon_core::domain::transfer::{FileBlock, FileTransfer, TransferStats};
