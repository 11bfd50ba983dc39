// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types with no I/O dependencies.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`instance`] | `Instance`, `InstanceId`, `InstanceConfig`, `InstanceReport` |
//! | [`transfer`] | `FileTransfer`, `FileBlock`, `TransferStats` |
//! | [`repository`] | `RegistryRepository`, `RegistryError`, `RegistryStats` |
//! | [`config`] | `MonitorConfig` |

pub mod config;
pub mod instance;
pub mod repository;
pub mod timestamp;
pub mod transfer;

pub use instance::*;
pub use repository::*;
pub use transfer::*;
