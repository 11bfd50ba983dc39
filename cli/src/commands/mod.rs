// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the fsmon CLI

pub mod cleanup;
pub mod config;
pub mod instance;
pub mod transfer;

pub use self::config::ConfigCommand;
pub use self::instance::InstanceCommand;
pub use self::transfer::TransferCommand;
