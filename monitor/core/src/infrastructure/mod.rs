// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Concrete implementations of the domain repository traits.

pub mod repositories;

pub use repositories::InMemoryRegistry;
