// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serde helpers for optional RFC 3339 timestamps.
//!
//! Some fleet clients always send every timestamp field and use
//! `0001-01-01T00:00:00Z` to mean "not set". Decoding maps any timestamp at or
//! before that instant to `None` so it never reaches the registry as a real time.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer};

/// Returns true for the "zero time" placeholder.
pub fn is_zero(time: &DateTime<Utc>) -> bool {
    time.year() <= 1
}

/// `deserialize_with` target for `Option<DateTime<Utc>>` fields.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|t| !is_zero(t)))
}
