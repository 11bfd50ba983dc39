// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Resolves the address a request came from.
//!
//! Proxy headers win over the socket peer: `X-Real-Ip` first, then the first
//! hop of `X-Forwarded-For`. Ports are stripped in every form.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(addr) = header("x-real-ip").or_else(|| header("x-forwarded-for")) {
        return strip_port(addr);
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return ip.to_string();
    }

    // hostname:port
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host.to_string()
        }
        _ => addr.to_string(),
    }
}
