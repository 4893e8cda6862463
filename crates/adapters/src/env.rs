// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

/// Per-iteration receive timeout while negotiating a WebSocket upgrade.
pub fn upgrade_recv_timeout() -> Duration {
    std::env::var("KX_UPGRADE_RECV_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// How long an exec session waits for the peer to answer our close frame.
pub fn exec_close_timeout() -> Duration {
    std::env::var("KX_EXEC_CLOSE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(2))
}

/// Command channel capacity for connection and exec actors.
pub fn channel_capacity() -> usize {
    std::env::var("KX_CONN_CHANNEL_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(64)
}
