// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel-backed connection pool handle.
//!
//! The pool manager runs elsewhere and owns the selection policy. Requests
//! only see a [`ChannelPool`], which forwards each checkin to the manager.

use kx_core::{ConnId, ConnectionPool, PoolId, PoolLease};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A connection handed back to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkin {
    pub pool: PoolId,
    pub conn: ConnId,
}

#[derive(Clone)]
pub struct ChannelPool {
    tx: mpsc::UnboundedSender<Checkin>,
}

impl ChannelPool {
    /// Create a pool handle and the receiver the pool manager reads checkins from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Checkin>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Lease for a connection checked out of pool `id`.
    pub fn lease(&self, id: PoolId) -> PoolLease {
        PoolLease::new(id, Arc::new(self.clone()))
    }
}

impl ConnectionPool for ChannelPool {
    fn checkin(&self, pool: &PoolId, conn: &ConnId) {
        let checkin = Checkin { pool: pool.clone(), conn: conn.clone() };
        if self.tx.send(checkin).is_err() {
            tracing::warn!(%pool, %conn, "pool manager gone, checkin dropped");
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
