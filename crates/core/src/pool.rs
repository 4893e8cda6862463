// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection pool boundary.
//!
//! The pool's selection and scaling policy live elsewhere; a request only
//! needs to hand its connection back once, after its last item is delivered.

use crate::id::{ConnId, PoolId};
use std::fmt;
use std::sync::Arc;

/// Receives connections back from finished requests.
pub trait ConnectionPool: Send + Sync {
    /// Return `conn` to `pool`. Fire-and-forget.
    fn checkin(&self, pool: &PoolId, conn: &ConnId);
}

/// A request's claim on a pooled connection.
///
/// Consumed by [`PoolLease::checkin`], so a lease can only be returned once.
#[derive(Clone)]
pub struct PoolLease {
    id: PoolId,
    pool: Arc<dyn ConnectionPool>,
}

impl PoolLease {
    pub fn new(id: PoolId, pool: Arc<dyn ConnectionPool>) -> Self {
        Self { id, pool }
    }

    pub fn id(&self) -> &PoolId {
        &self.id
    }

    pub fn checkin(self, conn: &ConnId) {
        tracing::debug!(pool = %self.id, %conn, "checking connection back in");
        self.pool.checkin(&self.id, conn);
    }
}

impl fmt::Debug for PoolLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolLease").field("id", &self.id).finish_non_exhaustive()
    }
}
