// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{ConnId, ConnectionPool, LivenessWatch, PoolId, PoolLease, Request, RequestRef};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for items.
pub mod strategies {
    use crate::Item;
    use bytes::Bytes;
    use http::StatusCode;
    use proptest::prelude::*;

    fn arb_bytes() -> impl Strategy<Value = Bytes> {
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Bytes::from)
    }

    /// Items that leave a `Receiving` request in `Receiving`.
    pub fn arb_streaming_item() -> impl Strategy<Value = Item> {
        prop_oneof![
            (100u16..600).prop_filter_map("valid status", |code| {
                StatusCode::from_u16(code).ok().map(Item::Status)
            }),
            arb_bytes().prop_map(Item::Data),
            arb_bytes().prop_map(Item::Stdout),
            arb_bytes().prop_map(Item::Stderr),
            arb_bytes().prop_map(Item::ErrorChannel),
            "[a-z ]{0,16}".prop_map(Item::Error),
        ]
    }
}

// ── Fakes ───────────────────────────────────────────────────────────────

/// Pool that records every checkin.
#[derive(Clone, Default)]
pub struct FakePool {
    checkins: Arc<Mutex<Vec<(PoolId, ConnId)>>>,
}

impl FakePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease on this pool under `id`.
    pub fn lease(&self, id: &str) -> PoolLease {
        PoolLease::new(PoolId::from(id), Arc::new(self.clone()))
    }

    pub fn checkins(&self) -> Vec<(PoolId, ConnId)> {
        self.checkins.lock().clone()
    }
}

impl ConnectionPool for FakePool {
    fn checkin(&self, pool: &PoolId, conn: &ConnId) {
        self.checkins.lock().push((pool.clone(), conn.clone()));
    }
}

/// Watch that counts cancellations. Clones share the counter.
#[derive(Clone, Default)]
pub struct FakeWatch {
    cancels: Arc<AtomicUsize>,
}

impl FakeWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Box<dyn LivenessWatch> {
        Box::new(self.clone())
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl LivenessWatch for FakeWatch {
    fn cancel(self: Box<Self>) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Request factories ───────────────────────────────────────────────────

/// Pool-managed request on `conn-test` with fakes attached.
pub fn pooled_request(reference: &str) -> (Request, FakePool, FakeWatch) {
    let pool = FakePool::new();
    let watch = FakeWatch::new();
    let request = Request::new(RequestRef::from(reference), ConnId::from("conn-test"), watch.boxed())
        .with_pool(pool.lease("pool-test"));
    (request, pool, watch)
}
