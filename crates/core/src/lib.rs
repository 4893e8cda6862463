// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kx-core: per-request state machine for streamed cluster API calls

pub mod macros;

pub mod delivery;
pub mod id;
pub mod item;
pub mod pool;
pub mod request;
pub mod watch;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use delivery::{Delivery, Tagged};
pub use id::{ConnId, PoolId, RequestRef, StreamTag};
pub use item::Item;
pub use pool::{ConnectionPool, PoolLease};
pub use request::{Mode, Outcome, Request, WebSocketState};
pub use watch::LivenessWatch;
