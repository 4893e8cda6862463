// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kx-adapters: actors that own requests and drive them from a transport.
//!
//! - [`http`]: one task per HTTP connection, many requests per connection
//! - [`exec`]: one task per upgraded exec/attach WebSocket
//! - [`upgrade`]: HTTP to WebSocket handshake negotiation
//! - [`registry`]: the per-actor request table both actors share

pub mod env;
pub mod exec;
pub mod http;
pub mod pool;
pub mod registry;
pub mod upgrade;
pub mod watch;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::ScriptedTransport;

pub use exec::{spawn_exec, ExecHandle, ExecSession, SessionError};
pub use http::{spawn_connection, ConnectionError, ConnectionHandle};
pub use pool::{ChannelPool, Checkin};
pub use registry::{Applied, Registry};
pub use upgrade::{
    negotiate, negotiate_with_env, Transport, TransportError, UpgradeError, UpgradeResponse,
};
pub use watch::{watch_caller, CallerGuard, CallerWatch};
