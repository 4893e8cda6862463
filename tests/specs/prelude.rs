// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub use bytes::Bytes;
pub use kx_adapters::{spawn_connection, spawn_exec, ChannelPool, Checkin, ScriptedTransport};
pub use kx_core::{ConnId, Delivery, Item, Mode, PoolId, Request, RequestRef, StreamTag, Tagged};
pub use kx_wire::{exit_status, ExitStatus, RawPart};
pub use std::time::Duration;

/// Upper bound for any single wait in a spec.
pub const SPEC_WAIT: Duration = Duration::from_secs(5);

/// Receive from `rx`, failing the spec if nothing arrives in time.
pub async fn recv<T>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(SPEC_WAIT, rx.recv())
        .await
        .expect("timed out waiting for item")
        .expect("channel closed")
}
