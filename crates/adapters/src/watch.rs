// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller liveness watches.
//!
//! The caller holds a [`CallerGuard`]; the request holds the matching
//! [`CallerWatch`]. Dropping the guard runs the `on_down` future, which tells
//! the owning actor to discard the request. Cancelling the watch (when the
//! request finishes first) stops the background task without running it.

use kx_core::LivenessWatch;
use std::future::Future;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Held by the caller for as long as it wants the request's results.
#[must_use = "dropping the guard fires the watch"]
pub struct CallerGuard {
    _guard: DropGuard,
}

/// Request-side half of a caller watch.
#[derive(Debug)]
pub struct CallerWatch {
    stop: CancellationToken,
}

impl LivenessWatch for CallerWatch {
    fn cancel(self: Box<Self>) {
        self.stop.cancel();
    }
}

/// Install a watch on the caller. Must be called within a tokio runtime.
pub fn watch_caller<F>(on_down: F) -> (CallerWatch, CallerGuard)
where
    F: Future<Output = ()> + Send + 'static,
{
    let alive = CancellationToken::new();
    let stop = CancellationToken::new();
    let (caller_gone, watch_stopped) = (alive.clone(), stop.clone());
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = watch_stopped.cancelled() => {}
            _ = caller_gone.cancelled() => on_down.await,
        }
    });
    (CallerWatch { stop }, CallerGuard { _guard: alive.drop_guard() })
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
