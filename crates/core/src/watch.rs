// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller liveness watch boundary.

/// A watch on the caller that issued a request.
///
/// Installed once when the request is created. When the caller goes away the
/// watch notifies the owning actor (how is up to the implementation). When
/// the request finishes first, the watch is cancelled; `cancel` takes the
/// boxed handle by value so it cannot run twice.
pub trait LivenessWatch: Send {
    fn cancel(self: Box<Self>);
}
