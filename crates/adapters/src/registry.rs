// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-actor request table.
//!
//! Routes each transport event to its request by correlation reference and
//! applies the returned [`Outcome`]: store and continue, store the terminal
//! snapshot, or drop the entry.

use kx_core::{Item, Outcome, Request, RequestRef};
use kx_wire::{decode_frame, normalize, RawPart};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

/// What happened to the registry entry after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Request updated and still in flight
    Stored,
    /// Close completed; snapshot stored, the actor should shut down
    Terminal(RequestRef),
    /// Request finished and was dropped
    Removed,
    /// No request with that reference
    Unknown,
    /// Frame outside the exec vocabulary; nothing changed
    Ignored,
}

#[derive(Debug, Default)]
pub struct Registry {
    requests: HashMap<RequestRef, Request>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `request`. A request already stored under the same reference
    /// is discarded: its watch is cancelled and its connection checked in.
    pub fn insert(&mut self, request: Request) {
        let reference = request.reference().clone();
        tracing::debug!(%reference, "request registered");
        if let Some(previous) = self.requests.insert(reference.clone(), request) {
            tracing::warn!(%reference, ?previous, "replaced request with duplicate reference");
            previous.discard();
        }
    }

    pub fn get(&self, reference: &RequestRef) -> Option<&Request> {
        self.requests.get(reference)
    }

    pub fn contains(&self, reference: &RequestRef) -> bool {
        self.requests.contains_key(reference)
    }

    pub fn remove(&mut self, reference: &RequestRef) -> Option<Request> {
        self.requests.remove(reference)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Route an HTTP response part.
    pub fn dispatch_part(&mut self, part: RawPart) -> Applied {
        let (item, reference) = normalize(part);
        self.dispatch(reference, item)
    }

    /// Route a WebSocket frame received for `reference`.
    pub fn dispatch_frame(&mut self, reference: &RequestRef, msg: Message) -> Applied {
        match decode_frame(msg) {
            Some(item) => self.dispatch(reference.clone(), item),
            None => {
                tracing::trace!(%reference, "ignoring frame outside exec vocabulary");
                Applied::Ignored
            }
        }
    }

    /// Feed a normalized item to its request.
    pub fn dispatch(&mut self, reference: RequestRef, item: Item) -> Applied {
        let Some(request) = self.requests.remove(&reference) else {
            tracing::debug!(%reference, kind = item.kind(), "event for unknown request");
            return Applied::Unknown;
        };
        self.apply(reference, request.apply_event(item))
    }

    /// Deliver whatever `reference` has buffered to `reply`.
    ///
    /// For an unknown reference the reply is dropped, so the caller sees a
    /// closed channel.
    pub fn pull(&mut self, reference: &RequestRef, reply: oneshot::Sender<Vec<Item>>) -> Applied {
        let Some(request) = self.requests.remove(reference) else {
            tracing::debug!(%reference, "pull for unknown request");
            return Applied::Unknown;
        };
        self.apply(reference.clone(), request.pull(reply))
    }

    /// The caller behind `reference` went away.
    pub fn caller_down(&mut self, reference: &RequestRef) -> Applied {
        match self.requests.remove(reference) {
            Some(request) => {
                request.abandon();
                Applied::Removed
            }
            None => Applied::Unknown,
        }
    }

    /// Discard every request, returning pooled connections.
    pub fn abandon_all(&mut self) {
        for (_, request) in self.requests.drain() {
            request.abandon();
        }
    }

    fn apply(&mut self, reference: RequestRef, outcome: Outcome) -> Applied {
        match outcome {
            Outcome::Remove => {
                tracing::debug!(%reference, "request removed");
                Applied::Removed
            }
            Outcome::Terminal(request) => {
                tracing::info!(%reference, "request closed by peer");
                self.requests.insert(reference.clone(), request);
                Applied::Terminal(reference)
            }
            Outcome::Continue(request) => {
                self.requests.insert(reference, request);
                Applied::Stored
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
