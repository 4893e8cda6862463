// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request state machine.
//!
//! A [`Request`] buffers normalized items as they arrive from the transport,
//! hands them to whatever [`Delivery`] target is installed, and decides when
//! the request is finished.
//!
//! ```text
//! Receiving ──close frame──▶ Closing ──drained──▶ Closed      (Outcome::Terminal)
//!     │
//!     └────────done────────▶ Terminating ──drained──▶ removed (Outcome::Remove)
//! ```
//!
//! Every operation consumes the request and returns an [`Outcome`] telling the
//! owning actor what to do with its registry entry.

use crate::delivery::{Delivery, Tagged};
use crate::id::{ConnId, RequestRef};
use crate::item::Item;
use crate::pool::PoolLease;
use crate::watch::LivenessWatch;
use http::{HeaderMap, StatusCode};
use std::fmt;
use tokio::sync::oneshot;

/// Lifecycle mode of a request. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Still receiving events
    Receiving,
    /// WebSocket close frame seen; draining the buffer
    Closing,
    /// HTTP done signal seen; draining the buffer
    Terminating,
    /// Closing finished; the adapter shuts down
    Closed,
}

crate::simple_display! {
    Mode {
        Receiving => "receiving",
        Closing => "closing",
        Terminating => "terminating",
        Closed => "closed",
    }
}

impl Mode {
    /// Mode after `item` arrives. Sticky once it has left `Receiving`.
    pub fn after(self, item: &Item) -> Mode {
        match (self, item) {
            (Mode::Receiving, Item::Close { .. }) => Mode::Closing,
            (Mode::Receiving, Item::Done) => Mode::Terminating,
            (mode, _) => mode,
        }
    }
}

/// Handshake state of an upgraded (WebSocket) connection.
#[derive(Debug, Clone, PartialEq)]
pub struct WebSocketState {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Subprotocol the server selected, if any
    pub protocol: Option<String>,
}

/// What the owning actor should do with a request after an operation.
#[must_use]
#[derive(Debug)]
pub enum Outcome {
    /// Finished. Drop the registry entry; the watch is cancelled and the
    /// connection checked in already.
    Remove,
    /// The WebSocket side closed cleanly. Store the snapshot, then shut the
    /// adapter down.
    Terminal(Request),
    /// Store the request and keep waiting for events.
    Continue(Request),
}

impl Outcome {
    pub fn is_remove(&self) -> bool {
        matches!(self, Outcome::Remove)
    }

    /// The request carried by `Terminal` or `Continue`.
    pub fn request(&self) -> Option<&Request> {
        match self {
            Outcome::Remove => None,
            Outcome::Terminal(request) | Outcome::Continue(request) => Some(request),
        }
    }

    pub fn into_request(self) -> Option<Request> {
        match self {
            Outcome::Remove => None,
            Outcome::Terminal(request) | Outcome::Continue(request) => Some(request),
        }
    }
}

/// One in-flight call on a connection.
pub struct Request {
    reference: RequestRef,
    conn: ConnId,
    delivery: Delivery,
    pool: Option<PoolLease>,
    watch: Option<Box<dyn LivenessWatch>>,
    websocket: Option<Box<WebSocketState>>,
    mode: Mode,
    buffer: Vec<Item>,
}

impl Request {
    /// Create a request in `Receiving` mode with nothing to deliver to.
    ///
    /// `watch` observes the caller; it is cancelled when the request is removed.
    pub fn new(reference: RequestRef, conn: ConnId, watch: Box<dyn LivenessWatch>) -> Self {
        Self {
            reference,
            conn,
            delivery: Delivery::None,
            pool: None,
            watch: Some(watch),
            websocket: None,
            mode: Mode::Receiving,
            buffer: Vec::new(),
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_pool(mut self, lease: PoolLease) -> Self {
        self.pool = Some(lease);
        self
    }

    pub fn with_websocket(mut self, state: WebSocketState) -> Self {
        self.websocket = Some(Box::new(state));
        self
    }

    pub fn reference(&self) -> &RequestRef {
        &self.reference
    }

    pub fn conn(&self) -> &ConnId {
        &self.conn
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Items received but not yet delivered, oldest first.
    pub fn buffered(&self) -> &[Item] {
        &self.buffer
    }

    pub fn pool(&self) -> Option<&PoolLease> {
        self.pool.as_ref()
    }

    pub fn websocket(&self) -> Option<&WebSocketState> {
        self.websocket.as_deref()
    }

    /// Feed one transport event into the request.
    pub fn apply_event(mut self, item: Item) -> Outcome {
        let next = self.mode.after(&item);
        if next != self.mode {
            tracing::debug!(
                reference = %self.reference,
                from = %self.mode,
                to = %next,
                trigger = item.kind(),
                "request mode changed"
            );
        }
        self.mode = next;
        self.buffer.push(item);
        self.attempt_delivery();
        self.settle()
    }

    /// Ask for whatever has arrived since the last delivery.
    ///
    /// Installs `reply` as the delivery target. If nothing is buffered the
    /// reply stays pending until the next event arrives.
    pub fn pull(mut self, reply: oneshot::Sender<Vec<Item>>) -> Outcome {
        if !self.delivery.is_none() {
            tracing::debug!(
                reference = %self.reference,
                replaced = %self.delivery,
                "pull replaces installed delivery target"
            );
        }
        self.delivery = Delivery::Reply(reply);
        self.attempt_delivery();
        self.settle()
    }

    /// Hand buffered items to the installed delivery target.
    ///
    /// A no-op when the buffer is empty or no target is installed. A reply
    /// target is completed once and then cleared; stream targets stay
    /// installed.
    pub fn attempt_delivery(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        match std::mem::take(&mut self.delivery) {
            Delivery::None => {}
            Delivery::Reply(tx) => {
                let items = std::mem::take(&mut self.buffer);
                let count = items.len();
                if tx.send(items).is_err() {
                    tracing::warn!(reference = %self.reference, count, "reply receiver dropped");
                }
            }
            Delivery::Tagged(tx, tag) => {
                for item in self.buffer.drain(..) {
                    if tx.send(Tagged { tag: tag.clone(), item }).is_err() {
                        tracing::debug!(reference = %self.reference, %tag, "tagged receiver dropped");
                    }
                }
                self.delivery = Delivery::Tagged(tx, tag);
            }
            Delivery::Raw(tx) => {
                for item in self.buffer.drain(..) {
                    if tx.send(item).is_err() {
                        tracing::debug!(reference = %self.reference, "stream receiver dropped");
                    }
                }
                self.delivery = Delivery::Raw(tx);
            }
        }
    }

    /// Discard a request whose caller went away.
    ///
    /// The watch already fired, so it is dropped rather than cancelled. A
    /// pooled connection is still returned.
    pub fn abandon(mut self) {
        tracing::info!(
            reference = %self.reference,
            mode = %self.mode,
            buffered = self.buffer.len(),
            "caller gone, discarding request"
        );
        self.watch = None;
        if let Some(lease) = self.pool.take() {
            lease.checkin(&self.conn);
        }
    }

    /// Drop a request that will never finish normally, such as one displaced
    /// by a duplicate reference. Cancels the watch and returns a pooled
    /// connection, as a normal finish would.
    pub fn discard(self) {
        tracing::info!(
            reference = %self.reference,
            mode = %self.mode,
            buffered = self.buffer.len(),
            "discarding request"
        );
        self.finish();
    }

    fn settle(mut self) -> Outcome {
        if !self.buffer.is_empty() {
            return Outcome::Continue(self);
        }
        match self.mode {
            Mode::Closing => {
                tracing::debug!(reference = %self.reference, "request drained after close");
                self.mode = Mode::Closed;
                Outcome::Terminal(self)
            }
            Mode::Terminating => {
                self.finish();
                Outcome::Remove
            }
            Mode::Receiving | Mode::Closed => Outcome::Continue(self),
        }
    }

    fn finish(mut self) {
        tracing::debug!(reference = %self.reference, "request finished");
        if let Some(watch) = self.watch.take() {
            watch.cancel();
        }
        if let Some(lease) = self.pool.take() {
            lease.checkin(&self.conn);
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("reference", &self.reference)
            .field("conn", &self.conn)
            .field("mode", &self.mode)
            .field("delivery", &format_args!("{}", self.delivery))
            .field("pool", &self.pool.as_ref().map(PoolLease::id))
            .field("websocket", &self.websocket.is_some())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
