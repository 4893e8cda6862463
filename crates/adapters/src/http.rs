// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP connection actor.
//!
//! One task owns a connection's [`Registry`]. The transport feeds it response
//! parts, callers register requests and pull results, and caller watches
//! report callers that went away. All of it arrives over one command channel,
//! so the registry is never shared.

use crate::registry::{Applied, Registry};
use crate::watch::{watch_caller, CallerGuard};
use kx_core::{ConnId, Delivery, Item, PoolLease, Request, RequestRef};
use kx_wire::RawPart;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Errors from talking to a connection actor
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection {0} is closed")]
    Closed(ConnId),
    /// The request finished, or this pull was displaced by a later one
    #[error("request {0} is gone")]
    RequestGone(RequestRef),
}

#[derive(Debug)]
enum ConnCommand {
    Register(Request),
    Part(RawPart),
    Pull { reference: RequestRef, reply: oneshot::Sender<Vec<Item>> },
    CallerDown(RequestRef),
}

/// Cloneable handle to a running connection actor.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnId,
    tx: mpsc::Sender<ConnCommand>,
}

/// Spawn the actor for connection `id`.
///
/// The actor stops when every handle (and every outstanding caller watch) is
/// dropped, or when a request closes the connection from the peer side.
pub fn spawn_connection(id: ConnId) -> (ConnectionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(crate::env::channel_capacity());
    let actor = Connection { id: id.clone(), registry: Registry::new(), rx };
    let task = tokio::spawn(actor.run());
    (ConnectionHandle { id, tx }, task)
}

impl ConnectionHandle {
    pub fn id(&self) -> &ConnId {
        &self.id
    }

    /// Start a request on this connection.
    ///
    /// Installs a watch on the caller: dropping the returned guard discards
    /// the request and returns a pooled connection.
    pub async fn start(
        &self,
        delivery: Delivery,
        lease: Option<PoolLease>,
    ) -> Result<(RequestRef, CallerGuard), ConnectionError> {
        let reference = RequestRef::new();
        let (watch, guard) = {
            let tx = self.tx.clone();
            let reference = reference.clone();
            watch_caller(async move {
                let _ = tx.send(ConnCommand::CallerDown(reference)).await;
            })
        };
        let mut request =
            Request::new(reference.clone(), self.id.clone(), Box::new(watch)).with_delivery(delivery);
        if let Some(lease) = lease {
            request = request.with_pool(lease);
        }
        self.register(request).await?;
        Ok((reference, guard))
    }

    /// Register a request built by the caller.
    pub async fn register(&self, request: Request) -> Result<(), ConnectionError> {
        self.send(ConnCommand::Register(request)).await
    }

    /// Feed a response part from the transport.
    pub async fn feed(&self, part: RawPart) -> Result<(), ConnectionError> {
        self.send(ConnCommand::Part(part)).await
    }

    /// Wait for the items `reference` received since its last delivery.
    ///
    /// One pull per request waits at a time. A later pull displaces an
    /// earlier one still waiting, which then fails with `RequestGone` even
    /// though the request lives on.
    pub async fn pull(&self, reference: &RequestRef) -> Result<Vec<Item>, ConnectionError> {
        let (reply, rx) = oneshot::channel();
        self.send(ConnCommand::Pull { reference: reference.clone(), reply }).await?;
        rx.await.map_err(|_| ConnectionError::RequestGone(reference.clone()))
    }

    async fn send(&self, cmd: ConnCommand) -> Result<(), ConnectionError> {
        self.tx.send(cmd).await.map_err(|_| ConnectionError::Closed(self.id.clone()))
    }
}

struct Connection {
    id: ConnId,
    registry: Registry,
    rx: mpsc::Receiver<ConnCommand>,
}

impl Connection {
    async fn run(mut self) {
        tracing::debug!(conn = %self.id, "connection actor started");
        while let Some(cmd) = self.rx.recv().await {
            if let Applied::Terminal(reference) = self.handle(cmd) {
                tracing::info!(conn = %self.id, %reference, "peer closed, shutting connection down");
                break;
            }
        }
        if !self.registry.is_empty() {
            tracing::warn!(
                conn = %self.id,
                in_flight = self.registry.len(),
                "connection stopping with requests in flight"
            );
        }
        self.registry.abandon_all();
    }

    fn handle(&mut self, cmd: ConnCommand) -> Applied {
        match cmd {
            ConnCommand::Register(request) => {
                self.registry.insert(request);
                Applied::Stored
            }
            ConnCommand::Part(part) => self.registry.dispatch_part(part),
            ConnCommand::Pull { reference, reply } => self.registry.pull(&reference, reply),
            ConnCommand::CallerDown(reference) => self.registry.caller_down(&reference),
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
