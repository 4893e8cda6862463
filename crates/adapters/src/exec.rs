// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exec/attach session over an upgraded WebSocket.
//!
//! One task owns the socket and the session's request. Incoming channel
//! frames are decoded and fed to the request; outgoing messages from
//! [`ExecHandle`]s are encoded and written. The task ends when the request
//! reaches its terminal state, the socket ends, or the peer fails to answer
//! our close frame in time. Dropping every handle closes the session.

use crate::registry::{Applied, Registry};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use kx_core::{Item, Mode, Request, RequestRef};
use kx_wire::{encode, Outgoing, WireError};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Errors from an exec session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("exec session {0} has ended")]
    Ended(RequestRef),
    #[error("send failed: {0}")]
    Send(String),
}

#[derive(Debug)]
enum ExecCommand {
    Send { msg: Outgoing, reply: oneshot::Sender<Result<(), SessionError>> },
    Pull(oneshot::Sender<Vec<Item>>),
}

/// Cloneable handle for talking to a running exec session.
#[derive(Clone)]
pub struct ExecHandle {
    reference: RequestRef,
    tx: mpsc::Sender<ExecCommand>,
}

impl ExecHandle {
    pub fn reference(&self) -> &RequestRef {
        &self.reference
    }

    pub async fn send(&self, msg: Outgoing) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ExecCommand::Send { msg, reply })
            .await
            .map_err(|_| SessionError::Ended(self.reference.clone()))?;
        rx.await.map_err(|_| SessionError::Ended(self.reference.clone()))?
    }

    /// Send a JSON control message. Unsupported messages are rejected here,
    /// before anything reaches the session.
    pub async fn send_value(&self, value: &serde_json::Value) -> Result<(), SessionError> {
        let msg = Outgoing::try_from(value)?;
        self.send(msg).await
    }

    pub async fn stdin(&self, data: impl Into<Bytes>) -> Result<(), SessionError> {
        self.send(Outgoing::Stdin(data.into())).await
    }

    /// Start the close handshake.
    pub async fn close(&self) -> Result<(), SessionError> {
        self.send(Outgoing::Close).await
    }

    /// Wait for the items received since the last delivery.
    ///
    /// A later pull displaces one still waiting; the displaced call fails
    /// with `Ended`.
    pub async fn pull(&self) -> Result<Vec<Item>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ExecCommand::Pull(reply))
            .await
            .map_err(|_| SessionError::Ended(self.reference.clone()))?;
        rx.await.map_err(|_| SessionError::Ended(self.reference.clone()))
    }
}

/// A running exec session.
pub struct ExecSession {
    handle: ExecHandle,
    task: JoinHandle<Option<Request>>,
}

impl ExecSession {
    pub fn handle(&self) -> ExecHandle {
        self.handle.clone()
    }

    pub fn reference(&self) -> &RequestRef {
        &self.handle.reference
    }

    /// Wait for the session to end and return the request's final state.
    ///
    /// After a clean close the request is `Closed`. When the socket fails,
    /// ends early, or the peer never answers our close frame, the request
    /// comes back as it was: possibly still `Receiving` with items buffered,
    /// and with any pool lease not yet checked in. Dispose of it with
    /// [`Request::discard`].
    pub async fn finished(self) -> Option<Request> {
        let ExecSession { handle, task } = self;
        let result = task.await;
        drop(handle);
        match result {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "exec session task failed");
                None
            }
        }
    }
}

/// Run `request` over an upgraded socket.
pub fn spawn_exec<S>(ws: WebSocketStream<S>, request: Request) -> ExecSession
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let reference = request.reference().clone();
    let (tx, rx) = mpsc::channel(crate::env::channel_capacity());
    let (sink, stream) = ws.split();
    let mut registry = Registry::new();
    registry.insert(request);
    let actor = Exec {
        reference: reference.clone(),
        registry,
        sink,
        stream,
        rx,
        commands_open: true,
        close_deadline: None,
    };
    let task = tokio::spawn(actor.run());
    ExecSession { handle: ExecHandle { reference, tx }, task }
}

struct Exec<S> {
    reference: RequestRef,
    registry: Registry,
    sink: SplitSink<WebSocketStream<S>, Message>,
    stream: SplitStream<WebSocketStream<S>>,
    rx: mpsc::Receiver<ExecCommand>,
    commands_open: bool,
    close_deadline: Option<Instant>,
}

impl<S> Exec<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn run(mut self) -> Option<Request> {
        tracing::info!(reference = %self.reference, "exec session started");
        loop {
            let deadline = self.close_deadline;
            tokio::select! {
                cmd = self.rx.recv(), if self.commands_open => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd).await {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!(reference = %self.reference, "all handles dropped, closing");
                        self.commands_open = false;
                        if let Err(e) = self.write(Message::Close(None)).await {
                            tracing::debug!(reference = %self.reference, %e, "close on drop failed");
                            break;
                        }
                    }
                },
                frame = self.stream.next() => match frame {
                    Some(Ok(msg)) => match self.registry.dispatch_frame(&self.reference, msg) {
                        Applied::Terminal(_) | Applied::Removed | Applied::Unknown => break,
                        Applied::Stored | Applied::Ignored => {}
                    },
                    Some(Err(e)) => {
                        tracing::warn!(reference = %self.reference, error = %e, "exec socket error");
                        break;
                    }
                    None => {
                        tracing::debug!(reference = %self.reference, "exec socket ended");
                        break;
                    }
                },
                _ = close_timer(deadline) => {
                    tracing::warn!(reference = %self.reference, "peer did not answer close frame");
                    break;
                }
            }
        }

        // Flushes a close reply tungstenite may have queued; errors once the
        // handshake is already complete.
        if let Err(e) = self.sink.close().await {
            tracing::trace!(reference = %self.reference, %e, "exec socket close");
        }
        let request = self.registry.remove(&self.reference);
        if let Some(request) = request.as_ref().filter(|r| r.mode() != Mode::Closed) {
            tracing::warn!(
                reference = %self.reference,
                mode = %request.mode(),
                buffered = request.buffered().len(),
                pooled = request.pool().is_some(),
                "exec session ended without a clean close"
            );
        }
        tracing::info!(
            reference = %self.reference,
            mode = ?request.as_ref().map(Request::mode),
            "exec session ended"
        );
        request
    }

    /// Returns true when the session should stop.
    async fn handle_command(&mut self, cmd: ExecCommand) -> bool {
        match cmd {
            ExecCommand::Send { msg, reply } => {
                let result = self.write(encode(&msg)).await;
                let _ = reply.send(result);
                false
            }
            ExecCommand::Pull(reply) => matches!(
                self.registry.pull(&self.reference, reply),
                Applied::Terminal(_) | Applied::Removed | Applied::Unknown
            ),
        }
    }

    async fn write(&mut self, frame: Message) -> Result<(), SessionError> {
        let closing = frame.is_close();
        self.sink.send(frame).await.map_err(|e| SessionError::Send(e.to_string()))?;
        if closing && self.close_deadline.is_none() {
            self.close_deadline = Some(Instant::now() + crate::env::exec_close_timeout());
        }
        Ok(())
    }
}

async fn close_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
