// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP → WebSocket upgrade negotiation.
//!
//! After the upgrade request is written, the transport is polled until the
//! response is complete. Each poll yields a batch of parts; batches are merged
//! into one [`UpgradeResponse`]. Within a batch the last part of a kind wins;
//! across batches the value seen first is kept.

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use kx_core::{RequestRef, WebSocketState};
use kx_wire::RawPart;
use std::time::Duration;
use thiserror::Error;

/// Errors from the transport's receive primitive
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("receive timed out")]
    Timeout,
    #[error("connection closed")]
    Closed,
    #[error("transport error: {0}")]
    Io(String),
}

/// Errors from upgrade negotiation
#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("upgrade aborted: {0}")]
    Transport(#[from] TransportError),
    #[error("upgrade rejected (status {status:?}): {}", .reason.as_deref().unwrap_or("no reason"))]
    Rejected { status: Option<StatusCode>, reason: Option<String> },
}

/// Blocking receive on an established connection.
#[async_trait]
pub trait Transport: Send {
    /// Wait up to `timeout` for parts. An empty batch means nothing arrived.
    async fn receive(&mut self, timeout: Duration) -> Result<Vec<RawPart>, TransportError>;
}

/// Upgrade response accumulated across polls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpgradeResponse {
    pub status: Option<StatusCode>,
    pub headers: Option<HeaderMap>,
    pub data: Option<Bytes>,
    pub trailers: Option<HeaderMap>,
    pub error: Option<String>,
    pub done: bool,
}

impl UpgradeResponse {
    /// Collect one batch of parts for `reference`. Later parts overwrite earlier ones.
    pub fn from_parts(reference: &RequestRef, parts: Vec<RawPart>) -> Self {
        let mut batch = Self::default();
        for part in parts {
            if part.reference() != reference {
                tracing::trace!(%reference, other = %part.reference(), "skipping part for other request");
                continue;
            }
            match part {
                RawPart::Status(_, status) => batch.status = Some(status),
                RawPart::Headers(_, headers) => batch.headers = Some(headers),
                RawPart::Data(_, data) => batch.data = Some(data),
                RawPart::Trailers(_, trailers) => batch.trailers = Some(trailers),
                RawPart::Error(_, reason) => batch.error = Some(reason),
                RawPart::Done(_) => batch.done = true,
            }
        }
        batch
    }

    /// Merge a newer batch, keeping fields already set.
    pub fn merge(&mut self, newer: UpgradeResponse) {
        self.status = self.status.or(newer.status);
        self.headers = self.headers.take().or(newer.headers);
        self.data = self.data.take().or(newer.data);
        self.trailers = self.trailers.take().or(newer.trailers);
        self.error = self.error.take().or(newer.error);
        self.done = self.done || newer.done;
    }

    /// Accept the handshake: the server must have switched protocols.
    pub fn accept(self) -> Result<WebSocketState, UpgradeError> {
        match self.status {
            Some(status) if status == StatusCode::SWITCHING_PROTOCOLS => {
                let headers = self.headers.unwrap_or_default();
                let protocol = headers
                    .get(header::SEC_WEBSOCKET_PROTOCOL)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                Ok(WebSocketState { status, headers, protocol })
            }
            status => Err(UpgradeError::Rejected { status, reason: self.error }),
        }
    }
}

/// Poll `transport` until the upgrade response for `reference` is complete.
///
/// Each receive waits at most `timeout`; there is no overall deadline. A
/// receive error ends negotiation immediately.
pub async fn negotiate<T>(
    transport: &mut T,
    reference: &RequestRef,
    timeout: Duration,
) -> Result<UpgradeResponse, UpgradeError>
where
    T: Transport + ?Sized,
{
    let mut response = UpgradeResponse::default();
    let mut polls = 0u32;
    while !response.done {
        polls += 1;
        let parts = match transport.receive(timeout).await {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(%reference, polls, error = %e, "upgrade receive failed");
                return Err(e.into());
            }
        };
        tracing::trace!(%reference, polls, count = parts.len(), "upgrade parts received");
        response.merge(UpgradeResponse::from_parts(reference, parts));
    }
    tracing::debug!(%reference, polls, status = ?response.status, "upgrade response complete");
    Ok(response)
}

/// [`negotiate`] with the timeout from `KX_UPGRADE_RECV_TIMEOUT_MS`.
pub async fn negotiate_with_env<T>(
    transport: &mut T,
    reference: &RequestRef,
) -> Result<UpgradeResponse, UpgradeError>
where
    T: Transport + ?Sized,
{
    negotiate(transport, reference, crate::env::upgrade_recv_timeout()).await
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
