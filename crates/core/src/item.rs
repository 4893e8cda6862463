// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized response items.
//!
//! Every transport event a request buffers is one of these. HTTP responses
//! arrive as `Status`, `Headers`, zero or more `Data`, optional `Trailers`,
//! then `Done`. Multiplexed exec/attach sessions arrive as channel frames
//! (`Stdout`, `Stderr`, `ErrorChannel`) terminated by `Close`.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// A single normalized transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Response status line
    Status(StatusCode),
    /// Response headers
    Headers(HeaderMap),
    /// A chunk of the response body
    Data(Bytes),
    /// Trailing headers after the body
    Trailers(HeaderMap),
    /// Transport-level error for this request
    Error(String),
    /// HTTP completion signal
    Done,
    /// Remote process stdout (channel 1)
    Stdout(Bytes),
    /// Remote process stderr (channel 2)
    Stderr(Bytes),
    /// Remote error/status channel (channel 3)
    ErrorChannel(Bytes),
    /// WebSocket close frame
    Close { code: u16, reason: String },
}

impl Item {
    /// Short name of the item's type, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Status(_) => "status",
            Item::Headers(_) => "headers",
            Item::Data(_) => "data",
            Item::Trailers(_) => "trailers",
            Item::Error(_) => "error",
            Item::Done => "done",
            Item::Stdout(_) => "stdout",
            Item::Stderr(_) => "stderr",
            Item::ErrorChannel(_) => "error_channel",
            Item::Close { .. } => "close",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Item::Done)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Item::Close { .. })
    }
}
