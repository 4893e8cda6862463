// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outgoing messages on an exec/attach session.
//!
//! Callers that speak JSON (attach clients, scripted drivers) send one of:
//!
//! ```text
//! {"stdin": "ls -la\n"}
//! "close"
//! "exit"
//! {"close_with": {"code": 1000, "reason": "done"}}
//! ```
//!
//! Anything else is rejected with [`WireError::UnsupportedMessage`].

use crate::error::WireError;
use crate::frame::Channel;
use bytes::Bytes;
use serde::Deserialize;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// A message the caller sends to the remote process.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Stdin(Bytes),
    Close,
    Exit,
    CloseWith { code: u16, reason: String },
}

/// JSON shape of [`Outgoing`].
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ControlMessage {
    Stdin(String),
    Close,
    Exit,
    CloseWith { code: u16, reason: String },
}

impl TryFrom<&serde_json::Value> for Outgoing {
    type Error = WireError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let msg = ControlMessage::deserialize(value)
            .map_err(|_| WireError::UnsupportedMessage(value.to_string()))?;
        Ok(match msg {
            ControlMessage::Stdin(text) => Outgoing::Stdin(Bytes::from(text)),
            ControlMessage::Close => Outgoing::Close,
            ControlMessage::Exit => Outgoing::Exit,
            ControlMessage::CloseWith { code, reason } => Outgoing::CloseWith { code, reason },
        })
    }
}

/// Encode a message as a WebSocket frame.
///
/// Stdin goes out as a text frame even though every incoming channel frame
/// is binary; the remote side accepts both. Text frames must be UTF-8, so
/// stdin that is not falls back to a binary frame with the same bytes.
pub fn encode(msg: &Outgoing) -> Message {
    match msg {
        Outgoing::Stdin(data) => {
            let mut payload = Vec::with_capacity(data.len() + 1);
            payload.push(Channel::Stdin.as_byte());
            payload.extend_from_slice(data);
            match String::from_utf8(payload) {
                Ok(text) => Message::Text(text.into()),
                Err(e) => Message::Binary(Bytes::from(e.into_bytes())),
            }
        }
        Outgoing::Close | Outgoing::Exit => Message::Close(None),
        Outgoing::CloseWith { code, reason } => Message::Close(Some(CloseFrame {
            code: CloseCode::from(*code),
            reason: reason.clone().into(),
        })),
    }
}

/// Encode a JSON control message.
pub fn encode_value(value: &serde_json::Value) -> Result<Message, WireError> {
    Outgoing::try_from(value).map(|msg| encode(&msg))
}

#[cfg(test)]
#[path = "outgoing_tests.rs"]
mod tests;
