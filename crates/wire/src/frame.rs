// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bytes::Bytes;
use kx_core::Item;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

/// Logical channel of a multiplexed exec frame, identified by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    Stdin = 0,
    Stdout = 1,
    Stderr = 2,
    Error = 3,
}

kx_core::simple_display! {
    Channel {
        Stdin => "stdin",
        Stdout => "stdout",
        Stderr => "stderr",
        Error => "error",
    }
}

impl Channel {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Channel::Stdin),
            1 => Some(Channel::Stdout),
            2 => Some(Channel::Stderr),
            3 => Some(Channel::Error),
            _ => None,
        }
    }

    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Split a frame payload into its channel and the bytes after the discriminator.
pub fn split_channel(payload: &Bytes) -> Option<(Channel, Bytes)> {
    let channel = Channel::from_byte(*payload.first()?)?;
    Some((channel, payload.slice(1..)))
}

/// Decode an incoming WebSocket frame.
///
/// Returns `None` for frames outside the exec vocabulary (text, ping/pong,
/// unknown or stdin discriminators); the caller decides whether to ignore them.
pub fn decode_frame(msg: Message) -> Option<Item> {
    match msg {
        Message::Close(Some(frame)) => Some(Item::Close {
            code: u16::from(frame.code),
            reason: frame.reason.as_str().to_owned(),
        }),
        Message::Close(None) => {
            Some(Item::Close { code: u16::from(CloseCode::Status), reason: String::new() })
        }
        Message::Binary(data) => match split_channel(&data)? {
            (Channel::Stdout, payload) => Some(Item::Stdout(payload)),
            (Channel::Stderr, payload) => Some(Item::Stderr(payload)),
            (Channel::Error, payload) => Some(Item::ErrorChannel(payload)),
            (Channel::Stdin, _) => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
