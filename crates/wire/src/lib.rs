// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame codec for streamed cluster API calls.
//!
//! - HTTP response parts are normalized into `(Item, RequestRef)` pairs.
//! - Exec/attach WebSocket frames carry a one-byte channel discriminator
//!   followed by the payload: `0` stdin, `1` stdout, `2` stderr, `3` error.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod frame;
mod outgoing;
mod part;
mod status;

pub use error::WireError;
pub use frame::{decode_frame, split_channel, Channel};
pub use outgoing::{encode, encode_value, Outgoing};
pub use part::{normalize, RawPart};
pub use status::{exit_status, ExitStatus};
