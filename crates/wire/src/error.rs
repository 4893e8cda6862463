// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from encoding or decoding frames
#[derive(Debug, Error)]
pub enum WireError {
    /// The message has no encoding in the multiplexed protocol. Carries the
    /// rejected value as rendered JSON.
    #[error("unsupported message: {0}")]
    UnsupportedMessage(String),

    #[error("invalid status payload: {0}")]
    InvalidStatus(#[from] serde_json::Error),
}
