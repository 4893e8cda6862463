// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit status carried on the error channel.
//!
//! When the remote process exits, the API server writes a `meta/v1 Status`
//! object to channel 3. A non-zero exit is reported as reason
//! `NonZeroExitCode` with an `ExitCode` cause whose message is the code.

use crate::error::WireError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;

/// How a remote exec process finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Code(i32),
    /// Exec failed before or without producing an exit code
    Failure { reason: Option<String>, message: String },
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    /// Process exit code, when one is known.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Code(code) => Some(*code),
            ExitStatus::Failure { .. } => None,
        }
    }
}

/// Parse an error channel payload.
pub fn exit_status(payload: &[u8]) -> Result<ExitStatus, WireError> {
    let status: Status = serde_json::from_slice(payload)?;
    if status.status.as_deref() == Some("Success") {
        return Ok(ExitStatus::Success);
    }

    if status.reason.as_deref() == Some("NonZeroExitCode") {
        let code = status
            .details
            .as_ref()
            .and_then(|d| d.causes.as_ref())
            .and_then(|causes| causes.iter().find(|c| c.reason.as_deref() == Some("ExitCode")))
            .and_then(|c| c.message.as_deref())
            .and_then(|m| m.trim().parse::<i32>().ok());
        if let Some(code) = code {
            return Ok(ExitStatus::Code(code));
        }
        tracing::debug!(?status, "NonZeroExitCode without a parseable ExitCode cause");
    }

    Ok(ExitStatus::Failure { reason: status.reason, message: status.message.unwrap_or_default() })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
