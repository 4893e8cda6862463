// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted transport for upgrade negotiation tests.

use crate::upgrade::{Transport, TransportError};
use async_trait::async_trait;
use kx_wire::RawPart;
use std::collections::VecDeque;
use std::time::Duration;

/// Transport that replays a fixed script of receive results.
///
/// Once the script runs out every receive fails with `Closed`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Result<Vec<RawPart>, TransportError>>,
    timeouts: Vec<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch of parts.
    pub fn then_parts(mut self, parts: Vec<RawPart>) -> Self {
        self.script.push_back(Ok(parts));
        self
    }

    /// Queue a receive error.
    pub fn then_error(mut self, error: TransportError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    /// Timeouts passed to each receive, in call order.
    pub fn timeouts(&self) -> &[Duration] {
        &self.timeouts
    }

    pub fn receives(&self) -> usize {
        self.timeouts.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn receive(&mut self, timeout: Duration) -> Result<Vec<RawPart>, TransportError> {
        self.timeouts.push(timeout);
        self.script.pop_front().unwrap_or(Err(TransportError::Closed))
    }
}
