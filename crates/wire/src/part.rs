// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use kx_core::{Item, RequestRef};

/// A response part as the HTTP transport yields it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPart {
    Status(RequestRef, StatusCode),
    Headers(RequestRef, HeaderMap),
    Data(RequestRef, Bytes),
    Trailers(RequestRef, HeaderMap),
    Error(RequestRef, String),
    Done(RequestRef),
}

impl RawPart {
    pub fn reference(&self) -> &RequestRef {
        match self {
            RawPart::Status(r, _)
            | RawPart::Headers(r, _)
            | RawPart::Data(r, _)
            | RawPart::Trailers(r, _)
            | RawPart::Error(r, _)
            | RawPart::Done(r) => r,
        }
    }
}

/// Split a raw part into its normalized item and the request it belongs to.
pub fn normalize(part: RawPart) -> (Item, RequestRef) {
    match part {
        RawPart::Status(r, status) => (Item::Status(status), r),
        RawPart::Headers(r, headers) => (Item::Headers(headers), r),
        RawPart::Data(r, data) => (Item::Data(data), r),
        RawPart::Trailers(r, headers) => (Item::Trailers(headers), r),
        RawPart::Error(r, reason) => (Item::Error(reason), r),
        RawPart::Done(r) => (Item::Done, r),
    }
}

#[cfg(test)]
#[path = "part_tests.rs"]
mod tests;
