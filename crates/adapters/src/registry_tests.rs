// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bytes::Bytes;
use http::StatusCode;
use kx_core::test_support::pooled_request;
use kx_core::{Delivery, Mode};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

fn r(s: &str) -> RequestRef {
    RequestRef::from(s)
}

#[test]
fn http_parts_route_by_reference() {
    let mut registry = Registry::new();
    let (a, _, _) = pooled_request("ref-a");
    let (b, _, _) = pooled_request("ref-b");
    registry.insert(a);
    registry.insert(b);

    assert_eq!(registry.dispatch_part(RawPart::Status(r("ref-a"), StatusCode::OK)), Applied::Stored);
    assert_eq!(
        registry.dispatch_part(RawPart::Data(r("ref-b"), Bytes::from_static(b"x"))),
        Applied::Stored
    );

    assert_eq!(registry.get(&r("ref-a")).unwrap().buffered(), &[Item::Status(StatusCode::OK)]);
    assert_eq!(registry.get(&r("ref-b")).unwrap().buffered(), &[Item::Data(Bytes::from_static(b"x"))]);
}

#[test]
fn done_with_stream_target_removes_entry() {
    let mut registry = Registry::new();
    let (request, pool, watch) = pooled_request("ref-done");
    let (delivery, mut rx) = Delivery::raw();
    registry.insert(request.with_delivery(delivery));

    assert_eq!(registry.dispatch_part(RawPart::Done(r("ref-done"))), Applied::Removed);
    assert!(registry.is_empty());
    assert_eq!(rx.try_recv().unwrap(), Item::Done);
    assert_eq!(pool.checkins().len(), 1);
    assert_eq!(watch.cancel_count(), 1);
}

#[test]
fn pull_drains_terminating_request() {
    let mut registry = Registry::new();
    let (request, pool, _) = pooled_request("ref-pull");
    registry.insert(request);
    let _ = registry.dispatch_part(RawPart::Data(r("ref-pull"), Bytes::from_static(b"body")));
    assert_eq!(registry.dispatch_part(RawPart::Done(r("ref-pull"))), Applied::Stored);
    assert_eq!(registry.get(&r("ref-pull")).unwrap().mode(), Mode::Terminating);

    let (tx, mut rx) = oneshot::channel();
    assert_eq!(registry.pull(&r("ref-pull"), tx), Applied::Removed);
    assert_eq!(rx.try_recv().unwrap(), vec![Item::Data(Bytes::from_static(b"body")), Item::Done]);
    assert_eq!(pool.checkins().len(), 1);
    assert!(registry.is_empty());
}

#[test]
fn close_frame_stores_terminal_snapshot() {
    let mut registry = Registry::new();
    let (request, pool, _) = pooled_request("ref-ws");
    let (delivery, _rx) = Delivery::raw();
    registry.insert(request.with_delivery(delivery));

    let close = Message::Close(Some(CloseFrame { code: CloseCode::Normal, reason: "".into() }));
    assert_eq!(registry.dispatch_frame(&r("ref-ws"), close), Applied::Terminal(r("ref-ws")));
    assert_eq!(registry.get(&r("ref-ws")).unwrap().mode(), Mode::Closed);
    assert!(pool.checkins().is_empty());
}

#[test]
fn unmatched_frame_is_ignored() {
    let mut registry = Registry::new();
    let (request, _, _) = pooled_request("ref-ws");
    registry.insert(request);
    assert_eq!(registry.dispatch_frame(&r("ref-ws"), Message::Text("hi".into())), Applied::Ignored);
    assert!(registry.get(&r("ref-ws")).unwrap().buffered().is_empty());
}

#[test]
fn unknown_reference() {
    let mut registry = Registry::new();
    assert_eq!(registry.dispatch_part(RawPart::Done(r("ref-missing"))), Applied::Unknown);

    let (tx, mut rx) = oneshot::channel();
    assert_eq!(registry.pull(&r("ref-missing"), tx), Applied::Unknown);
    assert!(rx.try_recv().is_err());
    assert_eq!(registry.caller_down(&r("ref-missing")), Applied::Unknown);
}

#[test]
fn caller_down_returns_connection_once() {
    let mut registry = Registry::new();
    let (request, pool, watch) = pooled_request("ref-gone");
    registry.insert(request);

    assert_eq!(registry.caller_down(&r("ref-gone")), Applied::Removed);
    assert_eq!(registry.caller_down(&r("ref-gone")), Applied::Unknown);
    assert_eq!(pool.checkins().len(), 1);
    assert_eq!(watch.cancel_count(), 0);
}

#[test]
fn abandon_all_empties_registry() {
    let mut registry = Registry::new();
    let (a, pool_a, _) = pooled_request("ref-a");
    let (b, pool_b, _) = pooled_request("ref-b");
    registry.insert(a);
    registry.insert(b);
    assert_eq!(registry.len(), 2);

    registry.abandon_all();
    assert!(registry.is_empty());
    assert_eq!(pool_a.checkins().len() + pool_b.checkins().len(), 2);
}

#[test]
fn duplicate_reference_returns_displaced_connection() {
    let mut registry = Registry::new();
    let (first, first_pool, first_watch) = pooled_request("ref-dup");
    let (second, second_pool, second_watch) = pooled_request("ref-dup");
    registry.insert(first);
    registry.insert(second);

    assert_eq!(registry.len(), 1);
    assert_eq!(first_pool.checkins().len(), 1);
    assert_eq!(first_watch.cancel_count(), 1);

    assert_eq!(registry.dispatch_part(RawPart::Done(r("ref-dup"))), Applied::Stored);
    let (reply, _rx) = oneshot::channel();
    assert_eq!(registry.pull(&r("ref-dup"), reply), Applied::Removed);
    assert_eq!(second_pool.checkins().len(), 1);
    assert_eq!(second_watch.cancel_count(), 1);
    assert_eq!(first_pool.checkins().len(), 1);
}
