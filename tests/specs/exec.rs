// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exec specs
//!
//! Upgrade a real TCP connection, run an interactive exec against an
//! in-process server speaking the channel protocol, and read the exit code.

use crate::prelude::*;
use futures_util::{SinkExt, StreamExt};
use http::header::SEC_WEBSOCKET_PROTOCOL;
use http::HeaderValue;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request as HsRequest, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

const PROTOCOL: &str = "v4.channel.k8s.io";

const EXIT_3: &str = r#"{"metadata":{},"status":"Failure","message":"command terminated with non-zero exit code: exit code 3","reason":"NonZeroExitCode","details":{"causes":[{"reason":"ExitCode","message":"3"}]}}"#;

fn channel(n: u8, payload: &[u8]) -> Message {
    let mut data = vec![n];
    data.extend_from_slice(payload);
    Message::Binary(Bytes::from(data))
}

/// Serve one exec: prompt, echo one stdin line, exit 3.
async fn serve_exec(listener: TcpListener) {
    let (tcp, _) = listener.accept().await.unwrap();
    let select_protocol = |_: &HsRequest, mut resp: Response| -> Result<Response, ErrorResponse> {
        resp.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(PROTOCOL));
        Ok(resp)
    };
    let mut ws = tokio_tungstenite::accept_hdr_async(tcp, select_protocol).await.unwrap();

    ws.send(channel(1, b"$ ")).await.unwrap();
    let line = match ws.next().await.unwrap().unwrap() {
        Message::Text(text) => text.as_str().strip_prefix('\0').unwrap().to_owned(),
        other => panic!("expected stdin text frame, got {:?}", other),
    };
    ws.send(channel(1, line.as_bytes())).await.unwrap();
    ws.send(channel(3, EXIT_3.as_bytes())).await.unwrap();
    ws.send(Message::Close(Some(CloseFrame { code: CloseCode::Normal, reason: "".into() })))
        .await
        .unwrap();
    while let Some(Ok(_)) = ws.next().await {}
}

/// Client handshake, then run the HTTP side of it through the negotiator.
async fn upgrade(
    addr: std::net::SocketAddr,
    reference: &RequestRef,
) -> (WebSocketStream<TcpStream>, kx_core::WebSocketState) {
    let mut req = format!("ws://{addr}/api/v1/namespaces/default/pods/web/exec")
        .into_client_request()
        .unwrap();
    req.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(PROTOCOL));
    let tcp = TcpStream::connect(addr).await.unwrap();
    let (ws, resp) = tokio_tungstenite::client_async(req, tcp).await.unwrap();

    let mut transport = ScriptedTransport::new()
        .then_parts(vec![RawPart::Status(reference.clone(), resp.status())])
        .then_parts(vec![
            RawPart::Headers(reference.clone(), resp.headers().clone()),
            RawPart::Done(reference.clone()),
        ]);
    let response =
        kx_adapters::negotiate(&mut transport, reference, SPEC_WAIT).await.unwrap();
    (ws, response.accept().unwrap())
}

#[tokio::test]
async fn interactive_exec_reports_exit_code() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_exec(listener));

    let reference = RequestRef::new();
    let (ws, state) = upgrade(addr, &reference).await;
    assert_eq!(state.protocol.as_deref(), Some(PROTOCOL));

    let (watch, _guard) = kx_adapters::watch_caller(async {});
    let (delivery, mut items) = Delivery::raw();
    let request = Request::new(reference, ConnId::new(), Box::new(watch))
        .with_delivery(delivery)
        .with_websocket(state);
    let session = spawn_exec(ws, request);
    let handle = session.handle();

    assert_eq!(recv(&mut items).await, Item::Stdout(Bytes::from_static(b"$ ")));
    handle.stdin("echo hi\n").await.unwrap();
    assert_eq!(recv(&mut items).await, Item::Stdout(Bytes::from_static(b"echo hi\n")));

    let status = match recv(&mut items).await {
        Item::ErrorChannel(payload) => exit_status(&payload).unwrap(),
        other => panic!("expected error channel, got {:?}", other),
    };
    assert_eq!(status, ExitStatus::Code(3));
    assert_eq!(recv(&mut items).await, Item::Close { code: 1000, reason: String::new() });

    let finished = tokio::time::timeout(SPEC_WAIT, session.finished()).await.unwrap().unwrap();
    assert_eq!(finished.mode(), Mode::Closed);
    assert_eq!(finished.websocket().and_then(|ws| ws.protocol.as_deref()), Some(PROTOCOL));

    tokio::time::timeout(SPEC_WAIT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn rejected_upgrade_never_opens_a_session() {
    let reference = RequestRef::new();
    let mut transport = ScriptedTransport::new().then_parts(vec![
        RawPart::Status(reference.clone(), http::StatusCode::FORBIDDEN),
        RawPart::Error(reference.clone(), "pods \"web\" is forbidden".to_string()),
        RawPart::Done(reference.clone()),
    ]);

    let response = kx_adapters::negotiate(&mut transport, &reference, SPEC_WAIT).await.unwrap();
    match response.accept() {
        Err(kx_adapters::UpgradeError::Rejected { status, reason }) => {
            assert_eq!(status, Some(http::StatusCode::FORBIDDEN));
            assert!(reason.unwrap().contains("forbidden"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}
