// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection specs
//!
//! Several requests share one HTTP connection and one tagged receiver.

use crate::prelude::*;

#[tokio::test]
async fn list_completes_while_watch_keeps_streaming() {
    let (conn, _task) = spawn_connection(ConnId::from("conn-api"));
    let (pool, mut checkins) = ChannelPool::new();
    let (list_delivery, mut events) = Delivery::tagged(StreamTag::from("tag-list"));
    let shared = match &list_delivery {
        Delivery::Tagged(tx, _) => tx.clone(),
        _ => unreachable!(),
    };

    let (list, _list_guard) = conn
        .start(list_delivery, Some(pool.lease(PoolId::from("pool-api"))))
        .await
        .unwrap();
    let (watch, _watch_guard) = conn
        .start(
            Delivery::Tagged(shared, StreamTag::from("tag-watch")),
            Some(pool.lease(PoolId::from("pool-api"))),
        )
        .await
        .unwrap();

    conn.feed(RawPart::Data(watch.clone(), Bytes::from_static(b"ADDED"))).await.unwrap();
    conn.feed(RawPart::Data(list.clone(), Bytes::from_static(b"{\"items\":[]}"))).await.unwrap();
    conn.feed(RawPart::Done(list.clone())).await.unwrap();
    conn.feed(RawPart::Data(watch.clone(), Bytes::from_static(b"MODIFIED"))).await.unwrap();

    let seen: Vec<Tagged> = vec![
        recv(&mut events).await,
        recv(&mut events).await,
        recv(&mut events).await,
        recv(&mut events).await,
    ];
    let tags: Vec<&str> = seen.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, ["tag-watch", "tag-list", "tag-list", "tag-watch"]);
    assert_eq!(seen[2].item, Item::Done);

    // Only the finished list hands its connection back.
    assert_eq!(
        recv(&mut checkins).await,
        Checkin { pool: PoolId::from("pool-api"), conn: ConnId::from("conn-api") }
    );
    assert!(checkins.try_recv().is_err());
    assert!(conn.pull(&list).await.is_err());
}

#[tokio::test]
async fn abandoned_watch_returns_its_connection() {
    let (conn, _task) = spawn_connection(ConnId::from("conn-watch"));
    let (pool, mut checkins) = ChannelPool::new();
    let (watch, guard) =
        conn.start(Delivery::None, Some(pool.lease(PoolId::from("pool-api")))).await.unwrap();

    conn.feed(RawPart::Status(watch.clone(), http::StatusCode::OK)).await.unwrap();
    drop(guard);

    assert_eq!(recv(&mut checkins).await.conn, ConnId::from("conn-watch"));
}
