// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use wl_client::MockService;
use wl_proto::RecordActivityTaskHeartbeatResponse;

#[tokio::test]
async fn buffers_and_flushes_latest_details() {
    let service = Arc::new(MockService::new());
    let token = CancellationToken::new();
    let (handle, join) = spawn_heartbeat_loop(
        service.clone(),
        TaskToken::from_string("ttk-1"),
        "w-1".into(),
        Duration::from_millis(50),
        token.clone(),
    );

    // Two records before the first flush: only the latest survives.
    handle.record(Payloads::single(&json!(1)).unwrap());
    handle.record(Payloads::single(&json!(2)).unwrap());
    tokio::time::sleep(Duration::from_millis(120)).await;

    let heartbeats = service.heartbeat_requests();
    assert_eq!(heartbeats.len(), 1);
    assert_eq!(heartbeats[0].details.decode_at::<i64>(0).unwrap(), 2);
    assert_eq!(heartbeats[0].identity, "w-1");

    token.cancel();
    join.await.unwrap();
}

#[tokio::test]
async fn idle_intervals_send_nothing() {
    let service = Arc::new(MockService::new());
    let token = CancellationToken::new();
    let (_handle, join) = spawn_heartbeat_loop(
        service.clone(),
        TaskToken::from_string("ttk-2"),
        "w-1".into(),
        Duration::from_millis(40),
        token.clone(),
    );
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(service.heartbeat_requests().is_empty());
    token.cancel();
    join.await.unwrap();
}

#[tokio::test]
async fn cancel_requested_fires_the_activity_token() {
    let service = Arc::new(MockService::new());
    service.on_heartbeat(|_req| RecordActivityTaskHeartbeatResponse { cancel_requested: true });
    let token = CancellationToken::new();
    let (handle, join) = spawn_heartbeat_loop(
        service.clone(),
        TaskToken::from_string("ttk-3"),
        "w-1".into(),
        Duration::from_millis(30),
        token.clone(),
    );
    handle.record(Payloads::new());
    join.await.unwrap();
    assert!(token.is_cancelled());
}
