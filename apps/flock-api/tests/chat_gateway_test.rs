mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time;

use flock_api::models::user::UserRole;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Helper: open a live channel. `query` includes the leading `?` (or is empty).
async fn connect_gateway(addr: SocketAddr, query: &str) -> WsStream {
    let url = format!("ws://{addr}/gateway{query}");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    // Give the server a moment to attach the connection before posting.
    time::sleep(Duration::from_millis(100)).await;
    ws
}

/// Helper: read the next text frame as JSON, with a timeout.
async fn next_json(ws: &mut WsStream) -> serde_json::Value {
    let msg = time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout waiting for push")
        .expect("stream ended")
        .expect("ws read error");
    let text = msg.into_text().expect("not text");
    serde_json::from_str(&text).expect("parse push")
}

/// Helper: POST a message over REST, assert 201, return the response body.
async fn post_message(
    addr: SocketAddr,
    token: &str,
    group_id: i64,
    content: &str,
) -> serde_json::Value {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/v1/messages"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "group_id": group_id, "content": content }))
        .send()
        .await
        .expect("post message");
    assert_eq!(resp.status(), 201);
    resp.json().await.expect("parse post response")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn both_group_sockets_receive_one_push_each() {
    let (state, backend) = common::test_state();
    let seeded = common::seed_org(&backend);
    let addr = common::start_ws_server(state).await;

    let query = format!("?group_id={}", seeded.group);
    let mut a = connect_gateway(addr, &query).await;
    let mut b = connect_gateway(addr, &query).await;

    let token = common::token_for(seeded.leader, UserRole::GroupLeader, Some(seeded.branch));
    let body = post_message(addr, &token, seeded.group, "Hello").await;
    let id = body["id"].as_i64().expect("assigned id");

    // The sender's own socket gets the broadcast too.
    for ws in [&mut a, &mut b] {
        let event = next_json(ws).await;
        assert_eq!(event["type"], "NEW_MESSAGE");
        assert_eq!(event["message"]["id"], id);
        assert_eq!(event["message"]["group_id"], seeded.group);
        assert_eq!(event["message"]["sender_id"], seeded.leader);
        assert_eq!(event["message"]["sender_name"], "Jane Smith");
        assert_eq!(event["message"]["content"], "Hello");
        assert!(event["message"]["timestamp"].is_string());
    }
}

#[tokio::test]
async fn pushes_arrive_in_post_order() {
    let (state, backend) = common::test_state();
    let seeded = common::seed_org(&backend);
    let addr = common::start_ws_server(state).await;

    let mut ws = connect_gateway(addr, &format!("?group_id={}", seeded.group)).await;
    let token = common::token_for(seeded.leader, UserRole::GroupLeader, Some(seeded.branch));

    let mut ids = Vec::new();
    for n in 1..=3 {
        let body = post_message(addr, &token, seeded.group, &format!("message {n}")).await;
        ids.push(body["id"].as_i64().unwrap());
    }

    for expected in ids {
        let event = next_json(&mut ws).await;
        assert_eq!(event["message"]["id"], expected);
    }
}

#[tokio::test]
async fn socket_without_group_param_receives_nothing() {
    let (state, backend) = common::test_state();
    let seeded = common::seed_org(&backend);
    let addr = common::start_ws_server(state).await;

    // Missing and non-numeric group ids: accepted, never attached.
    let mut silent = connect_gateway(addr, "").await;
    let mut garbled = connect_gateway(addr, "?group_id=abc").await;

    let token = common::token_for(seeded.leader, UserRole::GroupLeader, Some(seeded.branch));
    post_message(addr, &token, seeded.group, "Hello").await;

    for ws in [&mut silent, &mut garbled] {
        let outcome = time::timeout(Duration::from_millis(300), ws.next()).await;
        assert!(outcome.is_err(), "unattached socket must receive nothing");
    }

    // The message still landed in history.
    let client = reqwest::Client::new();
    let detail: serde_json::Value = client
        .get(format!("http://{addr}/api/v1/groups/{}", seeded.group))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("group detail")
        .json()
        .await
        .expect("parse detail");
    assert_eq!(detail["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dropped_socket_does_not_break_delivery_to_the_rest() {
    let (state, backend) = common::test_state();
    let seeded = common::seed_org(&backend);
    let addr = common::start_ws_server(state).await;

    let query = format!("?group_id={}", seeded.group);
    let mut survivor = connect_gateway(addr, &query).await;
    let casualty = connect_gateway(addr, &query).await;

    // Drop the connection without a close handshake.
    drop(casualty);
    time::sleep(Duration::from_millis(100)).await;

    let token = common::token_for(seeded.leader, UserRole::GroupLeader, Some(seeded.branch));
    let body = post_message(addr, &token, seeded.group, "Still here").await;

    let event = next_json(&mut survivor).await;
    assert_eq!(event["message"]["id"], body["id"].as_i64().unwrap());
    assert_eq!(event["message"]["content"], "Still here");
}

#[tokio::test]
async fn pushes_never_cross_group_boundaries() {
    let (state, backend) = common::test_state();
    let seeded = common::seed_org(&backend);
    let addr = common::start_ws_server(state).await;

    let mut in_group = connect_gateway(addr, &format!("?group_id={}", seeded.group)).await;
    let mut elsewhere = connect_gateway(addr, &format!("?group_id={}", seeded.other_group)).await;

    let token = common::token_for(seeded.leader, UserRole::GroupLeader, Some(seeded.branch));
    post_message(addr, &token, seeded.group, "Worship only").await;

    let event = next_json(&mut in_group).await;
    assert_eq!(event["message"]["content"], "Worship only");

    let outcome = time::timeout(Duration::from_millis(300), elsewhere.next()).await;
    assert!(outcome.is_err(), "other group's socket must stay silent");
}
