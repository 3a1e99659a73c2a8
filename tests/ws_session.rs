mod support;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

async fn connect() -> Socket {
    connect_to(support::ensure_server()).await
}

async fn connect_to(url: &str) -> Socket {
    let (socket, _response) = connect_async(url).await.expect("websocket handshake");
    socket
}

// Next `{"state": ...}` frame, skipping control frames.
async fn next_state(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, socket.next())
            .await
            .expect("frame before timeout")
            .expect("socket open")
            .expect("valid frame");
        if msg.is_text() {
            let text = msg.into_text().expect("utf8 text");
            let value: Value = serde_json::from_str(&text).expect("json frame");
            return value;
        }
    }
}

fn players(frame: &Value) -> Vec<&Value> {
    frame["state"]
        .as_array()
        .expect("state rows")
        .iter()
        .flat_map(|row| row.as_array().expect("row cells").iter())
        .filter(|cell| cell["type"] == "player")
        .collect()
}

fn player_ids(frame: &Value) -> Vec<u64> {
    let mut ids: Vec<u64> = players(frame)
        .iter()
        .map(|p| p["playerId"].as_u64().expect("player id"))
        .collect();
    ids.sort_unstable();
    ids
}

// Frames keep coming until one shows at least `count` players.
async fn wait_for_players(socket: &mut Socket, count: usize) -> Value {
    for _ in 0..200 {
        let frame = next_state(socket).await;
        if players(&frame).len() >= count {
            return frame;
        }
    }
    panic!("never saw {count} players");
}

// Close frame code the server sent, ignoring state frames queued ahead of it.
async fn close_code(socket: &mut Socket) -> u16 {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, socket.next())
            .await
            .expect("close before timeout");
        match msg {
            Some(Ok(Message::Close(Some(frame)))) => return u16::from(frame.code),
            Some(Ok(_)) => continue,
            other => panic!("expected a close frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn state_frames_describe_the_field() {
    let mut socket = connect().await;
    let frame = wait_for_players(&mut socket, 1).await;

    let rows = frame["state"].as_array().expect("state rows");
    assert_eq!(rows.len(), support::FIELD_HEIGHT);
    for row in rows {
        let cells = row.as_array().expect("row cells");
        assert_eq!(cells.len(), support::FIELD_WIDTH);
        for cell in cells {
            let terrain = cell["terrain"].as_u64().expect("terrain");
            assert!(terrain <= 1);
        }
    }

    for player in players(&frame) {
        assert_eq!(player["terrain"], 0);
        assert!(player["playerId"].as_u64().expect("player id") >= 1);
        let direction = player["direction"].as_u64().expect("direction");
        assert!((1..=4).contains(&direction));
    }
}

#[tokio::test]
async fn commands_are_accepted_and_frames_continue() {
    let mut socket = connect().await;
    wait_for_players(&mut socket, 1).await;

    socket
        .send(Message::text(r#"{"action":"move","data":2}"#))
        .await
        .expect("send move");
    socket
        .send(Message::text(r#"{"action":"shoot"}"#))
        .await
        .expect("send shoot");

    // A few more ticks arrive on the same connection.
    for _ in 0..5 {
        next_state(&mut socket).await;
    }
}

#[tokio::test]
async fn two_clients_see_each_other() {
    // Own server, so no player from another test can show up.
    let server = support::start_private_server(support::open_field()).await;

    let mut first = connect_to(&server.url).await;
    let ids = player_ids(&wait_for_players(&mut first, 1).await);
    assert_eq!(ids.len(), 1, "only the first client is connected: {ids:?}");
    let first_id = ids[0];

    let mut second = connect_to(&server.url).await;
    let ids = player_ids(&wait_for_players(&mut second, 2).await);
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first_id));
    let second_id = ids
        .into_iter()
        .find(|&id| id != first_id)
        .expect("second client's id");

    // The first client learns about the second one from its own frames.
    for _ in 0..200 {
        let frame = next_state(&mut first).await;
        if player_ids(&frame).contains(&second_id) {
            let _ = server.stop.send(());
            return;
        }
    }
    panic!("first client never saw player {second_id}");
}

#[tokio::test]
async fn binary_frames_close_the_connection() {
    let mut socket = connect().await;
    next_state(&mut socket).await;

    socket
        .send(Message::binary(vec![1u8, 2, 3]))
        .await
        .expect("send binary");

    assert_eq!(close_code(&mut socket).await, 1003);
}

#[tokio::test]
async fn repeated_garbage_closes_the_connection() {
    let mut socket = connect().await;
    next_state(&mut socket).await;

    for _ in 0..11 {
        socket
            .send(Message::text("not json"))
            .await
            .expect("send garbage");
    }

    assert_eq!(close_code(&mut socket).await, 1008);
}
