use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use secret_draw::{router, AppState};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::new())).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, query: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws?{query}")).await.unwrap();
    ws
}

/// Next JSON text frame, or `None` once the server closed the socket.
async fn next_json(ws: &mut Client) -> Option<Value> {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame");
        match frame {
            Some(Ok(Message::Text(text))) => return Some(serde_json::from_str(&text).unwrap()),
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

async fn start_game(ws: &mut Client) {
    ws.send(Message::Text(json!({ "type": "start-game" }).to_string())).await.unwrap();
}

#[tokio::test]
async fn alice_and_bob_draw_each_other() {
    let addr = spawn_server().await;

    let mut alice = connect(addr, "room=X42&name=Alice&avatar=elf&action=create").await;
    assert_eq!(
        next_json(&mut alice).await.unwrap(),
        json!({ "type": "participant-list-update", "payload": [
            { "name": "Alice", "avatar": "elf", "isHost": true }
        ]})
    );

    let mut bob = connect(addr, "room=X42&name=Bob&action=join").await;
    let expected = json!({ "type": "participant-list-update", "payload": [
        { "name": "Alice", "avatar": "elf", "isHost": true },
        { "name": "Bob", "avatar": "", "isHost": false }
    ]});
    assert_eq!(next_json(&mut bob).await.unwrap(), expected);
    assert_eq!(next_json(&mut alice).await.unwrap(), expected);

    start_game(&mut alice).await;
    assert_eq!(next_json(&mut alice).await.unwrap(), json!({ "type": "match-result", "payload": "Bob" }));
    assert_eq!(next_json(&mut bob).await.unwrap(), json!({ "type": "match-result", "payload": "Alice" }));
}

#[tokio::test]
async fn refused_connections_get_an_error_then_close() {
    let addr = spawn_server().await;
    let mut alice = connect(addr, "room=R1&name=Alice&action=create").await;
    next_json(&mut alice).await.unwrap();

    let mut dup = connect(addr, "room=R1&name=Mallory&action=create").await;
    assert_eq!(next_json(&mut dup).await.unwrap(), json!({ "type": "error", "payload": "Room already exists" }));
    assert!(next_json(&mut dup).await.is_none());

    let mut lost = connect(addr, "room=nowhere&name=Bob&action=join").await;
    assert_eq!(next_json(&mut lost).await.unwrap(), json!({ "type": "error", "payload": "Room does not exist" }));
    assert!(next_json(&mut lost).await.is_none());

    let mut bob = connect(addr, "room=R1&name=Bob&action=join").await;
    next_json(&mut bob).await.unwrap();
    next_json(&mut alice).await.unwrap();
    start_game(&mut alice).await;
    next_json(&mut alice).await.unwrap();

    let mut late = connect(addr, "room=R1&name=Carol&action=join").await;
    assert_eq!(next_json(&mut late).await.unwrap(), json!({ "type": "error", "payload": "Game already started" }));
    assert!(next_json(&mut late).await.is_none());
}

#[tokio::test]
async fn missing_parameters_are_rejected_before_upgrade() {
    let addr = spawn_server().await;
    for query in ["room=X42&action=create", "name=Alice&action=create", "room=X42&name=Alice&action=watch"] {
        match connect_async(format!("ws://{addr}/ws?{query}")).await {
            Err(tungstenite::Error::Http(response)) => assert_eq!(response.status().as_u16(), 400),
            other => panic!("expected HTTP 400 for {query}, got {:?}", other.map(|_| ())),
        }
    }
}

#[tokio::test]
async fn lone_host_start_sends_nothing() {
    let addr = spawn_server().await;
    let mut alice = connect(addr, "room=solo&name=Alice&action=create").await;
    next_json(&mut alice).await.unwrap();

    start_game(&mut alice).await;
    ws_silent(&mut alice).await;

    // the room is still open for joiners
    let mut bob = connect(addr, "room=solo&name=Bob&action=join").await;
    assert_eq!(next_json(&mut bob).await.unwrap()["type"], "participant-list-update");
}

#[tokio::test]
async fn host_leaving_promotes_next_and_last_leave_frees_id() {
    let addr = spawn_server().await;
    let mut alice = connect(addr, "room=H1&name=Alice&action=create").await;
    next_json(&mut alice).await.unwrap();
    let mut bob = connect(addr, "room=H1&name=Bob&action=join").await;
    next_json(&mut bob).await.unwrap();

    alice.close(None).await.unwrap();
    assert_eq!(
        next_json(&mut bob).await.unwrap(),
        json!({ "type": "participant-list-update", "payload": [
            { "name": "Bob", "avatar": "", "isHost": true }
        ]})
    );

    bob.close(None).await.unwrap();
    // leaving is processed asynchronously after the close frame; retry briefly
    for _ in 0..50 {
        let mut again = connect(addr, "room=H1&name=Carol&action=create").await;
        let first = next_json(&mut again).await.unwrap();
        if first["type"] == "participant-list-update" {
            assert_eq!(first["payload"][0]["isHost"], true);
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("room id was never freed");
}

#[tokio::test]
async fn junk_frames_are_ignored() {
    let addr = spawn_server().await;
    let mut alice = connect(addr, "room=J1&name=Alice&action=create").await;
    next_json(&mut alice).await.unwrap();
    let mut bob = connect(addr, "room=J1&name=Bob&action=join").await;
    next_json(&mut bob).await.unwrap();
    next_json(&mut alice).await.unwrap();

    alice.send(Message::Text("not json".into())).await.unwrap();
    alice.send(Message::Text(json!({ "type": "reveal-all" }).to_string())).await.unwrap();
    alice.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
    // a non-host start is ignored too
    start_game(&mut bob).await;
    ws_silent(&mut bob).await;

    start_game(&mut alice).await;
    assert_eq!(next_json(&mut alice).await.unwrap()["type"], "match-result");
}

async fn ws_silent(ws: &mut Client) {
    let quiet = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(quiet.is_err(), "expected no message, got {quiet:?}");
}
