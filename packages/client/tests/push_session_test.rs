//! Integration tests for the WebSocket push transport.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - `/ws` のイベント契約（connectedUsers / userJoined / userLeft /
//!   message / userTyping / error）を複数接続で検証する
//!
//! ### なぜこのテストが必要か
//! - ブロードキャストの対象選定（本人除外、ルーム分離）はユニット
//!   テストでも検証済みだが、ここでは実際のソケット越しに確認する
//!
//! ### どのような状況を想定しているか
//! - ルータをエフェメラルポートで serve し、tokio-tungstenite で接続

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use irori_server::{
    domain::ChatAuthority,
    infrastructure::{authority::InMemoryChatAuthority, pusher::WebSocketMessagePusher},
    ui::{Server, build_router},
    usecase::{
        FetchUpdatesUseCase, JoinParticipantUseCase, LeaveParticipantUseCase, SendMessageUseCase,
        SetTypingUseCase,
    },
};
use irori_shared::time::SystemClock;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Serve a fully wired router on an ephemeral port; returns the ws URL
async fn spawn_server() -> String {
    let clock = Arc::new(SystemClock);
    let authority: Arc<dyn ChatAuthority> = Arc::new(InMemoryChatAuthority::new(clock.clone()));
    let pusher = Arc::new(WebSocketMessagePusher::new());

    let server = Server::new(
        Arc::new(JoinParticipantUseCase::new(
            authority.clone(),
            pusher.clone(),
        )),
        Arc::new(LeaveParticipantUseCase::new(
            authority.clone(),
            pusher.clone(),
        )),
        Arc::new(SendMessageUseCase::new(
            authority.clone(),
            pusher.clone(),
            clock.clone(),
        )),
        Arc::new(SetTypingUseCase::new(authority.clone(), pusher.clone())),
        Arc::new(FetchUpdatesUseCase::new(authority.clone(), clock)),
        authority,
    );
    let app = build_router(server.into_state(Duration::from_secs(120)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("ws://{}/ws", addr)
}

/// One connected test peer
struct Peer {
    stream: WsStream,
}

impl Peer {
    async fn connect(url: &str) -> Self {
        let (stream, _) = connect_async(url).await.unwrap();
        Self { stream }
    }

    async fn send(&mut self, event: Value) {
        self.stream
            .send(Message::Text(event.to_string().into()))
            .await
            .unwrap();
    }

    /// Join and return the roster snapshot event
    async fn join(&mut self, name: &str, room: Option<&str>) -> Value {
        let mut event = json!({ "type": "join", "displayName": name });
        if let Some(room) = room {
            event["room"] = json!(room);
        }
        self.send(event).await;
        let snapshot = self.next_event().await;
        assert_eq!(snapshot["type"], json!("connectedUsers"));
        assert!(
            snapshot["selfId"].as_str().is_some_and(|id| !id.is_empty()),
            "snapshot must disclose the assigned connection id"
        );
        snapshot
    }

    /// Read the next text event, failing the test after 2 seconds
    async fn next_event(&mut self) -> Value {
        let message = tokio::time::timeout(Duration::from_secs(2), self.stream.next())
            .await
            .expect("timed out waiting for an event")
            .expect("connection closed")
            .expect("read error");
        match message {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    /// Assert that no event arrives within the given window
    async fn expect_silence(&mut self, window: Duration) {
        let result = tokio::time::timeout(window, self.stream.next()).await;
        assert!(result.is_err(), "expected silence, got {:?}", result);
    }
}

fn roster_names(snapshot: &Value) -> Vec<String> {
    snapshot["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_join_snapshot_and_join_broadcast() {
    // テスト項目: join 本人にスナップショット、既存参加者に userJoined
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    let snapshot = alice.join("alice", None).await;
    assert_eq!(roster_names(&snapshot), vec!["alice"]);

    // when (操作): 2 人目が join
    let mut bob = Peer::connect(&url).await;
    let snapshot = bob.join("bob", None).await;

    // then (期待する結果):
    let mut names = roster_names(&snapshot);
    names.sort();
    assert_eq!(names, vec!["alice", "bob"]);

    let joined = alice.next_event().await;
    assert_eq!(joined["type"], json!("userJoined"));
    assert_eq!(joined["name"], json!("bob"));
}

#[tokio::test]
async fn test_message_is_broadcast_to_whole_room_including_sender() {
    // テスト項目: メッセージが送信者を含むルーム全員に配信される
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", None).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", None).await;
    let _ = alice.next_event().await; // bob の userJoined

    // when (操作):
    alice.send(json!({ "type": "message", "text": "hi" })).await;

    // then (期待する結果): 双方が同じメッセージを受け取る
    let to_alice = alice.next_event().await;
    let to_bob = bob.next_event().await;
    for event in [&to_alice, &to_bob] {
        assert_eq!(event["type"], json!("message"));
        assert_eq!(event["text"], json!("hi"));
        assert_eq!(event["user"], json!("alice"));
        assert_eq!(event["system"], json!(false));
    }
    assert_eq!(to_alice["id"], to_bob["id"]);
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    // テスト項目: 別ルームの接続にはメッセージも join も届かない
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", Some("general")).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", Some("random")).await;

    // when (操作):
    alice.send(json!({ "type": "message", "text": "hi" })).await;

    // then (期待する結果): alice には届き、bob には何も届かない
    let to_alice = alice.next_event().await;
    assert_eq!(to_alice["type"], json!("message"));
    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_typing_indicator_excludes_sender() {
    // テスト項目: タイピング通知が本人に返らない
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", None).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", None).await;
    let _ = alice.next_event().await; // bob の userJoined

    // when (操作):
    bob.send(json!({ "type": "typing", "isTyping": true })).await;

    // then (期待する結果):
    let typing = alice.next_event().await;
    assert_eq!(typing["type"], json!("userTyping"));
    assert_eq!(typing["userName"], json!("bob"));
    assert_eq!(typing["isTyping"], json!(true));
    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_empty_text_gets_error_event_without_broadcast() {
    // テスト項目: 空白のみの本文がエラーイベントになり、配信されない
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", None).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", None).await;
    let _ = alice.next_event().await; // bob の userJoined

    // when (操作):
    alice.send(json!({ "type": "message", "text": "   " })).await;

    // then (期待する結果): 本人だけがエラーを受け取る
    let error = alice.next_event().await;
    assert_eq!(error["type"], json!("error"));
    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_unparseable_event_gets_error_event() {
    // テスト項目: 解釈できないイベントが接続限定のエラーになる
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", None).await;

    // when (操作):
    alice.send(json!({ "type": "detonate" })).await;

    // then (期待する結果):
    let error = alice.next_event().await;
    assert_eq!(error["type"], json!("error"));
}

#[tokio::test]
async fn test_disconnect_broadcasts_user_left() {
    // テスト項目: トランスポート切断が leave として通知される
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", None).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", None).await;
    let _ = alice.next_event().await; // bob の userJoined

    // when (操作): bob がソケットを閉じる
    bob.stream.close(None).await.unwrap();

    // then (期待する結果):
    let left = alice.next_event().await;
    assert_eq!(left["type"], json!("userLeft"));
    assert_eq!(left["name"], json!("bob"));
}

#[tokio::test]
async fn test_room_switch_notifies_both_rooms() {
    // テスト項目: ルーム切り替えが旧ルームの leave + 新ルームの join になる
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", Some("general")).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", Some("random")).await;
    let mut carol = Peer::connect(&url).await;
    carol.join("carol", Some("general")).await;
    let _ = alice.next_event().await; // carol の userJoined

    // when (操作): carol が random へ join し直す
    let snapshot = carol.join("carol", Some("random")).await;

    // then (期待する結果):
    let mut names = roster_names(&snapshot);
    names.sort();
    assert_eq!(names, vec!["bob", "carol"]);

    let left = alice.next_event().await;
    assert_eq!(left["type"], json!("userLeft"));
    assert_eq!(left["name"], json!("carol"));

    let joined = bob.next_event().await;
    assert_eq!(joined["type"], json!("userJoined"));
    assert_eq!(joined["name"], json!("carol"));
}

#[tokio::test]
async fn test_snapshot_self_id_matches_own_messages() {
    // テスト項目: スナップショットの selfId がロースターの自分の
    //             エントリおよび自分の発言の userId と一致する
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    let snapshot = alice.join("alice", None).await;
    let self_id = snapshot["selfId"].as_str().unwrap().to_string();

    // then (期待する結果): selfId がロースターに載っている
    let roster_ids: Vec<&str> = snapshot["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(roster_ids, vec![self_id.as_str()]);

    // when (操作): 自分の発言のエコーを受け取る
    alice.send(json!({ "type": "message", "text": "mine" })).await;
    let echoed = alice.next_event().await;

    // then (期待する結果): userId で自分の発言だと判別できる
    assert_eq!(echoed["type"], json!("message"));
    assert_eq!(echoed["userId"], json!(self_id));
}

#[tokio::test]
async fn test_same_room_rejoin_is_not_rebroadcast() {
    // テスト項目: 同じルームへの再 join が既存参加者に再通知されない
    // given (前提条件):
    let url = spawn_server().await;
    let mut alice = Peer::connect(&url).await;
    alice.join("alice", None).await;
    let mut bob = Peer::connect(&url).await;
    bob.join("bob", None).await;
    let _ = alice.next_event().await; // bob の userJoined

    // when (操作): bob が同じルームへ join し直す
    let snapshot = bob.join("bob", None).await;

    // then (期待する結果): 本人はスナップショットを受け取り直し、
    // alice には何も届かない
    let mut names = roster_names(&snapshot);
    names.sort();
    assert_eq!(names, vec!["alice", "bob"]);
    alice.expect_silence(Duration::from_millis(300)).await;
}
