//! WebSocket connection handlers (push transport).

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, DisplayName, Participant, RoomName, Timestamp, TransportKind},
    infrastructure::dto::websocket::{ClientEvent, MessageDto, ParticipantDto, ServerEvent},
    ui::state::AppState,
    usecase::SendMessageError,
};
use irori_shared::time::{get_utc_timestamp, timestamp_to_rfc3339};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // 接続 ID はサーバが採番する（クライアントは供給しない）
    let connection_id = ConnectionId::generate();
    tracing::info!("WebSocket upgrade for connection '{}'", connection_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This function handles the outbound message flow: events for this
/// connection (roster snapshots, broadcasts from other participants) are
/// queued on the channel and drained here.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();

    // この接続への送信チャンネル。join 時に pusher へ登録されるが、
    // join 前のエラー通知にも同じチャンネルを使う。
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let id_clone = connection_id.clone();
    let tx_clone = tx.clone();
    let idle_timeout = state.idle_timeout;

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        loop {
            // アイドルタイムアウトを超えて無通信なら切断扱いにする
            let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
                Ok(Some(Ok(msg))) => msg,
                Ok(Some(Err(e))) => {
                    tracing::error!("WebSocket error on '{}': {}", id_clone, e);
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::info!("Connection '{}' idle for {:?}, closing", id_clone, idle_timeout);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Unparseable event from '{}': {}", id_clone, e);
                            let error = ServerEvent::Error {
                                message: "unrecognized event".to_string(),
                            };
                            if tx_clone.send(serde_json::to_string(&error).unwrap()).is_err() {
                                break;
                            }
                            continue;
                        }
                    };

                    handle_client_event(&state_clone, &id_clone, &tx_clone, event).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping from '{}'", id_clone);
                    // ping/pong は WebSocket プロトコル側で処理される
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // 明示的な leave イベントはないので、トランスポート切断が leave になる
    match state.leave_participant_usecase.execute(&connection_id).await {
        Ok(outcome) => {
            tracing::info!(
                "Connection '{}' ('{}') disconnected and removed from registry",
                connection_id,
                outcome.participant.display_name.as_str()
            );

            let left_event = ServerEvent::UserLeft {
                id: connection_id.as_str().to_string(),
                name: outcome.participant.display_name.into_string(),
                timestamp: timestamp_to_rfc3339(get_utc_timestamp()),
            };
            let left_json = serde_json::to_string(&left_event).unwrap();
            state
                .leave_participant_usecase
                .broadcast_participant_left(outcome.room_peers, &left_json)
                .await;
        }
        Err(_) => {
            // join 前に切断された接続はレジストリに存在しない
            tracing::debug!("Connection '{}' closed without joining", connection_id);
        }
    }
}

async fn handle_client_event(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    tx: &mpsc::UnboundedSender<String>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Join { display_name, room } => {
            handle_join(state, connection_id, tx, display_name, room).await;
        }
        ClientEvent::Message { text } => {
            match state.send_message_usecase.execute(connection_id, text).await {
                Ok(outcome) => {
                    let event = ServerEvent::Message(MessageDto::from(outcome.message));
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .send_message_usecase
                        .broadcast_message(outcome.room_targets, &json)
                        .await;
                }
                Err(e @ SendMessageError::EmptyText) => {
                    send_error(tx, &e.to_string());
                }
                Err(e @ SendMessageError::UnknownParticipant(_)) => {
                    tracing::warn!("Message from unjoined connection '{}'", connection_id);
                    send_error(tx, &e.to_string());
                }
            }
        }
        ClientEvent::Typing { is_typing } => {
            match state.set_typing_usecase.execute(connection_id).await {
                Ok(outcome) => {
                    let event = ServerEvent::UserTyping {
                        user_id: outcome.user_id.into_string(),
                        user_name: outcome.user_name,
                        is_typing,
                    };
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .set_typing_usecase
                        .broadcast_typing(outcome.room_peers, &json)
                        .await;
                }
                Err(e) => {
                    tracing::warn!("Typing from unjoined connection '{}'", connection_id);
                    send_error(tx, &e.to_string());
                }
            }
        }
    }
}

async fn handle_join(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    tx: &mpsc::UnboundedSender<String>,
    display_name: String,
    room: Option<String>,
) {
    let display_name = match DisplayName::new(display_name) {
        Ok(name) => name,
        Err(e) => {
            send_error(tx, &e.to_string());
            return;
        }
    };
    let room = match RoomName::from_optional(room) {
        Ok(room) => room,
        Err(e) => {
            send_error(tx, &e.to_string());
            return;
        }
    };

    let now = Timestamp::new(get_utc_timestamp());
    let participant = Participant::new(
        connection_id.clone(),
        display_name.clone(),
        room.clone(),
        now,
        TransportKind::Push,
    );

    let outcome = state
        .join_participant_usecase
        .execute(participant, Some(tx.clone()))
        .await;
    tracing::info!(
        "Connection '{}' joined room '{}' as '{}'",
        connection_id,
        room,
        display_name.as_str()
    );

    let timestamp = timestamp_to_rfc3339(now.value());

    // ルーム切り替えなら旧ルームの参加者へ leave を通知する
    if let Some(previous_room) = &outcome.previous_room {
        let left_event = ServerEvent::UserLeft {
            id: connection_id.as_str().to_string(),
            name: display_name.as_str().to_string(),
            timestamp: timestamp.clone(),
        };
        let left_json = serde_json::to_string(&left_event).unwrap();
        state
            .join_participant_usecase
            .broadcast_participant_left_room(previous_room, connection_id, &left_json)
            .await;
    }

    // 本人には自身の接続 ID と参加ルームのロースターのスナップショットを返す
    let snapshot = ServerEvent::ConnectedUsers {
        self_id: connection_id.as_str().to_string(),
        participants: outcome
            .roster
            .into_iter()
            .map(ParticipantDto::from)
            .collect(),
    };
    if tx.send(serde_json::to_string(&snapshot).unwrap()).is_err() {
        return;
    }

    // 既存の参加者には join イベントをブロードキャストする。
    // 同じルームへの再 join（リフレッシュ）は通知しない。
    if outcome.newly_joined || outcome.previous_room.is_some() {
        let joined_event = ServerEvent::UserJoined {
            id: connection_id.as_str().to_string(),
            name: display_name.into_string(),
            timestamp,
        };
        let joined_json = serde_json::to_string(&joined_event).unwrap();
        state
            .join_participant_usecase
            .broadcast_participant_joined(&room, connection_id, &joined_json)
            .await;
    }
}

/// この接続だけにエラーイベントを返す（他の接続へは波及しない）
fn send_error(tx: &mpsc::UnboundedSender<String>, message: &str) {
    let event = ServerEvent::Error {
        message: message.to_string(),
    };
    let _ = tx.send(serde_json::to_string(&event).unwrap());
}
