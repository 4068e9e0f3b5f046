//! HTTP polling handlers (pull transport).
//!
//! ## 作業記録
//!
//! pull トランスポートは push と同じ Chat Authority・ユースケースを共有
//! する。poll 参加者には pusher チャンネルがないため、ブロードキャスト
//! は push 接続にだけ届き、poll 側は次の Fetch で差分として観測する。
//! リクエストボディは `Json<serde_json::Value>` で受けてから手動で
//! デシリアライズする。axum の既定のリジェクトではなく、不明なアクション
//! や欠落フィールドを `400 { error }` の契約で返すため。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ConnectionId, DisplayName, MessageId, Participant, RoomName, Timestamp, TransportKind},
    infrastructure::dto::{
        http::{
            PollErrorResponse, PollFetchResponse, PollJoinResponse, PollLeaveResponse,
            PollMessageResponse, PollQuery, PollRequest,
        },
        websocket::{MessageDto, ParticipantDto, ServerEvent},
    },
    ui::state::AppState,
};
use irori_shared::time::{get_utc_timestamp, timestamp_to_rfc3339};

/// `GET /poll` — カーソル以降の差分とロースターを返す
///
/// join していない呼び出し元も読み取り専用の観測者として受け付ける
/// （レジストリには登録されない）。
pub async fn poll_fetch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> Json<PollFetchResponse> {
    let caller = query
        .user_id
        .and_then(|raw| ConnectionId::new(raw).ok());
    let cursor = query
        .last_message_id
        .map(MessageId::new)
        .unwrap_or_else(MessageId::zero);

    let outcome = state
        .fetch_updates_usecase
        .execute(caller.as_ref(), cursor)
        .await;

    Json(PollFetchResponse {
        messages: outcome.messages.into_iter().map(MessageDto::from).collect(),
        connected_users: outcome.roster.into_iter().map(ParticipantDto::from).collect(),
        timestamp: timestamp_to_rfc3339(outcome.now.value()),
    })
}

/// `POST /poll` — join / message / leave アクションを実行する
pub async fn poll_act(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let request = match serde_json::from_value::<PollRequest>(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected poll action: {}", e);
            return bad_request("unrecognized action or malformed data");
        }
    };

    match request {
        PollRequest::Join {
            user_id,
            display_name,
            room,
        } => handle_join(state, user_id, display_name, room).await,
        PollRequest::Message { text, user, user_id } => {
            // `user` はワイヤ契約上必須だが、表示名はレジストリが権威
            let _ = user;
            handle_message(state, user_id, text).await
        }
        PollRequest::Leave { user_id } => handle_leave(state, user_id).await,
    }
}

async fn handle_join(
    state: Arc<AppState>,
    user_id: Option<String>,
    display_name: String,
    room: Option<String>,
) -> Response {
    let display_name = match DisplayName::new(display_name) {
        Ok(name) => name,
        Err(e) => return bad_request(&e.to_string()),
    };
    let room = match RoomName::from_optional(room) {
        Ok(room) => room,
        Err(e) => return bad_request(&e.to_string()),
    };

    // 再 join（リフレッシュ）は既存 ID を添えて呼ばれる。初回は採番する。
    let connection_id = match user_id {
        Some(raw) => match ConnectionId::new(raw) {
            Ok(id) => id,
            Err(e) => return bad_request(&e.to_string()),
        },
        None => ConnectionId::generate(),
    };

    let now = Timestamp::new(get_utc_timestamp());
    let participant = Participant::new(
        connection_id.clone(),
        display_name.clone(),
        room.clone(),
        now,
        TransportKind::Poll,
    );

    let outcome = state
        .join_participant_usecase
        .execute(participant, None)
        .await;
    tracing::info!(
        "Poll participant '{}' joined room '{}' as '{}'",
        connection_id,
        room,
        display_name.as_str()
    );

    let timestamp = timestamp_to_rfc3339(now.value());

    if let Some(previous_room) = &outcome.previous_room {
        let left_event = ServerEvent::UserLeft {
            id: connection_id.as_str().to_string(),
            name: display_name.as_str().to_string(),
            timestamp: timestamp.clone(),
        };
        let left_json = serde_json::to_string(&left_event).unwrap();
        state
            .join_participant_usecase
            .broadcast_participant_left_room(previous_room, &connection_id, &left_json)
            .await;
    }

    // join 告知メッセージをログに残す（poll 側は Fetch で観測する）
    let announcement = state
        .join_participant_usecase
        .append_join_announcement(display_name.as_str(), room.clone())
        .await;

    // push 側の同室参加者へは join イベントで通知する
    let joined_event = ServerEvent::UserJoined {
        id: connection_id.as_str().to_string(),
        name: display_name.into_string(),
        timestamp,
    };
    let joined_json = serde_json::to_string(&joined_event).unwrap();
    state
        .join_participant_usecase
        .broadcast_participant_joined(&room, &connection_id, &joined_json)
        .await;

    Json(PollJoinResponse {
        success: true,
        user_id: connection_id.into_string(),
        message: MessageDto::from(announcement),
    })
    .into_response()
}

async fn handle_message(state: Arc<AppState>, user_id: String, text: String) -> Response {
    let connection_id = match ConnectionId::new(user_id) {
        Ok(id) => id,
        Err(e) => return bad_request(&e.to_string()),
    };

    match state
        .send_message_usecase
        .execute(&connection_id, text)
        .await
    {
        Ok(outcome) => {
            // push 側の同室参加者へ即時配信（poll の ID は pusher が無視する）
            let event = ServerEvent::Message(MessageDto::from(outcome.message.clone()));
            let json = serde_json::to_string(&event).unwrap();
            state
                .send_message_usecase
                .broadcast_message(outcome.room_targets, &json)
                .await;

            Json(PollMessageResponse {
                success: true,
                message: MessageDto::from(outcome.message),
            })
            .into_response()
        }
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn handle_leave(state: Arc<AppState>, user_id: String) -> Response {
    let connection_id = match ConnectionId::new(user_id) {
        Ok(id) => id,
        Err(e) => return bad_request(&e.to_string()),
    };

    match state.leave_participant_usecase.execute(&connection_id).await {
        Ok(outcome) => {
            tracing::info!(
                "Poll participant '{}' ('{}') left",
                connection_id,
                outcome.participant.display_name.as_str()
            );

            let announcement = state
                .leave_participant_usecase
                .append_leave_announcement(
                    outcome.participant.display_name.as_str(),
                    outcome.participant.room.clone(),
                )
                .await;

            let left_event = ServerEvent::UserLeft {
                id: connection_id.as_str().to_string(),
                name: outcome.participant.display_name.into_string(),
                timestamp: timestamp_to_rfc3339(announcement.created_at.value()),
            };
            let left_json = serde_json::to_string(&left_event).unwrap();
            state
                .leave_participant_usecase
                .broadcast_participant_left(outcome.room_peers, &left_json)
                .await;

            Json(PollLeaveResponse { success: true }).into_response()
        }
        Err(e) => bad_request(&e.to_string()),
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(PollErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
