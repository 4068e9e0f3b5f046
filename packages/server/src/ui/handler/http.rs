//! HTTP API endpoint handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    domain::{MessageId, RoomName},
    infrastructure::dto::http::RoomSummaryDto,
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms with their occupants and log sizes
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let roster = state.authority.roster(None).await;

    // ルーム名順で安定した一覧を返す
    let mut rooms: BTreeMap<RoomName, Vec<String>> = BTreeMap::new();
    for participant in roster {
        rooms
            .entry(participant.room.clone())
            .or_default()
            .push(participant.display_name.into_string());
    }

    let mut summaries = Vec::with_capacity(rooms.len());
    for (room, participants) in rooms {
        let message_count = state
            .authority
            .messages_since(&room, MessageId::zero())
            .await
            .len();
        summaries.push(RoomSummaryDto {
            name: room.as_str().to_string(),
            participants,
            message_count,
        });
    }

    Json(summaries)
}
