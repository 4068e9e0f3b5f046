//! Conversion logic between domain entities and wire DTOs.

use irori_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Participant};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for dto::MessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.value(),
            text: model.text.into_string(),
            user: model.author.into_string(),
            user_id: model.author_connection_id.map(|id| id.into_string()),
            room: model.room.as_str().to_string(),
            timestamp: timestamp_to_rfc3339(model.created_at.value()),
            system: model.system,
        }
    }
}

impl From<Participant> for dto::ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.display_name.into_string(),
            room: model.room.as_str().to_string(),
            last_seen: model.last_seen.value(),
        }
    }
}
