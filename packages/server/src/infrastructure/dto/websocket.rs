//! WebSocket (push transport) wire contract.
//!
//! Field names are camelCase on the wire; the `type` tag selects the
//! variant. Unknown tags fail deserialization at the boundary and are
//! answered with an `error` event scoped to the offending connection.

use serde::{Deserialize, Serialize};

/// Roster entry as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    /// Server-assigned connection identifier
    pub id: String,
    /// Display name supplied at join time
    pub name: String,
    /// Room the participant currently occupies
    pub room: String,
    /// Last activity, Unix milliseconds
    pub last_seen: i64,
}

/// Chat message as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub text: String,
    /// Author display name captured at send time
    pub user: String,
    /// Author connection id; `None` for system messages
    pub user_id: Option<String>,
    pub room: String,
    /// Server-side receipt time, RFC 3339
    pub timestamp: String,
    /// True for server-generated join/leave announcements
    #[serde(default)]
    pub system: bool,
}

/// Client-to-server events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Join (or switch room): `{ "type": "join", "displayName": ..., "room"?: ... }`
    #[serde(rename_all = "camelCase")]
    Join {
        display_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Send a chat message: `{ "type": "message", "text": ... }`
    Message { text: String },
    /// Typing indicator: `{ "type": "typing", "isTyping": ... }`
    #[serde(rename_all = "camelCase")]
    Typing { is_typing: bool },
}

/// Server-to-client events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Roster snapshot, sent to the joining connection
    #[serde(rename_all = "camelCase")]
    ConnectedUsers {
        /// Connection id the server assigned to the receiver
        self_id: String,
        participants: Vec<ParticipantDto>,
    },
    /// A participant joined the room
    UserJoined {
        id: String,
        name: String,
        timestamp: String,
    },
    /// A participant left the room
    UserLeft {
        id: String,
        name: String,
        timestamp: String,
    },
    /// Broadcast of an accepted chat message
    Message(MessageDto),
    /// Typing state of a room peer
    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: String,
        user_name: String,
        is_typing: bool,
    },
    /// Error scoped to this connection only
    Error { message: String },
}
