//! HTTP polling (pull transport) wire contract.
//!
//! `GET /poll?lastMessageId=<id>&userId=<id>` reads; `POST /poll` writes
//! with an adjacently tagged body: `{ "action": ..., "data": { ... } }`.
//! Unknown actions and missing fields fail deserialization and are
//! answered with `400 { error }`, with no state mutation.

use serde::{Deserialize, Serialize};

use super::websocket::{MessageDto, ParticipantDto};

/// Query parameters for the Fetch request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    /// Cursor: only messages with a greater id are returned
    #[serde(default)]
    pub last_message_id: Option<i64>,
    /// Caller identifier; unknown ids are read-only observers
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Fetch response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollFetchResponse {
    pub messages: Vec<MessageDto>,
    pub connected_users: Vec<ParticipantDto>,
    /// Server time of the response, RFC 3339
    pub timestamp: String,
}

/// Act request body (adjacently tagged)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum PollRequest {
    /// Register or refresh a participant; the server generates `userId`
    /// when the caller supplies none
    #[serde(rename_all = "camelCase")]
    Join {
        #[serde(default)]
        user_id: Option<String>,
        display_name: String,
        #[serde(default)]
        room: Option<String>,
    },
    /// Append a chat message
    #[serde(rename_all = "camelCase")]
    Message {
        text: String,
        user: String,
        user_id: String,
    },
    /// Remove the participant
    #[serde(rename_all = "camelCase")]
    Leave { user_id: String },
}

/// Response to `Act(join)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollJoinResponse {
    pub success: bool,
    pub user_id: String,
    /// The system message announcing the join
    pub message: MessageDto,
}

/// Response to `Act(message)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollMessageResponse {
    pub success: bool,
    pub message: MessageDto,
}

/// Response to `Act(leave)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollLeaveResponse {
    pub success: bool,
}

/// Error body for 4xx/5xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollErrorResponse {
    pub error: String,
}

/// Per-room summary for `GET /api/rooms`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub name: String,
    /// Display names of the participants currently in the room
    pub participants: Vec<String>,
    /// Number of messages currently retained in the room's log
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_action_wire_format() {
        // テスト項目: join アクションが action/data の二段構造から復元できる
        // given (前提条件):
        let json = r#"{"action":"join","data":{"displayName":"alice","room":"general"}}"#;

        // when (操作):
        let request: PollRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            request,
            PollRequest::Join {
                user_id: None,
                display_name: "alice".to_string(),
                room: Some("general".to_string()),
            }
        );
    }

    #[test]
    fn test_message_action_requires_all_fields() {
        // テスト項目: message アクションは userId 欠落で拒否される
        // given (前提条件):
        let json = r#"{"action":"message","data":{"text":"yo","user":"alice"}}"#;

        // when (操作):
        let result = serde_json::from_str::<PollRequest>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        // テスト項目: 未知のアクション名は境界で拒否される
        // given (前提条件):
        let json = r#"{"action":"purge","data":{}}"#;

        // when (操作):
        let result = serde_json::from_str::<PollRequest>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_poll_query_parameters_are_optional() {
        // テスト項目: クエリパラメータはどちらも省略できる
        // given (前提条件):
        let empty: PollQuery = serde_json::from_str("{}").unwrap();
        let full: PollQuery =
            serde_json::from_str(r#"{"lastMessageId":5,"userId":"u1"}"#).unwrap();

        // when (操作):
        // then (期待する結果):
        assert_eq!(empty.last_message_id, None);
        assert_eq!(empty.user_id, None);
        assert_eq!(full.last_message_id, Some(5));
        assert_eq!(full.user_id, Some("u1".to_string()));
    }
}
