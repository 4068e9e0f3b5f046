//! Message formatting utilities for client display.

use irori_server::infrastructure::dto::websocket::{MessageDto, ParticipantDto};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the roster snapshot shown after joining
    pub fn format_roster(participants: &[ParticipantDto], own_id: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str("Participants:\n");

        if participants.is_empty() {
            output.push_str("(No participants)\n");
        } else {
            for participant in participants {
                let is_me = own_id == Some(participant.id.as_str());
                let me_suffix = if is_me { " (me)" } else { "" };
                output.push_str(&format!(
                    "{}{} [{}]\n",
                    participant.name, me_suffix, participant.room
                ));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a chat message for display
    ///
    /// System announcements (join/leave) are rendered without an author
    /// prefix.
    pub fn format_message(message: &MessageDto) -> String {
        if message.system {
            format!("\n* {} ({})\n", message.text, message.timestamp)
        } else {
            format!(
                "\n[{}] {}: {}\n",
                message.timestamp, message.user, message.text
            )
        }
    }

    /// Format a participant-joined notification
    pub fn format_user_joined(name: &str, timestamp: &str) -> String {
        format!("\n+ {} joined at {}\n", name, timestamp)
    }

    /// Format a participant-left notification
    pub fn format_user_left(name: &str, timestamp: &str) -> String {
        format!("\n- {} left at {}\n", name, timestamp)
    }

    /// Format a typing indicator
    pub fn format_typing(name: &str, is_typing: bool) -> String {
        if is_typing {
            format!("\n... {} is typing\n", name)
        } else {
            format!("\n... {} stopped typing\n", name)
        }
    }

    /// Format a server-side error scoped to this connection
    pub fn format_error(message: &str) -> String {
        format!("\n! server error: {}\n", message)
    }

    /// Format a payload that could not be decoded
    pub fn format_raw(text: &str) -> String {
        format!("\n? {}\n", text)
    }

    /// Format a composed line whose send failed, so the user can retry it
    pub fn format_undelivered(text: &str) -> String {
        format!("\n! not delivered (retry after reconnecting): {}\n", text)
    }
}
