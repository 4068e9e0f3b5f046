//! ドメイン層
//!
//! チャット同期のドメインモデル（エンティティ、値オブジェクト）と、
//! 他の層が依存するインターフェース（`ChatAuthority`, `MessagePusher`）を
//! 定義します。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

mod authority;
mod entity;
mod error;
mod pusher;
mod sequence;
mod value_object;

pub use authority::{ChatAuthority, UpsertOutcome};
pub use entity::{ChatMessage, MessageDraft, Participant, TransportKind};
pub use error::{MessagePushError, ValueError};
pub use pusher::{MessagePusher, PusherChannel};
pub use sequence::MessageIdGenerator;
pub use value_object::{ConnectionId, DisplayName, MessageId, MessageText, RoomName, Timestamp};

#[cfg(test)]
pub use pusher::MockMessagePusher;
