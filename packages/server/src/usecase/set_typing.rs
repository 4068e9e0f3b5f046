//! UseCase: タイピング状態の通知
//!
//! タイピングインジケータは一時的な状態でログに残らない。通知対象は
//! 同室の接続のうち本人を除いた全員で、次のインジケータイベントで
//! 上書きされる。

use std::sync::Arc;

use crate::domain::{ChatAuthority, ConnectionId, MessagePusher};

use super::error::ParticipantNotFoundError;

/// タイピング通知の結果
#[derive(Debug, Clone)]
pub struct TypingOutcome {
    /// タイピング中の参加者の接続 ID
    pub user_id: ConnectionId,
    /// タイピング中の参加者の表示名
    pub user_name: String,
    /// 通知対象（本人を除く同室の接続 ID）
    pub room_peers: Vec<ConnectionId>,
}

/// タイピング状態通知のユースケース
pub struct SetTypingUseCase {
    /// Chat Authority（共有状態の抽象化）
    authority: Arc<dyn ChatAuthority>,
    /// MessagePusher（push 通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl SetTypingUseCase {
    /// 新しい SetTypingUseCase を作成
    pub fn new(authority: Arc<dyn ChatAuthority>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { authority, pusher }
    }

    /// タイピング状態の通知対象を解決する
    ///
    /// # Returns
    ///
    /// * `Ok(TypingOutcome)` - 通知対象（本人を除く同室の接続）
    /// * `Err(ParticipantNotFoundError)` - 参加者が存在しない
    pub async fn execute(
        &self,
        id: &ConnectionId,
    ) -> Result<TypingOutcome, ParticipantNotFoundError> {
        let participant = self
            .authority
            .participant(id)
            .await
            .ok_or_else(|| ParticipantNotFoundError(id.as_str().to_string()))?;

        let room_peers: Vec<ConnectionId> = self
            .authority
            .connection_ids_in_room(&participant.room)
            .await
            .into_iter()
            .filter(|peer| peer != id)
            .collect();

        Ok(TypingOutcome {
            user_id: participant.id,
            user_name: participant.display_name.into_string(),
            room_peers,
        })
    }

    /// タイピング状態を同室の接続にブロードキャスト
    pub async fn broadcast_typing(&self, targets: Vec<ConnectionId>, json: &str) {
        self.pusher.broadcast(targets, json).await;
    }
}
