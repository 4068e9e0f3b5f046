//! UseCase: 参加者の leave / 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveParticipantUseCase::execute() メソッド
//! - 参加者の削除、通知対象の選定、pull モデルの leave 告知
//!
//! ### なぜこのテストが必要か
//! - 明示的な leave とトランスポート切断の双方が同じ経路で処理される
//! - 退出の通知が同室の残存参加者のみに届くことを保証
//! - 存在しない参加者の leave がエラーとして報告されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の退出と通知
//! - エッジケース：最後の参加者の退出（通知対象なし）
//! - 異常系：未登録の接続 ID での leave 試行

use std::sync::Arc;

use crate::domain::{
    ChatAuthority, ChatMessage, ConnectionId, MessageDraft, MessagePusher, MessageText,
    Participant, RoomName,
};

use super::error::ParticipantNotFoundError;

/// leave 処理の結果
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// 削除された参加者
    pub participant: Participant,
    /// 通知対象（退出者と同室だった残存参加者の接続 ID）
    pub room_peers: Vec<ConnectionId>,
}

/// 参加者 leave のユースケース
pub struct LeaveParticipantUseCase {
    /// Chat Authority（共有状態の抽象化）
    authority: Arc<dyn ChatAuthority>,
    /// MessagePusher（push 通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl LeaveParticipantUseCase {
    /// 新しい LeaveParticipantUseCase を作成
    pub fn new(authority: Arc<dyn ChatAuthority>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { authority, pusher }
    }

    /// leave を実行
    ///
    /// # Arguments
    ///
    /// * `id` - 退出する参加者の接続 ID
    ///
    /// # Returns
    ///
    /// * `Ok(LeaveOutcome)` - 削除された参加者と通知対象
    /// * `Err(ParticipantNotFoundError)` - 参加者が存在しない
    pub async fn execute(
        &self,
        id: &ConnectionId,
    ) -> Result<LeaveOutcome, ParticipantNotFoundError> {
        // 1. レジストリから削除
        let participant = self
            .authority
            .remove_participant(id)
            .await
            .ok_or_else(|| ParticipantNotFoundError(id.as_str().to_string()))?;

        // 2. push チャンネルを登録解除（poll 参加者では no-op）
        self.pusher.unregister_client(id).await;

        // 3. 通知対象を取得（削除後なので退出者自身は含まれない）
        let room_peers = self
            .authority
            .connection_ids_in_room(&participant.room)
            .await;

        Ok(LeaveOutcome {
            participant,
            room_peers,
        })
    }

    /// pull モデルの leave 告知システムメッセージをログに追記
    pub async fn append_leave_announcement(
        &self,
        display_name: &str,
        room: RoomName,
    ) -> ChatMessage {
        let text = MessageText::new(format!("{} left the chat", display_name))
            .expect("announcement text is never empty");
        self.authority
            .append_message(MessageDraft::system(text, room))
            .await
    }

    /// leave をルームの残存参加者にブロードキャスト
    pub async fn broadcast_participant_left(&self, targets: Vec<ConnectionId>, json: &str) {
        self.pusher.broadcast(targets, json).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, MessageId, MockMessagePusher, Timestamp, TransportKind};
    use crate::infrastructure::authority::InMemoryChatAuthority;
    use irori_shared::time::SystemClock;

    fn create_test_authority() -> Arc<InMemoryChatAuthority> {
        Arc::new(InMemoryChatAuthority::new(Arc::new(SystemClock)))
    }

    fn participant(id: &str, name: &str, room: &str) -> Participant {
        Participant::new(
            ConnectionId::new(id.to_string()).unwrap(),
            DisplayName::new(name.to_string()).unwrap(),
            RoomName::new(room.to_string()).unwrap(),
            Timestamp::new(1_000),
            TransportKind::Push,
        )
    }

    fn pusher_expecting_unregister() -> MockMessagePusher {
        let mut pusher = MockMessagePusher::new();
        pusher.expect_unregister_client().returning(|_| ());
        pusher
    }

    #[tokio::test]
    async fn test_leave_removes_participant_and_reports_peers() {
        // テスト項目: leave で参加者が削除され、同室の残存参加者が通知対象になる
        // given (前提条件):
        let authority = create_test_authority();
        authority.upsert_participant(participant("c1", "alice", "general")).await;
        authority.upsert_participant(participant("c2", "bob", "general")).await;
        authority.upsert_participant(participant("c3", "carol", "random")).await;
        let usecase =
            LeaveParticipantUseCase::new(authority.clone(), Arc::new(pusher_expecting_unregister()));

        // when (操作):
        let alice = ConnectionId::new("c1".to_string()).unwrap();
        let outcome = usecase.execute(&alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.participant.display_name.as_str(), "alice");
        assert_eq!(outcome.room_peers.len(), 1);
        assert_eq!(outcome.room_peers[0].as_str(), "c2");
        assert!(authority.participant(&alice).await.is_none());
    }

    #[tokio::test]
    async fn test_last_participant_leave_has_no_peers() {
        // テスト項目: 最後の参加者の退出では通知対象が空になる
        // given (前提条件):
        let authority = create_test_authority();
        authority.upsert_participant(participant("c1", "alice", "general")).await;
        let usecase =
            LeaveParticipantUseCase::new(authority, Arc::new(pusher_expecting_unregister()));

        // when (操作):
        let alice = ConnectionId::new("c1".to_string()).unwrap();
        let outcome = usecase.execute(&alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.room_peers.len(), 0);
    }

    #[tokio::test]
    async fn test_leave_of_unknown_participant_is_an_error() {
        // テスト項目: 未登録の接続 ID での leave はエラーになり状態を変えない
        // given (前提条件):
        let authority = create_test_authority();
        let usecase =
            LeaveParticipantUseCase::new(authority, Arc::new(MockMessagePusher::new()));

        // when (操作):
        let ghost = ConnectionId::new("ghost".to_string()).unwrap();
        let result = usecase.execute(&ghost).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ParticipantNotFoundError("ghost".to_string())
        );
    }

    #[tokio::test]
    async fn test_leave_announcement_is_appended_as_system_message() {
        // テスト項目: pull の leave がシステムメッセージをログに残す
        // given (前提条件):
        let authority = create_test_authority();
        let usecase =
            LeaveParticipantUseCase::new(authority.clone(), Arc::new(MockMessagePusher::new()));

        // when (操作):
        let message = usecase
            .append_leave_announcement("alice", RoomName::global())
            .await;

        // then (期待する結果):
        assert!(message.system);
        assert_eq!(message.text.as_str(), "alice left the chat");
        let log = authority
            .messages_since(&RoomName::global(), MessageId::zero())
            .await;
        assert_eq!(log.len(), 1);
    }
}
