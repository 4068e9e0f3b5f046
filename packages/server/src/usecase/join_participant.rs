//! UseCase: 参加者の join 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinParticipantUseCase::execute() メソッド
//! - 参加者の登録（冪等な upsert）、ルーム切り替えの検出、ロースター構築
//!
//! ### なぜこのテストが必要か
//! - 冪等性の保証：同じ接続 ID での join がロースターを重複させない
//! - ルーム切り替えが「旧ルームからの leave + 新ルームへの join」として
//!   観測可能であることを保証
//! - pull モデルの join がシステムメッセージを残すことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規 join、再 join（メタデータ更新）
//! - エッジケース：ルーム切り替え、1 人目の join（ブロードキャスト対象なし）

use std::sync::Arc;

use crate::domain::{
    ChatAuthority, ChatMessage, ConnectionId, MessageDraft, MessagePusher, MessageText,
    Participant, PusherChannel, RoomName,
};

/// join 処理の結果
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// 初回の join かどうか
    pub newly_joined: bool,
    /// ルーム切り替えの場合、切り替え前のルーム
    pub previous_room: Option<RoomName>,
    /// join 後の参加ルームのロースター（接続 ID 順）
    pub roster: Vec<Participant>,
}

/// 参加者 join のユースケース
pub struct JoinParticipantUseCase {
    /// Chat Authority（共有状態の抽象化）
    authority: Arc<dyn ChatAuthority>,
    /// MessagePusher（push 通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl JoinParticipantUseCase {
    /// 新しい JoinParticipantUseCase を作成
    pub fn new(authority: Arc<dyn ChatAuthority>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { authority, pusher }
    }

    /// join を実行
    ///
    /// # Arguments
    ///
    /// * `participant` - 登録する参加者（Domain Model）
    /// * `channel` - push 接続の場合、この接続への送信チャンネル
    ///
    /// # Returns
    ///
    /// join 後のロースターと、ルーム切り替え情報を含む `JoinOutcome`
    pub async fn execute(
        &self,
        participant: Participant,
        channel: Option<PusherChannel>,
    ) -> JoinOutcome {
        let id = participant.id.clone();
        let room = participant.room.clone();

        // 1. push 接続のチャンネルを登録（join のやり直しでも冪等）
        if let Some(sender) = channel {
            self.pusher.register_client(id.clone(), sender).await;
        }

        // 2. レジストリへ登録（接続 ID をキーに冪等）
        let outcome = self.authority.upsert_participant(participant).await;

        // 3. 参加ルームのロースターを構築
        let roster = self.authority.roster(Some(&room)).await;

        JoinOutcome {
            newly_joined: outcome.newly_joined,
            previous_room: outcome.previous_room,
            roster,
        }
    }

    /// pull モデルの join 告知システムメッセージをログに追記
    pub async fn append_join_announcement(
        &self,
        display_name: &str,
        room: RoomName,
    ) -> ChatMessage {
        // 表示名は検証済みなので告知文が空になることはない
        let text = MessageText::new(format!("{} joined the chat", display_name))
            .expect("announcement text is never empty");
        self.authority
            .append_message(MessageDraft::system(text, room))
            .await
    }

    /// join をルームの既存参加者にブロードキャスト
    ///
    /// 新規参加者自身は対象から除外される（本人にはロースターのスナップ
    /// ショットが返る）。
    pub async fn broadcast_participant_joined(
        &self,
        room: &RoomName,
        joined_id: &ConnectionId,
        json: &str,
    ) {
        let targets: Vec<ConnectionId> = self
            .authority
            .connection_ids_in_room(room)
            .await
            .into_iter()
            .filter(|id| id != joined_id)
            .collect();
        self.pusher.broadcast(targets, json).await;
    }

    /// ルーム切り替え時、旧ルームの参加者へ leave をブロードキャスト
    pub async fn broadcast_participant_left_room(
        &self,
        previous_room: &RoomName,
        left_id: &ConnectionId,
        json: &str,
    ) {
        let targets: Vec<ConnectionId> = self
            .authority
            .connection_ids_in_room(previous_room)
            .await
            .into_iter()
            .filter(|id| id != left_id)
            .collect();
        self.pusher.broadcast(targets, json).await;
    }
}
