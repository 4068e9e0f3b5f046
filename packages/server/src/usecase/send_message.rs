//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 本文の検証、ログへの追記、ブロードキャスト対象の選定
//!
//! ### なぜこのテストが必要か
//! - 空・空白のみの本文がログにもブロードキャストにも到達しないことを保証
//! - メッセージが送信者を含むルーム全員に配信されることを確認
//! - 別ルームの接続が配信対象に含まれないこと（ルーム分離）を保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信と配信対象の選定
//! - 異常系：未登録の送信者、空の本文
//! - エッジケース：送信者のみが接続している場合

use std::sync::Arc;

use irori_shared::time::Clock;

use crate::domain::{
    ChatAuthority, ChatMessage, ConnectionId, MessageDraft, MessagePusher, MessageText, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ送信の結果
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// ログに追記されたメッセージ（ID・受理時刻つき）
    pub message: ChatMessage,
    /// 配信対象（送信者を含む同室の全接続 ID）
    pub room_targets: Vec<ConnectionId>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Chat Authority（共有状態の抽象化）
    authority: Arc<dyn ChatAuthority>,
    /// MessagePusher（push 通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
    /// 時刻取得（last_seen 更新用）
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        authority: Arc<dyn ChatAuthority>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authority,
            pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信者の接続 ID
    /// * `raw_text` - クライアントから受け取った生の本文
    ///
    /// # Returns
    ///
    /// * `Ok(SendOutcome)` - 追記されたメッセージと配信対象
    /// * `Err(SendMessageError)` - 検証エラー（状態は変更されない）
    pub async fn execute(
        &self,
        from: &ConnectionId,
        raw_text: String,
    ) -> Result<SendOutcome, SendMessageError> {
        // 1. 送信者の存在確認
        let sender = self
            .authority
            .participant(from)
            .await
            .ok_or_else(|| SendMessageError::UnknownParticipant(from.as_str().to_string()))?;

        // 2. 本文の検証（trim して空なら拒否、状態は変更しない）
        let text =
            MessageText::new(raw_text).map_err(|_| SendMessageError::EmptyText)?;

        // 3. 送信はアクティビティなので last_seen を更新
        let now = Timestamp::new(self.clock.now_utc_millis());
        self.authority.touch(from, now).await;

        // 4. ログへ追記（ID と受理時刻は追記時に採番・付与される）
        let draft = MessageDraft::chat(
            text,
            sender.display_name.clone(),
            from.clone(),
            sender.room.clone(),
        );
        let message = self.authority.append_message(draft).await;

        // 5. 配信対象を取得（送信者を含むルーム全員）
        let room_targets = self.authority.connection_ids_in_room(&sender.room).await;

        Ok(SendOutcome {
            message,
            room_targets,
        })
    }

    /// 受理したメッセージをルーム全員にブロードキャスト
    pub async fn broadcast_message(&self, targets: Vec<ConnectionId>, json: &str) {
        self.pusher.broadcast(targets, json).await;
    }
}
