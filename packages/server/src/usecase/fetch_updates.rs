//! UseCase: pull トランスポートの Fetch 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FetchUpdatesUseCase::execute() メソッド
//! - カーソル以降のメッセージ取得、ロースター構築、ステイルネススイープ
//!
//! ### なぜこのテストが必要か
//! - Fetch が join を伴わない読み取り専用の操作であることを保証
//!   （未登録の呼び出し元は観測者として扱われ、登録されない）
//! - スイープがロースター計算の「前」に実行されることを保証
//! - Fetch が呼び出し元の last_seen を更新することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：join 済みの参加者による定期ポーリング
//! - エッジケース：join していない呼び出し元の Fetch（登録されない）
//! - ステイル参加者の退去とロースターからの消滅

use std::sync::Arc;

use irori_shared::time::Clock;

use crate::domain::{ChatAuthority, ChatMessage, ConnectionId, MessageId, Participant, RoomName, Timestamp};

/// ステイルネススイープの既定閾値（ミリ秒）
pub const DEFAULT_STALE_AFTER_MILLIS: i64 = 120_000;

/// Fetch の結果
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// カーソルより新しいメッセージ（追記順）
    pub messages: Vec<ChatMessage>,
    /// スイープ後の全ロースター
    pub roster: Vec<Participant>,
    /// 応答のサーバ時刻
    pub now: Timestamp,
}

/// Fetch（差分取得）のユースケース
pub struct FetchUpdatesUseCase {
    /// Chat Authority（共有状態の抽象化）
    authority: Arc<dyn ChatAuthority>,
    /// 時刻取得
    clock: Arc<dyn Clock>,
    /// ステイルネススイープの閾値（ミリ秒）
    stale_after_millis: i64,
}

impl FetchUpdatesUseCase {
    /// 既定の閾値（120 秒）で作成
    pub fn new(authority: Arc<dyn ChatAuthority>, clock: Arc<dyn Clock>) -> Self {
        Self::with_stale_after(authority, clock, DEFAULT_STALE_AFTER_MILLIS)
    }

    /// 閾値を指定して作成（テスト・デプロイ設定用）
    pub fn with_stale_after(
        authority: Arc<dyn ChatAuthority>,
        clock: Arc<dyn Clock>,
        stale_after_millis: i64,
    ) -> Self {
        Self {
            authority,
            clock,
            stale_after_millis,
        }
    }

    /// Fetch を実行
    ///
    /// # Arguments
    ///
    /// * `caller` - 呼び出し元の接続 ID（未登録でもよい。Fetch は join しない）
    /// * `cursor` - 最後に観測したメッセージ ID
    ///
    /// # Returns
    ///
    /// カーソル以降のメッセージと、スイープ後のロースター
    pub async fn execute(&self, caller: Option<&ConnectionId>, cursor: MessageId) -> FetchOutcome {
        let now = Timestamp::new(self.clock.now_utc_millis());

        // 1. 呼び出し元が既知なら last_seen を更新（未知でも登録はしない）
        let caller_room = match caller {
            Some(id) => {
                self.authority.touch(id, now).await;
                self.authority.participant(id).await.map(|p| p.room)
            }
            None => None,
        };

        // 2. ロースター計算の前にステイル参加者を退去させる
        let evicted = self.authority.sweep_stale(now, self.stale_after_millis).await;
        for participant in &evicted {
            tracing::info!(
                "Evicted stale participant '{}' ('{}')",
                participant.id,
                participant.display_name.as_str()
            );
        }

        // 3. 差分メッセージとロースターを取得
        //    未登録の観測者にはグローバルルームのログを返す
        let room = caller_room.unwrap_or_else(RoomName::global);
        let messages = self.authority.messages_since(&room, cursor).await;
        let roster = self.authority.roster(None).await;

        FetchOutcome {
            messages,
            roster,
            now,
        }
    }
}
