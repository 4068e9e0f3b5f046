//! Client-side mirror of the server's chat state.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatMirror のメッセージ重複排除とカーソル前進
//! - ロースターの置き換え・差分適用、未読カウント
//!
//! ### なぜこのテストが必要か
//! - pull クライアントは同じメッセージを複数回の Fetch で受け取り得る。
//!   ミラーが ID で重複排除しない限り、表示が重複する
//! - カーソルは観測済みの最大 ID でなければ、差分取得が巻き戻る
//! - 自分の発言を未読に数えないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：順序どおりの受信、重複を含む受信
//! - エッジケース：空の差分、未 join での観測、ロースターの全入れ替え

use std::collections::{BTreeMap, HashSet};

use irori_server::infrastructure::dto::websocket::{MessageDto, ParticipantDto};

/// Local replica of the message log and presence roster.
///
/// Both transports feed this type: push events arrive one at a time,
/// poll responses arrive as batches that may overlap with previous
/// batches. Messages are deduplicated by their server-assigned id.
#[derive(Debug, Default)]
pub struct ChatMirror {
    /// Own connection id, once known
    user_id: Option<String>,
    /// Messages in arrival order, deduplicated by id
    messages: Vec<MessageDto>,
    /// Ids already recorded
    seen: HashSet<i64>,
    /// Roster keyed by connection id
    roster: BTreeMap<String, ParticipantDto>,
    /// Highest message id observed; the Fetch cursor
    cursor: i64,
    /// Messages recorded since the last `mark_read`
    unread: usize,
    /// Transport liveness as last reported
    connected: bool,
}

impl ChatMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the server-assigned connection id
    pub fn set_user_id(&mut self, id: String) {
        self.user_id = Some(id);
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Record one message; returns false if the id was already known
    pub fn record_message(&mut self, message: MessageDto) -> bool {
        if !self.seen.insert(message.id) {
            return false;
        }
        self.cursor = self.cursor.max(message.id);

        // 自分の発言は未読に数えない
        let own = match (&self.user_id, &message.user_id) {
            (Some(mine), Some(author)) => mine == author,
            _ => false,
        };
        if !own {
            self.unread += 1;
        }

        self.messages.push(message);
        true
    }

    /// Record a batch (e.g. one Fetch response); returns the number of
    /// messages that were actually new
    pub fn record_batch(&mut self, batch: Vec<MessageDto>) -> usize {
        batch
            .into_iter()
            .filter(|m| self.record_message(m.clone()))
            .count()
    }

    /// Replace the whole roster (poll Fetch, push roster snapshot)
    pub fn replace_roster(&mut self, participants: Vec<ParticipantDto>) {
        self.roster = participants
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
    }

    /// Apply an incremental join event
    pub fn apply_join(&mut self, participant: ParticipantDto) {
        self.roster.insert(participant.id.clone(), participant);
    }

    /// Apply an incremental leave event
    pub fn apply_leave(&mut self, id: &str) {
        self.roster.remove(id);
    }

    /// Current roster, ordered by connection id
    pub fn roster(&self) -> Vec<&ParticipantDto> {
        self.roster.values().collect()
    }

    /// All recorded messages, in arrival order
    pub fn messages(&self) -> &[MessageDto] {
        &self.messages
    }

    /// Messages recorded after the given index (for incremental display)
    pub fn messages_from(&self, index: usize) -> &[MessageDto] {
        &self.messages[index.min(self.messages.len())..]
    }

    /// The Fetch cursor: highest message id observed so far
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn mark_read(&mut self) {
        self.unread = 0;
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn connected(&self) -> bool {
        self.connected
    }
}
