//! インメモリ Chat Authority 実装
//!
//! プレゼンスレジストリ（HashMap）とルームごとのメッセージログ（VecDeque）を
//! 単一の Mutex で保護する。変更はすべてロック内で完結し、追記と切り詰め、
//! スイープと退去は部分的に観測されない。
//!
//! ## 技術的負債
//!
//! ドメインモデルを直接ストレージとして使用しています。インメモリ実装では
//! 許容される妥協ですが、永続化バックエンドを実装する場合は DTO への変換層が
//! 必要になります。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use irori_shared::time::Clock;

use crate::domain::{
    ChatAuthority, ChatMessage, ConnectionId, MessageDraft, MessageId, MessageIdGenerator,
    Participant, RoomName, Timestamp, TransportKind, UpsertOutcome,
};

/// ルームごとのメッセージログの上限（超過時は先頭＝最古から破棄）
pub const MESSAGE_LOG_CAPACITY: usize = 100;

struct AuthorityState {
    /// 接続識別子 → 参加者
    participants: HashMap<ConnectionId, Participant>,
    /// ルーム名 → 追記順のメッセージログ
    logs: HashMap<RoomName, VecDeque<ChatMessage>>,
}

/// インメモリ Chat Authority
pub struct InMemoryChatAuthority {
    state: Mutex<AuthorityState>,
    ids: MessageIdGenerator,
    clock: Arc<dyn Clock>,
    log_capacity: usize,
}

impl InMemoryChatAuthority {
    /// 既定のログ容量で作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(clock, MESSAGE_LOG_CAPACITY)
    }

    /// ログ容量を指定して作成（テスト用）
    pub fn with_capacity(clock: Arc<dyn Clock>, log_capacity: usize) -> Self {
        Self {
            state: Mutex::new(AuthorityState {
                participants: HashMap::new(),
                logs: HashMap::new(),
            }),
            ids: MessageIdGenerator::new(),
            clock,
            log_capacity,
        }
    }
}

#[async_trait]
impl ChatAuthority for InMemoryChatAuthority {
    async fn upsert_participant(&self, participant: Participant) -> UpsertOutcome {
        let mut state = self.state.lock().await;
        match state.participants.insert(participant.id.clone(), participant.clone()) {
            None => UpsertOutcome {
                newly_joined: true,
                previous_room: None,
            },
            Some(previous) => UpsertOutcome {
                newly_joined: false,
                previous_room: (previous.room != participant.room).then_some(previous.room),
            },
        }
    }

    async fn remove_participant(&self, id: &ConnectionId) -> Option<Participant> {
        let mut state = self.state.lock().await;
        state.participants.remove(id)
    }

    async fn participant(&self, id: &ConnectionId) -> Option<Participant> {
        let state = self.state.lock().await;
        state.participants.get(id).cloned()
    }

    async fn touch(&self, id: &ConnectionId, at: Timestamp) {
        let mut state = self.state.lock().await;
        if let Some(participant) = state.participants.get_mut(id) {
            participant.last_seen = at;
        }
    }

    async fn roster(&self, room: Option<&RoomName>) -> Vec<Participant> {
        let state = self.state.lock().await;
        let mut roster: Vec<Participant> = state
            .participants
            .values()
            .filter(|p| room.is_none_or(|r| &p.room == r))
            .cloned()
            .collect();

        // Sort by connection id for consistent ordering
        roster.sort_by(|a, b| a.id.cmp(&b.id));

        roster
    }

    async fn connection_ids_in_room(&self, room: &RoomName) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .participants
            .values()
            .filter(|p| &p.room == room)
            .map(|p| p.id.clone())
            .collect()
    }

    async fn append_message(&self, draft: MessageDraft) -> ChatMessage {
        let now = self.clock.now_utc_millis();
        let id = self.ids.next(now);
        let message = ChatMessage::from_draft(draft, id, Timestamp::new(now));

        let mut state = self.state.lock().await;
        let log = state.logs.entry(message.room.clone()).or_default();
        log.push_back(message.clone());
        // 追記と切り詰めは同一ロック内の 1 ステップ
        while log.len() > self.log_capacity {
            log.pop_front();
        }

        message
    }

    async fn messages_since(&self, room: &RoomName, after: MessageId) -> Vec<ChatMessage> {
        let state = self.state.lock().await;
        state
            .logs
            .get(room)
            .map(|log| log.iter().filter(|m| m.id > after).cloned().collect())
            .unwrap_or_default()
    }

    async fn sweep_stale(&self, now: Timestamp, threshold_millis: i64) -> Vec<Participant> {
        let mut state = self.state.lock().await;
        let stale_ids: Vec<ConnectionId> = state
            .participants
            .values()
            .filter(|p| {
                p.transport == TransportKind::Poll
                    && now.millis_since(p.last_seen) > threshold_millis
            })
            .map(|p| p.id.clone())
            .collect();

        stale_ids
            .iter()
            .filter_map(|id| state.participants.remove(id))
            .collect()
    }
}
