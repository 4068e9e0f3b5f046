//! エンティティ定義
//!
//! プレゼンスレジストリに登録される参加者と、メッセージログに記録される
//! チャットメッセージ。どちらもサーバ権威のみが変更し、クライアントは
//! 読み取り専用のコピーを保持する。

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, DisplayName, MessageId, MessageText, RoomName, Timestamp};

/// 参加者がどちらのトランスポートで接続しているか
///
/// push 接続の寿命はトランスポート（切断・アイドルタイムアウト）が管理し、
/// poll 参加者のみがステイルネススイープの対象になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    Push,
    Poll,
}

/// チャット参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// 接続識別子（ロースター上の一意キー）
    pub id: ConnectionId,
    /// 表示名（join 時にクライアントが申告）
    pub display_name: DisplayName,
    /// 現在参加しているルーム
    pub room: RoomName,
    /// 最終アクティビティ時刻（poll リクエスト / join / 送信で更新）
    pub last_seen: Timestamp,
    /// 接続しているトランスポート
    pub transport: TransportKind,
}

impl Participant {
    pub fn new(
        id: ConnectionId,
        display_name: DisplayName,
        room: RoomName,
        last_seen: Timestamp,
        transport: TransportKind,
    ) -> Self {
        Self {
            id,
            display_name,
            room,
            last_seen,
            transport,
        }
    }
}

/// ログに追記する前のメッセージ
///
/// `id` と `created_at` は権威が追記時に採番・付与するため、ドラフトには
/// 含まれない（リクエスト到着時刻ではなく追記時刻で採番する）。
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub text: MessageText,
    pub author: DisplayName,
    /// 送信者の接続識別子。システムメッセージでは `None`
    pub author_connection_id: Option<ConnectionId>,
    pub room: RoomName,
    pub system: bool,
}

impl MessageDraft {
    /// 参加者が送信した通常のチャットメッセージ
    pub fn chat(
        text: MessageText,
        author: DisplayName,
        author_connection_id: ConnectionId,
        room: RoomName,
    ) -> Self {
        Self {
            text,
            author,
            author_connection_id: Some(author_connection_id),
            room,
            system: false,
        }
    }

    /// サーバが生成するシステムメッセージ（join / leave の告知）
    pub fn system(text: MessageText, room: RoomName) -> Self {
        Self {
            text,
            author: DisplayName::system(),
            author_connection_id: None,
            room,
            system: true,
        }
    }
}

/// ログに記録されたチャットメッセージ
///
/// `author` は送信時点の表示名のコピーであり、参加者への参照ではない。
/// 送信後に改名しても履歴は遡って変わらない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 単調非減少のメッセージ識別子（追記時に採番）
    pub id: MessageId,
    /// 本文（trim 済み、非空）
    pub text: MessageText,
    /// 送信時点の表示名
    pub author: DisplayName,
    /// 送信者の接続識別子（システムメッセージでは `None`）
    pub author_connection_id: Option<ConnectionId>,
    /// メッセージの属するルーム
    pub room: RoomName,
    /// サーバ受理時刻（クライアントの作成時刻ではない）
    pub created_at: Timestamp,
    /// システムメッセージかどうか
    pub system: bool,
}

impl ChatMessage {
    /// ドラフトに採番結果と受理時刻を与えて確定させる
    pub fn from_draft(draft: MessageDraft, id: MessageId, created_at: Timestamp) -> Self {
        Self {
            id,
            text: draft.text,
            author: draft.author,
            author_connection_id: draft.author_connection_id,
            room: draft.room,
            created_at,
            system: draft.system,
        }
    }
}
