//! Chat Authority trait 定義
//!
//! メッセージログとプレゼンスレジストリを排他的に所有するプロセス内権威の
//! インターフェース。UseCase 層はこの trait に依存し、Infrastructure 層の
//! 具体的な実装には依存しない（依存性の逆転）。
//!
//! push / pull 両トランスポートが同一の権威を共有する。ログの容量制限と
//! ステイルネススイープは、独立したタイマーではなく要求処理に同期して
//! インラインで実行される。

use async_trait::async_trait;

use super::entity::{ChatMessage, MessageDraft, Participant};
use super::value_object::{ConnectionId, MessageId, RoomName, Timestamp};

/// `upsert_participant` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// 初回の join なら true、既存エントリの更新なら false
    pub newly_joined: bool,
    /// ルームが変わった場合、変更前のルーム
    pub previous_room: Option<RoomName>,
}

/// Chat Authority trait
///
/// 全ての変更操作はこの trait 経由で行われ、クライアントが状態を直接
/// 変更することはない。
#[async_trait]
pub trait ChatAuthority: Send + Sync {
    /// 参加者を登録または更新する（接続 ID をキーとした冪等な join）
    ///
    /// 同じ ID で再度呼ばれた場合は 2 回目のメタデータが勝ち、ロースターの
    /// エントリは増えない。ルームが変わった場合は変更前のルームを返す。
    async fn upsert_participant(&self, participant: Participant) -> UpsertOutcome;

    /// 参加者を削除する。存在した場合は削除されたエントリを返す
    async fn remove_participant(&self, id: &ConnectionId) -> Option<Participant>;

    /// 参加者を取得する
    async fn participant(&self, id: &ConnectionId) -> Option<Participant>;

    /// 参加者の最終アクティビティ時刻を更新する
    async fn touch(&self, id: &ConnectionId, at: Timestamp);

    /// ロースターを取得する（`room` 指定時はそのルームのみ、未指定は全体）
    async fn roster(&self, room: Option<&RoomName>) -> Vec<Participant>;

    /// 指定ルームの接続 ID 一覧を取得する（ブロードキャスト対象の選定用）
    async fn connection_ids_in_room(&self, room: &RoomName) -> Vec<ConnectionId>;

    /// メッセージをログに追記する
    ///
    /// ID と受理時刻は追記時に採番・付与される。容量超過時の先頭切り詰めは
    /// 追記と同一の論理ステップで行われ、部分的な変更は起こらない。
    async fn append_message(&self, draft: MessageDraft) -> ChatMessage;

    /// カーソルより新しいメッセージを追記順で取得する
    async fn messages_since(&self, room: &RoomName, after: MessageId) -> Vec<ChatMessage>;

    /// ステイルな poll 参加者を退去させ、退去したエントリを返す
    ///
    /// push 接続はトランスポートの切断遷移が寿命を管理するため対象外。
    async fn sweep_stale(&self, now: Timestamp, threshold_millis: i64) -> Vec<Participant>;
}
