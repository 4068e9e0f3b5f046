//! UseCase 層のエラー型定義

use thiserror::Error;

/// 指定された接続 ID の参加者がレジストリに存在しない
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("participant '{0}' is not registered")]
pub struct ParticipantNotFoundError(pub String);

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 送信者がレジストリに存在しない
    #[error("participant '{0}' is not registered")]
    UnknownParticipant(String),

    /// trim 後の本文が空（メッセージは生成されない）
    #[error("message text is empty after trimming")]
    EmptyText,
}
