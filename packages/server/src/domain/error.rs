//! ドメイン層のエラー型定義

use thiserror::Error;

/// 値オブジェクトの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("message text must not be empty after trimming")]
    EmptyMessageText,
}

/// メッセージ送信（push）のエラー
#[derive(Debug, Error)]
pub enum MessagePushError {
    /// 対象クライアントのチャンネルが登録されていない
    #[error("client '{0}' is not registered for push delivery")]
    ClientNotFound(String),

    /// チャンネルへの送信に失敗した（受信側が閉じている等）
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
