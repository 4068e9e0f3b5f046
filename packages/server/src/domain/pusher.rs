//! メッセージ送信（通知）の trait 定義
//!
//! push トランスポートの接続ごとのチャンネルを管理し、UseCase 層からの
//! ブロードキャストを仲介する。poll 参加者はチャンネルを持たないため、
//! ブロードキャスト時に未登録の ID はスキップされる。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ConnectionId;

/// クライアントへの送信チャンネル（JSON 文字列を渡す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続のチャンネルを登録する
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel);

    /// 接続のチャンネルを登録解除する
    async fn unregister_client(&self, id: &ConnectionId);

    /// 特定の接続にメッセージを送信する
    async fn push_to(&self, id: &ConnectionId, content: &str) -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージを送信する
    ///
    /// 一部の送信失敗・チャンネル未登録は許容され、残りの対象への送信は
    /// 継続される。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str);
}
