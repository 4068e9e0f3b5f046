//! Server state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ChatAuthority;
use crate::usecase::{
    FetchUpdatesUseCase, JoinParticipantUseCase, LeaveParticipantUseCase, SendMessageUseCase,
    SetTypingUseCase,
};

/// Shared application state
pub struct AppState {
    /// JoinParticipantUseCase（join / ルーム切り替えのユースケース）
    pub join_participant_usecase: Arc<JoinParticipantUseCase>,
    /// LeaveParticipantUseCase（leave / 切断のユースケース）
    pub leave_participant_usecase: Arc<LeaveParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// SetTypingUseCase（タイピング通知のユースケース）
    pub set_typing_usecase: Arc<SetTypingUseCase>,
    /// FetchUpdatesUseCase（pull の差分取得ユースケース）
    pub fetch_updates_usecase: Arc<FetchUpdatesUseCase>,
    /// ルーム一覧 API 用の権威への読み取りアクセス
    pub authority: Arc<dyn ChatAuthority>,
    /// push 接続のアイドルタイムアウト
    pub idle_timeout: Duration,
}
