//! UseCase 層
//!
//! トランスポートに依存しない操作を 1 操作 1 構造体で提供します。
//! push（WebSocket）と pull（HTTP polling）のハンドラは同じ UseCase を
//! 呼び出し、メッセージログとプレゼンスレジストリを共有します。

mod error;
mod fetch_updates;
mod join_participant;
mod leave_participant;
mod send_message;
mod set_typing;

pub use error::{ParticipantNotFoundError, SendMessageError};
pub use fetch_updates::{FetchOutcome, FetchUpdatesUseCase};
pub use join_participant::{JoinOutcome, JoinParticipantUseCase};
pub use leave_participant::{LeaveOutcome, LeaveParticipantUseCase};
pub use send_message::{SendMessageUseCase, SendOutcome};
pub use set_typing::{SetTypingUseCase, TypingOutcome};
