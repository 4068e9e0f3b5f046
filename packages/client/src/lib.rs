//! CLI chat client for irori.
//!
//! いずれのトランスポートでも、受信したイベントは [`mirror::ChatMirror`]
//! に集約されてから表示されます。push（WebSocket）と pull（HTTP polling）
//! はワイヤ契約が違うだけで、ミラーの観測結果は一致します。

mod error;
mod formatter;
pub mod mirror;
pub mod poll;
mod push;
mod runner;
mod ui;

pub use error::ClientError;
pub use runner::{run_poll_client, run_push_client};
