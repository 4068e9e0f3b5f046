//! Chat Authority の実装
//!
//! 現在はインメモリ実装のみ。チャット履歴はエフェメラルで、プロセス再起動で
//! 失われる（仕様上の非目標）。

mod inmemory;

pub use inmemory::{InMemoryChatAuthority, MESSAGE_LOG_CAPACITY};
