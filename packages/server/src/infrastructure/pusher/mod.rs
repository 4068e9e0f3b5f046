//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: WebSocket 接続のチャンネルマップを使った実装

mod websocket;

pub use websocket::WebSocketMessagePusher;
