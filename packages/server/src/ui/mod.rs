//! UI 層（トランスポート境界）
//!
//! axum のハンドラ、ルータ、共有状態を提供します。

pub mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerConfig, build_router};
