//! Infrastructure 層
//!
//! ドメイン層が定義する trait（`ChatAuthority`, `MessagePusher`）の具体的な
//! 実装と、ワイヤ境界の DTO を提供します。

pub mod authority;
pub mod dto;
pub mod pusher;
