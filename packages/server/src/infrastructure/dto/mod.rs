//! Data Transfer Objects (DTOs) for the chat wire contracts.
//!
//! DTOs are organized by protocol:
//! - `websocket`: push transport events (bidirectional, tagged by `type`)
//! - `http`: pull transport requests/responses (tagged by `action`)
//!
//! Every payload is a closed tagged variant validated at the boundary
//! before it touches shared state.

pub mod conversion;
pub mod http;
pub mod websocket;
