mod http;
mod poll;
mod websocket;

pub use http::{get_rooms, health_check};
pub use poll::{poll_act, poll_fetch};
pub use websocket::websocket_handler;
