//! Shared utilities for the irori chat synchronization workspace.
//!
//! Both the server and the client crates depend on this crate for the
//! clock abstraction and logging setup.

pub mod logger;
pub mod time;
