//! Chat and presence synchronization server.
//!
//! This crate provides a single in-process chat authority (message log and
//! presence registry) exposed over two transports: a WebSocket push channel
//! and an HTTP polling surface for environments where a persistent
//! bidirectional connection is unavailable.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
