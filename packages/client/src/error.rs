//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server rejected a request (4xx with an error body)
    #[error("Server rejected the request: {0}")]
    Rejected(String),

    /// A server payload could not be decoded
    #[error("Malformed server payload: {0}")]
    MalformedPayload(String),

    /// An operation requires a join that has not happened yet
    #[error("Not joined: call join before sending")]
    NotJoined,
}
