//! Transport-level error types.

use thiserror::Error;

/// Errors raised while opening or consuming an event feed.
///
/// Every variant is fatal to the current connection and routes into the
/// reconnect-or-fallback path. Per-message parse failures are deliberately
/// not represented here — a malformed payload is dropped without touching
/// the connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be made at all (DNS, connection refused, TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered the subscription request with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The open feed broke mid-flight or was closed by the server.
    #[error("stream error: {0}")]
    Stream(String),

    /// No traffic (not even a keepalive) within the activity window.
    #[error("connection timed out: no events received within {ms}ms")]
    Timeout { ms: u64 },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_carries_code() {
        let err = TransportError::Status {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }

    #[test]
    fn timeout_message_names_window() {
        let err = TransportError::Timeout { ms: 30_000 };
        assert!(err.to_string().contains("30000ms"));
    }
}
