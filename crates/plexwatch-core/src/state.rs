//! Connection lifecycle state and the observable status snapshot.
//!
//! State transitions:
//! - `Disconnected` → `Connecting`:   `connect()` called
//! - `Connecting`   → `Connected`:    feed opened within the activity window
//! - `Connecting` / `Connected` → `Reconnecting`: transport failure or
//!   heartbeat timeout with retries remaining
//! - `Reconnecting` → `Connecting`:   backoff delay elapsed
//! - any error path → `Fallback`:     retry budget exhausted
//! - any state → `Disconnected`:      `disconnect()` called

use std::time::SystemTime;

/// Where a client currently sits in its connection lifecycle.
///
/// Exactly one state holds at any time. `Fallback` is terminal for the
/// automatic recovery machinery: only an external `connect()` or
/// `disconnect()` moves the client out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No feed and no recovery scheduled.
    Disconnected,
    /// Opening the feed; bounded by the activity window.
    Connecting,
    /// Feed is live and the heartbeat is armed.
    Connected,
    /// Waiting out a backoff delay before the next attempt.
    Reconnecting,
    /// Retries exhausted. Consumers should switch to an alternative data
    /// path (e.g. polling) until the client is revived externally.
    Fallback,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Read-only view of one client's connection, recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    /// Opaque identifier of the monitored server.
    pub server_id: String,
    /// Human-readable server name.
    pub server_name: String,
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// When the feed last opened successfully. Cleared on disconnect.
    pub connected_at: Option<SystemTime>,
    /// When the last frame (including keepalives) arrived.
    pub last_event_at: Option<SystemTime>,
    /// Consecutive failed attempts since the last successful connect.
    pub reconnect_attempts: u32,
    /// Message of the most recent error, if any.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "reconnecting");
        assert_eq!(ConnectionState::Fallback.to_string(), "fallback");
    }
}
