//! The `EventSource` trait — the transport abstraction for event feeds.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::descriptor::ServerDescriptor;
use crate::error::TransportError;

/// One wire frame from the feed: an optional channel name plus the raw
/// payload text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFrame {
    /// Named channel (`playing`, `notification`, `ping`); `None` for
    /// plain unnamed messages.
    pub channel: Option<String>,
    /// Raw payload text; JSON on every meaningful channel.
    pub data: String,
}

impl EventFrame {
    /// An unnamed message frame.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            channel: None,
            data: data.into(),
        }
    }

    /// A frame on a named channel.
    pub fn named(channel: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            data: data.into(),
        }
    }

    /// Keepalive frames carry no payload worth parsing; their receipt
    /// alone re-arms the heartbeat.
    pub fn is_ping(&self) -> bool {
        self.channel.as_deref() == Some("ping")
    }
}

/// Items produced by an open feed. A stream error is fatal to the
/// connection that produced it.
pub type FrameStream = BoxStream<'static, Result<EventFrame, TransportError>>;

/// The async trait every event-feed transport implements.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and is consumed as `Arc<dyn EventSource>`,
/// so clients can be driven by a fake transport in tests.
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Open a live feed to `server`.
    ///
    /// Resolves once the subscription is established; frames then arrive
    /// on the returned stream. Dropping the stream closes the feed and
    /// releases everything registered for it.
    async fn open(&self, server: &ServerDescriptor) -> Result<FrameStream, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_detection() {
        assert!(EventFrame::named("ping", "").is_ping());
        assert!(!EventFrame::named("playing", "{}").is_ping());
        assert!(!EventFrame::message("{}").is_ping());
    }
}
