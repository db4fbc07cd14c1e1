//! plexwatch-core — foundation traits and types for Plexwatch.
//!
//! # Overview
//!
//! Plexwatch ingests real-time playback events from Plex Media Server
//! over a persistent event-stream connection. The core crate defines:
//!
//! - [`EventSource`] — the transport capability trait clients are driven by
//! - [`ConnectionState`] / [`ConnectionStatus`] — observable lifecycle
//! - [`ServerDescriptor`] — identity and credentials of one server
//! - [`PlaybackNotification`] — normalized playback event payloads
//! - [`EventBus`] — the fixed six-signal dispatch surface
//! - [`policy`] module — jittered exponential reconnect backoff
//! - [`TransportError`] — structured transport error type

pub mod descriptor;
pub mod error;
pub mod events;
pub mod notification;
pub mod policy;
pub mod state;
pub mod transport;

pub use descriptor::ServerDescriptor;
pub use error::TransportError;
pub use events::{ClientEvent, EventBus, SessionEvent, Signal};
pub use notification::{parse_notifications, PlaybackNotification, PlaybackState};
pub use policy::{BackoffConfig, ReconnectPolicy};
pub use state::{ConnectionState, ConnectionStatus};
pub use transport::{EventFrame, EventSource, FrameStream};
