//! plexwatch-sse — Server-Sent-Events transport for the Plex event feed.
//!
//! # Features
//! - Long-lived `text/event-stream` GET with token authentication
//! - Incremental SSE decoding (named events, multi-line data, CRLF input)
//! - Maps request and mid-stream failures into `TransportError`

pub mod endpoint;
pub mod parser;
pub mod transport;

pub use parser::SseParser;
pub use transport::{SseConfig, SseEventSource};
