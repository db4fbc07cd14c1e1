//! plexwatch-client — stateful event-stream client with auto-recovery.
//!
//! # Features
//! - One live feed subscription per monitored server
//! - Heartbeat-based dead-connection detection
//! - Jittered exponential reconnect backoff with a capped attempt budget
//! - Terminal fallback state once retries are exhausted
//! - Typed signal emission via `plexwatch_core::EventBus`

pub mod client;

pub use client::{ClientConfig, EventStreamClient};
