//! Recovery policy — reconnect scheduling for a broken feed.

pub mod backoff;

pub use backoff::{BackoffConfig, ReconnectPolicy};
