//! `EventSource` implementation over a long-lived HTTP event stream.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use plexwatch_core::descriptor::ServerDescriptor;
use plexwatch_core::error::TransportError;
use plexwatch_core::transport::{EventFrame, EventSource, FrameStream};

use crate::endpoint;
use crate::parser::SseParser;

/// Configuration for the SSE transport.
#[derive(Debug, Clone)]
pub struct SseConfig {
    /// TCP/TLS connect timeout for the subscription request.
    pub connect_timeout: Duration,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// SSE transport backed by `reqwest`.
pub struct SseEventSource {
    http: reqwest::Client,
}

impl SseEventSource {
    pub fn new(config: SseConfig) -> Self {
        // Only the connect phase gets a timeout. The feed itself is
        // expected to stay open indefinitely; liveness while connected is
        // the client's heartbeat concern, not the transport's.
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { http }
    }
}

impl Default for SseEventSource {
    fn default() -> Self {
        Self::new(SseConfig::default())
    }
}

#[async_trait]
impl EventSource for SseEventSource {
    async fn open(&self, server: &ServerDescriptor) -> Result<FrameStream, TransportError> {
        let url = endpoint::events_url(&server.base_url);
        tracing::debug!(server = %server.name, url = %url, "opening event stream");

        let resp = self
            .http
            .get(&url)
            .query(&[("X-Plex-Token", server.token.as_str())])
            .header("X-Plex-Token", &server.token)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request rejected");
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                reason.to_string()
            } else {
                truncate(body.trim(), 200)
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mut parser = SseParser::new();
        let frames = resp
            .bytes_stream()
            .flat_map(move |chunk| {
                let items: Vec<Result<EventFrame, TransportError>> = match chunk {
                    Ok(bytes) => parser.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(TransportError::Stream(e.to_string()))],
                };
                futures::stream::iter(items)
            })
            .boxed();

        Ok(frames)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_body_unchanged() {
        assert_eq!(truncate("unauthorized", 200), "unauthorized");
    }

    #[test]
    fn truncate_long_body() {
        let long = "x".repeat(300);
        let cut = truncate(&long, 200);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }
}
