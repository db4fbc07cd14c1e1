//! Incremental decoder for the SSE wire format.
//!
//! Events are blocks of `field: value` lines terminated by a blank line.
//! Only the `event` and `data` fields matter for the feed; comment lines
//! (leading `:`) and the `id`/`retry` fields are skipped. Multiple `data`
//! lines within one block are joined with `\n`. Input may arrive split at
//! arbitrary byte boundaries; unterminated tails stay buffered until the
//! next chunk.

use plexwatch_core::transport::EventFrame;

/// Stateful SSE decoder. Feed it raw body chunks, collect completed
/// frames.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    channel: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk of bytes, returning every frame it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<EventFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(frame) = self.take_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn take_line(&mut self, line: &str) -> Option<EventFrame> {
        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.channel = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {} // id, retry — not used by this feed
        }
        None
    }

    fn flush(&mut self) -> Option<EventFrame> {
        let channel = self.channel.take();
        let data = std::mem::take(&mut self.data);
        if channel.is_none() && data.is_empty() {
            return None;
        }
        Some(EventFrame {
            channel,
            data: data.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(input: &str) -> Vec<EventFrame> {
        SseParser::new().feed(input.as_bytes())
    }

    #[test]
    fn unnamed_message() {
        let frames = feed_all("data: {\"state\":\"playing\"}\n\n");
        assert_eq!(frames, vec![EventFrame::message("{\"state\":\"playing\"}")]);
    }

    #[test]
    fn named_event() {
        let frames = feed_all("event: playing\ndata: {}\n\n");
        assert_eq!(frames, vec![EventFrame::named("playing", "{}")]);
    }

    #[test]
    fn ping_without_payload() {
        let frames = feed_all("event: ping\ndata\n\n");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_ping());
        assert_eq!(frames[0].data, "");
    }

    #[test]
    fn multi_line_data_joined() {
        let frames = feed_all("data: line one\ndata: line two\n\n");
        assert_eq!(frames[0].data, "line one\nline two");
    }

    #[test]
    fn comments_and_unknown_fields_skipped() {
        let frames = feed_all(": keepalive comment\nid: 7\nretry: 3000\ndata: x\n\n");
        assert_eq!(frames, vec![EventFrame::message("x")]);
    }

    #[test]
    fn crlf_input() {
        let frames = feed_all("event: ping\r\ndata: {}\r\n\r\n");
        assert_eq!(frames, vec![EventFrame::named("ping", "{}")]);
    }

    #[test]
    fn split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"event: play").is_empty());
        assert!(parser.feed(b"ing\ndata: {\"a\":").is_empty());
        let frames = parser.feed(b"1}\n\n");
        assert_eq!(frames, vec![EventFrame::named("playing", "{\"a\":1}")]);
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        let frames = feed_all("data: a\n\nevent: ping\ndata\n\ndata: b\n\n");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].data, "a");
        assert!(frames[1].is_ping());
        assert_eq!(frames[2].data, "b");
    }

    #[test]
    fn blank_lines_between_frames_emit_nothing() {
        let frames = feed_all("\n\n\ndata: x\n\n\n");
        assert_eq!(frames, vec![EventFrame::message("x")]);
    }

    #[test]
    fn unterminated_tail_stays_buffered() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: partial").is_empty());
        // Nothing emitted until the blank-line terminator arrives.
        assert!(parser.feed(b" still going").is_empty());
        let frames = parser.feed(b"\n\n");
        assert_eq!(frames[0].data, "partial still going");
    }
}
