//! Incremental parser for OpenAI-style server-sent-event streams.
//!
//! The chat-completions endpoint with `stream: true` responds with lines of
//! the form `data: {json}` where the payload carries
//! `choices[0].delta.content`, terminated by a literal `data: [DONE]` line.
//! HTTP chunks do not align with line boundaries, so [`SseParser`] buffers
//! the trailing partial line between [`push`](SseParser::push) calls.

use serde_json::Value;

// ---------------------------------------------------------------------------
// SseEvent
// ---------------------------------------------------------------------------

/// One parsed event from the completion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// An incremental text fragment.
    Delta(String),
    /// The `[DONE]` terminator — no further fragments follow.
    Done,
}

// ---------------------------------------------------------------------------
// SseParser
// ---------------------------------------------------------------------------

/// Stateful line-oriented SSE parser.
///
/// Feed raw HTTP body chunks with [`push`](SseParser::push); complete lines
/// are parsed immediately and the remainder is carried over.  Splitting at
/// `\n` is UTF-8 safe, so multi-byte characters straddling a chunk boundary
/// are reassembled before decoding.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a body chunk and return every event completed by it, in order.
    ///
    /// Events after a [`SseEvent::Done`] are not parsed; callers stop reading
    /// the body once `Done` is seen.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = parse_line(line.trim()) {
                let done = event == SseEvent::Done;
                events.push(event);
                if done {
                    return events;
                }
            }
        }
        events
    }
}

/// Parse one complete SSE line.
///
/// Returns `None` for blank lines, comments, non-`data:` fields, payloads
/// that are not valid JSON, and deltas with no text content (e.g. the
/// role-announcement chunk).
fn parse_line(line: &str) -> Option<SseEvent> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return Some(SseEvent::Done);
    }

    let value: Value = serde_json::from_str(data).ok()?;
    let content = value["choices"][0]["delta"]["content"].as_str()?;
    if content.is_empty() {
        return None;
    }
    Some(SseEvent::Delta(content.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(text: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({ "choices": [{ "delta": { "content": text } }] })
        )
    }

    #[test]
    fn parses_single_delta() {
        let mut parser = SseParser::new();
        let events = parser.push(delta_line("Hello").as_bytes());
        assert_eq!(events, vec![SseEvent::Delta("Hello".into())]);
    }

    #[test]
    fn parses_multiple_deltas_in_one_chunk() {
        let mut parser = SseParser::new();
        let chunk = format!("{}{}", delta_line("Hel"), delta_line("lo"));
        let events = parser.push(chunk.as_bytes());
        assert_eq!(
            events,
            vec![
                SseEvent::Delta("Hel".into()),
                SseEvent::Delta("lo".into())
            ]
        );
    }

    #[test]
    fn buffers_partial_line_across_pushes() {
        let mut parser = SseParser::new();
        let line = delta_line("split");
        let (a, b) = line.split_at(10);

        assert!(parser.push(a.as_bytes()).is_empty());
        assert_eq!(
            parser.push(b.as_bytes()),
            vec![SseEvent::Delta("split".into())]
        );
    }

    #[test]
    fn reassembles_multibyte_char_split_across_chunks() {
        let mut parser = SseParser::new();
        let line = delta_line("héllo");
        let bytes = line.as_bytes();
        // Split inside the two-byte 'é' sequence.
        let split = line.find('é').unwrap() + 1;

        assert!(parser.push(&bytes[..split]).is_empty());
        assert_eq!(
            parser.push(&bytes[split..]),
            vec![SseEvent::Delta("héllo".into())]
        );
    }

    #[test]
    fn done_terminates_parsing() {
        let mut parser = SseParser::new();
        let chunk = format!("{}data: [DONE]\n{}", delta_line("a"), delta_line("after"));
        let events = parser.push(chunk.as_bytes());
        assert_eq!(events, vec![SseEvent::Delta("a".into()), SseEvent::Done]);
    }

    #[test]
    fn ignores_blank_lines_and_comments() {
        let mut parser = SseParser::new();
        let events = parser.push(b"\n: keep-alive\nevent: ping\n");
        assert!(events.is_empty());
    }

    #[test]
    fn ignores_role_announcement_chunk() {
        let mut parser = SseParser::new();
        let chunk = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n";
        assert!(parser.push(chunk.as_bytes()).is_empty());
    }

    #[test]
    fn ignores_malformed_json_payload() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"data: {not json}\n").is_empty());
    }
}
