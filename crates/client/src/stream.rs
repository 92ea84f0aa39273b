//! Event-stream consumer for `POST /api/chat/stream`.
//!
//! Bytes arrive in arbitrary pieces: a `data:` line, or a single UTF-8
//! character, may be split across reads. [`SseLineDecoder`] buffers raw bytes
//! and only hands out complete lines, so nothing is parsed before its line
//! terminator has been seen.

use futures::{Stream, StreamExt};
use log::{debug, warn};
use std::fmt::Display;

use promptdeck_core::chat::{StreamFrame, DATA_PREFIX};

/// Reported when the body ends without a finished or error frame.
pub const STREAM_ENDED_EARLY: &str = "Stream ended before completion";

/// Splits a byte stream into lines, keeping any partial trailing line.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns every line completed by them, without
    /// the `\n` (or `\r\n`) terminator.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Bytes received after the last line terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Flushes the unterminated remainder once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Parses one line. Non-`data:` lines, empty payloads, and malformed JSON
/// yield `None`; malformed JSON is logged.
pub fn parse_line(line: &str) -> Option<StreamFrame> {
    let payload = line.trim().strip_prefix(DATA_PREFIX.trim_end())?.trim();
    if payload.is_empty() {
        return None;
    }
    match StreamFrame::decode(payload) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("Failed to parse stream payload {}: {}", payload, e);
            None
        }
    }
}

/// Callbacks fired while a reply streams in.
pub trait StreamHandler {
    /// Cumulative reply text so far.
    fn on_chunk(&mut self, content: &str);
    /// Final reply text. Fired once, right after the last `on_chunk`.
    fn on_complete(&mut self, content: &str);
    fn on_error(&mut self, message: &str);
}

/// How a consumed stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed { content: String },
    Failed { message: String },
    /// The body ended without a terminal frame.
    Interrupted,
}

/// Reads `stream` to its first terminal frame, driving `handler` in frame
/// order. Bytes after the terminal frame are never read.
pub async fn consume_stream<S, B, E, H>(stream: S, handler: &mut H) -> StreamOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    H: StreamHandler + ?Sized,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = SseLineDecoder::new();

    while let Some(item) = stream.next().await {
        let bytes = match item {
            Ok(bytes) => bytes,
            Err(e) => {
                let message = e.to_string();
                handler.on_error(&message);
                return StreamOutcome::Failed { message };
            }
        };

        for line in decoder.push(bytes.as_ref()) {
            if let Some(outcome) = dispatch(&line, handler) {
                return outcome;
            }
        }
    }

    if let Some(line) = decoder.finish() {
        if let Some(outcome) = dispatch(&line, handler) {
            return outcome;
        }
    }

    debug!("Event stream closed without a terminal frame");
    handler.on_error(STREAM_ENDED_EARLY);
    StreamOutcome::Interrupted
}

fn dispatch<H: StreamHandler + ?Sized>(line: &str, handler: &mut H) -> Option<StreamOutcome> {
    match parse_line(line)? {
        StreamFrame::Error { error } if error.is_empty() => {
            debug!("Ignoring error frame without a message");
            None
        }
        StreamFrame::Error { error } => {
            handler.on_error(&error);
            Some(StreamOutcome::Failed { message: error })
        }
        StreamFrame::Chunk(chunk) => {
            handler.on_chunk(&chunk.content);
            if !chunk.finished {
                return None;
            }
            handler.on_complete(&chunk.content);
            Some(StreamOutcome::Completed {
                content: chunk.content,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use promptdeck_core::chat::StreamChunk;
    use proptest::prelude::*;

    #[derive(Debug, Default, PartialEq)]
    struct Recorder {
        events: Vec<String>,
    }

    impl StreamHandler for Recorder {
        fn on_chunk(&mut self, content: &str) {
            self.events.push(format!("chunk:{}", content));
        }
        fn on_complete(&mut self, content: &str) {
            self.events.push(format!("complete:{}", content));
        }
        fn on_error(&mut self, message: &str) {
            self.events.push(format!("error:{}", message));
        }
    }

    fn body(frames: &[StreamFrame]) -> Vec<u8> {
        frames
            .iter()
            .map(|f| f.encode().unwrap())
            .collect::<String>()
            .into_bytes()
    }

    fn split_at(bytes: &[u8], cuts: &[usize]) -> Vec<Result<Vec<u8>, String>> {
        let mut points: Vec<usize> = cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
        points.push(0);
        points.push(bytes.len());
        points.sort_unstable();
        points.dedup();
        points
            .windows(2)
            .map(|w| Ok(bytes[w[0]..w[1]].to_vec()))
            .collect()
    }

    async fn run(pieces: Vec<Result<Vec<u8>, String>>) -> (StreamOutcome, Vec<String>) {
        let mut recorder = Recorder::default();
        let outcome = consume_stream(stream::iter(pieces), &mut recorder).await;
        (outcome, recorder.events)
    }

    #[test]
    fn test_decoder_keeps_partial_line() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(b"data: {\"con").is_empty());
        assert_eq!(decoder.pending(), b"data: {\"con");
        let lines = decoder.push(b"tent\":\"a\"}\r\n\n");
        assert_eq!(lines, vec!["data: {\"content\":\"a\"}".to_string(), String::new()]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_decoder_reassembles_split_utf8() {
        let text = "data: {\"content\":\"héllo 👋\",\"finished\":false}\n";
        let bytes = text.as_bytes();
        // Cut inside the four-byte emoji.
        let cut = text.find('👋').unwrap() + 2;

        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(&bytes[..cut]).is_empty());
        let lines = decoder.push(&bytes[cut..]);
        assert_eq!(lines, vec![text.trim_end().to_string()]);
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(
            parse_line("data: {\"content\":\"Hi\",\"finished\":true}"),
            Some(StreamFrame::from(StreamChunk::finished("Hi")))
        );
        assert_eq!(
            parse_line("  data: {\"error\":\"boom\"}  "),
            Some(StreamFrame::error("boom"))
        );
        assert_eq!(
            parse_line("data: {\"content\":\"Hi\"}"),
            Some(StreamFrame::from(StreamChunk::partial("Hi")))
        );
        assert_eq!(parse_line("data: "), None);
        assert_eq!(parse_line(": keep-alive"), None);
        assert_eq!(parse_line("event: message"), None);
        assert_eq!(parse_line("data: {not json"), None);
    }

    #[tokio::test]
    async fn test_consume_stream_end_to_end() {
        let bytes = body(&[
            StreamChunk::partial("H").into(),
            StreamChunk::partial("He").into(),
            StreamChunk::finished("Hello").into(),
        ]);

        let (outcome, events) = run(vec![Ok(bytes)]).await;

        assert_eq!(
            outcome,
            StreamOutcome::Completed {
                content: "Hello".to_string()
            }
        );
        assert_eq!(
            events,
            vec!["chunk:H", "chunk:He", "chunk:Hello", "complete:Hello"]
        );
    }

    #[tokio::test]
    async fn test_consume_stream_stops_at_error_frame() {
        let mut bytes = body(&[
            StreamChunk::partial("Hel").into(),
            StreamFrame::error("Streaming failed: reset"),
        ]);
        bytes.extend(body(&[StreamChunk::finished("ignored").into()]));

        let (outcome, events) = run(vec![Ok(bytes)]).await;

        assert_eq!(
            outcome,
            StreamOutcome::Failed {
                message: "Streaming failed: reset".to_string()
            }
        );
        assert_eq!(events, vec!["chunk:Hel", "error:Streaming failed: reset"]);
    }

    #[tokio::test]
    async fn test_consume_stream_skips_malformed_payloads() {
        let mut bytes = b"data: {oops\n\n".to_vec();
        bytes.extend(body(&[StreamChunk::finished("ok").into()]));

        let (_, events) = run(vec![Ok(bytes)]).await;
        assert_eq!(events, vec!["chunk:ok", "complete:ok"]);
    }

    #[tokio::test]
    async fn test_consume_stream_ignores_empty_error() {
        let mut bytes = body(&[StreamChunk::partial("He").into(), StreamFrame::error("")]);
        bytes.extend(body(&[StreamChunk::finished("Hello").into()]));

        let (outcome, events) = run(vec![Ok(bytes)]).await;

        assert_eq!(
            outcome,
            StreamOutcome::Completed {
                content: "Hello".to_string()
            }
        );
        assert_eq!(events, vec!["chunk:He", "chunk:Hello", "complete:Hello"]);
    }

    #[tokio::test]
    async fn test_consume_stream_reports_early_end() {
        let bytes = body(&[StreamChunk::partial("Hel").into()]);

        let (outcome, events) = run(vec![Ok(bytes)]).await;

        assert_eq!(outcome, StreamOutcome::Interrupted);
        assert_eq!(
            events,
            vec!["chunk:Hel".to_string(), format!("error:{}", STREAM_ENDED_EARLY)]
        );
    }

    #[tokio::test]
    async fn test_consume_stream_reports_transport_error() {
        let (outcome, events) = run(vec![
            Ok(body(&[StreamChunk::partial("a").into()])),
            Err("connection reset".to_string()),
        ])
        .await;

        assert_eq!(
            outcome,
            StreamOutcome::Failed {
                message: "connection reset".to_string()
            }
        );
        assert_eq!(events, vec!["chunk:a", "error:connection reset"]);
    }

    #[tokio::test]
    async fn test_unterminated_last_frame_is_still_delivered() {
        let bytes = b"data: {\"content\":\"done\",\"finished\":true}".to_vec();
        let (outcome, _) = run(vec![Ok(bytes)]).await;
        assert_eq!(
            outcome,
            StreamOutcome::Completed {
                content: "done".to_string()
            }
        );
    }

    proptest! {
        #[test]
        fn prop_callbacks_follow_frame_order_for_any_split(
            cuts in proptest::collection::vec(0usize..400, 0..12)
        ) {
            let bytes = body(&[
                StreamChunk::partial("Grüß").into(),
                StreamChunk::partial("Grüß dich 🌍").into(),
                StreamChunk::finished("Grüß dich 🌍!").into(),
            ]);
            let pieces = split_at(&bytes, &cuts);

            let runtime = tokio::runtime::Runtime::new().unwrap();
            let (outcome, events) = runtime.block_on(run(pieces));

            prop_assert_eq!(
                outcome,
                StreamOutcome::Completed { content: "Grüß dich 🌍!".to_string() }
            );
            prop_assert_eq!(
                events,
                vec![
                    "chunk:Grüß".to_string(),
                    "chunk:Grüß dich 🌍".to_string(),
                    "chunk:Grüß dich 🌍!".to_string(),
                    "complete:Grüß dich 🌍!".to_string(),
                ]
            );
        }
    }
}
