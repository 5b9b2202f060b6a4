//! Incremental Server-Sent-Events decoder
//!
//! Turns a chunked HTTP response body into the ordered sequence of `data: `
//! payloads it carries:
//! - Framing: one event per `data: ` line, newline delimited
//! - Termination: `data: [DONE]` or end of input, whichever comes first
//! - Buffer: 1MB maximum for a single pending line
//!
//! The decoder knows nothing about providers; payloads are handed out as
//! opaque strings.

use crate::errors::{Result, SayError};
use futures_util::{Stream, StreamExt};

/// Maximum size of a single undelimited line (1MB)
pub const MAX_LINE_SIZE: usize = 1_048_576;

/// Prefix marking an SSE data line
pub const DATA_PREFIX: &str = "data: ";

/// Payload signalling that no further events follow
pub const DONE_SENTINEL: &str = "[DONE]";

/// One decoded `data: ` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    payload: String,
}

impl RawEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Payload with the `data: ` prefix removed
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn into_payload(self) -> String {
        self.payload
    }

    /// Whether this payload is the terminal `[DONE]` marker
    pub fn is_sentinel(&self) -> bool {
        self.payload == DONE_SENTINEL
    }
}

/// How a decoded stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `data: [DONE]` was observed
    Sentinel,

    /// The body ended without a sentinel
    EndOfInput,
}

/// Classification of one complete line
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Event(RawEvent),
    Done,
    Skip,
}

fn classify(line: &[u8]) -> SseLine {
    let text = String::from_utf8_lossy(line);
    match text.strip_prefix(DATA_PREFIX) {
        Some(DONE_SENTINEL) => SseLine::Done,
        Some(payload) => SseLine::Event(RawEvent::new(payload)),
        None => SseLine::Skip,
    }
}

/// Byte accumulator that hands out complete lines
///
/// Bytes stay raw until a newline arrives, so a multi-byte character split
/// across two transport chunks is decoded intact.
#[derive(Debug)]
struct LineBuffer {
    buffer: Vec<u8>,
    /// Bytes after the last newline in `buffer`
    pending: usize,
    max_line_size: usize,
}

impl LineBuffer {
    fn with_capacity(max_line_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            pending: 0,
            max_line_size,
        }
    }

    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);

        // Only the new bytes can hold a newline that shortens the pending tail
        self.pending = match bytes.iter().rposition(|&b| b == b'\n') {
            Some(idx) => bytes.len() - idx - 1,
            None => self.pending + bytes.len(),
        };
        if self.pending > self.max_line_size {
            return Err(SayError::LineTooLong {
                len: self.pending,
                max: self.max_line_size,
            });
        }

        Ok(())
    }

    /// Pop the next newline-terminated line, without its terminator
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Take whatever is left once the body has ended
    fn take_remainder(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            return None;
        }
        self.pending = 0;
        let mut line = std::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }
}

/// Provider-agnostic SSE reader over a chunked byte stream
///
/// Single pass: once [`next_event`](Self::next_event) returns `Ok(None)` or an
/// error, the decoder is finished and the underlying body is never polled
/// again. Dropping the decoder drops the body, which releases the connection.
pub struct EventStreamDecoder<S> {
    body: S,
    lines: LineBuffer,
    termination: Option<Termination>,
    failed: bool,
    events: usize,
}

impl<S, B, E> EventStreamDecoder<S>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<SayError>,
{
    /// Create decoder with the default line limit
    pub fn new(body: S) -> Self {
        Self::with_max_line_size(body, MAX_LINE_SIZE)
    }

    /// Create decoder with a custom line limit
    pub fn with_max_line_size(body: S, max_line_size: usize) -> Self {
        Self {
            body,
            lines: LineBuffer::with_capacity(max_line_size),
            termination: None,
            failed: false,
            events: 0,
        }
    }

    /// Next payload in arrival order, or `None` once the stream has ended
    ///
    /// Suspends only while waiting for the next transport chunk.
    pub async fn next_event(&mut self) -> Result<Option<RawEvent>> {
        loop {
            if self.is_finished() {
                return Ok(None);
            }

            while let Some(line) = self.lines.next_line() {
                match classify(&line) {
                    SseLine::Event(event) => {
                        self.events += 1;
                        return Ok(Some(event));
                    }
                    SseLine::Done => {
                        tracing::debug!(
                            events = self.events,
                            discarded_bytes = self.lines.len(),
                            "SSE sentinel received"
                        );
                        self.termination = Some(Termination::Sentinel);
                        return Ok(None);
                    }
                    SseLine::Skip => {}
                }
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    if let Err(err) = self.lines.push(chunk.as_ref()) {
                        self.failed = true;
                        return Err(err);
                    }
                }
                Some(Err(err)) => {
                    self.failed = true;
                    return Err(err.into());
                }
                None => return Ok(self.finish_at_end_of_input()),
            }
        }
    }

    fn finish_at_end_of_input(&mut self) -> Option<RawEvent> {
        let tail = self.lines.take_remainder().map(|line| classify(&line));
        match tail {
            Some(SseLine::Done) => {
                self.termination = Some(Termination::Sentinel);
                None
            }
            Some(SseLine::Event(event)) => {
                self.events += 1;
                self.termination = Some(Termination::EndOfInput);
                Some(event)
            }
            Some(SseLine::Skip) | None => {
                tracing::debug!(events = self.events, "SSE body ended without sentinel");
                self.termination = Some(Termination::EndOfInput);
                None
            }
        }
    }

    /// Convert into a lazy `Stream` of events
    pub fn into_stream(self) -> impl Stream<Item = Result<RawEvent>> {
        futures_util::stream::unfold(self, |mut decoder| async move {
            match decoder.next_event().await {
                Ok(Some(event)) => Some((Ok(event), decoder)),
                Ok(None) => None,
                Err(err) => Some((Err(err), decoder)),
            }
        })
    }
}

impl<S> EventStreamDecoder<S> {
    /// How the stream ended, once it has
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Number of events handed out so far
    pub fn events_decoded(&self) -> usize {
        self.events
    }

    pub fn is_finished(&self) -> bool {
        self.failed || self.termination.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::stream;
    use quickcheck_macros::quickcheck;

    type Chunk = std::result::Result<Bytes, std::io::Error>;

    fn body(chunks: &[&str]) -> impl Stream<Item = Chunk> + Unpin {
        let owned: Vec<Chunk> = chunks
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
            .collect();
        stream::iter(owned)
    }

    async fn drain<S>(decoder: &mut EventStreamDecoder<S>) -> Result<Vec<String>>
    where
        S: Stream<Item = Chunk> + Unpin,
    {
        let mut payloads = Vec::new();
        while let Some(event) = decoder.next_event().await? {
            payloads.push(event.into_payload());
        }
        Ok(payloads)
    }

    #[tokio::test]
    async fn test_events_before_sentinel() {
        let mut decoder = EventStreamDecoder::new(body(&[
            "data: {\"a\":1}\n\ndata: {\"a\":2}\n\ndata: [DONE]\n\n",
        ]));

        let payloads = drain(&mut decoder).await.unwrap();
        assert_eq!(payloads, vec![r#"{"a":1}"#, r#"{"a":2}"#]);
        assert_eq!(decoder.termination(), Some(Termination::Sentinel));
        assert_eq!(decoder.events_decoded(), 2);
    }

    #[tokio::test]
    async fn test_nothing_after_sentinel() {
        let mut decoder = EventStreamDecoder::new(body(&[
            "data: first\n",
            "data: [DONE]\n",
            "data: after\n",
        ]));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["first"]);
        assert!(decoder.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_end_of_input_without_sentinel() {
        let mut decoder = EventStreamDecoder::new(body(&["data: one\n\n", "data: two\n\n"]));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["one", "two"]);
        assert_eq!(decoder.termination(), Some(Termination::EndOfInput));
    }

    #[tokio::test]
    async fn test_line_split_across_chunks() {
        let mut decoder = EventStreamDecoder::new(body(&[
            "da",
            "ta: {\"completion\":",
            "\"Hi\"}\n",
            "\ndata: [DO",
            "NE]\n",
        ]));

        assert_eq!(
            drain(&mut decoder).await.unwrap(),
            vec![r#"{"completion":"Hi"}"#]
        );
        assert_eq!(decoder.termination(), Some(Termination::Sentinel));
    }

    #[tokio::test]
    async fn test_multibyte_split_across_chunks() {
        let text = "data: héllo\n";
        let bytes = text.as_bytes();
        // Split inside the two-byte 'é'
        let split = text.find('é').unwrap() + 1;
        let chunks: Vec<Chunk> = vec![
            Ok(Bytes::copy_from_slice(&bytes[..split])),
            Ok(Bytes::copy_from_slice(&bytes[split..])),
        ];
        let mut decoder = EventStreamDecoder::new(stream::iter(chunks));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["héllo"]);
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let mut decoder =
            EventStreamDecoder::new(body(&["data: x\r\n\r\ndata: [DONE]\r\n\r\n"]));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["x"]);
        assert_eq!(decoder.termination(), Some(Termination::Sentinel));
    }

    #[tokio::test]
    async fn test_non_data_lines_skipped() {
        let mut decoder = EventStreamDecoder::new(body(&[
            ": keep-alive\n",
            "event: completion\n",
            "id: 7\n",
            "data:nospace\n",
            "data: kept\n",
            "\n",
        ]));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_unterminated_final_line() {
        let mut decoder = EventStreamDecoder::new(body(&["data: a\n", "data: b"]));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["a", "b"]);
        assert_eq!(decoder.termination(), Some(Termination::EndOfInput));
    }

    #[tokio::test]
    async fn test_unterminated_sentinel() {
        let mut decoder = EventStreamDecoder::new(body(&["data: a\ndata: [DONE]"]));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec!["a"]);
        assert_eq!(decoder.termination(), Some(Termination::Sentinel));
    }

    #[tokio::test]
    async fn test_io_error_after_partial_output() {
        let chunks: Vec<Chunk> = vec![
            Ok(Bytes::from_static(b"data: before\n")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            )),
            Ok(Bytes::from_static(b"data: never\n")),
        ];
        let mut decoder = EventStreamDecoder::new(stream::iter(chunks));

        let first = decoder.next_event().await.unwrap();
        assert_eq!(first, Some(RawEvent::new("before")));

        let err = decoder.next_event().await.unwrap_err();
        assert!(err.is_transport());
        assert!(decoder.is_finished());
        assert!(decoder.next_event().await.unwrap().is_none());
        assert!(decoder.termination().is_none());
    }

    #[tokio::test]
    async fn test_line_too_long() {
        let long = format!("data: {}", "x".repeat(64));
        let mut decoder = EventStreamDecoder::with_max_line_size(body(&[long.as_str()]), 32);

        let err = decoder.next_event().await.unwrap_err();
        assert!(matches!(err, SayError::LineTooLong { max: 32, .. }));
    }

    #[test]
    fn test_line_limit_counts_only_unterminated_tail() {
        let mut lines = LineBuffer::with_capacity(8);
        lines.push(b"data: first line\n").unwrap();
        lines.push(b"1234").unwrap();
        lines.push(b"5678").unwrap();

        let err = lines.push(b"9").unwrap_err();
        assert!(matches!(err, SayError::LineTooLong { len: 9, max: 8 }));
    }

    #[test]
    fn test_line_limit_resets_after_newline() {
        let mut lines = LineBuffer::with_capacity(4);
        lines.push(b"abc").unwrap();
        lines.push(b"d\nwx").unwrap();
        lines.push(b"yz").unwrap();

        assert_eq!(lines.next_line(), Some(b"abcd".to_vec()));
        assert_eq!(lines.next_line(), None);
        assert_eq!(lines.take_remainder(), Some(b"wxyz".to_vec()));
        lines.push(b"1234").unwrap();
    }

    #[tokio::test]
    async fn test_long_line_in_many_small_chunks() {
        let payload = "y".repeat(10_000);
        let wire = format!("data: {}\ndata: [DONE]\n", payload);
        let chunks: Vec<Chunk> = wire
            .as_bytes()
            .chunks(3)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        let mut decoder = EventStreamDecoder::new(stream::iter(chunks));

        assert_eq!(drain(&mut decoder).await.unwrap(), vec![payload]);
        assert_eq!(decoder.termination(), Some(Termination::Sentinel));
    }

    #[tokio::test]
    async fn test_into_stream() {
        let decoder = EventStreamDecoder::new(body(&["data: 1\ndata: 2\ndata: [DONE]\n"]));

        let events: Vec<_> = decoder.into_stream().collect().await;
        let payloads: Vec<String> = events
            .into_iter()
            .map(|e| e.unwrap().into_payload())
            .collect();
        assert_eq!(payloads, vec!["1", "2"]);
    }

    #[test]
    fn test_sentinel_flag() {
        assert!(RawEvent::new("[DONE]").is_sentinel());
        assert!(!RawEvent::new("[DONE] ").is_sentinel());
        assert!(!RawEvent::new("{}").is_sentinel());
    }

    fn sanitize(payloads: Vec<String>) -> Vec<String> {
        payloads
            .into_iter()
            .map(|p| p.replace(['\n', '\r'], ""))
            .filter(|p| p != DONE_SENTINEL)
            .collect()
    }

    #[quickcheck]
    fn prop_yields_every_event_in_order(payloads: Vec<String>, chunk_size: u8) -> bool {
        let payloads = sanitize(payloads);
        let mut wire = String::new();
        for p in &payloads {
            wire.push_str(DATA_PREFIX);
            wire.push_str(p);
            wire.push_str("\n\n");
        }
        wire.push_str("data: [DONE]\ndata: trailing\n");

        let step = chunk_size.max(1) as usize;
        let chunks: Vec<Chunk> = wire
            .as_bytes()
            .chunks(step)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let mut decoder = EventStreamDecoder::new(stream::iter(chunks));
        let decoded = tokio_test::block_on(drain(&mut decoder)).unwrap();

        decoded == payloads && decoder.termination() == Some(Termination::Sentinel)
    }

    #[quickcheck]
    fn prop_end_of_input_keeps_all_events(payloads: Vec<String>) -> bool {
        let payloads = sanitize(payloads);
        let wire: String = payloads
            .iter()
            .map(|p| format!("{}{}\n", DATA_PREFIX, p))
            .collect();

        let mut decoder = EventStreamDecoder::new(body(&[wire.as_str()]));
        let decoded = tokio_test::block_on(drain(&mut decoder)).unwrap();

        decoded == payloads && decoder.termination() == Some(Termination::EndOfInput)
    }
}
