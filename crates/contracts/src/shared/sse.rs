//! Server-Sent-Events framing over a POST response body.
//!
//! The backend answers streamed calls with newline-delimited `data: <json>`
//! records. Read chunks arrive at arbitrary boundaries, so the decoder keeps
//! the trailing partial line between pushes. Bytes are split on `\n` before
//! UTF-8 decoding, which keeps multi-byte characters split across chunks
//! intact.
//!
//! A line that is not a `data: ` record is ignored. A `data: ` record whose
//! payload does not decode into the event type is logged and skipped; it
//! never aborts the stream.

use serde::de::DeserializeOwned;
use std::marker::PhantomData;

pub const DATA_PREFIX: &str = "data: ";

/// Incremental decoder turning raw body chunks into typed events.
#[derive(Debug)]
pub struct SseDecoder<E> {
    pending: Vec<u8>,
    skipped: usize,
    decoded: usize,
    _event: PhantomData<fn() -> E>,
}

impl<E> Default for SseDecoder<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            skipped: 0,
            decoded: 0,
            _event: PhantomData,
        }
    }
}

impl<E: DeserializeOwned> SseDecoder<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one read chunk and returns the events completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<E> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.handle_line(&line[..line.len() - 1], &mut events);
        }
        events
    }

    /// Flushes a final record that was not newline-terminated.
    pub fn finish(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.handle_line(&line, &mut events);
        }
        events
    }

    /// Number of `data:` records dropped because they failed to decode.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn decoded(&self) -> usize {
        self.decoded
    }

    fn handle_line(&mut self, raw: &[u8], events: &mut Vec<E>) {
        let text = String::from_utf8_lossy(raw);
        match parse_data_line::<E>(&text) {
            None => {}
            Some(Ok(event)) => {
                self.decoded += 1;
                events.push(event);
            }
            Some(Err(e)) => {
                self.skipped += 1;
                log::warn!("skipping malformed SSE record: {}", e);
            }
        }
    }
}

/// Decodes a single line. `None` when the line carries no `data: ` record.
pub fn parse_data_line<E: DeserializeOwned>(line: &str) -> Option<Result<E, serde_json::Error>> {
    let trimmed = line.trim();
    let payload = trimmed.strip_prefix(DATA_PREFIX)?;
    Some(serde_json::from_str(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        n: u32,
    }

    #[test]
    fn test_records_split_across_chunks() {
        let mut decoder = SseDecoder::<Ping>::new();
        assert!(decoder.push(b"data: {\"n\"").is_empty());
        assert_eq!(decoder.push(b": 1}\n\ndata: {\"n\": 2}\nda"), vec![Ping { n: 1 }, Ping { n: 2 }]);
        assert_eq!(decoder.push(b"ta: {\"n\": 3}\n"), vec![Ping { n: 3 }]);
        assert_eq!(decoder.decoded(), 3);
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let mut decoder = SseDecoder::<Ping>::new();
        let events = decoder.push(b"data: {broken\ndata: {\"n\": 7}\n: comment\n");
        assert_eq!(events, vec![Ping { n: 7 }]);
        assert_eq!(decoder.skipped(), 1);
    }

    #[test]
    fn test_multibyte_char_split_between_chunks() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Text {
            content: String,
        }
        let bytes = "data: {\"content\": \"geração\"}\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::<Text>::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let events = decoder.push(&bytes[split..]);
        assert_eq!(events[0].content, "geração");
    }

    #[test]
    fn test_finish_flushes_unterminated_record() {
        let mut decoder = SseDecoder::<Ping>::new();
        assert!(decoder.push(b"data: {\"n\": 9}").is_empty());
        assert_eq!(decoder.finish(), vec![Ping { n: 9 }]);
        assert!(decoder.finish().is_empty());
    }
}
