//! Incremental decode of the streamed completion body.
//!
//! Network reads can cut a multi-byte character in half, so byte-to-text
//! decode is stateful: an incomplete UTF-8 tail is carried into the next
//! chunk. Line framing stays per decoded chunk; a line cut across chunks
//! fails the prefix test and is dropped, an accepted transport assumption.

use crate::stream::frame::{CompletionChunk, DONE_SENTINEL, EVENT_PREFIX};
use tracing::{trace, warn};

#[derive(Default)]
pub struct StreamDecoder {
    carry: Vec<u8>, // incomplete UTF-8 tail from the previous chunk
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk of the response body into the deltas it carries.
    /// Non-event lines, the `[DONE]` sentinel, and malformed frames produce
    /// nothing; none of them abort the stream.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.decode_text(chunk);

        let mut deltas = Vec::new();
        for line in text.lines() {
            let Some(rest) = line.strip_prefix(EVENT_PREFIX) else {
                continue;
            };
            if rest == DONE_SENTINEL {
                trace!("stream sentinel observed");
                continue;
            }
            match serde_json::from_str::<CompletionChunk>(rest) {
                Ok(frame) => deltas.push(frame.delta_content()),
                Err(e) => warn!(error = %e, "dropping malformed stream frame"),
            }
        }
        deltas
    }

    /// Stateful UTF-8 decode: prepends the carried tail, holds back a new
    /// incomplete tail for the next call, and substitutes U+FFFD for bytes
    /// that can never complete a sequence.
    fn decode_text(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        let tail = incomplete_tail_len(&bytes);
        if tail > 0 {
            self.carry = bytes.split_off(bytes.len() - tail);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Length of a trailing UTF-8 sequence that is still waiting for more bytes,
/// or 0 when the buffer ends on a sequence boundary (valid or not).
fn incomplete_tail_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    let lower = len.saturating_sub(4);

    for i in (lower..len).rev() {
        let b = bytes[i];
        if b & 0b1100_0000 == 0b1000_0000 {
            continue; // continuation byte, keep scanning for the lead
        }
        let needed = match b {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return 0, // not a lead byte; leave it to the lossy decode
        };
        let have = len - i;
        return if have < needed { have } else { 0 };
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_detection() {
        assert_eq!(incomplete_tail_len(b"plain ascii"), 0);
        assert_eq!(incomplete_tail_len("caf\u{e9}".as_bytes()), 0);
        assert_eq!(incomplete_tail_len(&[b'a', 0xC3]), 1); // é missing its second byte
        assert_eq!(incomplete_tail_len(&[b'a', 0xE2, 0x82]), 2); // € missing its third
        assert_eq!(incomplete_tail_len(&[0xF0, 0x9F, 0x98]), 3); // emoji missing its fourth
        assert_eq!(incomplete_tail_len(&[]), 0);
    }

    #[test]
    fn carry_reassembles_split_characters() {
        let mut decoder = StreamDecoder::new();
        let bytes = "caf\u{e9} au lait".as_bytes();

        let mut text = decoder.decode_text(&bytes[..4]); // ends on the é lead byte
        assert_eq!(text, "caf");
        text.push_str(&decoder.decode_text(&bytes[4..]));
        assert_eq!(text, "caf\u{e9} au lait");
    }

    #[test]
    fn invalid_bytes_become_replacement_chars() {
        let mut decoder = StreamDecoder::new();
        // 0xFF can never start a sequence; it must not be carried forever.
        assert_eq!(decoder.decode_text(&[b'a', 0xFF, b'b']), "a\u{fffd}b");
        assert!(decoder.carry.is_empty());
    }
}
