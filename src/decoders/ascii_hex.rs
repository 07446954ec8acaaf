//! ASCIIHexDecode stage of the decoding pipeline.
//!
//! Decodes hexadecimal-encoded data (e.g., "48656C6C6F" -> "Hello").
//! Whitespace is ignored, `>` ends the data, and an odd trailing digit is
//! padded with an implicit '0'.

use crate::decoders::ByteSource;
use crate::error::{Error, Result};
use bytes::Bytes;

/// ASCIIHexDecode filter stage.
///
/// A high nibble left over at the end of one upstream chunk is carried into
/// the next chunk.
pub struct AsciiHexSource {
    upstream: Box<dyn ByteSource>,
    pending: Option<u8>,
    done: bool,
}

impl AsciiHexSource {
    /// Wrap `upstream`.
    pub fn new(upstream: Box<dyn ByteSource>) -> Self {
        Self {
            upstream,
            pending: None,
            done: false,
        }
    }

    fn finish(&mut self, output: &mut Vec<u8>) {
        if let Some(high) = self.pending.take() {
            output.push(high << 4);
        }
        self.done = true;
    }
}

impl ByteSource for AsciiHexSource {
    fn has_more(&self) -> bool {
        !self.done
    }

    fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.done {
            return Ok(None);
        }
        let chunk = match self.upstream.next_chunk()? {
            Some(chunk) => chunk,
            None => {
                let mut tail = Vec::new();
                self.finish(&mut tail);
                return Ok(if tail.is_empty() { None } else { Some(Bytes::from(tail)) });
            },
        };

        let mut output = Vec::with_capacity(chunk.len() / 2 + 1);
        for &c in chunk.iter() {
            if c.is_ascii_whitespace() {
                continue;
            }
            if c == b'>' {
                self.finish(&mut output);
                break;
            }
            let nibble = hex_digit_to_value(c).ok_or_else(|| {
                Error::Decode(format!("ASCIIHexDecode: invalid hex digit '{}'", c as char))
            })?;
            match self.pending.take() {
                Some(high) => output.push((high << 4) | nibble),
                None => self.pending = Some(nibble),
            }
        }
        Ok(Some(Bytes::from(output)))
    }
}

/// Convert a hexadecimal ASCII character to its numeric value.
fn hex_digit_to_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}
