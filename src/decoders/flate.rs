//! FlateDecode (zlib/deflate) stage of the decoding pipeline.
//!
//! Decompression itself is done by the flate2 crate; this module adapts its
//! `Read`-based decoder to the chunked [`ByteSource`] interface.

use crate::decoders::ByteSource;
use crate::error::{Error, Result};
use bytes::Bytes;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{self, Read, Write};

/// Adapter exposing an upstream [`ByteSource`] as `io::Read`.
struct SourceReader {
    upstream: Box<dyn ByteSource>,
    current: Bytes,
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.current.is_empty() {
            if !self.upstream.has_more() {
                return Ok(0);
            }
            match self.upstream.next_chunk() {
                Ok(Some(chunk)) => self.current = chunk,
                Ok(None) => return Ok(0),
                Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
            }
        }
        let n = buf.len().min(self.current.len());
        buf[..n].copy_from_slice(&self.current[..n]);
        let _ = self.current.split_to(n);
        Ok(n)
    }
}

/// FlateDecode filter stage.
pub struct FlateSource {
    decoder: ZlibDecoder<SourceReader>,
    chunk_size: usize,
    produced: usize,
    done: bool,
}

impl FlateSource {
    /// Wrap `upstream`, inflating its bytes in chunks of up to `chunk_size`.
    pub fn new(upstream: Box<dyn ByteSource>, chunk_size: usize) -> Self {
        let reader = SourceReader {
            upstream,
            current: Bytes::new(),
        };
        Self {
            decoder: ZlibDecoder::new(reader),
            chunk_size: chunk_size.max(1),
            produced: 0,
            done: false,
        }
    }
}

impl ByteSource for FlateSource {
    fn has_more(&self) -> bool {
        !self.done
    }

    fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.done {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.chunk_size];
        match self.decoder.read(&mut buf) {
            Ok(0) => {
                self.done = true;
                Ok(None)
            },
            Ok(n) => {
                buf.truncate(n);
                self.produced += n;
                Ok(Some(Bytes::from(buf)))
            },
            Err(e) => {
                self.done = true;
                // Partial recovery: keep what was inflated before the corruption
                if self.produced > 0 {
                    log::warn!(
                        "FlateDecode partial recovery: extracted {} bytes before corruption: {}",
                        self.produced,
                        e
                    );
                    return Ok(None);
                }
                Err(Error::Decode(format!("FlateDecode: {}", e)))
            },
        }
    }
}

/// Zlib-compress `data` for a FlateDecode stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::{SliceSource, drain};

    #[test]
    fn test_flate_roundtrip_small_chunks() {
        let original = b"10 0 11 3 42 /Test ".repeat(20);
        let compressed = compress(&original).unwrap();
        let upstream = Box::new(SliceSource::new(Bytes::from(compressed), 7));
        let mut source = FlateSource::new(upstream, 16);
        assert_eq!(drain(&mut source, 0).unwrap(), original);
        assert!(!source.has_more());
    }

    #[test]
    fn test_flate_garbage_input_fails() {
        let upstream = Box::new(SliceSource::new(Bytes::from_static(b"not zlib at all"), 64));
        let mut source = FlateSource::new(upstream, 64);
        assert!(matches!(drain(&mut source, 0), Err(Error::Decode(_))));
    }
}
