//! Stream decoding pipeline.
//!
//! Stream data is pulled through a chain of [`ByteSource`]s, one per filter
//! named in the stream dictionary's `/Filter` entry, on top of a
//! [`SliceSource`] over the raw bytes. Consumers call [`drain`] to pull the
//! chain to completion. Each source is single-pass: once `has_more` returns
//! false it stays exhausted.
//!
//! Supported filters:
//! - FlateDecode (zlib/deflate, via `flate2`)
//! - ASCIIHexDecode
//!
//! Everything else, including predictors in `/DecodeParms`, is rejected with
//! [`Error::UnsupportedFilter`].

use crate::config::ObjectStreamConfig;
use crate::error::{Error, Result};
use crate::object::{Dict, Object};
use bytes::Bytes;

mod ascii_hex;
mod flate;

pub use ascii_hex::AsciiHexSource;
pub use flate::{FlateSource, compress};

/// Pull-based source of byte chunks.
pub trait ByteSource {
    /// Whether another call to [`ByteSource::next_chunk`] may yield data.
    fn has_more(&self) -> bool;

    /// Pull the next chunk; `Ok(None)` once the source is exhausted.
    fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// Source handing out an in-memory buffer in fixed-size chunks.
pub struct SliceSource {
    data: Bytes,
    pos: usize,
    chunk_size: usize,
}

impl SliceSource {
    /// Create a source over `data` yielding chunks of at most `chunk_size` bytes.
    pub fn new(data: Bytes, chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl ByteSource for SliceSource {
    fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if !self.has_more() {
            return Ok(None);
        }
        let end = (self.pos + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.pos..end);
        self.pos = end;
        Ok(Some(chunk))
    }
}

/// Build the decoding chain for a stream.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFilter`] for filters other than FlateDecode and
/// ASCIIHexDecode, and for any `/DecodeParms` predictor.
pub fn pipeline(
    dict: &Dict,
    data: Bytes,
    config: &ObjectStreamConfig,
) -> Result<Box<dyn ByteSource>> {
    let filters = dict
        .get("Filter")
        .map(extract_filter_names)
        .unwrap_or_default();

    if let Some(predictor) = predictor(dict.get("DecodeParms")) {
        return Err(Error::UnsupportedFilter(format!("predictor {}", predictor)));
    }

    let mut source: Box<dyn ByteSource> = Box::new(SliceSource::new(data, config.chunk_size));
    for filter in filters {
        source = match filter.as_str() {
            "FlateDecode" | "Fl" => Box::new(FlateSource::new(source, config.chunk_size)),
            "ASCIIHexDecode" | "AHx" => Box::new(AsciiHexSource::new(source)),
            other => return Err(Error::UnsupportedFilter(other.to_string())),
        };
    }
    Ok(source)
}

/// Pull a source to completion.
///
/// `max_size` of 0 disables the size check.
pub fn drain(source: &mut dyn ByteSource, max_size: usize) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    while source.has_more() {
        match source.next_chunk()? {
            Some(chunk) => {
                output.extend_from_slice(&chunk);
                if max_size > 0 && output.len() > max_size {
                    return Err(Error::Decode(format!(
                        "decoded stream exceeds {} bytes",
                        max_size
                    )));
                }
            },
            None => break,
        }
    }
    log::debug!("Drained {} decoded bytes", output.len());
    Ok(output)
}

/// Extract filter names from a Filter object.
///
/// The Filter entry can be either:
/// - A single Name (e.g., /FlateDecode)
/// - An Array of Names (e.g., [/ASCIIHexDecode /FlateDecode])
fn extract_filter_names(filter_obj: &Object) -> Vec<String> {
    match filter_obj {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

/// Predictor requested by a DecodeParms object, if other than "none".
fn predictor(params_obj: Option<&Object>) -> Option<i64> {
    let dicts: Vec<&Dict> = match params_obj? {
        Object::Dictionary(d) => vec![d],
        Object::Array(arr) => arr.iter().filter_map(|obj| obj.as_dict()).collect(),
        _ => return None,
    };
    dicts
        .into_iter()
        .filter_map(|d| d.get("Predictor").and_then(|p| p.as_integer()))
        .find(|&p| p > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_with_filter(filter: Object) -> Dict {
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), filter);
        dict
    }

    #[test]
    fn test_slice_source_chunks() {
        let mut source = SliceSource::new(Bytes::from_static(b"abcdefg"), 3);
        assert_eq!(source.next_chunk().unwrap().unwrap(), Bytes::from_static(b"abc"));
        assert_eq!(source.next_chunk().unwrap().unwrap(), Bytes::from_static(b"def"));
        assert_eq!(source.next_chunk().unwrap().unwrap(), Bytes::from_static(b"g"));
        assert!(!source.has_more());
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_pipeline_without_filters_is_identity() {
        let config = ObjectStreamConfig::new().with_chunk_size(2);
        let mut source = pipeline(&Dict::new(), Bytes::from_static(b"1 0 42"), &config).unwrap();
        assert_eq!(drain(source.as_mut(), 0).unwrap(), b"1 0 42");
    }

    #[test]
    fn test_pipeline_filter_chain() {
        let compressed = compress(b"hello world").unwrap();
        let hex: String = compressed.iter().map(|b| format!("{:02X}", b)).collect();
        let dict = dict_with_filter(Object::Array(vec![
            Object::name("ASCIIHexDecode"),
            Object::name("FlateDecode"),
        ]));
        let config = ObjectStreamConfig::new().with_chunk_size(5);
        let mut source = pipeline(&dict, Bytes::from(hex.into_bytes()), &config).unwrap();
        assert_eq!(drain(source.as_mut(), 0).unwrap(), b"hello world");
    }

    #[test]
    fn test_pipeline_unsupported_filter() {
        let dict = dict_with_filter(Object::name("LZWDecode"));
        let result = pipeline(&dict, Bytes::new(), &ObjectStreamConfig::default());
        assert!(matches!(result, Err(Error::UnsupportedFilter(f)) if f == "LZWDecode"));
    }

    #[test]
    fn test_pipeline_rejects_predictor() {
        let mut params = Dict::new();
        params.insert("Predictor".to_string(), Object::Integer(12));
        let mut dict = dict_with_filter(Object::name("FlateDecode"));
        dict.insert("DecodeParms".to_string(), Object::Dictionary(params));
        let result = pipeline(&dict, Bytes::new(), &ObjectStreamConfig::default());
        assert!(matches!(result, Err(Error::UnsupportedFilter(_))));
    }

    #[test]
    fn test_drain_enforces_limit() {
        let mut source = SliceSource::new(Bytes::from_static(b"0123456789"), 4);
        assert!(matches!(drain(&mut source, 6), Err(Error::Decode(_))));
    }

    #[test]
    fn test_extract_filter_names_invalid() {
        assert!(extract_filter_names(&Object::Integer(42)).is_empty());
    }
}
