//! Object streams (PDF 1.5+).
//!
//! Object streams (/Type /ObjStm) store many indirect objects in the payload
//! of a single stream. [`ObjectStream`] reads them (via [`ObjectStream::parse_stream`])
//! and writes them (via [`ObjectStream::write_objects`]) on top of the generic
//! [`Dictionary`] machinery.
//!
//! # Format
//!
//! ```text
//! << /Type /ObjStm
//!    /N 2              % Number of objects in stream
//!    /First 8          % Byte offset of the first object
//! >>
//! stream
//! 1 0 5 2              % Pairs: (obj_num, offset relative to /First)
//! 5 [1 2]              % Object 1 at offset 0, object 5 at offset 2
//! endstream
//! ```
//!
//! Only generation-0 objects can live in an object stream, and the stream
//! itself must have generation 0.

use crate::config::ObjectStreamConfig;
use crate::decoders;
use crate::dictionary::Dictionary;
use crate::document::{Document, Revision};
use crate::error::{Error, Result};
use crate::lexer::is_whitespace;
use crate::object::{Dict, Object, ObjectHandle, ObjectKind, ObjectRef, PdfObject};
use crate::parser::parse_value;
use crate::schema::{object_stream_type, Reporter};
use crate::serializer::ObjectSerializer;
use bytes::Bytes;
use std::collections::HashMap;

/// An object waiting to be written into an object stream.
#[derive(Debug, Clone)]
pub enum StagedObject {
    /// Looked up in the revision at write time
    Reference(ObjectRef),
    /// Held directly; must carry an identity
    Object(ObjectHandle),
}

impl StagedObject {
    /// Identity of the staged object, if it has one.
    pub fn identity(&self) -> Option<ObjectRef> {
        match self {
            StagedObject::Reference(r) => Some(*r),
            StagedObject::Object(handle) => handle.try_borrow().ok().and_then(|o| o.oid),
        }
    }
}

impl From<ObjectRef> for StagedObject {
    fn from(r: ObjectRef) -> Self {
        StagedObject::Reference(r)
    }
}

impl From<ObjectHandle> for StagedObject {
    fn from(handle: ObjectHandle) -> Self {
        StagedObject::Object(handle)
    }
}

/// Decoded contents of an object stream.
///
/// `numbers[i]` is the object number of the i-th object and `offsets[i]` its
/// offset into `payload` (the bytes after `/First`).
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStreamData {
    payload: Bytes,
    numbers: Vec<u32>,
    offsets: Vec<usize>,
}

impl ObjectStreamData {
    /// Build a view over `payload`.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedObjectStream`] if the tables differ in length.
    ///
    /// # Example
    ///
    /// ```
    /// use pdf_objmodel::objstm::ObjectStreamData;
    /// use pdf_objmodel::object::Object;
    ///
    /// let data = ObjectStreamData::new("5 [1 2]", vec![1, 5], vec![0, 2]).unwrap();
    /// assert_eq!(data.object_by_index(0).unwrap(), (Object::Integer(5), 1));
    /// assert!(data.object_by_index(2).is_err());
    /// ```
    pub fn new(payload: impl Into<Bytes>, numbers: Vec<u32>, offsets: Vec<usize>) -> Result<Self> {
        if numbers.len() != offsets.len() {
            return Err(Error::MalformedObjectStream(format!(
                "{} object numbers but {} offsets",
                numbers.len(),
                offsets.len()
            )));
        }
        Ok(Self {
            payload: payload.into(),
            numbers,
            offsets,
        })
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Whether the stream holds no objects.
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Object numbers in stream order.
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    /// Offsets relative to `/First`, in stream order.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Bytes after `/First`.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The `index`-th object and its object number.
    ///
    /// The object is parsed from its offset up to the next object's offset
    /// (or the end of the payload).
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] unless `index < len()`;
    /// [`Error::MalformedObjectStream`] for offsets outside the payload;
    /// [`Error::ParseError`] if the object bytes do not parse.
    pub fn object_by_index(&self, index: usize) -> Result<(Object, u32)> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let start = self.offsets[index];
        let end = self
            .offsets
            .get(index + 1)
            .copied()
            .unwrap_or(self.payload.len());
        if start > end || end > self.payload.len() {
            return Err(Error::MalformedObjectStream(format!(
                "object {} spans {}..{} outside payload of {} bytes",
                self.numbers[index],
                start,
                end,
                self.payload.len()
            )));
        }
        let value = parse_value(&self.payload[start..end])?;
        Ok((value, self.numbers[index]))
    }

    /// Objects in stream order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(Object, u32)>> + '_ {
        (0..self.len()).map(move |i| self.object_by_index(i))
    }

    /// Object number → object.
    ///
    /// Objects that fail to parse are skipped with a warning.
    pub fn to_map(&self) -> HashMap<u32, Object> {
        let mut result = HashMap::with_capacity(self.len());
        for (index, entry) in self.iter().enumerate() {
            match entry {
                Ok((value, number)) => {
                    result.insert(number, value);
                },
                Err(e) => {
                    log::warn!("Failed to parse object at index {} of object stream: {}", index, e);
                },
            }
        }
        result
    }
}

/// An object stream: a stream dictionary of type `ObjStm`, the objects staged
/// for the next write, and the decoded contents once parsed.
#[derive(Debug, Clone)]
pub struct ObjectStream {
    dict: Dictionary,
    staged: Vec<StagedObject>,
    data: Option<ObjectStreamData>,
}

impl ObjectStream {
    /// Empty object stream.
    pub fn new() -> Result<Self> {
        Self::from_object(Object::Stream {
            dict: Dict::new(),
            data: Bytes::new(),
        })
    }

    /// Wrap an existing stream (or a handle wrapping one).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDictionaryValue`] if `value` is not a stream.
    pub fn from_object(value: Object) -> Result<Self> {
        if value.kind() != ObjectKind::Stream {
            return Err(Error::InvalidDictionaryValue(value.type_name().to_string()));
        }
        Ok(Self {
            dict: Dictionary::new(object_stream_type(), value)?,
            staged: Vec::new(),
            data: None,
        })
    }

    /// The stream dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// The shared handle holding the stream.
    pub fn handle(&self) -> &ObjectHandle {
        self.dict.handle()
    }

    /// Stage an object (by identity or by handle). Duplicates are kept.
    pub fn add_object(&mut self, object: impl Into<StagedObject>) {
        self.staged.push(object.into());
    }

    /// Position of the most recently staged entry with this identity.
    pub fn object_index(&self, obj_ref: ObjectRef) -> Option<usize> {
        self.staged
            .iter()
            .rposition(|entry| entry.identity() == Some(obj_ref))
    }

    /// Unstage the most recent entry with this identity.
    ///
    /// The last staged entry takes its slot. Does nothing if the identity is
    /// not staged.
    pub fn delete_object(&mut self, obj_ref: ObjectRef) {
        if let Some(index) = self.object_index(obj_ref) {
            self.staged.swap_remove(index);
        }
    }

    /// Staged entries in order.
    pub fn staged(&self) -> &[StagedObject] {
        &self.staged
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Decoded contents, if [`ObjectStream::parse_stream`] has run.
    pub fn data(&self) -> Option<&ObjectStreamData> {
        self.data.as_ref()
    }

    /// Replace `/N` and `/First` references with the objects they point to.
    ///
    /// [`ObjectStream::parse_stream`] has no document to resolve through, so
    /// call this first when the header values may be indirect.
    ///
    /// # Errors
    ///
    /// [`Error::ObjectNotFound`] if a header reference does not resolve.
    pub fn resolve_header(&self, doc: &mut dyn Document) -> Result<()> {
        for key in ["N", "First"] {
            if let Some(Object::Reference(r)) = self.dict.get_raw(key)? {
                let handle = doc.deref(r)?.ok_or(Error::ObjectNotFound(r.id, r.gen))?;
                log::debug!("Resolved /{} of object stream through {}", key, r);
                self.dict.set(key, Object::Handle(handle))?;
            }
        }
        Ok(())
    }

    /// Decode the stream payload.
    ///
    /// The result is cached; later calls return it without decoding again.
    /// `/N` and `/First` must be direct or already resolved (see
    /// [`ObjectStream::resolve_header`]).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedObjectStream`] if `/N` or `/First` are missing,
    /// unresolved references or out of bounds, the payload is shorter than
    /// `/First`, or the header pairs do not parse. Filter failures are passed
    /// through.
    pub fn parse_stream(&mut self, config: &ObjectStreamConfig) -> Result<&ObjectStreamData> {
        let data = match self.data.take() {
            Some(data) => data,
            None => self.decode(config)?,
        };
        Ok(self.data.insert(data))
    }

    fn decode(&self, config: &ObjectStreamConfig) -> Result<ObjectStreamData> {
        let (dict, raw) = {
            let obj = self.handle().try_borrow().map_err(|_| Error::ObjectInUse)?;
            match &obj.value {
                Object::Stream { dict, data } => (dict.clone(), data.clone()),
                other => {
                    return Err(Error::InvalidObjectType {
                        expected: "Stream".to_string(),
                        found: other.type_name().to_string(),
                    })
                },
            }
        };

        let n = header_integer(&dict, "N")?;
        let first = header_integer(&dict, "First")?;
        if n > config.max_objects {
            return Err(Error::MalformedObjectStream(format!(
                "/N {} exceeds limit {}",
                n, config.max_objects
            )));
        }
        if first > config.max_first {
            return Err(Error::MalformedObjectStream(format!(
                "/First {} exceeds limit {}",
                first, config.max_first
            )));
        }

        let mut source = decoders::pipeline(&dict, raw, config)?;
        let decoded = decoders::drain(source.as_mut(), config.max_decompressed_size)?;
        if decoded.len() < first {
            return Err(Error::MalformedObjectStream(format!(
                "data too short: {} bytes, expected at least {}",
                decoded.len(),
                first
            )));
        }

        let pairs = parse_object_number_pairs(&decoded[..first], n)?;
        let (numbers, offsets) = pairs.into_iter().unzip();
        log::debug!("Parsed object stream: {} objects, /First {}", n, first);

        let mut decoded = Bytes::from(decoded);
        let payload = decoded.split_off(first);
        ObjectStreamData::new(payload, numbers, offsets)
    }

    /// Serialize the staged objects into the stream.
    ///
    /// Each staged entry is looked up in `revision` (a staged handle is used
    /// as-is when the revision does not know it). Entries are left out if
    /// they have no identity, a non-zero generation, a null value, are
    /// themselves streams, or are the document's security dictionary. `/N`, `/First` and `/Length` are
    /// updated and the payload replaced; with `config.compress` the payload
    /// is Flate-encoded, otherwise any filter is removed. Staged entries stay
    /// staged; the cached decoded data is dropped.
    pub fn write_objects(
        &mut self,
        revision: &dyn Revision,
        doc: &dyn Document,
        config: &ObjectStreamConfig,
    ) -> Result<()> {
        let serializer = ObjectSerializer::compact();
        let encryption = doc.encryption_dict();
        let mut header = Vec::new();
        let mut body = Vec::new();
        let mut count = 0usize;

        for entry in &self.staged {
            let Some(oid) = entry.identity() else {
                log::warn!("Skipping staged object without identity");
                continue;
            };
            if oid.gen != 0 {
                log::debug!("Skipping {}: non-zero generation", oid);
                continue;
            }
            if encryption == Some(oid) {
                log::debug!("Skipping {}: security dictionary", oid);
                continue;
            }
            let handle = match entry {
                StagedObject::Reference(r) => revision.object(*r),
                StagedObject::Object(h) => revision.object(oid).or_else(|| Some(h.clone())),
            };
            let Some(handle) = handle else {
                log::debug!("Skipping {}: not in revision", oid);
                continue;
            };
            let obj = handle.try_borrow().map_err(|_| Error::ObjectInUse)?;
            if obj.value.is_null_value() {
                log::debug!("Skipping {}: null value", oid);
                continue;
            }
            if obj.value.kind() == ObjectKind::Stream {
                log::debug!("Skipping {}: streams cannot be stored in an object stream", oid);
                continue;
            }

            if !header.is_empty() {
                header.push(b' ');
            }
            header.extend_from_slice(format!("{} {}", oid.id, body.len()).as_bytes());
            serializer.write_value(&mut body, &obj.value)?;
            body.push(b' ');
            count += 1;
        }
        if !header.is_empty() {
            header.push(b' ');
        }

        let first = header.len();
        let mut payload = header;
        payload.extend_from_slice(&body);
        let payload = if config.compress {
            decoders::compress(&payload)?
        } else {
            payload
        };
        log::debug!(
            "Wrote object stream: {} objects, /First {}, {} bytes",
            count,
            first,
            payload.len()
        );

        self.dict.set("N", Object::Integer(count as i64))?;
        self.dict.set("First", Object::Integer(first as i64))?;
        self.dict.set("Length", Object::Integer(payload.len() as i64))?;
        self.dict.remove("DecodeParms")?;
        if config.compress {
            self.dict.set("Filter", Object::name("FlateDecode"))?;
        } else {
            self.dict.remove("Filter")?;
        }

        {
            let mut obj = self
                .handle()
                .try_borrow_mut()
                .map_err(|_| Error::ObjectInUse)?;
            if let Object::Stream { data, .. } = &mut obj.value {
                *data = Bytes::from(payload);
            }
        }
        self.data = None;
        Ok(())
    }

    /// Validate the stream dictionary. See [`Dictionary::validate`].
    pub fn validate(
        &self,
        doc: &mut dyn Document,
        auto_correct: bool,
        on_issue: &mut dyn FnMut(&str, bool),
    ) -> Result<bool> {
        self.dict.validate(doc, auto_correct, on_issue)
    }
}

/// Checks specific to object streams, run after the field checks.
pub(crate) fn validate_object_stream(obj: &PdfObject, reporter: &mut Reporter<'_>) {
    if obj.gen() != 0 {
        reporter.report(
            &format!(
                "ObjStm: object streams must have generation 0, found {}",
                obj.gen()
            ),
            false,
        );
    }
}

/// Read a non-negative integer header entry, looking through handles.
fn header_integer(dict: &Dict, key: &str) -> Result<usize> {
    let value = match dict.get(key) {
        Some(Object::Handle(handle)) => handle.try_borrow().ok().map(|o| o.value.clone()),
        Some(Object::Reference(r)) => {
            return Err(Error::MalformedObjectStream(format!(
                "/{} is an unresolved reference to {}",
                key, r
            )))
        },
        other => other.cloned(),
    };
    let n = value
        .and_then(|v| v.as_integer())
        .ok_or_else(|| Error::MalformedObjectStream(format!("missing /{} entry", key)))?;
    usize::try_from(n)
        .map_err(|_| Error::MalformedObjectStream(format!("invalid /{} value: {}", key, n)))
}

/// Parse the pairs section of an object stream.
///
/// The pairs section contains `count` pairs of integers: (object_number, offset).
/// The offset is relative to the start of the objects data section.
fn parse_object_number_pairs(data: &[u8], count: usize) -> Result<Vec<(u32, usize)>> {
    let mut pairs = Vec::with_capacity(count);
    let mut remaining = data;

    for i in 0..count {
        remaining = skip_whitespace(remaining);
        let (rest, obj_num) = read_unsigned(remaining).ok_or_else(|| {
            Error::MalformedObjectStream(format!("failed to parse object number for pair {}", i))
        })?;
        let obj_num = u32::try_from(obj_num).map_err(|_| {
            Error::MalformedObjectStream(format!("object number {} out of range", obj_num))
        })?;

        remaining = skip_whitespace(rest);
        let (rest, offset) = read_unsigned(remaining).ok_or_else(|| {
            Error::MalformedObjectStream(format!("failed to parse offset for pair {}", i))
        })?;

        pairs.push((obj_num, offset));
        remaining = rest;
    }

    Ok(pairs)
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&c| !is_whitespace(c)).unwrap_or(data.len());
    &data[start..]
}

/// Read consecutive ASCII digits as an unsigned number.
fn read_unsigned(data: &[u8]) -> Option<(&[u8], usize)> {
    let end = data.iter().position(|c| !c.is_ascii_digit()).unwrap_or(data.len());
    if end == 0 {
        return None;
    }
    let digits = std::str::from_utf8(&data[..end]).ok()?;
    let value = digits.parse().ok()?;
    Some((&data[end..], value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    fn stream_object(dict_entries: &[(&str, Object)], data: &'static [u8]) -> Object {
        let mut dict = Dict::new();
        for (key, value) in dict_entries {
            dict.insert(key.to_string(), value.clone());
        }
        Object::Stream {
            dict,
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_skip_whitespace() {
        assert_eq!(skip_whitespace(b"   hello"), b"hello");
        assert_eq!(skip_whitespace(b"\t\n\r hello"), b"hello");
        assert_eq!(skip_whitespace(b""), b"");
    }

    #[test]
    fn test_read_unsigned() {
        assert_eq!(read_unsigned(b"123 rest"), Some((&b" rest"[..], 123)));
        assert_eq!(read_unsigned(b"-456"), None);
        assert_eq!(read_unsigned(b""), None);
    }

    #[test]
    fn test_parse_object_number_pairs() {
        let pairs = parse_object_number_pairs(b"  10   0   11  15  12   28  ", 3).unwrap();
        assert_eq!(pairs, vec![(10, 0), (11, 15), (12, 28)]);
    }

    #[test]
    fn test_parse_object_number_pairs_short() {
        let result = parse_object_number_pairs(b"10 0 11", 2);
        assert!(matches!(result, Err(Error::MalformedObjectStream(_))));
    }

    #[test]
    fn test_parse_stream_basic() {
        let obj = stream_object(
            &[("N", Object::Integer(2)), ("First", Object::Integer(10))],
            b"10 0 11 3 42 /Test",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        let data = stream.parse_stream(&ObjectStreamConfig::default()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.object_by_index(0).unwrap(), (Object::Integer(42), 10));
        assert_eq!(data.object_by_index(1).unwrap(), (Object::name("Test"), 11));
    }

    #[test]
    fn test_parse_stream_is_cached() {
        let obj = stream_object(
            &[("N", Object::Integer(1)), ("First", Object::Integer(4))],
            b"1 0 42",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        stream.parse_stream(&ObjectStreamConfig::default()).unwrap();
        // Corrupt the header; the cached data must still be returned
        stream.dictionary().set("N", Object::Integer(-1)).unwrap();
        let data = stream.parse_stream(&ObjectStreamConfig::default()).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_parse_stream_missing_n() {
        let obj = stream_object(&[("First", Object::Integer(4))], b"1 0 42");
        let mut stream = ObjectStream::from_object(obj).unwrap();
        let result = stream.parse_stream(&ObjectStreamConfig::default());
        assert!(matches!(result, Err(Error::MalformedObjectStream(_))));
    }

    #[test]
    fn test_parse_stream_negative_n() {
        let obj = stream_object(
            &[("N", Object::Integer(-1)), ("First", Object::Integer(4))],
            b"1 0 42",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        assert!(stream.parse_stream(&ObjectStreamConfig::default()).is_err());
    }

    #[test]
    fn test_parse_stream_limits() {
        let obj = stream_object(
            &[("N", Object::Integer(5)), ("First", Object::Integer(4))],
            b"1 0 42",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        let config = ObjectStreamConfig::new().with_max_objects(2);
        assert!(matches!(
            stream.parse_stream(&config),
            Err(Error::MalformedObjectStream(_))
        ));
    }

    #[test]
    fn test_parse_stream_data_too_short() {
        let obj = stream_object(
            &[("N", Object::Integer(1)), ("First", Object::Integer(100))],
            b"1 0 42",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        assert!(matches!(
            stream.parse_stream(&ObjectStreamConfig::default()),
            Err(Error::MalformedObjectStream(_))
        ));
    }

    #[test]
    fn test_parse_stream_unresolved_header_reference() {
        let obj = stream_object(
            &[
                ("N", Object::Reference(ObjectRef::new(8, 0))),
                ("First", Object::Integer(4)),
            ],
            b"1 0 42",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        match stream.parse_stream(&ObjectStreamConfig::default()) {
            Err(Error::MalformedObjectStream(msg)) => assert!(msg.contains("unresolved")),
            other => panic!("expected MalformedObjectStream, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_header_then_parse() {
        let mut doc = MemoryDocument::new();
        doc.insert(ObjectRef::new(8, 0), Object::Integer(1)).unwrap();
        doc.insert(ObjectRef::new(9, 0), Object::Integer(4)).unwrap();
        let obj = stream_object(
            &[
                ("N", Object::Reference(ObjectRef::new(8, 0))),
                ("First", Object::Reference(ObjectRef::new(9, 0))),
            ],
            b"1 0 42",
        );
        let mut stream = ObjectStream::from_object(obj).unwrap();
        stream.resolve_header(&mut doc).unwrap();
        let data = stream.parse_stream(&ObjectStreamConfig::default()).unwrap();
        assert_eq!(data.object_by_index(0).unwrap(), (Object::Integer(42), 1));
    }

    #[test]
    fn test_resolve_header_dangling_reference() {
        let mut doc = MemoryDocument::new();
        let obj = stream_object(
            &[
                ("N", Object::Integer(1)),
                ("First", Object::Reference(ObjectRef::new(30, 2))),
            ],
            b"1 0 42",
        );
        let stream = ObjectStream::from_object(obj).unwrap();
        assert!(matches!(
            stream.resolve_header(&mut doc),
            Err(Error::ObjectNotFound(30, 2))
        ));
    }

    #[test]
    fn test_write_objects_skips_streams() {
        let mut doc = MemoryDocument::new();
        doc.insert(ObjectRef::new(1, 0), stream_object(&[], b"abc")).unwrap();
        doc.insert(ObjectRef::new(2, 0), Object::Integer(7)).unwrap();
        let mut stream = ObjectStream::new().unwrap();
        stream.add_object(ObjectRef::new(1, 0));
        stream.add_object(ObjectRef::new(2, 0));
        stream
            .write_objects(&doc, &doc, &ObjectStreamConfig::default())
            .unwrap();

        let data = stream.parse_stream(&ObjectStreamConfig::default()).unwrap();
        assert_eq!(data.numbers(), &[2]);
        assert_eq!(data.object_by_index(0).unwrap(), (Object::Integer(7), 2));
    }

    #[test]
    fn test_from_object_rejects_dictionary() {
        let result = ObjectStream::from_object(Object::Dictionary(Dict::new()));
        assert!(matches!(result, Err(Error::InvalidDictionaryValue(_))));
    }

    #[test]
    fn test_new_has_type_default() {
        let stream = ObjectStream::new().unwrap();
        assert_eq!(
            stream.dictionary().get_raw("Type").unwrap(),
            Some(Object::name("ObjStm"))
        );
    }

    #[test]
    fn test_object_stream_data_table_mismatch() {
        assert!(ObjectStreamData::new("42", vec![1, 2], vec![0]).is_err());
    }

    #[test]
    fn test_object_stream_data_bad_offset() {
        let data = ObjectStreamData::new("42", vec![1], vec![10]).unwrap();
        assert!(matches!(
            data.object_by_index(0),
            Err(Error::MalformedObjectStream(_))
        ));
    }

    #[test]
    fn test_to_map() {
        let data = ObjectStreamData::new("5 [1 2]", vec![1, 5], vec![0, 2]).unwrap();
        let map = data.to_map();
        assert_eq!(map.get(&1), Some(&Object::Integer(5)));
        assert_eq!(map.len(), 2);
    }
}
