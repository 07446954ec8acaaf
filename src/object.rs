//! PDF object types.
//!
//! [`Object`] is the value union used everywhere in the crate. Values that need
//! an identity of their own (indirect objects, typed dictionaries) live in a
//! [`PdfObject`] shared through an [`ObjectHandle`]; the document's object
//! table and any number of dictionaries can hold the same handle, so mutating
//! the wrapped value through one holder is visible through all of them.

use crate::config::ObjectStreamConfig;
use crate::error::{Error, Result};
use crate::schema::DictType;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Ordered name → value mapping used by dictionaries and stream dictionaries.
pub type Dict = IndexMap<String, Object>;

/// Shared, identity-preserving handle to a wrapped object.
pub type ObjectHandle = Rc<RefCell<PdfObject>>;

/// PDF object representation.
#[derive(Debug, Clone)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// Text string
    String(Vec<u8>),
    /// Binary string, always written in hex form
    ByteString(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (ordered key-value pairs)
    Dictionary(Dict),
    /// Stream (dictionary + data)
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Stream data, encoded with the filters named in `dict`
        data: bytes::Bytes,
    },
    /// Indirect object reference, not yet resolved
    Reference(ObjectRef),
    /// Wrapped object, possibly carrying an identity and a dictionary type
    Handle(ObjectHandle),
}

/// Structural equality.
///
/// Two handles are equal if they are the same handle or wrap equal objects.
/// A handle that is mutably borrowed elsewhere only equals itself.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Real(a), Object::Real(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::ByteString(a), Object::ByteString(b)) => a == b,
            (Object::Name(a), Object::Name(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Dictionary(a), Object::Dictionary(b)) => a == b,
            (
                Object::Stream { dict: a, data: x },
                Object::Stream { dict: b, data: y },
            ) => a == b && x == y,
            (Object::Reference(a), Object::Reference(b)) => a == b,
            (Object::Handle(a), Object::Handle(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                match (a.try_borrow(), b.try_borrow()) {
                    (Ok(a), Ok(b)) => *a == *b,
                    _ => false,
                }
            },
            _ => false,
        }
    }
}

/// Kind tag of an [`Object`] value, used by field type constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Integer number
    Integer,
    /// Real number
    Real,
    /// Name
    Name,
    /// Text string
    String,
    /// Binary string
    ByteString,
    /// Array
    Array,
    /// Dictionary
    Dictionary,
    /// Stream
    Stream,
    /// Unresolved indirect reference
    Reference,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Null => "Null",
            ObjectKind::Boolean => "Boolean",
            ObjectKind::Integer => "Integer",
            ObjectKind::Real => "Real",
            ObjectKind::Name => "Name",
            ObjectKind::String => "String",
            ObjectKind::ByteString => "ByteString",
            ObjectKind::Array => "Array",
            ObjectKind::Dictionary => "Dictionary",
            ObjectKind::Stream => "Stream",
            ObjectKind::Reference => "Reference",
        };
        f.write_str(name)
    }
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

/// A value wrapped together with its identity and dictionary type.
///
/// `oid == None` means the object is direct (inlined at its point of use).
/// `ty == None` means the object is a bare wrapper with no schema attached.
#[derive(Clone)]
pub struct PdfObject {
    /// Identity, if the object is indirect
    pub oid: Option<ObjectRef>,
    /// Dictionary type governing the value, if any
    pub ty: Option<Rc<DictType>>,
    /// Wrapped value
    pub value: Object,
}

impl PdfObject {
    /// Wrap a value as a bare direct object.
    pub fn new(value: Object) -> Self {
        Self {
            oid: None,
            ty: None,
            value,
        }
    }

    /// Wrap a value as a typed direct object.
    pub fn typed(value: Object, ty: Rc<DictType>) -> Self {
        Self {
            oid: None,
            ty: Some(ty),
            value,
        }
    }

    /// Set the identity, making the object indirect.
    pub fn with_oid(mut self, oid: ObjectRef) -> Self {
        self.oid = Some(oid);
        self
    }

    /// Move the object behind a shared handle.
    pub fn into_handle(self) -> ObjectHandle {
        Rc::new(RefCell::new(self))
    }

    /// Whether the object has an identity of its own.
    pub fn is_indirect(&self) -> bool {
        self.oid.is_some()
    }

    /// Whether the object is a plain wrapper without a dictionary type.
    pub fn is_bare(&self) -> bool {
        self.ty.is_none()
    }

    /// Generation number, 0 for direct objects.
    pub fn gen(&self) -> u16 {
        self.oid.map(|r| r.gen).unwrap_or(0)
    }
}

impl PartialEq for PdfObject {
    fn eq(&self, other: &Self) -> bool {
        let same_type = match (&self.ty, &other.ty) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_type && self.oid == other.oid && self.value == other.value
    }
}

impl fmt::Debug for PdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PdfObject");
        s.field("oid", &self.oid);
        if let Some(ty) = &self.ty {
            s.field("ty", &ty.name());
        }
        // Indirect objects can be part of reference cycles
        if self.oid.is_none() {
            s.field("value", &self.value);
        }
        s.finish()
    }
}

impl Object {
    /// Create a Name object.
    pub fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    /// Create a text String object from a Rust string.
    pub fn string(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec())
    }

    /// Wrap a value into a fresh bare, direct handle.
    pub fn wrapped(value: Object) -> Object {
        Object::Handle(PdfObject::new(value).into_handle())
    }

    /// Get the type name of this object (without data).
    ///
    /// Returns a human-readable type name like "String", "Array", "Dictionary", etc.
    /// without including the actual data content.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::ByteString(_) => "ByteString",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
            Object::Handle(_) => "Object",
        }
    }

    /// Kind tag of this value.
    ///
    /// Handles report the kind of the value they wrap.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Null => ObjectKind::Null,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::Integer(_) => ObjectKind::Integer,
            Object::Real(_) => ObjectKind::Real,
            Object::String(_) => ObjectKind::String,
            Object::ByteString(_) => ObjectKind::ByteString,
            Object::Name(_) => ObjectKind::Name,
            Object::Array(_) => ObjectKind::Array,
            Object::Dictionary(_) => ObjectKind::Dictionary,
            Object::Stream { .. } => ObjectKind::Stream,
            Object::Reference(_) => ObjectKind::Reference,
            Object::Handle(h) => match h.try_borrow() {
                Ok(obj) => obj.value.kind(),
                // Only dictionaries stay mutably borrowed across calls
                Err(_) => ObjectKind::Dictionary,
            },
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Mutable variant of [`Object::as_dict`].
    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to a wrapped object handle.
    pub fn as_handle(&self) -> Option<&ObjectHandle> {
        match self {
            Object::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to cast to real number.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to string bytes (text or binary).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) | Object::ByteString(s) => Some(s),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Check if the value is null, looking through bare handles.
    pub fn is_null_value(&self) -> bool {
        match self {
            Object::Null => true,
            Object::Handle(h) => h.try_borrow().map(|o| o.value.is_null()).unwrap_or(false),
            _ => false,
        }
    }

    /// Decode stream data using the filters specified in the stream dictionary.
    ///
    /// # Returns
    ///
    /// The decoded stream data, or an error if this is not a stream object
    /// or if decoding fails.
    pub fn decode_stream_data(&self, config: &ObjectStreamConfig) -> Result<Vec<u8>> {
        match self {
            Object::Stream { dict, data } => {
                let mut source = crate::decoders::pipeline(dict, data.clone(), config)?;
                crate::decoders::drain(source.as_mut(), config.max_decompressed_size)
            },
            Object::Handle(h) => {
                let obj = h.try_borrow().map_err(|_| Error::ObjectInUse)?;
                obj.value.decode_stream_data(config)
            },
            _ => Err(Error::InvalidObjectType {
                expected: "Stream".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Boolean(b)
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Integer(i)
    }
}

impl From<f64> for Object {
    fn from(r: f64) -> Self {
        Object::Real(r)
    }
}

impl From<ObjectRef> for Object {
    fn from(r: ObjectRef) -> Self {
        Object::Reference(r)
    }
}

impl From<ObjectHandle> for Object {
    fn from(h: ObjectHandle) -> Self {
        Object::Handle(h)
    }
}

impl From<Vec<Object>> for Object {
    fn from(items: Vec<Object>) -> Self {
        Object::Array(items)
    }
}

impl From<Dict> for Object {
    fn from(d: Dict) -> Self {
        Object::Dictionary(d)
    }
}
