//! PDF object serialization.
//!
//! Renders [`Object`] values back to PDF syntax. Indirect handles are written
//! as references (`n g R`), direct handles inline. Dictionaries keep their
//! insertion order so that a parse/serialize cycle is stable.

use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectHandle, PdfObject};
use std::cell::RefCell;
use std::io::Write;

/// Direct handles currently being written, innermost last.
type OpenHandles = Vec<*const RefCell<PdfObject>>;

/// Serializer for PDF objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectSerializer {
    /// Whether to use compact formatting (minimal whitespace)
    compact: bool,
}

impl ObjectSerializer {
    /// Create a new object serializer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact serializer (minimal whitespace).
    ///
    /// This is the form used inside object streams.
    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Serialize an object to bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::DirectObjectCycle`] if a direct handle contains
    /// itself.
    pub fn serialize(&self, obj: &Object) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_value(&mut buf, obj)?;
        Ok(buf)
    }

    /// Serialize an object to a string (for debugging and logging).
    pub fn serialize_to_string(&self, obj: &Object) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.serialize(obj)?).into_owned())
    }

    /// Write an object, appending to `w`.
    pub fn write_value<W: Write>(&self, w: &mut W, obj: &Object) -> Result<()> {
        let mut open = Vec::new();
        self.write_object(w, obj, &mut open)
    }

    fn write_object<W: Write>(
        &self,
        w: &mut W,
        obj: &Object,
        open: &mut OpenHandles,
    ) -> Result<()> {
        match obj {
            Object::Null => write!(w, "null")?,
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" })?,
            Object::Integer(i) => write!(w, "{}", i)?,
            Object::Real(r) => self.write_real(w, *r)?,
            Object::String(s) => self.write_string(w, s)?,
            Object::ByteString(s) => self.write_hex(w, s)?,
            Object::Name(n) => self.write_name(w, n)?,
            Object::Array(arr) => self.write_array(w, arr, open)?,
            Object::Dictionary(dict) => self.write_dictionary(w, dict, open)?,
            Object::Stream { dict, data } => self.write_stream(w, dict, data, open)?,
            Object::Reference(r) => write!(w, "{} {} R", r.id, r.gen)?,
            Object::Handle(h) => self.write_handle(w, h, open)?,
        }
        Ok(())
    }

    fn write_handle<W: Write>(
        &self,
        w: &mut W,
        handle: &ObjectHandle,
        open: &mut OpenHandles,
    ) -> Result<()> {
        let ptr = std::rc::Rc::as_ptr(handle);
        if open.contains(&ptr) {
            return Err(Error::DirectObjectCycle);
        }
        let obj = handle.try_borrow().map_err(|_| Error::ObjectInUse)?;
        if let Some(r) = obj.oid {
            write!(w, "{} {} R", r.id, r.gen)?;
            return Ok(());
        }
        open.push(ptr);
        let result = self.write_object(w, &obj.value, open);
        open.pop();
        result
    }

    /// Write a real number.
    ///
    /// Uses the shortest decimal that parses back to the same value, always
    /// with a decimal point so it reads back as a real. PDF has no exponent
    /// syntax, so large and tiny values are written out in full.
    fn write_real<W: Write>(&self, w: &mut W, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::NonFiniteReal(value));
        }
        // f64 Display never uses exponent notation
        let formatted = value.to_string();
        if formatted.contains('.') {
            write!(w, "{}", formatted)?;
        } else {
            write!(w, "{}.0", formatted)?;
        }
        Ok(())
    }

    /// Write a text string in literal syntax `(...)`.
    ///
    /// Delimiters and the backslash are escaped; bytes outside printable
    /// ASCII use three-digit octal escapes so they read back unchanged.
    fn write_string<W: Write>(&self, w: &mut W, data: &[u8]) -> std::io::Result<()> {
        write!(w, "(")?;
        for &byte in data {
            match byte {
                b'(' => write!(w, "\\(")?,
                b')' => write!(w, "\\)")?,
                b'\\' => write!(w, "\\\\")?,
                b'\n' => write!(w, "\\n")?,
                b'\r' => write!(w, "\\r")?,
                b'\t' => write!(w, "\\t")?,
                0x20..=0x7E => w.write_all(&[byte])?,
                _ => write!(w, "\\{:03o}", byte)?,
            }
        }
        write!(w, ")")
    }

    fn write_hex<W: Write>(&self, w: &mut W, data: &[u8]) -> std::io::Result<()> {
        write!(w, "<")?;
        for byte in data {
            write!(w, "{:02X}", byte)?;
        }
        write!(w, ">")
    }

    /// Write a PDF name.
    ///
    /// Names start with `/` and escape special characters with `#xx`.
    fn write_name<W: Write>(&self, w: &mut W, name: &str) -> std::io::Result<()> {
        write!(w, "/")?;
        for byte in name.bytes() {
            match byte {
                b'!'
                | b'"'
                | b'$'
                | b'&'
                | b'\''
                | b'*'..=b'.'
                | b'0'..=b'9'
                | b';'
                | b'='
                | b'?'
                | b'@'
                | b'A'..=b'Z'
                | b'\\'
                | b'^'..=b'z'
                | b'|'
                | b'~' => w.write_all(&[byte])?,
                _ => write!(w, "#{:02X}", byte)?,
            }
        }
        Ok(())
    }

    fn write_array<W: Write>(
        &self,
        w: &mut W,
        arr: &[Object],
        open: &mut OpenHandles,
    ) -> Result<()> {
        write!(w, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            self.write_object(w, obj, open)?;
        }
        write!(w, "]")?;
        Ok(())
    }

    fn write_dictionary<W: Write>(
        &self,
        w: &mut W,
        dict: &Dict,
        open: &mut OpenHandles,
    ) -> Result<()> {
        write!(w, "<<")?;
        for (key, value) in dict {
            if !self.compact {
                write!(w, "\n  ")?;
            }
            self.write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value, open)?;
        }
        if !self.compact && !dict.is_empty() {
            writeln!(w)?;
        }
        write!(w, ">>")?;
        Ok(())
    }

    fn write_stream<W: Write>(
        &self,
        w: &mut W,
        dict: &Dict,
        data: &[u8],
        open: &mut OpenHandles,
    ) -> Result<()> {
        let mut dict_with_length = dict.clone();
        if !dict_with_length.contains_key("Length") {
            dict_with_length.insert("Length".to_string(), Object::Integer(data.len() as i64));
        }

        self.write_dictionary(w, &dict_with_length, open)?;
        write!(w, "\nstream\n")?;
        w.write_all(data)?;
        write!(w, "\nendstream")?;
        Ok(())
    }
}
