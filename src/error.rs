//! Error types for the object model.
//!
//! Structural failures (a dictionary built over a non-mapping, a non-name key,
//! an out-of-range object stream index, a malformed object stream header) are
//! reported as [`Error`] values. Issues found while validating a dictionary are
//! not errors: they are handed to the caller's callback instead.

use crate::object::ObjectRef;

/// Result type alias for object model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building, reading or encoding objects.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// A dictionary was constructed over a value that is not a mapping or stream
    #[error("Invalid dictionary value: expected Dictionary or Stream, found {0}")]
    InvalidDictionaryValue(String),

    /// A dictionary entry was written with a key that is not a name
    #[error("Invalid key type: dictionary keys must be names, found {0}")]
    InvalidKeyType(String),

    /// Object stream data accessed outside of `[0, N)`
    #[error("Object stream index {index} out of range (0..{len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of objects in the stream
        len: usize,
    },

    /// Object stream header or dictionary cannot be decoded
    #[error("Malformed object stream: {0}")]
    MalformedObjectStream(String),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// A reference that must resolve is missing from the document
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// A deferred field type name is not registered
    #[error("Unknown dictionary type: {0}")]
    UnknownType(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// An object is already borrowed further up the current operation
    #[error("Circular reference detected: object {0}")]
    CircularReference(ObjectRef),

    /// An object handle is already borrowed by an enclosing operation
    #[error("Object is in use by an enclosing operation")]
    ObjectInUse,

    /// A real number has no PDF representation (NaN or infinite)
    #[error("Cannot serialize non-finite real number {0}")]
    NonFiniteReal(f64),

    /// A direct object contains itself and cannot be rendered inline
    #[error("Direct object cycle: a direct object cannot contain itself")]
    DirectObjectCycle,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dictionary_value_error() {
        let err = Error::InvalidDictionaryValue("Integer".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid dictionary value"));
        assert!(msg.contains("Integer"));
    }

    #[test]
    fn test_index_out_of_range_error() {
        let err = Error::IndexOutOfRange { index: 7, len: 2 };
        let msg = format!("{}", err);
        assert!(msg.contains("7"));
        assert!(msg.contains("0..2"));
    }

    #[test]
    fn test_parse_error() {
        let err = Error::ParseError {
            offset: 1234,
            reason: "invalid token".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("1234"));
        assert!(msg.contains("invalid token"));
    }

    #[test]
    fn test_object_not_found_error() {
        let err = Error::ObjectNotFound(10, 0);
        assert!(format!("{}", err).contains("10 0 R"));
    }

    #[test]
    fn test_circular_reference_error() {
        let err = Error::CircularReference(ObjectRef::new(4, 0));
        assert!(format!("{}", err).contains("4 0 R"));
    }
}
