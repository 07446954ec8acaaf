//! Configuration for object stream encoding and decoding.

/// Default upper bound for `/N` (DoS protection).
pub const DEFAULT_MAX_OBJECTS: usize = 1_000_000;

/// Default upper bound for `/First`.
pub const DEFAULT_MAX_FIRST: usize = 10_000_000;

/// Default maximum decompressed stream size (100 MB).
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 100 * 1024 * 1024;

/// Default chunk size handed out by the byte pipeline.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Object stream processing configuration.
///
/// # Example
///
/// ```
/// use pdf_objmodel::config::ObjectStreamConfig;
///
/// let config = ObjectStreamConfig::new()
///     .with_compress(true)
///     .with_max_objects(10_000);
/// assert!(config.compress);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ObjectStreamConfig {
    /// Flate-compress the payload written by `write_objects`.
    pub compress: bool,

    /// Size of the chunks pulled through the decoding pipeline.
    pub chunk_size: usize,

    /// Maximum decompressed payload size in bytes (0 = unlimited).
    ///
    /// Protects against decompression bombs.
    pub max_decompressed_size: usize,

    /// Maximum accepted `/N` value.
    pub max_objects: usize,

    /// Maximum accepted `/First` value.
    pub max_first: usize,
}

impl Default for ObjectStreamConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStreamConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            compress: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_objects: DEFAULT_MAX_OBJECTS,
            max_first: DEFAULT_MAX_FIRST,
        }
    }

    /// Enable payload compression on write.
    pub fn with_compress(mut self, enable: bool) -> Self {
        self.compress = enable;
        self
    }

    /// Set the pipeline chunk size (at least one byte).
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set the maximum decompressed payload size.
    pub fn with_max_decompressed_size(mut self, size: usize) -> Self {
        self.max_decompressed_size = size;
        self
    }

    /// Set the maximum accepted object count.
    pub fn with_max_objects(mut self, max: usize) -> Self {
        self.max_objects = max;
        self
    }

    /// Set the maximum accepted `/First` offset.
    pub fn with_max_first(mut self, max: usize) -> Self {
        self.max_first = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ObjectStreamConfig::default();
        assert!(!config.compress);
        assert_eq!(config.max_objects, DEFAULT_MAX_OBJECTS);
        assert_eq!(config.max_first, DEFAULT_MAX_FIRST);
    }

    #[test]
    fn test_chunk_size_never_zero() {
        let config = ObjectStreamConfig::new().with_chunk_size(0);
        assert_eq!(config.chunk_size, 1);
    }
}
