//! Document and revision capabilities.
//!
//! Dictionaries and object streams call back into a [`Document`] to resolve
//! references, allocate identities for promoted objects and look up the
//! type registry. [`MemoryDocument`] is a complete in-memory implementation:
//! an object table keyed by identity holding shared handles, so mutating an
//! object through any dictionary that holds it is visible to every other
//! holder.

use crate::config::ObjectStreamConfig;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectHandle, ObjectRef, PdfObject};
use crate::objstm::ObjectStream;
use crate::schema::{default_registry, TypeRegistry, Version};
use indexmap::IndexMap;
use std::rc::Rc;

/// Default PDF version of a new in-memory document.
pub const DEFAULT_VERSION: Version = (1, 4);

/// What dictionaries need from the document that owns them.
pub trait Document {
    /// Resolve a reference. `Ok(None)` when the document has no such object.
    fn deref(&mut self, obj_ref: ObjectRef) -> Result<Option<ObjectHandle>>;

    /// Register `handle` as an indirect object and return its identity.
    ///
    /// A handle that already has an identity keeps it.
    fn add(&mut self, handle: ObjectHandle) -> Result<ObjectRef>;

    /// Free an identity, returning the object that held it.
    fn delete(&mut self, obj_ref: ObjectRef) -> Option<ObjectHandle>;

    /// Registry used to resolve deferred field types.
    fn type_registry(&self) -> Rc<TypeRegistry>;

    /// Identity of the security (encryption) dictionary, if any.
    fn encryption_dict(&self) -> Option<ObjectRef>;

    /// PDF version.
    fn version(&self) -> Version;

    /// Change the PDF version.
    fn set_version(&mut self, version: Version);
}

/// Read access to the objects of one document revision.
pub trait Revision {
    /// Object with the given identity in this revision.
    fn object(&self, obj_ref: ObjectRef) -> Option<ObjectHandle>;
}

/// In-memory document: an object table plus document-level settings.
///
/// # Example
///
/// ```
/// use pdf_objmodel::document::{Document, MemoryDocument};
/// use pdf_objmodel::object::{Object, PdfObject};
///
/// let mut doc = MemoryDocument::new();
/// let oid = doc.add(PdfObject::new(Object::Integer(7)).into_handle()).unwrap();
/// assert_eq!(oid.id, 1);
/// assert!(doc.deref(oid).unwrap().is_some());
/// ```
pub struct MemoryDocument {
    objects: IndexMap<ObjectRef, ObjectHandle>,
    next_id: u32,
    version: Version,
    encryption: Option<ObjectRef>,
    registry: Rc<TypeRegistry>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty document using a snapshot of the default type registry.
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    /// Empty document with its own type registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            objects: IndexMap::new(),
            next_id: 1,
            version: DEFAULT_VERSION,
            encryption: None,
            registry: Rc::new(registry),
        }
    }

    /// Set the PDF version (builder form).
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Store `value` under an explicit identity, replacing any previous
    /// object with that identity.
    ///
    /// A handle keeps its identity-carrying wrapper; any other value is
    /// wrapped in a new bare handle.
    pub fn insert(&mut self, obj_ref: ObjectRef, value: Object) -> Result<ObjectHandle> {
        let handle = match value {
            Object::Handle(handle) => {
                handle.try_borrow_mut().map_err(|_| Error::ObjectInUse)?.oid = Some(obj_ref);
                handle
            },
            other => PdfObject::new(other).with_oid(obj_ref).into_handle(),
        };
        self.next_id = self.next_id.max(obj_ref.id.saturating_add(1));
        self.objects.insert(obj_ref, handle.clone());
        Ok(handle)
    }

    /// Object with the given identity.
    pub fn get(&self, obj_ref: ObjectRef) -> Option<ObjectHandle> {
        self.objects.get(&obj_ref).cloned()
    }

    /// Whether an object with this identity exists.
    pub fn contains(&self, obj_ref: ObjectRef) -> bool {
        self.objects.contains_key(&obj_ref)
    }

    /// Identities in insertion order.
    pub fn refs(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.objects.keys().copied()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Mark an object as the security dictionary.
    pub fn set_encryption_dict(&mut self, obj_ref: Option<ObjectRef>) {
        self.encryption = obj_ref;
    }

    /// Decode an object stream and store every object it contains,
    /// generation 0, under its object number. Indirect `/N` and `/First`
    /// values are resolved through this document.
    ///
    /// Returns the identities of the imported objects in stream order.
    pub fn import_object_stream(
        &mut self,
        stream: &mut ObjectStream,
        config: &ObjectStreamConfig,
    ) -> Result<Vec<ObjectRef>> {
        stream.resolve_header(self)?;
        let data = stream.parse_stream(config)?;
        let mut imported = Vec::with_capacity(data.len());
        let mut entries = Vec::with_capacity(data.len());
        for entry in data.iter() {
            let (value, number) = entry?;
            entries.push((ObjectRef::new(number, 0), value));
        }
        for (obj_ref, value) in entries {
            self.insert(obj_ref, value)?;
            imported.push(obj_ref);
        }
        log::debug!("Imported {} objects from object stream", imported.len());
        Ok(imported)
    }
}

impl Document for MemoryDocument {
    fn deref(&mut self, obj_ref: ObjectRef) -> Result<Option<ObjectHandle>> {
        let found = self.objects.get(&obj_ref).cloned();
        if found.is_none() {
            log::debug!("Object {} not in document", obj_ref);
        }
        Ok(found)
    }

    fn add(&mut self, handle: ObjectHandle) -> Result<ObjectRef> {
        let obj_ref = ObjectRef::new(self.next_id, 0);
        {
            let mut obj = handle
                .try_borrow_mut()
                .map_err(|_| Error::CircularReference(obj_ref))?;
            if let Some(existing) = obj.oid {
                return Ok(existing);
            }
            obj.oid = Some(obj_ref);
        }
        self.next_id += 1;
        self.objects.insert(obj_ref, handle);
        log::debug!("Registered new indirect object {}", obj_ref);
        Ok(obj_ref)
    }

    fn delete(&mut self, obj_ref: ObjectRef) -> Option<ObjectHandle> {
        let removed = self.objects.shift_remove(&obj_ref);
        if removed.is_some() {
            log::debug!("Freed indirect object {}", obj_ref);
        }
        if self.encryption == Some(obj_ref) {
            self.encryption = None;
        }
        removed
    }

    fn type_registry(&self) -> Rc<TypeRegistry> {
        self.registry.clone()
    }

    fn encryption_dict(&self) -> Option<ObjectRef> {
        self.encryption
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        if version != self.version {
            log::info!(
                "Document version {}.{} -> {}.{}",
                self.version.0,
                self.version.1,
                version.0,
                version.1
            );
        }
        self.version = version;
    }
}

impl Revision for MemoryDocument {
    fn object(&self, obj_ref: ObjectRef) -> Option<ObjectHandle> {
        self.get(obj_ref)
    }
}
