//! Schema-aware dictionaries.
//!
//! A [`Dictionary`] is a view over a shared [`ObjectHandle`] whose value is a
//! dictionary or a stream, governed by a [`DictType`]. Reads go through the
//! schema: absent fields with a default are filled in, references are
//! resolved through the [`Document`] and cached in place, and values are
//! coerced to the declared type. [`Dictionary::validate`] checks (and, on
//! request, repairs) the dictionary and every direct object nested in it.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectHandle, ObjectRef, PdfObject};
use crate::schema::{dictionary_type, DictType, Field, Indirectness, Reporter, TypeRegistry};
use std::cell::{RefCell, RefMut};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

/// A typed dictionary (or stream dictionary).
///
/// Cloning a `Dictionary` clones the handle: both clones see the same entries.
///
/// # Example
///
/// ```
/// use pdf_objmodel::dictionary::Dictionary;
/// use pdf_objmodel::document::MemoryDocument;
/// use pdf_objmodel::object::{Dict, Object, ObjectKind};
/// use pdf_objmodel::schema::{dictionary_type, DictType, Field};
/// use std::rc::Rc;
///
/// let mut info = DictType::new("Info", Some(dictionary_type()));
/// info.define_field("Trapped", Field::new(ObjectKind::Name).default(Object::name("Unknown")));
///
/// let mut doc = MemoryDocument::new();
/// let dict = Dictionary::new(Rc::new(info), Object::Dictionary(Dict::new())).unwrap();
/// assert_eq!(dict.get("Trapped", &mut doc).unwrap(), Object::name("Unknown"));
/// assert!(dict.contains_key("Trapped").unwrap());
/// ```
#[derive(Clone)]
pub struct Dictionary {
    handle: ObjectHandle,
    ty: Rc<DictType>,
}

impl Dictionary {
    /// Wrap `value` as a dictionary of type `ty`.
    ///
    /// `value` may be a dictionary, a stream, or a handle wrapping either; a
    /// handle is typed in place and keeps its identity. Required fields that
    /// have a default and are absent are filled in.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDictionaryValue`] if `value` is not a mapping.
    pub fn new(ty: Rc<DictType>, value: Object) -> Result<Self> {
        let handle = match value {
            Object::Dictionary(_) | Object::Stream { .. } => {
                PdfObject::typed(value, ty.clone()).into_handle()
            },
            Object::Handle(handle) => {
                {
                    let mut obj = handle.try_borrow_mut().map_err(|_| Error::ObjectInUse)?;
                    if obj.value.as_dict().is_none() {
                        return Err(Error::InvalidDictionaryValue(
                            obj.value.type_name().to_string(),
                        ));
                    }
                    obj.ty = Some(ty.clone());
                }
                handle
            },
            other => return Err(Error::InvalidDictionaryValue(other.type_name().to_string())),
        };

        let dict = Self { handle, ty };
        dict.fill_required_defaults()?;
        Ok(dict)
    }

    /// Empty dictionary of type `ty`.
    pub fn empty(ty: Rc<DictType>) -> Result<Self> {
        Self::new(ty, Object::Dictionary(Dict::new()))
    }

    /// View an already-typed handle as a dictionary.
    ///
    /// Returns `None` if the handle has no type or does not wrap a mapping.
    pub fn from_handle(handle: ObjectHandle) -> Option<Self> {
        let ty = {
            let obj = handle.try_borrow().ok()?;
            obj.value.as_dict()?;
            obj.ty.clone()?
        };
        Some(Self { handle, ty })
    }

    /// View of a handle for validation: untyped mappings use the root type.
    fn view(handle: ObjectHandle) -> Option<Self> {
        let ty = {
            let obj = handle.try_borrow().ok()?;
            obj.value.as_dict()?;
            obj.ty.clone().unwrap_or_else(dictionary_type)
        };
        Some(Self { handle, ty })
    }

    fn fill_required_defaults(&self) -> Result<()> {
        let mut obj = self.borrow_mut()?;
        let Some(dict) = obj.value.as_dict_mut() else {
            return Ok(());
        };
        for (name, field) in self.ty.each_field() {
            if let (true, Some(default)) = (field.is_required(), field.default_value()) {
                if !dict.contains_key(name) {
                    dict.insert(name.to_string(), default.clone());
                }
            }
        }
        Ok(())
    }

    /// The shared handle behind this dictionary.
    pub fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    /// The dictionary as a value, for storing in another container.
    pub fn to_object(&self) -> Object {
        Object::Handle(self.handle.clone())
    }

    /// Dictionary type.
    pub fn dict_type(&self) -> &Rc<DictType> {
        &self.ty
    }

    /// Name of the dictionary type.
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// All schema fields, ancestors first.
    pub fn each_field(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.ty.each_field()
    }

    /// Identity, if the dictionary is an indirect object.
    pub fn oid(&self) -> Option<ObjectRef> {
        self.handle.try_borrow().ok().and_then(|o| o.oid)
    }

    fn borrow_mut(&self) -> Result<RefMut<'_, PdfObject>> {
        self.handle.try_borrow_mut().map_err(|_| Error::ObjectInUse)
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut Dict) -> T) -> Result<T> {
        let mut obj = self.borrow_mut()?;
        let found = obj.value.type_name();
        let dict = obj
            .value
            .as_dict_mut()
            .ok_or_else(|| Error::InvalidDictionaryValue(found.to_string()))?;
        Ok(f(dict))
    }

    /// Read an entry through the schema.
    ///
    /// In order: an absent entry whose field has a default gets the default
    /// stored; a reference is resolved and the entry replaced by the
    /// resolved object (a dangling reference reads as `Null` and stays); the
    /// value is converted to the field's type and the conversion stored;
    /// finally a bare handle is unwrapped to a copy of its value. Typed
    /// dictionaries come back as handles. Absent entries without a default
    /// read as `Null`.
    pub fn get(&self, name: &str, doc: &mut dyn Document) -> Result<Object> {
        let raw = self.resolve_entry(name, doc, true)?;
        Ok(raw.map(unwrap_bare).unwrap_or(Object::Null))
    }

    /// Read an entry and view it as a typed dictionary.
    pub fn get_dictionary(&self, name: &str, doc: &mut dyn Document) -> Result<Option<Dictionary>> {
        Ok(match self.get(name, doc)? {
            Object::Handle(handle) => Dictionary::from_handle(handle),
            _ => None,
        })
    }

    /// Entry after default materialization, reference resolution and
    /// conversion, with bare handles still wrapped. `None` if absent, or if
    /// the reference cannot be resolved.
    fn resolve_entry(
        &self,
        name: &str,
        doc: &mut dyn Document,
        materialize: bool,
    ) -> Result<Option<Object>> {
        let field = self.ty.field(name);

        let raw = self.with_entries(|dict| match dict.get(name) {
            Some(value) => Some(value.clone()),
            None => {
                let default = field.and_then(|f| f.default_value()).filter(|_| materialize)?;
                log::debug!("Materializing default for {}.{}", self.ty.name(), name);
                dict.insert(name.to_string(), default.clone());
                Some(default.clone())
            },
        })?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let value = match raw {
            Object::Reference(obj_ref) => match doc.deref(obj_ref)? {
                Some(handle) => {
                    let resolved = Object::Handle(handle);
                    self.with_entries(|dict| dict.insert(name.to_string(), resolved.clone()))?;
                    resolved
                },
                None => {
                    log::warn!(
                        "{}.{}: reference {} cannot be resolved",
                        self.ty.name(),
                        name,
                        obj_ref
                    );
                    return Ok(None);
                },
            },
            other => other,
        };

        let Some(field) = field else {
            return Ok(Some(value));
        };
        let registry = doc.type_registry();
        match field.convert(&value, &registry)? {
            Some(converted) => {
                self.set(name, converted.clone())?;
                Ok(Some(converted))
            },
            None => Ok(Some(value)),
        }
    }

    /// Write an entry. See [`Dictionary::insert`].
    pub fn set(&self, name: &str, value: Object) -> Result<()> {
        self.insert(Object::Name(name.to_string()), value)
    }

    /// Write an entry with a `Name` key.
    ///
    /// If the current entry is a bare handle and `value` is a plain value
    /// (neither a handle nor a reference), the handle is updated in place so
    /// everything sharing it sees the new value. Otherwise the entry is
    /// replaced.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyType`] if `key` is not a name.
    pub fn insert(&self, key: Object, value: Object) -> Result<()> {
        let name = match key {
            Object::Name(name) => name,
            other => return Err(Error::InvalidKeyType(other.type_name().to_string())),
        };
        self.with_entries(|dict| {
            if let Some(Object::Handle(existing)) = dict.get(&name) {
                if !matches!(value, Object::Handle(_) | Object::Reference(_)) {
                    if let Ok(mut inner) = existing.try_borrow_mut() {
                        if inner.is_bare() {
                            inner.value = value;
                            return;
                        }
                    }
                }
            }
            dict.insert(name, value);
        })
    }

    /// Remove an entry, keeping the order of the others.
    pub fn remove(&self, name: &str) -> Result<Option<Object>> {
        self.with_entries(|dict| dict.shift_remove(name))
    }

    /// Whether an entry is stored (defaults are not considered).
    pub fn contains_key(&self, name: &str) -> Result<bool> {
        self.with_entries(|dict| dict.contains_key(name))
    }

    /// Stored entry names, in order.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.with_entries(|dict| dict.keys().cloned().collect())
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize> {
        self.with_entries(|dict| dict.len())
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> Result<bool> {
        self.with_entries(|dict| dict.is_empty())
    }

    /// Stored entry without schema processing.
    pub fn get_raw(&self, name: &str) -> Result<Option<Object>> {
        self.with_entries(|dict| dict.get(name).cloned())
    }

    /// Check this dictionary and every direct object reachable from it.
    ///
    /// Issues go to `on_issue(message, correctable)`. With `auto_correct`,
    /// correctable issues are fixed: missing required fields get their
    /// default, the document version is raised for newer fields, and values
    /// are moved to or from indirect storage as their field demands.
    ///
    /// Returns `Ok(true)` if no issue is uncorrectable and, unless
    /// correcting, no issue was found at all. Each object is checked once,
    /// even when it is reachable along several paths.
    pub fn validate(
        &self,
        doc: &mut dyn Document,
        auto_correct: bool,
        on_issue: &mut dyn FnMut(&str, bool),
    ) -> Result<bool> {
        let mut reporter = Reporter::new(auto_correct, on_issue);
        let registry = doc.type_registry();
        let mut pending = VecDeque::from([self.handle.clone()]);
        let mut visited: HashSet<*const RefCell<PdfObject>> = HashSet::new();

        while let Some(handle) = pending.pop_front() {
            if !visited.insert(Rc::as_ptr(&handle)) {
                continue;
            }
            match Dictionary::view(handle) {
                Some(dict) => {
                    dict.validate_entries(doc, &registry, &mut reporter, &mut pending)?
                },
                None => log::debug!("Skipping non-dictionary or busy object during validation"),
            }
        }

        Ok(reporter.passed())
    }

    fn validate_entries(
        &self,
        doc: &mut dyn Document,
        registry: &TypeRegistry,
        reporter: &mut Reporter<'_>,
        pending: &mut VecDeque<ObjectHandle>,
    ) -> Result<()> {
        let mut names = self.keys()?;
        for (name, field) in self.ty.each_field() {
            if field.is_required() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        for name in &names {
            let value = self.resolve_entry(name, doc, false)?;
            if let Some(value) = &value {
                queue_direct_children(value, pending);
            }

            let Some(field) = self.ty.field(name) else {
                continue;
            };

            let value = match value {
                Some(v) if !v.is_null_value() => v,
                _ => {
                    if field.is_required() {
                        self.report_missing(name, field, reporter)?;
                    }
                    continue;
                },
            };

            if !field.valid_object(&value, registry)? {
                reporter.report(
                    &format!(
                        "{}.{}: expected {}, found {}",
                        self.ty.name(),
                        name,
                        field.describe_types(registry)?,
                        value.kind()
                    ),
                    false,
                );
            }

            let needed = field.min_version();
            if needed > doc.version() {
                reporter.report(
                    &format!(
                        "{}.{}: requires PDF {}.{}, document is {}.{}",
                        self.ty.name(),
                        name,
                        needed.0,
                        needed.1,
                        doc.version().0,
                        doc.version().1
                    ),
                    true,
                );
                if reporter.auto_correct() {
                    doc.set_version(needed);
                }
            }

            self.check_indirectness(name, field, value, doc, reporter)?;
        }

        if let Some(hook) = self.ty.validator() {
            match self.handle.try_borrow() {
                Ok(obj) => hook(&obj, reporter),
                Err(_) => log::warn!("{}: object busy, skipping type checks", self.ty.name()),
            }
        }
        Ok(())
    }

    fn report_missing(&self, name: &str, field: &Field, reporter: &mut Reporter<'_>) -> Result<()> {
        let message = format!("{}.{}: required field is missing", self.ty.name(), name);
        match field.default_value() {
            Some(default) => {
                reporter.report(&message, true);
                if reporter.auto_correct() {
                    log::debug!("Auto-correct: storing default for {}.{}", self.ty.name(), name);
                    self.set(name, default.clone())?;
                }
            },
            None => reporter.report(&message, false),
        }
        Ok(())
    }

    fn check_indirectness(
        &self,
        name: &str,
        field: &Field,
        value: Object,
        doc: &mut dyn Document,
        reporter: &mut Reporter<'_>,
    ) -> Result<()> {
        let indirect = match &value {
            Object::Handle(handle) => match handle.try_borrow() {
                Ok(obj) => obj.is_indirect(),
                Err(_) => return Ok(()),
            },
            _ => false,
        };

        match (field.indirectness(), indirect) {
            (Indirectness::MustBeIndirect, false) => {
                reporter.report(
                    &format!("{}.{}: must be an indirect object", self.ty.name(), name),
                    true,
                );
                if reporter.auto_correct() {
                    let handle = match value {
                        Object::Handle(handle) => handle,
                        other => {
                            let handle = PdfObject::new(other).into_handle();
                            self.with_entries(|dict| {
                                dict.insert(name.to_string(), Object::Handle(handle.clone()))
                            })?;
                            handle
                        },
                    };
                    let oid = doc.add(handle)?;
                    log::debug!("Auto-correct: {}.{} promoted to {}", self.ty.name(), name, oid);
                }
            },
            (Indirectness::MustBeDirect, true) => {
                reporter.report(
                    &format!("{}.{}: must be a direct object", self.ty.name(), name),
                    true,
                );
                if reporter.auto_correct() {
                    if let Object::Handle(handle) = value {
                        self.demote(name, handle, doc)?;
                    }
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn demote(&self, name: &str, handle: ObjectHandle, doc: &mut dyn Document) -> Result<()> {
        let (oid, inline) = {
            let mut obj = handle.try_borrow_mut().map_err(|_| Error::ObjectInUse)?;
            let oid = obj.oid.take();
            let inline = obj.is_bare().then(|| obj.value.clone());
            (oid, inline)
        };
        if let Some(oid) = oid {
            doc.delete(oid);
            log::debug!("Auto-correct: {}.{} demoted from {}", self.ty.name(), name, oid);
        }
        if let Some(value) = inline {
            self.with_entries(|dict| dict.insert(name.to_string(), value))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("type", &self.ty.name())
            .field("object", &self.handle)
            .finish()
    }
}

/// Copy of a bare handle's value; anything else unchanged.
fn unwrap_bare(value: Object) -> Object {
    if let Object::Handle(handle) = &value {
        if let Ok(obj) = handle.try_borrow() {
            if obj.is_bare() {
                return obj.value.clone();
            }
        }
    }
    value
}

/// Queue direct handles in `value`, looking through plain nested mappings.
fn queue_direct_children(value: &Object, pending: &mut VecDeque<ObjectHandle>) {
    let mut stack = vec![value];
    while let Some(current) = stack.pop() {
        match current {
            Object::Handle(handle) => {
                if handle.try_borrow().map(|o| !o.is_indirect()).unwrap_or(false) {
                    pending.push_back(handle.clone());
                }
            },
            Object::Dictionary(dict) | Object::Stream { dict, .. } => {
                // Reverse so nested entries are visited in mapping order
                stack.extend(dict.values().rev());
            },
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::object::ObjectKind;

    fn info_type() -> Rc<DictType> {
        let mut ty = DictType::new("Info", Some(dictionary_type()));
        ty.define_field(
            "Trapped",
            Field::new(ObjectKind::Name).required().default(Object::name("Unknown")),
        )
        .define_field("Title", Field::new(ObjectKind::String));
        Rc::new(ty)
    }

    #[test]
    fn test_new_rejects_non_mapping() {
        match Dictionary::new(info_type(), Object::Integer(3)) {
            Err(Error::InvalidDictionaryValue(found)) => assert_eq!(found, "Integer"),
            other => panic!("expected InvalidDictionaryValue, got {:?}", other),
        }
    }

    #[test]
    fn test_new_fills_required_defaults() {
        let dict = Dictionary::empty(info_type()).unwrap();
        assert_eq!(dict.get_raw("Trapped").unwrap(), Some(Object::name("Unknown")));
        assert!(!dict.contains_key("Title").unwrap());
    }

    #[test]
    fn test_new_types_handle_in_place() {
        let handle = PdfObject::new(Object::Dictionary(Dict::new()))
            .with_oid(ObjectRef::new(4, 0))
            .into_handle();
        let dict = Dictionary::new(info_type(), Object::Handle(handle.clone())).unwrap();
        assert_eq!(dict.oid(), Some(ObjectRef::new(4, 0)));
        assert_eq!(handle.borrow().ty.as_ref().map(|t| t.name().to_string()), Some("Info".to_string()));
    }

    #[test]
    fn test_insert_requires_name_key() {
        let dict = Dictionary::empty(info_type()).unwrap();
        assert!(matches!(
            dict.insert(Object::Integer(1), Object::Null),
            Err(Error::InvalidKeyType(_))
        ));
    }

    #[test]
    fn test_get_absent_without_default_is_null() {
        let mut doc = MemoryDocument::new();
        let dict = Dictionary::empty(info_type()).unwrap();
        assert_eq!(dict.get("Title", &mut doc).unwrap(), Object::Null);
        assert_eq!(dict.get("Unknown", &mut doc).unwrap(), Object::Null);
        assert!(!dict.contains_key("Title").unwrap());
    }

    #[test]
    fn test_get_resolves_and_caches_reference() {
        let mut doc = MemoryDocument::new();
        let r = ObjectRef::new(8, 0);
        doc.insert(r, Object::string("Hello")).unwrap();
        let dict = Dictionary::empty(info_type()).unwrap();
        dict.set("Title", Object::Reference(r)).unwrap();

        assert_eq!(dict.get("Title", &mut doc).unwrap(), Object::string("Hello"));
        assert!(matches!(dict.get_raw("Title").unwrap(), Some(Object::Handle(_))));
    }

    #[test]
    fn test_dangling_reference_reads_null_and_stays() {
        let mut doc = MemoryDocument::new();
        let dict = Dictionary::empty(info_type()).unwrap();
        let r = ObjectRef::new(99, 0);
        dict.set("Title", Object::Reference(r)).unwrap();
        assert_eq!(dict.get("Title", &mut doc).unwrap(), Object::Null);
        assert_eq!(dict.get_raw("Title").unwrap(), Some(Object::Reference(r)));
    }

    #[test]
    fn test_remove_keeps_order() {
        let dict = Dictionary::empty(info_type()).unwrap();
        dict.set("A", Object::Integer(1)).unwrap();
        dict.set("B", Object::Integer(2)).unwrap();
        assert_eq!(dict.remove("A").unwrap(), Some(Object::Integer(1)));
        assert_eq!(dict.keys().unwrap(), vec!["Trapped", "B"]);
        assert_eq!(dict.len().unwrap(), 2);
    }

    #[test]
    fn test_queue_direct_children_skips_indirect() {
        let direct = PdfObject::new(Object::Dictionary(Dict::new())).into_handle();
        let indirect = PdfObject::new(Object::Null)
            .with_oid(ObjectRef::new(1, 0))
            .into_handle();
        let mut nested = Dict::new();
        nested.insert("D".to_string(), Object::Handle(direct));
        nested.insert("I".to_string(), Object::Handle(indirect));
        let mut pending = VecDeque::new();
        queue_direct_children(&Object::Dictionary(nested), &mut pending);
        assert_eq!(pending.len(), 1);
    }
}
