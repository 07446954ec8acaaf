//! Dictionary schemas.
//!
//! A [`DictType`] declares the fields of one kind of dictionary and links to
//! the type it extends; field lookup walks that chain, so a subtype never
//! copies or mutates its ancestors' declarations. Field types may name other
//! dictionary types that are not built yet; those names are resolved through
//! a [`TypeRegistry`] on first use and cached in the [`Field`].
//!
//! # Example
//!
//! ```
//! use pdf_objmodel::object::{Object, ObjectKind};
//! use pdf_objmodel::schema::{dictionary_type, DictType, Field};
//!
//! let mut page = DictType::new("Page", Some(dictionary_type()));
//! page.define_field("Type", Field::new(ObjectKind::Name).required().default(Object::name("Page")));
//! page.define_field("Rotate", Field::new(ObjectKind::Integer));
//!
//! assert!(page.field("Rotate").is_some());
//! assert_eq!(page.each_field().count(), 2);
//! ```

use crate::error::{Error, Result};
use crate::object::{Object, ObjectKind, PdfObject};
use indexmap::IndexMap;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// PDF version as `(major, minor)`.
pub type Version = (u8, u8);

/// Minimum version assumed for fields that do not declare one.
pub const DEFAULT_FIELD_VERSION: Version = (1, 2);

/// Type-specific validation hook, run after the field checks.
pub type Validator = fn(&PdfObject, &mut Reporter<'_>);

/// Where a field's value must live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indirectness {
    /// The value must be an indirect object
    MustBeIndirect,
    /// The value must be stored inline
    MustBeDirect,
    /// Either form is fine
    #[default]
    Unconstrained,
}

/// A type accepted by a field, as declared.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// A value kind (Integer, Name, ...)
    Kind(ObjectKind),
    /// A dictionary type
    Dict(Rc<DictType>),
    /// A dictionary type known only by name, resolved on first use
    Named(String),
}

impl From<ObjectKind> for FieldType {
    fn from(kind: ObjectKind) -> Self {
        FieldType::Kind(kind)
    }
}

impl From<Rc<DictType>> for FieldType {
    fn from(ty: Rc<DictType>) -> Self {
        FieldType::Dict(ty)
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::Named(name.to_string())
    }
}

/// A type accepted by a field, after name resolution.
#[derive(Debug, Clone)]
pub enum ResolvedType {
    /// A value kind
    Kind(ObjectKind),
    /// A dictionary type
    Dict(Rc<DictType>),
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Kind(kind) => write!(f, "{}", kind),
            ResolvedType::Dict(ty) => f.write_str(ty.name()),
        }
    }
}

/// Constraints on one dictionary entry.
#[derive(Debug, Clone)]
pub struct Field {
    types: Vec<FieldType>,
    resolved: OnceCell<Vec<ResolvedType>>,
    required: bool,
    default: Option<Object>,
    indirect: Indirectness,
    version: Version,
}

impl Field {
    /// Field accepting a single type.
    pub fn new(ty: impl Into<FieldType>) -> Self {
        Self {
            types: vec![ty.into()],
            resolved: OnceCell::new(),
            required: false,
            default: None,
            indirect: Indirectness::Unconstrained,
            version: DEFAULT_FIELD_VERSION,
        }
    }

    /// Accept another type as well.
    pub fn or(mut self, ty: impl Into<FieldType>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value used when the entry is absent.
    pub fn default(mut self, value: Object) -> Self {
        self.default = Some(value);
        self
    }

    /// Constrain where the value lives.
    pub fn indirect(mut self, indirect: Indirectness) -> Self {
        self.indirect = indirect;
        self
    }

    /// First PDF version that knows this field.
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Whether the field must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default value, if any.
    pub fn default_value(&self) -> Option<&Object> {
        self.default.as_ref()
    }

    /// Indirectness constraint.
    pub fn indirectness(&self) -> Indirectness {
        self.indirect
    }

    /// Minimum PDF version.
    pub fn min_version(&self) -> Version {
        self.version
    }

    /// Types as declared, deferred names included.
    pub fn declared_types(&self) -> &[FieldType] {
        &self.types
    }

    /// Resolve the accepted types, looking up deferred names in `registry`.
    ///
    /// The result is cached, so the registry is consulted once per field.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownType`] if a deferred name is not registered.
    pub fn resolve(&self, registry: &TypeRegistry) -> Result<&[ResolvedType]> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved);
        }
        let resolved = self
            .types
            .iter()
            .map(|ty| match ty {
                FieldType::Kind(kind) => Ok(ResolvedType::Kind(*kind)),
                FieldType::Dict(dict) => Ok(ResolvedType::Dict(dict.clone())),
                FieldType::Named(name) => registry.resolve(name).map(ResolvedType::Dict),
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Resolved field types: {}", describe(&resolved));
        Ok(self.resolved.get_or_init(|| resolved))
    }

    /// Human-readable list of the accepted types.
    pub fn describe_types(&self, registry: &TypeRegistry) -> Result<String> {
        Ok(describe(self.resolve(registry)?))
    }

    /// Whether `value` satisfies the field's type constraint.
    ///
    /// Handles are checked by their dictionary type, or by the kind of the
    /// value they wrap when untyped. A dictionary type also accepts a plain
    /// dictionary (a stream type a plain stream), since those convert. Real
    /// fields accept integers.
    pub fn valid_object(&self, value: &Object, registry: &TypeRegistry) -> Result<bool> {
        let kind = value.kind();
        let typed = handle_type(value);
        Ok(self.resolve(registry)?.iter().any(|accepted| match accepted {
            ResolvedType::Kind(k) => {
                *k == kind || (*k == ObjectKind::Real && kind == ObjectKind::Integer)
            },
            ResolvedType::Dict(ty) => match &typed {
                Some(actual) => actual.is_a(ty),
                None => accepts_plain(ty, kind),
            },
        }))
    }

    /// Coerce `value` into the form the field asks for.
    ///
    /// Returns `Some(new_value)` when the caller must store a replacement:
    /// a plain dictionary or stream becomes a typed handle, a text string
    /// becomes a byte string. An untyped handle is typed in place and needs no
    /// replacement. Values that already match one of the accepted kinds are
    /// left alone.
    pub fn convert(&self, value: &Object, registry: &TypeRegistry) -> Result<Option<Object>> {
        let accepted = self.resolve(registry)?;
        let kind = value.kind();
        if accepted
            .iter()
            .any(|a| matches!(a, ResolvedType::Kind(k) if *k == kind))
        {
            return Ok(None);
        }
        let dict_target = accepted.iter().find_map(|a| match a {
            ResolvedType::Dict(ty) if accepts_plain(ty, kind) => Some(ty.clone()),
            _ => None,
        });
        let wants_bytes = accepted
            .iter()
            .any(|a| matches!(a, ResolvedType::Kind(ObjectKind::ByteString)));

        match value {
            Object::Dictionary(_) | Object::Stream { .. } => Ok(dict_target.map(|ty| {
                log::debug!("Converting plain {} to {}", kind, ty.name());
                Object::Handle(PdfObject::typed(value.clone(), ty).into_handle())
            })),
            Object::String(bytes) if wants_bytes => Ok(Some(Object::ByteString(bytes.clone()))),
            Object::Handle(handle) => {
                // Busy handles belong to an enclosing operation; leave them as they are
                let Ok(mut obj) = handle.try_borrow_mut() else {
                    return Ok(None);
                };
                if obj.ty.is_some() {
                    return Ok(None);
                }
                if let Some(ty) = dict_target {
                    log::debug!("Typing wrapped {} as {}", kind, ty.name());
                    obj.ty = Some(ty);
                } else if wants_bytes {
                    if let Object::String(bytes) = &obj.value {
                        obj.value = Object::ByteString(bytes.clone());
                    }
                }
                Ok(None)
            },
            _ => Ok(None),
        }
    }
}

fn describe(types: &[ResolvedType]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn handle_type(value: &Object) -> Option<Rc<DictType>> {
    let handle = value.as_handle()?;
    handle.try_borrow().ok()?.ty.clone()
}

fn accepts_plain(ty: &DictType, kind: ObjectKind) -> bool {
    if ty.is_stream() {
        kind == ObjectKind::Stream
    } else {
        kind == ObjectKind::Dictionary
    }
}

/// Schema of one kind of dictionary.
///
/// Built mutably with [`DictType::define_field`], then shared behind an `Rc`.
pub struct DictType {
    name: String,
    parent: Option<Rc<DictType>>,
    fields: IndexMap<String, Field>,
    stream: bool,
    validator: Option<Validator>,
}

impl DictType {
    /// Create a type extending `parent`.
    ///
    /// Stream-ness is inherited from the parent.
    pub fn new(name: &str, parent: Option<Rc<DictType>>) -> Self {
        let stream = parent.as_ref().map(|p| p.stream).unwrap_or(false);
        Self {
            name: name.to_string(),
            parent,
            fields: IndexMap::new(),
            stream,
            validator: None,
        }
    }

    /// Mark the type as describing stream dictionaries.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Attach a type-specific validation hook.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Declare a field on this type. Redeclaring a name replaces the earlier
    /// declaration on this type only.
    pub fn define_field(&mut self, name: &str, field: Field) -> &mut Self {
        self.fields.insert(name.to_string(), field);
        self
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent type.
    pub fn parent(&self) -> Option<&Rc<DictType>> {
        self.parent.as_ref()
    }

    /// Whether values of this type are streams.
    pub fn is_stream(&self) -> bool {
        self.stream
    }

    /// Validation hook, if any.
    pub fn validator(&self) -> Option<Validator> {
        self.validator
    }

    /// Look up a field on this type or its ancestors.
    pub fn field(&self, name: &str) -> Option<&Field> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(field) = ty.fields.get(name) {
                return Some(field);
            }
            current = ty.parent.as_deref();
        }
        None
    }

    /// Fields declared on this type only.
    pub fn own_fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All fields, ancestors first, each level in declaration order.
    pub fn each_field(&self) -> impl Iterator<Item = (&str, &Field)> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            chain.push(ty);
            current = ty.parent.as_deref();
        }
        chain.into_iter().rev().flat_map(|ty| ty.own_fields())
    }

    /// Whether this type is `other` or extends it.
    pub fn is_a(&self, other: &DictType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if std::ptr::eq(ty, other) {
                return true;
            }
            current = ty.parent.as_deref();
        }
        false
    }
}

impl fmt::Debug for DictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects validation issues and forwards them to the caller's callback.
pub struct Reporter<'a> {
    on_issue: &'a mut dyn FnMut(&str, bool),
    auto_correct: bool,
    issues: usize,
    uncorrectable: usize,
}

impl<'a> Reporter<'a> {
    /// Reporter forwarding to `on_issue(message, correctable)`.
    pub fn new(auto_correct: bool, on_issue: &'a mut dyn FnMut(&str, bool)) -> Self {
        Self {
            on_issue,
            auto_correct,
            issues: 0,
            uncorrectable: 0,
        }
    }

    /// Report an issue.
    pub fn report(&mut self, message: &str, correctable: bool) {
        log::debug!("Validation issue (correctable: {}): {}", correctable, message);
        self.issues += 1;
        if !correctable {
            self.uncorrectable += 1;
        }
        (self.on_issue)(message, correctable);
    }

    /// Whether correctable issues should be fixed.
    pub fn auto_correct(&self) -> bool {
        self.auto_correct
    }

    /// Number of issues reported so far.
    pub fn issue_count(&self) -> usize {
        self.issues
    }

    /// Validation outcome: no uncorrectable issue, and no issue at all unless
    /// correcting.
    pub fn passed(&self) -> bool {
        self.uncorrectable == 0 && (self.auto_correct || self.issues == 0)
    }
}

/// Name → type lookup for deferred field types.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Rc<DictType>>,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("XXDictionary", dictionary_type());
        registry.register("XXStream", stream_type());
        registry.register("ObjStm", object_stream_type());
        registry
    }

    /// Register `ty` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, ty: Rc<DictType>) {
        self.types.insert(name.to_string(), ty);
    }

    /// Look up a type.
    pub fn get(&self, name: &str) -> Option<Rc<DictType>> {
        self.types.get(name).cloned()
    }

    /// Look up a type, failing with [`Error::UnknownType`] when absent.
    pub fn resolve(&self, name: &str) -> Result<Rc<DictType>> {
        self.get(name).ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry").field("types", &self.names()).finish()
    }
}

struct Builtins {
    dictionary: Rc<DictType>,
    stream: Rc<DictType>,
    object_stream: Rc<DictType>,
}

impl Builtins {
    fn new() -> Self {
        let dictionary = Rc::new(DictType::new("XXDictionary", None));

        let mut stream = DictType::new("XXStream", Some(dictionary.clone())).streaming();
        stream
            .define_field("Length", Field::new(ObjectKind::Integer).required())
            .define_field("Filter", Field::new(ObjectKind::Name).or(ObjectKind::Array))
            .define_field(
                "DecodeParms",
                Field::new(ObjectKind::Dictionary).or(ObjectKind::Array),
            )
            .define_field("F", Field::new(ObjectKind::String).or(ObjectKind::Dictionary))
            .define_field("FFilter", Field::new(ObjectKind::Name).or(ObjectKind::Array))
            .define_field(
                "FDecodeParms",
                Field::new(ObjectKind::Dictionary).or(ObjectKind::Array),
            )
            .define_field("DL", Field::new(ObjectKind::Integer).version((1, 5)));
        let stream = Rc::new(stream);

        let mut object_stream = DictType::new("ObjStm", Some(stream.clone()))
            .with_validator(crate::objstm::validate_object_stream);
        object_stream
            .define_field(
                "Type",
                Field::new(ObjectKind::Name)
                    .required()
                    .default(Object::name("ObjStm"))
                    .version((1, 5)),
            )
            .define_field("N", Field::new(ObjectKind::Integer).required())
            .define_field("First", Field::new(ObjectKind::Integer).required())
            .define_field(
                "Extends",
                Field::new("ObjStm").indirect(Indirectness::MustBeIndirect),
            );

        Self {
            dictionary,
            stream,
            object_stream: Rc::new(object_stream),
        }
    }
}

thread_local! {
    static BUILTINS: Builtins = Builtins::new();
    static DEFAULT_REGISTRY: RefCell<TypeRegistry> = RefCell::new(TypeRegistry::with_builtins());
}

/// Root dictionary type, declaring no fields.
pub fn dictionary_type() -> Rc<DictType> {
    BUILTINS.with(|b| b.dictionary.clone())
}

/// Generic stream type.
pub fn stream_type() -> Rc<DictType> {
    BUILTINS.with(|b| b.stream.clone())
}

/// Object stream type (`/Type /ObjStm`).
pub fn object_stream_type() -> Rc<DictType> {
    BUILTINS.with(|b| b.object_stream.clone())
}

/// Snapshot of the default registry.
///
/// Documents take a snapshot at creation; later registrations do not affect
/// existing documents.
pub fn default_registry() -> TypeRegistry {
    DEFAULT_REGISTRY.with(|r| r.borrow().clone())
}

/// Add a type to the default registry.
pub fn register_default_type(name: &str, ty: Rc<DictType>) {
    DEFAULT_REGISTRY.with(|r| r.borrow_mut().register(name, ty));
}
