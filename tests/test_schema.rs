//! Integration tests for dictionary schemas and the type registry.

use pdf_objmodel::dictionary::Dictionary;
use pdf_objmodel::document::{Document, MemoryDocument};
use pdf_objmodel::object::{Dict, Object, ObjectKind, PdfObject};
use pdf_objmodel::schema::{
    default_registry, dictionary_type, object_stream_type, register_default_type, stream_type,
    DictType, Field, Reporter, TypeRegistry,
};
use pdf_objmodel::Error;
use std::rc::Rc;

fn annotation_type() -> Rc<DictType> {
    let mut ty = DictType::new("Annot", Some(dictionary_type()));
    ty.define_field(
        "Type",
        Field::new(ObjectKind::Name).required().default(Object::name("Annot")),
    )
    .define_field("Subtype", Field::new(ObjectKind::Name).required())
    .define_field("Rect", Field::new(ObjectKind::Array).required());
    Rc::new(ty)
}

fn link_type(parent: Rc<DictType>) -> Rc<DictType> {
    let mut ty = DictType::new("Link", Some(parent));
    ty.define_field("Dest", Field::new(ObjectKind::Name).or(ObjectKind::Array))
        .define_field("Border", Field::new(ObjectKind::Array));
    Rc::new(ty)
}

#[test]
fn test_each_field_ancestors_first() {
    let link = link_type(annotation_type());
    let names: Vec<&str> = link.each_field().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Type", "Subtype", "Rect", "Dest", "Border"]);

    let own: Vec<&str> = link.own_fields().map(|(name, _)| name).collect();
    assert_eq!(own, vec!["Dest", "Border"]);
}

#[test]
fn test_new_dictionary_gets_inherited_defaults() {
    let dict = Dictionary::empty(link_type(annotation_type())).unwrap();
    assert_eq!(dict.keys().unwrap(), vec!["Type"]);
    assert_eq!(dict.get_raw("Type").unwrap(), Some(Object::name("Annot")));
}

#[test]
fn test_deferred_type_resolved_by_name() {
    let annot = annotation_type();
    let mut registry = TypeRegistry::new();
    registry.register("Annot", annot.clone());

    let field = Field::new("Annot").or(ObjectKind::Null);
    assert_eq!(field.describe_types(&registry).unwrap(), "Annot or Null");

    let typed = Object::Handle(PdfObject::typed(Object::Dictionary(Dict::new()), link_type(annot)).into_handle());
    assert!(field.valid_object(&typed, &registry).unwrap());

    let other = Object::Handle(
        PdfObject::typed(Object::Dictionary(Dict::new()), dictionary_type()).into_handle(),
    );
    assert!(!field.valid_object(&other, &registry).unwrap());
}

#[test]
fn test_unknown_deferred_type() {
    let field = Field::new("Missing");
    let registry = TypeRegistry::new();
    match field.resolve(&registry) {
        Err(Error::UnknownType(name)) => assert_eq!(name, "Missing"),
        other => panic!("expected UnknownType, got {:?}", other),
    }
}

#[test]
fn test_unknown_type_surfaces_from_dictionary_reads() {
    let mut ty = DictType::new("Holder", Some(dictionary_type()));
    ty.define_field("Child", Field::new("NoSuchType"));
    let mut doc = MemoryDocument::new();
    let dict = Dictionary::empty(Rc::new(ty)).unwrap();
    dict.set("Child", Object::Dictionary(Dict::new())).unwrap();
    assert!(matches!(
        dict.get("Child", &mut doc),
        Err(Error::UnknownType(_))
    ));
}

#[test]
fn test_default_registry_snapshots() {
    let before = MemoryDocument::new();
    register_default_type("Thread", Rc::new(DictType::new("Thread", Some(dictionary_type()))));
    let after = MemoryDocument::new();

    assert!(before.type_registry().get("Thread").is_none());
    assert!(after.type_registry().get("Thread").is_some());
    assert!(default_registry().names().contains(&"Thread"));
}

#[test]
fn test_builtin_types() {
    assert!(stream_type().is_stream());
    assert!(!dictionary_type().is_stream());

    let objstm = object_stream_type();
    assert!(objstm.is_stream());
    assert!(objstm.is_a(&stream_type()));
    assert!(objstm.is_a(&dictionary_type()));
    assert!(!stream_type().is_a(&objstm));
    assert_eq!(objstm.field("Length").map(|f| f.is_required()), Some(true));
    assert_eq!(objstm.field("Type").map(|f| f.min_version()), Some((1, 5)));
}

#[test]
fn test_stream_type_accepts_plain_stream_only() {
    let field = Field::new(stream_type());
    let registry = TypeRegistry::new();
    let stream = Object::Stream {
        dict: Dict::new(),
        data: bytes::Bytes::new(),
    };
    assert!(field.valid_object(&stream, &registry).unwrap());
    assert!(!field
        .valid_object(&Object::Dictionary(Dict::new()), &registry)
        .unwrap());
}

fn require_even_count(obj: &PdfObject, reporter: &mut Reporter<'_>) {
    let count = obj
        .value
        .as_dict()
        .and_then(|d| d.get("Count"))
        .and_then(|c| c.as_integer());
    if matches!(count, Some(n) if n % 2 != 0) {
        reporter.report("Pair: Count must be even", false);
    }
}

#[test]
fn test_type_validator_hook_runs() {
    let mut ty = DictType::new("Pair", Some(dictionary_type())).with_validator(require_even_count);
    ty.define_field("Count", Field::new(ObjectKind::Integer));
    let ty = Rc::new(ty);
    let mut doc = MemoryDocument::new();

    let mut entries = Dict::new();
    entries.insert("Count".to_string(), Object::Integer(3));
    let odd = Dictionary::new(ty.clone(), Object::Dictionary(entries)).unwrap();
    let mut messages = Vec::new();
    let ok = odd
        .validate(&mut doc, true, &mut |msg, _| messages.push(msg.to_string()))
        .unwrap();
    assert!(!ok);
    assert_eq!(messages, vec!["Pair: Count must be even"]);

    odd.set("Count", Object::Integer(4)).unwrap();
    let ok = odd.validate(&mut doc, false, &mut |_, _| {}).unwrap();
    assert!(ok);
}

#[test]
fn test_reporter_outcome() {
    let mut seen = 0;
    let mut on_issue = |_: &str, _: bool| seen += 1;
    let mut reporter = Reporter::new(false, &mut on_issue);
    assert!(reporter.passed());
    reporter.report("correctable", true);
    assert!(!reporter.passed());
    assert_eq!(reporter.issue_count(), 1);
    drop(reporter);
    assert_eq!(seen, 1);

    let mut on_issue = |_: &str, _: bool| {};
    let mut reporter = Reporter::new(true, &mut on_issue);
    reporter.report("correctable", true);
    assert!(reporter.passed());
    reporter.report("broken", false);
    assert!(!reporter.passed());
}
