//! Integration coverage for the six worked scenarios: scalar round-trip,
//! nullable vs optional, automatic subtyping, lazy lists, cyclic refs, and
//! inheritance override.

use std::sync::Arc;

use serde_json::json;

use protocol_bind::{
    BuildConfig, FieldDescriptor, LoadStrategy, ParseError, ProtocolRegistry, SchemaBuildSession,
    SchemaDescriptor, SubtypeCasterDescriptor, ValueShape,
};

fn build_one(desc: SchemaDescriptor) -> ProtocolRegistry {
    let batch = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![desc])
        .expect("build should succeed");
    ProtocolRegistry::from_batch(batch)
}

#[test]
fn scalar_round_trip() {
    let point = SchemaDescriptor::new("Point")
        .field(FieldDescriptor::new("x", ValueShape::Int))
        .field(FieldDescriptor::new("y", ValueShape::Int));
    let registry = build_one(point);

    let view = registry.parse(&json!({"x": 3, "y": -7}), "Point").unwrap();
    assert_eq!(view.get("x").unwrap().as_i64(), Some(3));
    assert_eq!(view.get("y").unwrap().as_i64(), Some(-7));

    let err = registry.parse(&json!({"x": 3}), "Point").unwrap_err();
    assert!(missing_field(&err, "y"));
}

fn missing_field(err: &ParseError, field: &str) -> bool {
    match err {
        ParseError::AtField { field: f, source, .. } => {
            f == field && matches!(**source, ParseError::MissingRequiredField { .. })
        }
        _ => false,
    }
}

#[test]
fn nullable_vs_optional() {
    let name = SchemaDescriptor::new("Name").field(
        FieldDescriptor::new("middle", ValueShape::Str)
            .optional()
            .nullable(),
    );
    let registry = build_one(name);

    let view = registry.parse(&json!({"middle": null}), "Name").unwrap();
    assert!(view.get("middle").unwrap().is_none());

    let view = registry.parse(&json!({}), "Name").unwrap();
    assert!(view.get("middle").unwrap().is_none());

    let view = registry.parse(&json!({"middle": "Q"}), "Name").unwrap();
    assert_eq!(view.get("middle").unwrap().as_str(), Some("Q"));

    let err = registry.parse(&json!({"middle": 5}), "Name").unwrap_err();
    match err {
        ParseError::AtField { field, source, .. } => {
            assert_eq!(field, "middle");
            assert!(matches!(*source, ParseError::TypeMismatch { .. }));
        }
        other => panic!("expected AtField/TypeMismatch, got {other:?}"),
    }
}

#[test]
fn automatic_subtyping() {
    let click = SchemaDescriptor::new("ClickEvent").field(FieldDescriptor::new("x", ValueShape::Int));
    let key = SchemaDescriptor::new("KeyEvent").field(FieldDescriptor::new("code", ValueShape::Int));

    let has_x: protocol_bind::ConditionFn = Arc::new(|obj| obj.contains_key("x"));
    let has_code: protocol_bind::ConditionFn = Arc::new(|obj| obj.contains_key("code"));

    let event = SchemaDescriptor::new("Event").automatic_subtypes(vec![
        SubtypeCasterDescriptor::automatic("click_event", "ClickEvent", has_x),
        SubtypeCasterDescriptor::automatic("key_event", "KeyEvent", has_code),
        SubtypeCasterDescriptor::default_case("unknown_event"),
    ]);

    let batch = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![event, click, key])
        .unwrap();
    let registry = ProtocolRegistry::from_batch(batch);

    let view = registry.parse(&json!({"x": 1, "y": 2}), "Event").unwrap();
    assert!(view.get("click_event").unwrap().as_view().is_some());
    assert!(view.get("key_event").unwrap().is_none());

    let view = registry.parse(&json!({"code": 65}), "Event").unwrap();
    assert!(view.get("click_event").unwrap().is_none());
    assert!(view.get("key_event").unwrap().as_view().is_some());

    let err = registry.parse(&json!({"x": 1, "code": 65}), "Event").unwrap_err();
    assert!(matches!(err, ParseError::AmbiguousSubtype { .. }));

    let view = registry.parse(&json!({}), "Event").unwrap();
    assert!(view.get("click_event").unwrap().is_none());
    assert!(view.get("key_event").unwrap().is_none());
}

#[test]
fn nested_automatic_subtype_schema_rejects_non_object() {
    // Event (automatic mode, with a default case) nested as a field of
    // Container. A default case does not grant the "arbitrary value"
    // exception §4.4 reserves for manual mode — a non-object `event` must
    // still fail shape validation, the same as it would at the root.
    let click = SchemaDescriptor::new("ClickEvent").field(FieldDescriptor::new("x", ValueShape::Int));
    let key = SchemaDescriptor::new("KeyEvent").field(FieldDescriptor::new("code", ValueShape::Int));

    let has_x: protocol_bind::ConditionFn = Arc::new(|obj| obj.contains_key("x"));
    let has_code: protocol_bind::ConditionFn = Arc::new(|obj| obj.contains_key("code"));

    let event = SchemaDescriptor::new("Event").automatic_subtypes(vec![
        SubtypeCasterDescriptor::automatic("click_event", "ClickEvent", has_x),
        SubtypeCasterDescriptor::automatic("key_event", "KeyEvent", has_code),
        SubtypeCasterDescriptor::default_case("unknown_event"),
    ]);

    let container = SchemaDescriptor::new("Container").field(FieldDescriptor::new("event", ValueShape::Schema("Event")));

    let batch = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![container, event, click, key])
        .unwrap();
    let registry = ProtocolRegistry::from_batch(batch);

    let err = registry.parse(&json!({"event": 42}), "Container").unwrap_err();
    match err {
        ParseError::AtField { field, source, .. } => {
            assert_eq!(field, "event");
            assert!(matches!(*source, ParseError::NotAnObject { .. }));
        }
        other => panic!("expected AtField/NotAnObject, got {other:?}"),
    }

    // Sanity: a well-formed nested object still dispatches normally.
    let view = registry
        .parse(&json!({"event": {"x": 1}}), "Container")
        .unwrap();
    let event_view = view.get("event").unwrap().as_view().unwrap().clone();
    assert!(event_view.get("click_event").unwrap().as_view().is_some());
}

#[test]
fn lazy_list_skips_unaccessed_elements() {
    let item = SchemaDescriptor::new("Item").field(FieldDescriptor::new("id", ValueShape::Int));
    let bag = SchemaDescriptor::new("Bag").field(
        FieldDescriptor::new("items", ValueShape::List(Box::new(ValueShape::Schema("Item"))))
            .load(LoadStrategy::Lazy),
    );

    let batch = SchemaBuildSession::new(BuildConfig::strict())
        .build(vec![bag, item])
        .unwrap();
    let registry = ProtocolRegistry::from_batch(batch);

    let raw = json!({
        "items": [
            {"id": 1, "extra": "not declared on Item"},
            {"id": 2},
            {"id": 3}
        ]
    });
    let view = registry.parse(&raw, "Bag").unwrap();
    let items = view.get("items").unwrap();
    let list = items.as_list().unwrap();

    let second = list.get(1).unwrap();
    assert_eq!(second.as_view().unwrap().get("id").unwrap().as_i64(), Some(2));

    // items[0] carries a key Item's strict mode would reject; only touching
    // it surfaces the failure, proving index 1's access above left it alone.
    let err = list.get(0).unwrap_err();
    assert!(matches!(err, ParseError::AtIndex { .. }));
}

#[test]
fn cyclic_self_reference() {
    let node = SchemaDescriptor::new("Node")
        .field(FieldDescriptor::new("child", ValueShape::Schema("Node")).optional());
    let registry = build_one(node);

    let raw = json!({"child": {"child": {}}});
    let view = registry.parse(&raw, "Node").unwrap();
    let inner = view.get("child").unwrap().as_view().unwrap().clone();
    let innermost = inner.get("child").unwrap().as_view().unwrap().clone();
    assert!(innermost.get("child").unwrap().is_none());
}

#[test]
fn override_inherits_and_closes_name_set_once() {
    let base = SchemaDescriptor::new("Base").field(FieldDescriptor::new("name", ValueShape::Str));
    let extended = SchemaDescriptor::new("Extended")
        .supertype("Base")
        .field(FieldDescriptor::new("name", ValueShape::Str).overriding());

    let batch = SchemaBuildSession::new(BuildConfig::strict())
        .build(vec![base, extended])
        .expect("override must not be treated as a duplicate field");
    let registry = ProtocolRegistry::from_batch(batch);

    let view = registry.parse(&json!({"name": "hi"}), "Extended").unwrap();
    assert_eq!(view.get("name").unwrap().as_str(), Some("hi"));

    let view = registry.parse(&json!({"name": "hi"}), "Base").unwrap();
    assert_eq!(view.get("name").unwrap().as_str(), Some("hi"));

    // A key that only Base would permit must still be rejected on Extended
    // exactly as if "name" had been declared there a single time.
    let err = registry.parse(&json!({"name": "hi", "bogus": 1}), "Extended").unwrap_err();
    assert!(matches!(err, ParseError::ExtraneousKey { .. }));
}
