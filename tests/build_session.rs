//! Build-session invariants (`spec.md` §3, §4.5): the schema-model errors
//! that must be caught before a batch is ever frozen into a registry.

use std::sync::Arc;

use protocol_bind::{
    BuildConfig, FieldDescriptor, SchemaBuildSession, SchemaDescriptor, SchemaError,
    SubtypeCasterDescriptor, ValueShape,
};

#[test]
fn duplicate_schema_id_rejected() {
    let a = SchemaDescriptor::new("Dup");
    let b = SchemaDescriptor::new("Dup");
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![a, b])
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateSchema(id) if id == "Dup"));
}

#[test]
fn unresolved_schema_ref_rejected() {
    let orphan = SchemaDescriptor::new("Orphan")
        .field(FieldDescriptor::new("other", ValueShape::Schema("Nowhere")));
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![orphan])
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnresolvedRef(id) if id == "Nowhere"));
}

#[test]
fn nullable_on_primitive_rejected() {
    let bad = SchemaDescriptor::new("BadNullable")
        .field(FieldDescriptor::new("n", ValueShape::Int).nullable());
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![bad])
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::NullablePrimitive { schema, field }
            if schema == "BadNullable" && field == "n"
    ));
}

#[test]
fn duplicate_field_rejected() {
    let bad = SchemaDescriptor::new("Dup")
        .field(FieldDescriptor::new("a", ValueShape::Int))
        .field(FieldDescriptor::new("a", ValueShape::Int));
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![bad])
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateField { field, .. } if field == "a"));
}

#[test]
fn unflagged_override_rejected() {
    let base = SchemaDescriptor::new("Base").field(FieldDescriptor::new("name", ValueShape::Str));
    let extended = SchemaDescriptor::new("Extended")
        .supertype("Base")
        .field(FieldDescriptor::new("name", ValueShape::Str));
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![base, extended])
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnflaggedOverride { field, .. } if field == "name"));
}

#[test]
fn unknown_supertype_rejected() {
    let orphan = SchemaDescriptor::new("Orphan").supertype("Ghost");
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![orphan])
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnknownSupertype { supertype, .. } if supertype == "Ghost"));
}

#[test]
fn supertype_cycle_rejected() {
    let a = SchemaDescriptor::new("A").supertype("B");
    let b = SchemaDescriptor::new("B").supertype("A");
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![a, b])
        .unwrap_err();
    assert!(matches!(err, SchemaError::SupertypeCycle(_)));
}

#[test]
fn missing_condition_in_automatic_mode_rejected() {
    // A default case and a non-default case with no condition installed.
    let bad = SchemaDescriptor::new("Bad").automatic_subtypes(vec![SubtypeCasterDescriptor {
        accessor: "weird",
        target: "Bad",
        reinterpret: false,
        is_default_case: false,
        condition: None,
    }]);
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![bad])
        .unwrap_err();
    assert!(matches!(err, SchemaError::MissingCondition { .. }));
}

#[test]
fn reinterpret_outside_manual_mode_rejected() {
    let target = SchemaDescriptor::new("Target");
    let has_any: protocol_bind::ConditionFn = Arc::new(|_| true);
    let bad = SchemaDescriptor::new("Bad").automatic_subtypes(vec![
        SubtypeCasterDescriptor::manual("cast", "Target", true),
        SubtypeCasterDescriptor::automatic("fallback", "Target", has_any),
    ]);
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![bad, target])
        .unwrap_err();
    assert!(matches!(err, SchemaError::ReinterpretOutsideManualMode { .. }));
}

#[test]
fn unknown_subtype_target_rejected() {
    let has_any: protocol_bind::ConditionFn = Arc::new(|_| true);
    let bad = SchemaDescriptor::new("Bad")
        .automatic_subtypes(vec![SubtypeCasterDescriptor::automatic("cast", "Nowhere", has_any)]);
    let err = SchemaBuildSession::new(BuildConfig::lenient())
        .build(vec![bad])
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnknownSubtypeTarget { target, .. } if target == "Nowhere"));
}
