//! Schema-declaration surface: the input descriptors a caller submits to a
//! [`crate::session::SchemaBuildSession`]. Plain data, not macros — callers
//! that want a derive/codegen front end can build these programmatically
//! (see the Design Notes in `SPEC_FULL.md`, §C).

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;

/// Stable identifier for a declared schema. Protocol schemas are known up
/// front (this mirrors a generated protocol's domain.Type naming), so a
/// `&'static str` keeps lookups allocation-free; a build batch is rejected
/// if two descriptors share one.
pub type SchemaId = &'static str;

/// A field condition predicate, used by the automatic-subtyping engine
/// (§4.4) to test whether a JSON object matches a declared subtype. First
/// class so callers can close over config, not just a bare fn pointer.
pub type ConditionFn = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

/// How a field gets loaded into its `ObjectData` slot. See §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStrategy {
    /// Pick eager if the parser has a quick form, lazy-cached otherwise.
    #[default]
    Auto,
    /// Always pre-parse into a slot at top-level parse time.
    Eager,
    /// Always defer to first access (quick: re-parsed, uncached; slow:
    /// cached via compare-and-set).
    Lazy,
}

/// Which of the two subtyping engines (§4.4) a schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtypeMode {
    /// Dispatch by structural field-condition predicates; exactly one must
    /// match (or a declared default case is taken).
    Automatic,
    /// Caller-selected reinterpretation casts; no automatic matching.
    Manual,
}

/// The declared shape of a field's value. `List` and `Schema` are the only
/// recursive/referential shapes; everything else is a scalar leaf.
#[derive(Debug, Clone)]
pub enum ValueShape {
    Int,
    Bool,
    Float,
    Str,
    /// Parsed from a JSON string by member name; unknown names fail.
    Enum(&'static [&'static str]),
    /// Consumes any value, yields "no value"; used as a subtype default case.
    Void,
    /// Unchecked pass-through of any JSON value.
    Any,
    /// Pass-through, but the underlying value must be a JSON object.
    RawObject,
    List(Box<ValueShape>),
    /// A reference to another declared schema, resolved during the build
    /// session (may be a forward or cyclic reference).
    Schema(SchemaId),
}

impl ValueShape {
    /// Nullability is forbidden on primitive shapes (§3 invariants):
    /// integers, booleans, floats, enums, void. Only reference-shaped
    /// values (strings, objects, nested schemas, lists) may be nullable.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValueShape::Int | ValueShape::Bool | ValueShape::Float | ValueShape::Enum(_) | ValueShape::Void
        )
    }
}

/// One declared accessor on a schema: a field getter.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// The accessor's declared name.
    pub accessor: &'static str,
    /// Explicit JSON key override; defaults to `accessor` when absent.
    pub json_key: Option<&'static str>,
    pub shape: ValueShape,
    pub optional: bool,
    pub nullable: bool,
    pub load: LoadStrategy,
    /// Used only when this field also serves as an automatic-subtype
    /// condition carrier; ordinarily `None`.
    pub condition: Option<ConditionFn>,
    /// This accessor shadows a base schema's field of the same name rather
    /// than declaring a new one.
    pub is_override: bool,
}

impl FieldDescriptor {
    pub fn new(accessor: &'static str, shape: ValueShape) -> Self {
        FieldDescriptor {
            accessor,
            json_key: None,
            shape,
            optional: false,
            nullable: false,
            load: LoadStrategy::Auto,
            condition: None,
            is_override: false,
        }
    }

    pub fn json_key(mut self, key: &'static str) -> Self {
        self.json_key = Some(key);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn load(mut self, strategy: LoadStrategy) -> Self {
        self.load = strategy;
        self
    }

    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn key(&self) -> &'static str {
        self.json_key.unwrap_or(self.accessor)
    }
}

/// One declared subtype caster: an accessor that re-views the same
/// underlying JSON under a different schema (§4.4).
#[derive(Clone)]
pub struct SubtypeCasterDescriptor {
    pub accessor: &'static str,
    /// The subtype's schema. Ignored (treated as the void default case)
    /// when `is_default_case` is set.
    pub target: SchemaId,
    /// Valid only in manual mode: reparse the raw value fresh rather than
    /// treat the target as structurally sharing this object's raw JSON.
    pub reinterpret: bool,
    /// Automatic mode only: the "none of the above" case. At most one
    /// subtype per schema may be the default case.
    pub is_default_case: bool,
    /// Required in automatic mode for every non-default case.
    pub condition: Option<ConditionFn>,
}

impl SubtypeCasterDescriptor {
    pub fn automatic(accessor: &'static str, target: SchemaId, condition: ConditionFn) -> Self {
        SubtypeCasterDescriptor {
            accessor,
            target,
            reinterpret: false,
            is_default_case: false,
            condition: Some(condition),
        }
    }

    pub fn default_case(accessor: &'static str) -> Self {
        SubtypeCasterDescriptor {
            accessor,
            target: "",
            reinterpret: false,
            is_default_case: true,
            condition: None,
        }
    }

    pub fn manual(accessor: &'static str, target: SchemaId, reinterpret: bool) -> Self {
        SubtypeCasterDescriptor {
            accessor,
            target,
            reinterpret,
            is_default_case: false,
            condition: None,
        }
    }
}

/// A full interface-like declaration: one JSON object type, its fields, its
/// optional supertype, and its subtyping mode. Immutable once submitted to
/// a build session (§3 Lifecycle).
#[derive(Clone)]
pub struct SchemaDescriptor {
    pub id: SchemaId,
    pub supertype: Option<SchemaId>,
    pub fields: Vec<FieldDescriptor>,
    pub subtypes: Vec<SubtypeCasterDescriptor>,
    pub subtype_mode: SubtypeMode,
}

impl SchemaDescriptor {
    pub fn new(id: SchemaId) -> Self {
        SchemaDescriptor {
            id,
            supertype: None,
            fields: Vec::new(),
            subtypes: Vec::new(),
            subtype_mode: SubtypeMode::Manual,
        }
    }

    pub fn supertype(mut self, supertype: SchemaId) -> Self {
        self.supertype = Some(supertype);
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn automatic_subtypes(mut self, subtypes: Vec<SubtypeCasterDescriptor>) -> Self {
        self.subtype_mode = SubtypeMode::Automatic;
        self.subtypes = subtypes;
        self
    }

    pub fn manual_subtypes(mut self, subtypes: Vec<SubtypeCasterDescriptor>) -> Self {
        self.subtype_mode = SubtypeMode::Manual;
        self.subtypes = subtypes;
        self
    }
}
