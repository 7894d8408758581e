//! Two error taxonomies: schema-model errors (raised only during a build
//! session) and parse errors (raised during `parse`/accessor calls). Parse
//! errors accumulate a field/schema breadcrumb as they propagate outward,
//! the same `AtSchema`/`AtKeyword`-style wrapping idiom used elsewhere in
//! the JSON-schema tooling ecosystem.

use std::fmt;

use thiserror::Error;

/// Raised while a [`crate::session::SchemaBuildSession`] is assembling a
/// handler map. These indicate a programmer mistake in the declared schema
/// batch, not bad input data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate schema id '{0}' in build batch")]
    DuplicateSchema(String),

    #[error("schema '{schema}' declares field '{field}' more than once")]
    DuplicateField { schema: String, field: String },

    #[error(
        "schema '{schema}' field '{field}' collides with an inherited field of the same name; \
         mark it `override` if this is intentional shadowing"
    )]
    UnflaggedOverride { schema: String, field: String },

    #[error("reference to unknown schema '{0}'")]
    UnresolvedRef(String),

    #[error("schema '{schema}' declares nullable on primitive-shaped field '{field}'")]
    NullablePrimitive { schema: String, field: String },

    #[error("subtype caster in schema '{schema}' targets unknown schema '{target}'")]
    UnknownSubtypeTarget { schema: String, target: String },

    #[error("subtype caster '{accessor}' of schema '{schema}' sets `reinterpret` outside manual mode")]
    ReinterpretOutsideManualMode { schema: String, accessor: String },

    #[error("automatic-mode schema '{schema}' declares subtype '{accessor}' with no field condition")]
    MissingCondition { schema: String, accessor: String },

    #[error("schema '{schema}' declares supertype '{supertype}' which does not exist in this build")]
    UnknownSupertype { schema: String, supertype: String },

    #[error("cycle in supertype chain involving schema '{0}'")]
    SupertypeCycle(String),
}

/// Raised while parsing a JSON value against a handler, or lazily, from an
/// accessor call on an already-built [`crate::object_data::ObjectData`].
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("expected a JSON object for schema '{schema}'")]
    NotAnObject { schema: String },

    #[error("field '{field}' is not optional")]
    MissingRequiredField { field: String },

    #[error("type mismatch: {detail}")]
    TypeMismatch { detail: String },

    #[error("unknown member '{name}' for enum field '{field}'")]
    UnknownEnumMember { field: String, name: String },

    #[error("element {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },

    #[error("ambiguous subtype match in schema '{schema}': {matched:?}")]
    AmbiguousSubtype { schema: String, matched: Vec<String> },

    #[error("no subtype matched in schema '{schema}' and no default case was declared")]
    NoSubtypeMatched { schema: String },

    #[error("strict mode: key '{key}' is not declared on schema '{schema}'")]
    ExtraneousKey { schema: String, key: String },

    #[error("unknown schema id '{0}'")]
    UnknownSchema(String),

    #[error("in schema '{schema}', field '{field}': {source}")]
    AtField {
        schema: String,
        field: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wrap `self` with the field/schema breadcrumb the spec's propagation
    /// policy requires at every nesting level.
    pub fn at_field(self, schema: &str, field: &str) -> ParseError {
        ParseError::AtField {
            schema: schema.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap `self` with a list-index breadcrumb.
    pub fn at_index(self, index: usize) -> ParseError {
        ParseError::AtIndex {
            index,
            source: Box::new(self),
        }
    }
}

/// The "unchecked runtime-error envelope" lazy accessors surface through,
/// since an accessor's declared signature doesn't thread a checked error
/// the way the eager, pre-parse path does. Carries the same information as
/// a [`ParseError`]; kept as its own type so callers can distinguish "this
/// failed during the up-front parse" from "this failed lazily, on access".
#[derive(Debug, Clone)]
pub struct LazyError(pub ParseError);

impl fmt::Display for LazyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lazy accessor failed: {}", self.0)
    }
}

impl std::error::Error for LazyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<ParseError> for LazyError {
    fn from(e: ParseError) -> Self {
        LazyError(e)
    }
}
