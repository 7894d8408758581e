//! The parser facade (§6): `ProtocolRegistry::parse` and `::parse_anything`,
//! the crate's top-level entry point. Plays the role the teacher's
//! `JSONEval` struct (`src/lib.rs`) plays for its own domain — one small
//! struct wrapping a frozen, read-only map, with the real work delegated to
//! the compiled handlers underneath.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use crate::error::ParseError;
use crate::handler::TypeHandler;
use crate::object_data::View;
use crate::schema::SchemaId;
use crate::session::BuiltBatch;

/// A frozen handler map, ready to parse. Read-only after construction (§5:
/// "the built handler map is read-only after the build phase"); `parse`/
/// `parse_anything` may be called concurrently from multiple threads.
pub struct ProtocolRegistry {
    handlers: IndexMap<SchemaId, Arc<TypeHandler>>,
}

impl ProtocolRegistry {
    pub fn from_batch(batch: BuiltBatch) -> Self {
        ProtocolRegistry {
            handlers: batch.handlers,
        }
    }

    /// Entry point for the common case: `value` must be a JSON object,
    /// unconditionally — even for a schema declared in manual-subtyping
    /// mode, unlike `parse_anything` below. Fails if it isn't, or if
    /// `schema_id` is unknown.
    pub fn parse(&self, value: &Value, schema_id: SchemaId) -> Result<View, ParseError> {
        trace!(schema = schema_id, "parse");
        let handler = self.handler(schema_id)?;
        if !value.is_object() {
            return Err(ParseError::NotAnObject {
                schema: schema_id.to_string(),
            });
        }
        handler.parse_root(value)
    }

    /// Accepts any raw value. Only meaningful for schemas declared in
    /// manual-subtyping mode, which may bind to non-object underlying
    /// values; every other schema still rejects non-objects, enforced
    /// inside `TypeHandler::parse_object_data` itself (so the same shape
    /// check applies uniformly to root parses, nested typed-object fields,
    /// and subtype dispatch).
    pub fn parse_anything(&self, value: &Value, schema_id: SchemaId) -> Result<View, ParseError> {
        trace!(schema = schema_id, "parse_anything");
        let handler = self.handler(schema_id)?;
        handler.parse_root(value)
    }

    fn handler(&self, schema_id: SchemaId) -> Result<&Arc<TypeHandler>, ParseError> {
        self.handlers
            .get(schema_id)
            .ok_or_else(|| ParseError::UnknownSchema(schema_id.to_string()))
    }

    /// Read-only introspection over the frozen handler map, mirroring the
    /// teacher's `ParsedSchemaCache::{get, contains_key, len}`
    /// (`src/parsed_schema_cache.rs`) — useful for callers wiring together
    /// multiple build batches.
    pub fn schema_ids(&self) -> impl Iterator<Item = SchemaId> + '_ {
        self.handlers.keys().copied()
    }

    pub fn contains(&self, schema_id: SchemaId) -> bool {
        self.handlers.contains_key(schema_id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
