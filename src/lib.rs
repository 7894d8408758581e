//! A schema-driven JSON-to-typed-object binder.
//!
//! Given a batch of user-declared [`schema::SchemaDescriptor`]s, a
//! [`session::SchemaBuildSession`] compiles a network of
//! [`handler::TypeHandler`]s; a [`registry::ProtocolRegistry`] built from
//! the result then parses raw `serde_json::Value`s into typed,
//! (mostly-)immutable [`object_data::View`]s whose accessors are dispatched
//! through pre-built handlers rather than reflection.
//!
//! Two error taxonomies at the boundary: [`error::SchemaError`] for
//! mistakes in the declared schema batch (raised only during a build
//! session), and [`error::ParseError`] for input data that doesn't conform
//! to the schema (raised during `parse`/accessor calls). A lazy accessor
//! called after the initial parse surfaces failures wrapped in
//! [`error::LazyError`] instead, since its signature doesn't thread a
//! checked error the way the eager path does.

pub mod error;
pub mod field;
pub mod handler;
pub mod json_parser;
pub mod object_data;
pub mod parsers;
pub mod registry;
pub mod schema;
pub mod session;
pub mod value;

pub use error::{LazyError, ParseError, SchemaError};
pub use handler::{AccessorHandler, EagerLoader, HandlerRef, SubtypeCase, SubtypeSupport, TypeHandler};
pub use object_data::{ObjectData, View};
pub use registry::ProtocolRegistry;
pub use schema::{
    ConditionFn, FieldDescriptor, LoadStrategy, SchemaDescriptor, SchemaId, SubtypeCasterDescriptor,
    SubtypeMode, ValueShape,
};
pub use session::{BuildConfig, BuiltBatch, SchemaBuildSession};
pub use value::{FieldValue, LazyList, ListValue, StoredValue};
