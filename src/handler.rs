//! The compiled, per-schema `TypeHandler` (§4.3) and subtype-dispatch block
//! (§4.4). Built and wired exclusively by `crate::session::SchemaBuildSession`;
//! frozen (read-only) once the session returns.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::trace;

use crate::error::ParseError;
use crate::object_data::{ObjectData, View};
use crate::parsers::ValueParser;
use crate::schema::{ConditionFn, SchemaId};

/// A reference to another schema's handler, possibly not yet built at the
/// point a parser is constructed (forward or cyclic reference). Shared via
/// `Arc` so every parser pointing at the same schema observes the same
/// resolution; resolved exactly once, during the build session's Link phase
/// (§4.5 step 3). See the Design Notes in `spec.md` §9 on cyclic refs: this
/// is the "seed placeholders, then bind" two-phase build, using `id` as the
/// stable key instead of embedding a handler before it exists.
#[derive(Clone)]
pub struct HandlerRef {
    id: SchemaId,
    cell: Arc<OnceCell<Arc<TypeHandler>>>,
}

impl HandlerRef {
    pub fn new(id: SchemaId) -> Self {
        HandlerRef {
            id,
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    /// Resolve this ref to a concrete handler. Called once per ref during
    /// Link; a second call on the same cell is a build-session bug, not a
    /// caller error, hence the `expect`.
    pub(crate) fn resolve(&self, handler: Arc<TypeHandler>) {
        self.cell
            .set(handler)
            .ok()
            .expect("HandlerRef resolved twice");
    }

    /// Fetch the resolved handler. Panics if called before Link has run;
    /// the build session guarantees every ref is resolved before any parse
    /// is issued (§3 invariants), so this should never fire outside a bug.
    pub fn get(&self) -> &Arc<TypeHandler> {
        self.cell
            .get()
            .unwrap_or_else(|| panic!("unresolved reference to schema '{}' used before build completed", self.id))
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// One eager field loader: read a JSON key, parse it, store it at a fixed
/// slot index.
pub struct EagerLoader {
    pub slot: usize,
    pub accessor: &'static str,
    pub key: &'static str,
    pub optional: bool,
    pub parser: Arc<dyn ValueParser>,
}

/// The three accessor-handler shapes from §4.2, plus the two subtype
/// dispatch shapes from §4.4.
pub enum AccessorHandler {
    /// Returns `slots[slot]` directly; no parse cost at call time.
    PreParsedSlot { slot: usize },
    /// Re-reads the JSON key and re-parses on every call; no caching.
    LazyQuick {
        key: &'static str,
        optional: bool,
        parser: Arc<dyn ValueParser>,
    },
    /// Parses once, on first call, and memoizes into a lazy cache slot.
    LazyCached {
        key: &'static str,
        optional: bool,
        parser: Arc<dyn ValueParser>,
        cache_slot: usize,
    },
    /// Automatic mode: yields the stored subtype value iff its declared
    /// code matches the object's dispatched variant code, else "no value".
    SubtypeCase { variant_index: i64 },
    /// Manual mode: lazily reinterprets the enclosing raw JSON under the
    /// target schema, memoized.
    SubtypeCaster {
        target: HandlerRef,
        cache_slot: usize,
    },
}

/// One declared subtype in automatic mode.
pub struct SubtypeCase {
    pub target: HandlerRef,
    pub condition: ConditionFn,
}

/// The subtype-support block (§4.3, §4.4).
pub enum SubtypeSupport {
    Automatic {
        variant_code_slot: usize,
        variant_value_slot: usize,
        cases: Vec<SubtypeCase>,
        has_default: bool,
    },
    Manual,
}

/// The compiled, per-schema parser and dispatcher.
pub struct TypeHandler {
    pub id: SchemaId,
    pub supertype: Option<HandlerRef>,
    pub field_count: usize,
    pub eager_loaders: Vec<EagerLoader>,
    pub lazy_slot_count: usize,
    pub accessors: IndexMap<&'static str, AccessorHandler>,
    pub subtype_support: SubtypeSupport,
    /// Strict mode only: the closed set of permissible JSON keys, computed
    /// at build time (§4.5 step 6).
    pub strict_keys: Option<HashSet<&'static str>>,
}

impl TypeHandler {
    /// The (variant-code, variant-value) slot pair for automatic-mode
    /// subtype dispatch. Panics if this schema is not in automatic mode;
    /// only `AccessorHandler::SubtypeCase` calls this, which only exists on
    /// automatic-mode schemas.
    pub(crate) fn automatic_slots(&self) -> (usize, usize) {
        match &self.subtype_support {
            SubtypeSupport::Automatic {
                variant_code_slot,
                variant_value_slot,
                ..
            } => (*variant_code_slot, *variant_value_slot),
            SubtypeSupport::Manual => unreachable!("SubtypeCase accessor on a manual-mode schema"),
        }
    }

    /// Entry point for the facade (§4.3: `parseRoot`). Delegates the full
    /// parse procedure, including shape validation, to `parse_object_data`.
    pub fn parse_root(self: &Arc<Self>, raw: &Value) -> Result<View, ParseError> {
        let data = self.parse_object_data(raw)?;
        Ok(View::new(data))
    }

    /// Parse procedure (§4.3 steps 1-5), producing an `ObjectData`. Used
    /// both as the facade's root entry point and for nested/subtype parsing
    /// — step 1's shape check must therefore live here, not only at the
    /// facade boundary, since `TypedObjectParser` and subtype dispatch both
    /// call this directly without going through `parse_root`.
    pub fn parse_object_data(self: &Arc<Self>, raw: &Value) -> Result<Arc<ObjectData>, ParseError> {
        trace!(schema = self.id, "parsing object");

        // Step 1: the raw value must be a JSON object unless this schema is
        // in manual-subtyping mode, in which case an arbitrary value is
        // permitted (§4.4).
        let allow_non_object = matches!(self.subtype_support, SubtypeSupport::Manual);
        if !allow_non_object && !raw.is_object() {
            return Err(ParseError::NotAnObject {
                schema: self.id.to_string(),
            });
        }

        let mut slots: Vec<crate::value::FieldValue> = Vec::with_capacity(self.field_count);
        for _ in 0..self.field_count {
            slots.push(crate::value::FieldValue::None);
        }

        let obj = if raw.is_object() {
            Some(raw.as_object().unwrap())
        } else {
            None
        };

        // Step 3: run every eager field loader in declared order.
        for loader in &self.eager_loaders {
            let found = obj.and_then(|o| o.get(loader.key));
            let value = match found {
                Some(raw_field) => loader
                    .parser
                    .parse_slow(raw_field, None)
                    .and_then(|stored| loader.parser.finish(stored))
                    .map_err(|e| e.at_field(self.id, loader.accessor))?,
                None if loader.optional => crate::value::FieldValue::None,
                None => {
                    return Err(ParseError::MissingRequiredField {
                        field: loader.accessor.to_string(),
                    }
                    .at_field(self.id, loader.accessor))
                }
            };
            slots[loader.slot] = value;
        }

        // Step 4: subtype dispatch.
        if let SubtypeSupport::Automatic {
            variant_code_slot,
            variant_value_slot,
            cases,
            has_default,
        } = &self.subtype_support
        {
            let mut matched: Vec<(usize, &SubtypeCase)> = Vec::new();
            if let Some(o) = obj {
                for (i, case) in cases.iter().enumerate() {
                    if (case.condition)(o) {
                        matched.push((i, case));
                    }
                }
            }
            match matched.len() {
                0 => {
                    if !*has_default {
                        return Err(ParseError::NoSubtypeMatched {
                            schema: self.id.to_string(),
                        });
                    }
                    slots[*variant_code_slot] = crate::value::FieldValue::Int(-1);
                    slots[*variant_value_slot] = crate::value::FieldValue::None;
                }
                1 => {
                    let (i, case) = matched[0];
                    let child = case.target.get().parse_object_data(raw)?;
                    slots[*variant_code_slot] = crate::value::FieldValue::Int(i as i64);
                    slots[*variant_value_slot] =
                        crate::value::FieldValue::Object(View::new(child));
                }
                _ => {
                    return Err(ParseError::AmbiguousSubtype {
                        schema: self.id.to_string(),
                        matched: matched
                            .iter()
                            .map(|(i, _)| self.id.to_string() + "#" + &i.to_string())
                            .collect(),
                    })
                }
            }
        }

        // Step 5: strict-mode closed-name-set check.
        if let Some(allowed) = &self.strict_keys {
            if let Some(o) = obj {
                for key in o.keys() {
                    if !allowed.contains(key.as_str()) {
                        return Err(ParseError::ExtraneousKey {
                            schema: self.id.to_string(),
                            key: key.clone(),
                        });
                    }
                }
            }
        }

        let lazy = (0..self.lazy_slot_count)
            .map(|_| OnceCell::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Arc::new(ObjectData {
            raw: raw.clone(),
            handler: Arc::clone(self),
            slots: slots.into_boxed_slice(),
            lazy,
        }))
    }
}
