//! `ObjectData` (§3): the per-parsed-value state — raw input, eager slots,
//! lazy cache, and a back-reference to the compiled handler. `View` is the
//! materialized accessor view (§4.6) callers actually hold.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::{LazyError, ParseError};
use crate::handler::{AccessorHandler, TypeHandler};
use crate::value::FieldValue;

/// One parsed value's full state. Eager slots are write-once, filled before
/// this struct is ever wrapped in `Arc` and handed to a caller (§5: safe for
/// concurrent reads by construction). Lazy slots use `OnceCell`, which is
/// the safe, corpus-grounded (see `src/ffi/parsed_cache.rs`'s `OnceLock`)
/// stand-in for the spec's "compare-and-set, first writer wins" contract.
pub struct ObjectData {
    pub(crate) raw: Value,
    pub(crate) handler: Arc<TypeHandler>,
    pub(crate) slots: Box<[FieldValue]>,
    pub(crate) lazy: Box<[OnceCell<FieldValue>]>,
}

impl ObjectData {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn handler(&self) -> &Arc<TypeHandler> {
        &self.handler
    }
}

/// The materialized, user-visible view over an `ObjectData`. Routes every
/// accessor call to its pre-built handler (§4.6); cheap to clone (an `Arc`
/// bump).
#[derive(Clone)]
pub struct View {
    data: Arc<ObjectData>,
}

impl View {
    pub fn new(data: Arc<ObjectData>) -> Self {
        View { data }
    }

    pub fn schema_id(&self) -> &'static str {
        self.data.handler.id
    }

    /// The underlying raw JSON value, unmodified.
    pub fn raw(&self) -> &Value {
        &self.data.raw
    }

    /// Dynamic accessor dispatch: call accessor `name` and return its
    /// parsed value. Fails clearly if `name` requires a JSON-object backing
    /// and this view's raw value is not an object (possible only in
    /// manual-subtyping mode, per §4.6).
    pub fn get(&self, name: &str) -> Result<FieldValue, LazyError> {
        let handler = &self.data.handler;
        let accessor = handler
            .accessors
            .get(name)
            .unwrap_or_else(|| panic!("no accessor '{name}' on schema '{}'", handler.id));

        match accessor {
            AccessorHandler::PreParsedSlot { slot } => Ok(self.data.slots[*slot].clone()),

            AccessorHandler::LazyQuick { key, optional, parser } => {
                self.require_object(name)?;
                let obj = self.data.raw.as_object().unwrap();
                match obj.get(*key) {
                    Some(raw_field) => parser
                        .parse_quick(raw_field)
                        .map_err(|e| LazyError(e.at_field(handler.id, name))),
                    None if *optional => Ok(FieldValue::None),
                    None => Err(LazyError(
                        ParseError::MissingRequiredField {
                            field: name.to_string(),
                        }
                        .at_field(handler.id, name),
                    )),
                }
            }

            AccessorHandler::LazyCached {
                key,
                optional,
                parser,
                cache_slot,
            } => {
                self.require_object(name)?;
                let obj = self.data.raw.as_object().unwrap();
                self.data.lazy[*cache_slot]
                    .get_or_try_init(|| match obj.get(*key) {
                        Some(raw_field) => parser
                            .parse_slow(raw_field, Some(&self.data))
                            .and_then(|stored| parser.finish(stored)),
                        None if *optional => Ok(FieldValue::None),
                        None => Err(ParseError::MissingRequiredField {
                            field: name.to_string(),
                        }),
                    })
                    .map(|v| v.clone())
                    .map_err(|e| LazyError(e.at_field(handler.id, name)))
            }

            AccessorHandler::SubtypeCase { variant_index } => {
                let (code_slot, value_slot) = handler.automatic_slots();
                match &self.data.slots[code_slot] {
                    FieldValue::Int(code) if *code == *variant_index => {
                        Ok(self.data.slots[value_slot].clone())
                    }
                    _ => Ok(FieldValue::None),
                }
            }

            AccessorHandler::SubtypeCaster { target, cache_slot } => {
                self.data.lazy[*cache_slot]
                    .get_or_try_init(|| {
                        let child = target.get().parse_object_data(&self.data.raw)?;
                        Ok(FieldValue::Object(View::new(child)))
                    })
                    .map(|v| v.clone())
                    .map_err(|e: ParseError| LazyError(e.at_field(handler.id, name)))
            }
        }
    }

    fn require_object(&self, accessor: &str) -> Result<(), LazyError> {
        if self.data.raw.is_object() {
            Ok(())
        } else {
            Err(LazyError(ParseError::NotAnObject {
                schema: self.data.handler.id.to_string(),
            }.at_field(self.data.handler.id, accessor)))
        }
    }
}

impl PartialEq for View {
    /// Value equality, not pointer identity (testable property #1: parsing
    /// the same raw value twice yields field-by-field-equal views).
    fn eq(&self, other: &Self) -> bool {
        self.data.handler.id == other.data.handler.id && self.data.raw == other.data.raw
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("schema", &self.data.handler.id)
            .field("raw", &self.data.raw)
            .finish()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data.raw)
    }
}
