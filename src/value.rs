//! The parsed, user-visible value domain: what every accessor ultimately
//! returns, and the eager/lazy list representations layered under `List`.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::ParseError;
use crate::object_data::View;

/// A parsed field value. `None` stands in for the spec's "no value" —
/// produced by an absent optional field, an explicit JSON `null` under a
/// nullable field, or an unmatched automatic-subtype case.
#[derive(Debug, Clone)]
pub enum FieldValue {
    None,
    Int(i64),
    Bool(bool),
    Float(f32),
    Str(Arc<str>),
    Enum(&'static str),
    /// Unchecked pass-through of any JSON value (the "opaque-object" scalar).
    Any(Value),
    /// Pass-through restricted to JSON objects (the "raw-JSON-object" scalar).
    RawObject(Value),
    List(Arc<ListValue>),
    Object(View),
}

impl FieldValue {
    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&'static str> {
        match self {
            FieldValue::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&View> {
        match self {
            FieldValue::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Arc<ListValue>> {
        match self {
            FieldValue::List(l) => Some(l),
            _ => None,
        }
    }
}

/// An intermediate form produced by `ValueParser::parse_slow`, finished by
/// `ValueParser::finish` into a `FieldValue`. Separating the two lets the
/// typed-object parser hand back an `ObjectData` before it is wrapped in the
/// user-visible `View`.
pub enum StoredValue {
    Finished(FieldValue),
    PendingObject(Arc<crate::object_data::ObjectData>),
}

/// The two list-parser factories from §4.1.
pub enum ListValue {
    /// Every element was parsed up front; indexing never fails and never
    /// does work.
    Eager(Vec<FieldValue>),
    /// Elements are parsed on first access and memoized per index.
    Lazy(LazyList),
}

impl ListValue {
    pub fn len(&self) -> usize {
        match self {
            ListValue::Eager(v) => v.len(),
            ListValue::Lazy(l) => l.raw.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch element `index`. For a lazy list this may trigger a parse; the
    /// result is memoized so repeated access is free. Concurrent callers
    /// asking for the same index are serialized by `OnceCell`'s own
    /// blocking initialization, which conforms to (and is strictly stronger
    /// than) the spec's "first writer wins" compare-and-set requirement —
    /// see DESIGN.md.
    pub fn get(&self, index: usize) -> Result<FieldValue, ParseError> {
        match self {
            ListValue::Eager(v) => v
                .get(index)
                .cloned()
                .ok_or_else(|| ParseError::TypeMismatch {
                    detail: format!("list index {index} out of bounds"),
                }),
            ListValue::Lazy(l) => l.get(index),
        }
    }
}

/// Backing store for a LAZY-strategy list field: the raw, unparsed elements
/// plus one memoization cell per index.
pub struct LazyList {
    raw: Vec<Value>,
    slots: Vec<OnceCell<FieldValue>>,
    elem: Arc<dyn crate::parsers::ValueParser>,
}

impl LazyList {
    pub fn new(raw: Vec<Value>, elem: Arc<dyn crate::parsers::ValueParser>) -> Self {
        let slots = raw.iter().map(|_| OnceCell::new()).collect();
        LazyList { raw, slots, elem }
    }

    fn get(&self, index: usize) -> Result<FieldValue, ParseError> {
        let raw = self
            .raw
            .get(index)
            .ok_or_else(|| ParseError::TypeMismatch {
                detail: format!("list index {index} out of bounds"),
            })?;
        let slot = &self.slots[index];
        slot.get_or_try_init(|| {
            self.elem
                .parse_slow(raw, None)
                .and_then(|stored| self.elem.finish(stored))
                .map_err(|e| e.at_index(index))
        })
        .map(|v| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::IntParser;

    #[test]
    fn eager_list_out_of_bounds_is_a_type_mismatch() {
        let list = ListValue::Eager(vec![FieldValue::Int(1), FieldValue::Int(2)]);
        assert_eq!(list.len(), 2);
        assert!(list.get(5).is_err());
    }

    #[test]
    fn lazy_list_memoizes_per_index() {
        let raw = vec![Value::from(1), Value::from(2)];
        let lazy = LazyList::new(raw, Arc::new(IntParser));
        assert_eq!(lazy.get(0).unwrap().as_i64(), Some(1));
        // second call for the same index must hit the memoized slot, not reparse
        assert_eq!(lazy.get(0).unwrap().as_i64(), Some(1));
        assert!(lazy.get(9).is_err());
    }
}
