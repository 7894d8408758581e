//! List parsers (§4.1): eager (parse every element up front) and lazy
//! (index `i` parsed on first access, memoized). Both are "quick" — neither
//! needs the enclosing `ObjectData` to build the list value itself; laziness
//! lives entirely at the per-element level inside `crate::value::LazyList`.

use std::sync::Arc;

use serde_json::Value;

use super::ValueParser;
use crate::error::ParseError;
use crate::value::{FieldValue, LazyList, ListValue};

pub struct EagerListParser {
    pub elem: Arc<dyn ValueParser>,
}

impl ValueParser for EagerListParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        let arr = raw.as_array().ok_or_else(|| ParseError::TypeMismatch {
            detail: format!("expected array, got {}", kind_name(raw)),
        })?;
        let mut out = Vec::with_capacity(arr.len());
        for (index, v) in arr.iter().enumerate() {
            let parsed = self
                .elem
                .parse_slow(v, None)
                .and_then(|stored| self.elem.finish(stored))
                .map_err(|e| e.at_index(index))?;
            out.push(parsed);
        }
        Ok(FieldValue::List(Arc::new(ListValue::Eager(out))))
    }
}

pub struct LazyListParser {
    pub elem: Arc<dyn ValueParser>,
}

impl ValueParser for LazyListParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        let arr = raw.as_array().ok_or_else(|| ParseError::TypeMismatch {
            detail: format!("expected array, got {}", kind_name(raw)),
        })?;
        let lazy = LazyList::new(arr.clone(), Arc::clone(&self.elem));
        Ok(FieldValue::List(Arc::new(ListValue::Lazy(lazy))))
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
