//! Nullable wrapper combinator (§4.1). Only legal over reference-shaped
//! values; `crate::field` rejects nullability on primitive shapes before
//! this type is ever constructed (§3 invariants).

use std::sync::Arc;

use serde_json::Value;

use super::ValueParser;
use crate::error::ParseError;
use crate::object_data::ObjectData;
use crate::value::{FieldValue, StoredValue};

pub struct NullableParser {
    pub inner: Arc<dyn ValueParser>,
}

impl ValueParser for NullableParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        if raw.is_null() {
            Ok(FieldValue::None)
        } else {
            self.inner.parse_quick(raw)
        }
    }

    fn parse_slow(&self, raw: &Value, parent: Option<&ObjectData>) -> Result<StoredValue, ParseError> {
        if raw.is_null() {
            Ok(StoredValue::Finished(FieldValue::None))
        } else {
            self.inner.parse_slow(raw, parent)
        }
    }

    fn finish(&self, stored: StoredValue) -> Result<FieldValue, ParseError> {
        self.inner.finish(stored)
    }

    fn is_quick(&self) -> bool {
        self.inner.is_quick()
    }
}
