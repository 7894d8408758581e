//! Typed-object parser (§4.1): delegates to another schema's handler,
//! possibly via an unresolved reference.

use serde_json::Value;

use super::ValueParser;
use crate::error::ParseError;
use crate::handler::HandlerRef;
use crate::object_data::{ObjectData, View};
use crate::value::{FieldValue, StoredValue};

pub struct TypedObjectParser {
    pub target: HandlerRef,
}

impl ValueParser for TypedObjectParser {
    fn parse_slow(&self, raw: &Value, _parent: Option<&ObjectData>) -> Result<StoredValue, ParseError> {
        let data = self.target.get().parse_object_data(raw)?;
        Ok(StoredValue::PendingObject(data))
    }

    fn finish(&self, stored: StoredValue) -> Result<FieldValue, ParseError> {
        match stored {
            StoredValue::PendingObject(data) => Ok(FieldValue::Object(View::new(data))),
            StoredValue::Finished(v) => Ok(v),
        }
    }

    fn is_quick(&self) -> bool {
        false
    }
}
