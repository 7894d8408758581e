//! Enum parser: a JSON string matched against a declared set of member
//! names (§4.1). Unknown names fail; the nullable variant is produced by
//! wrapping this in `NullableParser`.

use serde_json::Value;

use super::ValueParser;
use crate::error::ParseError;
use crate::value::FieldValue;

pub struct EnumParser {
    pub field: &'static str,
    pub members: &'static [&'static str],
}

impl ValueParser for EnumParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        let name = raw.as_str().ok_or_else(|| ParseError::TypeMismatch {
            detail: "expected a string for enum field".to_string(),
        })?;
        match self.members.iter().find(|m| **m == name) {
            Some(member) => Ok(FieldValue::Enum(member)),
            None => Err(ParseError::UnknownEnumMember {
                field: self.field.to_string(),
                name: name.to_string(),
            }),
        }
    }
}
