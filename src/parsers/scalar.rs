//! Scalar quick parsers: integer, boolean, float, string, opaque pass-through,
//! raw-object pass-through, and the void default-case parser. Each scalar is
//! exposed bare (non-nullable) and wrapped in `NullableParser` for the
//! nullable variant (§4.1: "Each comes as a nullable/non-nullable pair").

use std::sync::Arc;

use serde_json::Value;

use super::ValueParser;
use crate::error::ParseError;
use crate::value::FieldValue;

fn type_mismatch(expected: &str, raw: &Value) -> ParseError {
    ParseError::TypeMismatch {
        detail: format!("expected {expected}, got {}", kind_name(raw)),
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

pub struct IntParser;

impl ValueParser for IntParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        raw.as_i64()
            .map(FieldValue::Int)
            .ok_or_else(|| type_mismatch("integer", raw))
    }
}

pub struct BoolParser;

impl ValueParser for BoolParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        raw.as_bool()
            .map(FieldValue::Bool)
            .ok_or_else(|| type_mismatch("boolean", raw))
    }
}

pub struct FloatParser;

impl ValueParser for FloatParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        raw.as_f64()
            .map(|f| FieldValue::Float(f as f32))
            .ok_or_else(|| type_mismatch("float", raw))
    }
}

pub struct StrParser;

impl ValueParser for StrParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        raw.as_str()
            .map(|s| FieldValue::Str(Arc::from(s)))
            .ok_or_else(|| type_mismatch("string", raw))
    }
}

/// Unchecked pass-through of any JSON value ("opaque-object" in §4.1).
pub struct AnyParser;

impl ValueParser for AnyParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        Ok(FieldValue::Any(raw.clone()))
    }
}

/// Pass-through restricted to JSON objects ("raw-JSON-object" in §4.1).
pub struct RawObjectParser;

impl ValueParser for RawObjectParser {
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        if raw.is_object() {
            Ok(FieldValue::RawObject(raw.clone()))
        } else {
            Err(type_mismatch("object", raw))
        }
    }
}

/// Consumes any value, always yields "no value". Used as the default-case
/// placeholder in automatic subtype dispatch.
pub struct VoidParser;

impl ValueParser for VoidParser {
    fn parse_quick(&self, _raw: &Value) -> Result<FieldValue, ParseError> {
        Ok(FieldValue::None)
    }
}

/// Helper used by field binding to build the `Arc<dyn ValueParser>` for a
/// scalar/void/any/raw-object shape.
pub fn scalar_parser(shape: &crate::schema::ValueShape) -> Option<Arc<dyn ValueParser>> {
    use crate::schema::ValueShape::*;
    match shape {
        Int => Some(Arc::new(IntParser)),
        Bool => Some(Arc::new(BoolParser)),
        Float => Some(Arc::new(FloatParser)),
        Str => Some(Arc::new(StrParser)),
        Any => Some(Arc::new(AnyParser)),
        RawObject => Some(Arc::new(RawObjectParser)),
        Void => Some(Arc::new(VoidParser)),
        Enum(_) | List(_) | Schema(_) => None,
    }
}
