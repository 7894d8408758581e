//! Value parsers (§4.1): the leaf combinators that turn a raw `serde_json`
//! value into a `FieldValue`. Every parser implements a single
//! [`ValueParser`] trait; "quick" vs "slow" is a capability flag
//! (`is_quick`) rather than two separate trait hierarchies, since in Rust a
//! trait object behind `Arc<dyn ValueParser>` is what field binding (§4.2)
//! and list/subtype dispatch actually hold onto.

mod enum_value;
mod list;
mod nullable;
mod object;
mod scalar;

pub use enum_value::EnumParser;
pub use list::{EagerListParser, LazyListParser};
pub use nullable::NullableParser;
pub use object::TypedObjectParser;
pub use scalar::{scalar_parser, AnyParser, BoolParser, FloatParser, IntParser, RawObjectParser, StrParser, VoidParser};

use serde_json::Value;

use crate::error::ParseError;
use crate::object_data::ObjectData;
use crate::value::{FieldValue, StoredValue};

/// A value parser. Every built-in parser overrides `parse_quick` (if it has
/// a context-free happy path) or `parse_slow`/`finish` (if it needs to
/// produce a `PendingObject` by delegating into another schema's handler,
/// as the typed-object parser does).
pub trait ValueParser: Send + Sync {
    /// Context-free parse. Default panics; every "quick" parser overrides
    /// this. Callers must check `is_quick()` before calling it directly —
    /// field binding always does.
    fn parse_quick(&self, raw: &Value) -> Result<FieldValue, ParseError> {
        let _ = raw;
        unreachable!("parse_quick called on a slow-only parser; check is_quick() first")
    }

    /// Context-sensitive parse, producing a `StoredValue` that `finish`
    /// turns into the user-visible `FieldValue`. Every quick parser is also
    /// a slow parser: the default delegates straight to `parse_quick`.
    fn parse_slow(&self, raw: &Value, parent: Option<&ObjectData>) -> Result<StoredValue, ParseError> {
        let _ = parent;
        self.parse_quick(raw).map(StoredValue::Finished)
    }

    /// Turn a `StoredValue` into the value an accessor hands back.
    fn finish(&self, stored: StoredValue) -> Result<FieldValue, ParseError> {
        match stored {
            StoredValue::Finished(v) => Ok(v),
            StoredValue::PendingObject(_) => {
                unreachable!("parser produced a pending object but does not override finish()")
            }
        }
    }

    /// True if `parse_quick` is usable (context-free). Field binding (§4.2)
    /// uses this to choose between the pre-parsed-slot and lazy-cached
    /// accessor shapes.
    fn is_quick(&self) -> bool {
        true
    }
}
