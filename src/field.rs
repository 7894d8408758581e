//! Field binding (§4.2): turns one `FieldDescriptor` into a compiled value
//! parser plus one of the three accessor-handler shapes, according to the
//! load-strategy resolution rule. `crate::session` drives this during its
//! Analyze phase; the slot bookkeeping (`next_slot`/`next_lazy_slot`) is
//! owned by the caller because it's shared across every field of one schema.

use std::sync::Arc;

use crate::error::SchemaError;
use crate::handler::{AccessorHandler, EagerLoader, HandlerRef};
use crate::parsers::{scalar_parser, EagerListParser, EnumParser, LazyListParser, TypedObjectParser, ValueParser};
use crate::schema::{FieldDescriptor, LoadStrategy, SchemaId, ValueShape};

/// Build the `Arc<dyn ValueParser>` for a declared value shape. `load` only
/// matters for `List`: a LAZY-strategy list field gets the lazy per-element
/// parser, everything else gets the eager one (§4.1). Recursion into a
/// list's element shape always requests the eager resolution for that
/// inner shape — per-element laziness is `LazyListParser`'s own concern,
/// not something a doubly-nested list would compound.
pub fn build_value_parser(
    shape: &ValueShape,
    load: LoadStrategy,
    field_name: &'static str,
    ref_for: &dyn Fn(SchemaId) -> Option<HandlerRef>,
) -> Result<Arc<dyn ValueParser>, SchemaError> {
    Ok(match shape {
        ValueShape::List(inner) => {
            let elem = build_value_parser(inner, LoadStrategy::Eager, field_name, ref_for)?;
            match load {
                LoadStrategy::Lazy => Arc::new(LazyListParser { elem }),
                LoadStrategy::Auto | LoadStrategy::Eager => Arc::new(EagerListParser { elem }),
            }
        }
        ValueShape::Schema(id) => {
            let id = *id;
            let target = ref_for(id).ok_or_else(|| SchemaError::UnresolvedRef(id.to_string()))?;
            Arc::new(TypedObjectParser { target })
        }
        ValueShape::Enum(members) => Arc::new(EnumParser {
            field: field_name,
            members: *members,
        }),
        _ => scalar_parser(shape).expect("every non-list, non-schema, non-enum shape is a scalar"),
    })
}

/// The outcome of binding one field: at most one `EagerLoader` (pushed into
/// the handler's eager-loader list) and exactly one `AccessorHandler`
/// (installed into the handler's accessor map under the field's name).
pub struct FieldBindOutcome {
    pub eager_loader: Option<EagerLoader>,
    pub accessor: AccessorHandler,
}

/// The three-way split from §4.2: AUTO/EAGER always pre-parse into a slot
/// (an eager loader works the same whether its parser is quick or slow —
/// `TypeHandler::parse_object_data` calls `parse_slow`+`finish` uniformly).
/// LAZY forks on whether the parser has a quick form: quick gets re-parsed,
/// uncached, on every call; slow gets parsed once and memoized.
pub fn bind_field(
    field: &FieldDescriptor,
    parser: Arc<dyn ValueParser>,
    next_slot: &mut usize,
    next_lazy_slot: &mut usize,
) -> FieldBindOutcome {
    match field.load {
        LoadStrategy::Auto | LoadStrategy::Eager => {
            let slot = *next_slot;
            *next_slot += 1;
            FieldBindOutcome {
                eager_loader: Some(EagerLoader {
                    slot,
                    accessor: field.accessor,
                    key: field.key(),
                    optional: field.optional,
                    parser,
                }),
                accessor: AccessorHandler::PreParsedSlot { slot },
            }
        }
        LoadStrategy::Lazy if parser.is_quick() => FieldBindOutcome {
            eager_loader: None,
            accessor: AccessorHandler::LazyQuick {
                key: field.key(),
                optional: field.optional,
                parser,
            },
        },
        LoadStrategy::Lazy => {
            let cache_slot = *next_lazy_slot;
            *next_lazy_slot += 1;
            FieldBindOutcome {
                eager_loader: None,
                accessor: AccessorHandler::LazyCached {
                    key: field.key(),
                    optional: field.optional,
                    parser,
                    cache_slot,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    #[test]
    fn auto_eager_allocates_slot() {
        let field = FieldDescriptor::new("x", ValueShape::Int);
        let mut slot = 0;
        let mut lazy = 0;
        let outcome = bind_field(&field, Arc::new(crate::parsers::IntParser), &mut slot, &mut lazy);
        assert!(outcome.eager_loader.is_some());
        assert_eq!(slot, 1);
        assert_eq!(lazy, 0);
    }
}
