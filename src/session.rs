//! The one-shot schema-building session (§4.5). Single-threaded,
//! non-reentrant: `SchemaBuildSession::build` consumes a batch of
//! `SchemaDescriptor`s and an optional list of previously built batches
//! (transitive imports) and produces a frozen `BuiltBatch`. See
//! `examples/byrizki-jsoneval-rs/src/parsed_schema.rs`'s `from_json`
//! one-shot constructor for the "single entry point assembles and freezes"
//! shape this generalizes to a multi-schema batch with forward/cyclic refs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::SchemaError;
use crate::field;
use crate::handler::{AccessorHandler, HandlerRef, SubtypeCase, SubtypeSupport, TypeHandler};
use crate::parsers::NullableParser;
use crate::schema::{FieldDescriptor, SchemaDescriptor, SchemaId, SubtypeMode};

/// Build-time configuration. Strict mode turns on closed-name-set
/// enforcement (§4.3 step 5, §4.5 step 6); there is no environment-variable
/// or file-based configuration surface (`spec.md` §6).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildConfig {
    pub strict: bool,
}

impl BuildConfig {
    pub fn strict() -> Self {
        BuildConfig { strict: true }
    }

    pub fn lenient() -> Self {
        BuildConfig { strict: false }
    }
}

/// The frozen result of one build session: a read-only map from schema id
/// to compiled handler, plus the effective (own + inherited, override-
/// resolved) field lists a later session needs to treat this batch as an
/// import for single-inheritance flattening (§4.2) across batches.
pub struct BuiltBatch {
    pub handlers: IndexMap<SchemaId, Arc<TypeHandler>>,
    effective_fields: IndexMap<SchemaId, Vec<FieldDescriptor>>,
}

impl BuiltBatch {
    pub fn get(&self, id: SchemaId) -> Option<&Arc<TypeHandler>> {
        self.handlers.get(id)
    }

    pub fn contains(&self, id: SchemaId) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub struct SchemaBuildSession<'a> {
    config: BuildConfig,
    imports: &'a [BuiltBatch],
}

impl<'a> SchemaBuildSession<'a> {
    pub fn new(config: BuildConfig) -> Self {
        SchemaBuildSession { config, imports: &[] }
    }

    pub fn with_imports(config: BuildConfig, imports: &'a [BuiltBatch]) -> Self {
        SchemaBuildSession { config, imports }
    }

    /// Run the full build: seed, analyze, link, and (strict mode) compute
    /// closed name sets. Consumes `batch`; descriptors are immutable after
    /// submission (§3 Lifecycle) and do not outlive this call — only their
    /// derived `effective_fields` survive into the returned `BuiltBatch`.
    pub fn build(self, batch: Vec<SchemaDescriptor>) -> Result<BuiltBatch, SchemaError> {
        // --- Seed ---
        let mut seen = HashSet::new();
        for d in &batch {
            if !seen.insert(d.id) {
                return Err(SchemaError::DuplicateSchema(d.id.to_string()));
            }
        }
        debug!(count = batch.len(), "seeding schema batch");

        let local_refs: IndexMap<SchemaId, HandlerRef> =
            batch.iter().map(|d| (d.id, HandlerRef::new(d.id))).collect();
        let local_descriptors: IndexMap<SchemaId, &SchemaDescriptor> =
            batch.iter().map(|d| (d.id, d)).collect();

        let ref_for = |id: SchemaId| -> Option<HandlerRef> {
            if let Some(r) = local_refs.get(id) {
                return Some(r.clone());
            }
            for b in self.imports {
                if let Some(h) = b.handlers.get(id) {
                    let r = HandlerRef::new(id);
                    r.resolve(Arc::clone(h));
                    return Some(r);
                }
            }
            None
        };

        // --- Analyze: flatten own + inherited fields per schema ---
        let mut effective_fields: IndexMap<SchemaId, Vec<FieldDescriptor>> = IndexMap::new();
        for d in &batch {
            let mut visiting = HashSet::new();
            let fields = collect_fields(d, &local_descriptors, self.imports, &mut visiting)?;
            effective_fields.insert(d.id, fields);
        }

        // --- Analyze: compile each handler (refs may still be unresolved
        // placeholders for forward/cyclic local references) ---
        debug!("analyzing schema batch");
        let mut built: Vec<(SchemaId, TypeHandler)> = Vec::with_capacity(batch.len());
        for d in &batch {
            let fields = &effective_fields[d.id];
            let handler = build_handler(d, fields, &ref_for, self.config.strict)?;
            built.push((d.id, handler));
        }

        // Validate (§4.5 step 5): "every subtype-support block must have a
        // caster installed if the schema participates as a subtype" holds
        // by construction here — `build_handler` cannot produce a
        // `SubtypeSupport::Automatic`/`Manual` case without installing its
        // accessor in the same pass that declares it, and every caster's
        // target was already confirmed resolvable (`UnknownSubtypeTarget`)
        // above. `supertype` (single-inheritance field flattening, §4.2) and
        // subtype casters (§4.4 polymorphic dispatch) are deliberately
        // independent relations — see DESIGN.md's note on Scenario 6 — so
        // declaring a `supertype` does not itself require the supertype to
        // wire a caster back.

        // --- Closed-name-set construction (strict mode only, §4.5 step 6) ---
        if self.config.strict {
            let mut memo: HashMap<SchemaId, HashSet<&'static str>> = HashMap::new();
            for (id, handler) in built.iter_mut() {
                let keys = closed_keys(
                    id,
                    &effective_fields,
                    &local_descriptors,
                    self.imports,
                    &mut memo,
                );
                handler.strict_keys = Some(keys);
            }
        }

        // --- Link: resolve every local placeholder to its built handler ---
        debug!("linking schema batch");
        let mut handlers: IndexMap<SchemaId, Arc<TypeHandler>> = IndexMap::with_capacity(built.len());
        for (id, handler) in built {
            let arc = Arc::new(handler);
            local_refs
                .get(id)
                .expect("every built schema was seeded")
                .resolve(Arc::clone(&arc));
            handlers.insert(id, arc);
        }

        Ok(BuiltBatch {
            handlers,
            effective_fields,
        })
    }
}

/// Recursively flatten a schema's own fields with its supertype chain's
/// fields, own fields overriding same-named inherited ones (must be
/// flagged `override`; §3 invariant). Detects supertype cycles via the
/// `visiting` set, since a local batch's supertype chain may include
/// forward references.
fn collect_fields(
    desc: &SchemaDescriptor,
    local: &IndexMap<SchemaId, &SchemaDescriptor>,
    imports: &[BuiltBatch],
    visiting: &mut HashSet<SchemaId>,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    if !visiting.insert(desc.id) {
        return Err(SchemaError::SupertypeCycle(desc.id.to_string()));
    }

    let mut fields: Vec<FieldDescriptor> = Vec::new();
    if let Some(sup_id) = desc.supertype {
        if let Some(sup_desc) = local.get(sup_id) {
            fields = collect_fields(sup_desc, local, imports, visiting)?;
        } else if let Some(sup_fields) = imported_effective_fields(sup_id, imports) {
            fields = sup_fields;
        } else {
            return Err(SchemaError::UnknownSupertype {
                schema: desc.id.to_string(),
                supertype: sup_id.to_string(),
            });
        }
    }
    visiting.remove(desc.id);

    let mut own_names = HashSet::new();
    for f in &desc.fields {
        if !own_names.insert(f.accessor) {
            return Err(SchemaError::DuplicateField {
                schema: desc.id.to_string(),
                field: f.accessor.to_string(),
            });
        }
    }

    for f in &desc.fields {
        match fields.iter().position(|inherited| inherited.accessor == f.accessor) {
            Some(idx) => {
                if !f.is_override {
                    return Err(SchemaError::UnflaggedOverride {
                        schema: desc.id.to_string(),
                        field: f.accessor.to_string(),
                    });
                }
                fields[idx] = f.clone();
            }
            None => fields.push(f.clone()),
        }
    }

    Ok(fields)
}

fn imported_effective_fields(id: SchemaId, imports: &[BuiltBatch]) -> Option<Vec<FieldDescriptor>> {
    for b in imports {
        if let Some(f) = b.effective_fields.get(id) {
            return Some(f.clone());
        }
    }
    None
}


/// Build one schema's compiled `TypeHandler` from its flattened field list.
/// `strict_keys` is left as a placeholder (`Some(empty)`/`None`) here; the
/// real set is filled in by a later pass once every handler in the batch
/// has been analyzed (§4.5 step 6 is deliberately deferred — see
/// `SchemaBuildSession::build`).
fn build_handler(
    desc: &SchemaDescriptor,
    fields: &[FieldDescriptor],
    ref_for: &dyn Fn(SchemaId) -> Option<HandlerRef>,
    strict: bool,
) -> Result<TypeHandler, SchemaError> {
    let supertype = match desc.supertype {
        Some(sup) => Some(ref_for(sup).ok_or_else(|| SchemaError::UnknownSupertype {
            schema: desc.id.to_string(),
            supertype: sup.to_string(),
        })?),
        None => None,
    };

    let mut next_slot = 0usize;
    let mut next_lazy = 0usize;
    let mut eager_loaders = Vec::new();
    let mut accessors: IndexMap<&'static str, AccessorHandler> = IndexMap::new();

    for f in fields {
        if f.nullable && f.shape.is_primitive() {
            return Err(SchemaError::NullablePrimitive {
                schema: desc.id.to_string(),
                field: f.accessor.to_string(),
            });
        }
        let base = field::build_value_parser(&f.shape, f.load, f.accessor, ref_for)?;
        let parser = if f.nullable {
            Arc::new(NullableParser { inner: base }) as Arc<dyn crate::parsers::ValueParser>
        } else {
            base
        };
        let outcome = field::bind_field(f, parser, &mut next_slot, &mut next_lazy);
        if let Some(loader) = outcome.eager_loader {
            eager_loaders.push(loader);
        }
        accessors.insert(f.accessor, outcome.accessor);
    }

    let subtype_support = match desc.subtype_mode {
        SubtypeMode::Automatic => {
            let mut cases = Vec::new();
            let mut has_default = false;
            for c in &desc.subtypes {
                if c.reinterpret {
                    return Err(SchemaError::ReinterpretOutsideManualMode {
                        schema: desc.id.to_string(),
                        accessor: c.accessor.to_string(),
                    });
                }
                if c.is_default_case {
                    has_default = true;
                    accessors.insert(c.accessor, AccessorHandler::SubtypeCase { variant_index: -1 });
                    continue;
                }
                let condition = c.condition.clone().ok_or_else(|| SchemaError::MissingCondition {
                    schema: desc.id.to_string(),
                    accessor: c.accessor.to_string(),
                })?;
                let target = ref_for(c.target).ok_or_else(|| SchemaError::UnknownSubtypeTarget {
                    schema: desc.id.to_string(),
                    target: c.target.to_string(),
                })?;
                let idx = cases.len() as i64;
                cases.push(SubtypeCase { target, condition });
                accessors.insert(c.accessor, AccessorHandler::SubtypeCase { variant_index: idx });
            }
            let variant_code_slot = next_slot;
            next_slot += 1;
            let variant_value_slot = next_slot;
            next_slot += 1;
            SubtypeSupport::Automatic {
                variant_code_slot,
                variant_value_slot,
                cases,
                has_default,
            }
        }
        SubtypeMode::Manual => {
            for c in &desc.subtypes {
                let target = ref_for(c.target).ok_or_else(|| SchemaError::UnknownSubtypeTarget {
                    schema: desc.id.to_string(),
                    target: c.target.to_string(),
                })?;
                let cache_slot = next_lazy;
                next_lazy += 1;
                accessors.insert(
                    c.accessor,
                    AccessorHandler::SubtypeCaster { target, cache_slot },
                );
            }
            SubtypeSupport::Manual
        }
    };

    Ok(TypeHandler {
        id: desc.id,
        supertype,
        field_count: next_slot,
        eager_loaders,
        lazy_slot_count: next_lazy,
        accessors,
        subtype_support,
        strict_keys: if strict { Some(HashSet::new()) } else { None },
    })
}

/// The closed name set for schema `id`: its own (flattened, override-
/// resolved) JSON keys, plus — for automatic-mode schemas — every
/// non-default subtype's closed set, recursively (§4.5 step 6). Computed
/// over the plain descriptor/field data rather than over built handlers so
/// it can run before the batch's handlers are wrapped in `Arc` (handlers
/// are immutable once built).
fn closed_keys(
    id: SchemaId,
    effective_fields: &IndexMap<SchemaId, Vec<FieldDescriptor>>,
    local_descriptors: &IndexMap<SchemaId, &SchemaDescriptor>,
    imports: &[BuiltBatch],
    memo: &mut HashMap<SchemaId, HashSet<&'static str>>,
) -> HashSet<&'static str> {
    if let Some(cached) = memo.get(id) {
        return cached.clone();
    }

    let mut keys: HashSet<&'static str> = HashSet::new();
    if let Some(fields) = effective_fields.get(id) {
        keys.extend(fields.iter().map(|f| f.key()));
    } else {
        for b in imports {
            if let Some(h) = b.handlers.get(id) {
                if let Some(k) = &h.strict_keys {
                    keys.extend(k.iter().copied());
                }
                break;
            }
        }
    }

    if let Some(desc) = local_descriptors.get(id) {
        if desc.subtype_mode == SubtypeMode::Automatic {
            for sub in &desc.subtypes {
                if !sub.is_default_case {
                    let sub_keys = closed_keys(sub.target, effective_fields, local_descriptors, imports, memo);
                    keys.extend(sub_keys);
                }
            }
        }
    }

    memo.insert(id, keys.clone());
    keys
}
