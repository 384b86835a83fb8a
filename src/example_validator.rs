//! # Example Validator
//!
//! Checks example values against the schema they illustrate.
//!
//! ## Conversion
//!
//! A schema's raw node is converted to JSON (every mapping key coerced to a string)
//! and compiled with `jsonschema`: draft 4 for Swagger 2.0 and OpenAPI 3.0, draft
//! 2020-12 for OpenAPI 3.1. Local `$ref`s are kept as written; each referenced
//! subtree of the document is copied into the fragment at the same JSON pointer,
//! so `#/components/schemas/Pet` resolves inside the fragment exactly as it does in
//! the document and recursive schemas compile without being expanded. References
//! that leave the document are dropped and accept anything.
//!
//! Polymorphic schemas whose subtree loops back on itself are not converted; the
//! probe gives up after [`MAX_PROBE_DEPTH`] levels and treats the schema as acyclic.
//!
//! ## Filtering
//!
//! - combinator summaries (`allOf failed`, `oneOf failed`, `if-then failed`,
//!   `if-else failed`) are dropped in favour of their leaf causes
//! - on OpenAPI 3.0 documents a null-type error is dropped when the schema is
//!   `nullable: true`, or when every null-valued property of a mapping example is
//!   declared `nullable: true`
//!
//! Compiled validators are cached per schema for the lifetime of the validator.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use jsonschema::Draft;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::document::{
    Document, Node, Schema, SchemaId, SpecVersion, MAX_CONVERSION_DEPTH, MAX_REFERENCE_HOPS,
};
use crate::walker::children;
use crate::worker_pool::lock;

/// Depth ceiling for the polymorphic cycle probe.
pub const MAX_PROBE_DEPTH: usize = 40;

/// Validator errors that only summarize nested failures
pub const BANNED_REASONS: [&str; 4] = [
    "if-then failed",
    "if-else failed",
    "allOf failed",
    "oneOf failed",
];

/// Result of validating one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// One reason per validator error that survived filtering
    Invalid(Vec<String>),
    /// The schema loops through its polymorphic branches and was not validated
    Cyclic,
    /// The schema could not be compiled
    Unconvertible(String),
}

impl Verdict {
    pub fn reasons(&self) -> &[String] {
        match self {
            Verdict::Invalid(reasons) => reasons,
            _ => &[],
        }
    }
}

enum Compiled {
    Ready(jsonschema::Validator),
    Cyclic,
    Failed(String),
}

/// Validates example values against schemas of one document
pub struct ExampleValidator {
    spec_version: SpecVersion,
    root: JsonValue,
    compiled: Mutex<HashMap<SchemaId, Arc<Compiled>>>,
}

impl ExampleValidator {
    pub fn new(document: &Document) -> Self {
        Self {
            spec_version: document.spec_version,
            root: document.root.to_json(),
            compiled: Mutex::new(HashMap::new()),
        }
    }

    /// Validate `value` against `schema`.
    pub fn validate(&self, document: &Document, schema: &Schema, value: &Node) -> Verdict {
        let compiled = self.compiled_for(document, schema);
        let validator = match compiled.as_ref() {
            Compiled::Ready(validator) => validator,
            Compiled::Cyclic => return Verdict::Cyclic,
            Compiled::Failed(reason) => return Verdict::Unconvertible(reason.clone()),
        };
        let instance = value.to_json();
        let reasons: Vec<String> = validator
            .iter_errors(&instance)
            .map(|e| e.to_string())
            .filter(|reason| !BANNED_REASONS.iter().any(|b| reason.contains(b)))
            .filter(|reason| !self.tolerates_null(document, schema, value, reason))
            .collect();
        if reasons.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Invalid(reasons)
        }
    }

    fn compiled_for(&self, document: &Document, schema: &Schema) -> Arc<Compiled> {
        if let Some(hit) = lock(&self.compiled).get(&schema.id) {
            return Arc::clone(hit);
        }
        // compile outside the lock; a racing worker at worst compiles twice
        let compiled = Arc::new(self.compile(document, schema));
        lock(&self.compiled)
            .entry(schema.id)
            .or_insert_with(|| Arc::clone(&compiled));
        compiled
    }

    fn compile(&self, document: &Document, schema: &Schema) -> Compiled {
        if schema.branches().next().is_some() && is_cyclic(document, schema) {
            debug!(
                schema = %schema.origin.location,
                "Polymorphic schema loops back on itself, not validating examples"
            );
            return Compiled::Cyclic;
        }

        let fragment = self.fragment(schema);
        let draft = match self.spec_version {
            SpecVersion::OpenApi31 => Draft::Draft202012,
            SpecVersion::Swagger2 | SpecVersion::OpenApi30 => Draft::Draft4,
        };
        match jsonschema::options().with_draft(draft).build(&fragment) {
            Ok(validator) => Compiled::Ready(validator),
            Err(e) => {
                debug!(
                    schema = %schema.origin.location,
                    error = %e,
                    "Schema could not be compiled"
                );
                Compiled::Failed(e.to_string())
            }
        }
    }

    /// The schema as a self-contained JSON Schema document.
    fn fragment(&self, schema: &Schema) -> JsonValue {
        let mut fragment = schema.node.to_json();
        let mut pending = Vec::new();
        self.sanitize(&mut fragment, 0, &mut pending);

        if let JsonValue::Object(target) = &mut fragment {
            let mut mirrored: HashSet<String> = HashSet::new();
            while let Some(pointer) = pending.pop() {
                if !mirrored.insert(pointer.clone()) {
                    continue;
                }
                let Some(found) = self.root.pointer(&pointer) else {
                    continue;
                };
                let mut subtree = found.clone();
                self.sanitize(&mut subtree, 0, &mut pending);
                mirror(target, &pointer, subtree);
            }
        }
        fragment
    }

    /// Drop references that cannot be followed and queue the local ones for mirroring.
    fn sanitize(&self, value: &mut JsonValue, depth: usize, pending: &mut Vec<String>) {
        if depth > MAX_CONVERSION_DEPTH {
            return;
        }
        match value {
            JsonValue::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(JsonValue::as_str) {
                    match reference.strip_prefix('#') {
                        Some(pointer)
                            if !pointer.is_empty() && self.root.pointer(pointer).is_some() =>
                        {
                            pending.push(pointer.to_string());
                        }
                        _ => {
                            debug!(reference, "Dropping reference that leaves the document");
                            map.remove("$ref");
                        }
                    }
                }
                if self.spec_version == SpecVersion::Swagger2
                    && map.get("type").and_then(JsonValue::as_str) == Some("file")
                {
                    map.remove("type");
                }
                for child in map.values_mut() {
                    self.sanitize(child, depth + 1, pending);
                }
            }
            JsonValue::Array(items) => {
                for item in items {
                    self.sanitize(item, depth + 1, pending);
                }
            }
            _ => {}
        }
    }

    fn tolerates_null(&self, document: &Document, schema: &Schema, value: &Node, reason: &str) -> bool {
        if self.spec_version != SpecVersion::OpenApi30 {
            return false;
        }
        if !(reason.contains("got null") || reason.contains("null is not of type")) {
            return false;
        }
        if schema.nullable == Some(true) {
            return true;
        }
        let Some(entries) = value.as_mapping() else {
            return false;
        };
        let mut nulls = entries.iter().filter(|(_, v)| v.is_null()).peekable();
        if nulls.peek().is_none() {
            return false;
        }
        nulls.all(|(key, _)| {
            property_schema(document, schema, &key.key_text(), 0)
                .is_some_and(|property| property.nullable == Some(true))
        })
    }
}

/// Place `subtree` at `pointer` inside `target`, creating objects along the way.
fn mirror(target: &mut JsonMap<String, JsonValue>, pointer: &str, subtree: JsonValue) {
    let segments: Vec<String> = pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = target;
    for segment in parents {
        let slot = cursor
            .entry(segment.clone())
            .or_insert_with(|| JsonValue::Object(JsonMap::new()));
        if !slot.is_object() {
            // an array or scalar already lives here; an object keyed by index
            // resolves the same pointer
            *slot = JsonValue::Object(array_as_object(slot));
        }
        let JsonValue::Object(next) = slot else {
            return;
        };
        cursor = next;
    }
    cursor.insert(last.clone(), subtree);
}

fn array_as_object(value: &JsonValue) -> JsonMap<String, JsonValue> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item.clone()))
            .collect(),
        _ => JsonMap::new(),
    }
}

/// A property schema defined on `schema` directly or through its branches.
fn property_schema<'d>(
    document: &'d Document,
    schema: &'d Schema,
    name: &str,
    depth: usize,
) -> Option<&'d Schema> {
    if depth > MAX_REFERENCE_HOPS {
        return None;
    }
    if let Some(proxy) = schema.property(name) {
        return document.resolve_schema(proxy);
    }
    schema
        .branches()
        .filter_map(|branch| document.resolve_schema(branch))
        .find_map(|branch| property_schema(document, branch, name, depth + 1))
}

/// True when some sub-schema of `schema` leads back to one of its ancestors.
pub fn is_cyclic(document: &Document, schema: &Schema) -> bool {
    let mut probe = Probe {
        document,
        trail: vec![schema.id],
        cleared: HashSet::new(),
        truncated: false,
    };
    probe.visit(schema, 0)
}

struct Probe<'d> {
    document: &'d Document,
    trail: Vec<SchemaId>,
    /// Schemas fully explored without finding a cycle
    cleared: HashSet<SchemaId>,
    truncated: bool,
}

impl<'d> Probe<'d> {
    fn visit(&mut self, schema: &'d Schema, depth: usize) -> bool {
        if depth >= MAX_PROBE_DEPTH {
            self.truncated = true;
            return false;
        }
        for proxy in children(schema) {
            let Some(child) = self.document.resolve_schema(proxy) else {
                continue;
            };
            if self.trail.contains(&child.id) {
                return true;
            }
            if self.cleared.contains(&child.id) {
                continue;
            }
            let truncated_before = std::mem::replace(&mut self.truncated, false);
            self.trail.push(child.id);
            let looped = self.visit(child, depth + 1);
            self.trail.pop();
            if looped {
                return true;
            }
            if !self.truncated {
                self.cleared.insert(child.id);
            }
            self.truncated |= truncated_before;
        }
        false
    }
}
