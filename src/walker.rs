//! # Schema Walker
//!
//! Enumerates every distinct schema reachable from a document exactly once.
//!
//! Roots are visited in a fixed order: component schemas, then every parameter,
//! header, media type and (Swagger 2.0) response schema. From each root the walk
//! descends through `properties`, `items`, `additionalProperties`, `not` and the
//! `allOf`/`anyOf`/`oneOf` branches, following `$ref`s. Two guards keep it finite
//! and duplicate-free:
//!
//! - a visited set keyed by schema identity, so a schema reached again through a
//!   `$ref` (including cyclic ones) is not re-entered
//! - a set of [`DedupKey`]s built from the source file and the position of the key
//!   node holding the schema
//! - a nesting ceiling of [`MAX_WALK_DEPTH`] below each root
//!
//! The result is computed once per run and shared read-only by every rule.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::document::{Document, Items, Schema, SchemaId, SchemaProxy};

/// Nesting depth below which the walk does not descend.
pub const MAX_WALK_DEPTH: usize = 40;

/// Identity of a schema for duplicate suppression
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DedupKey {
    /// Source file, key-node line, key-node column
    Position(String, usize, usize),
    /// Schemas without a source position fall back to their own identity
    Identity(SchemaId),
}

impl DedupKey {
    pub fn of(document: &Document, schema: &Schema) -> Self {
        let mark = schema.origin.key_mark;
        if mark.line == 0 {
            DedupKey::Identity(schema.id)
        } else {
            DedupKey::Position(document.identity(), mark.line, mark.column)
        }
    }

    /// Key for a non-schema container (parameter, header, media type) at `mark`.
    pub fn at(document: &Document, mark: crate::document::Mark) -> Self {
        DedupKey::Position(document.identity(), mark.line, mark.column)
    }
}

/// Cached enumeration of all schemas in walk order
#[derive(Debug, Clone, Default)]
pub struct SchemaWalker {
    order: Arc<[SchemaId]>,
}

impl SchemaWalker {
    pub fn new(document: &Document) -> Self {
        let order: Vec<SchemaId> = walk(document);
        debug!(schemas = order.len(), "Schema walk complete");
        Self {
            order: order.into(),
        }
    }

    pub fn ids(&self) -> &[SchemaId] {
        &self.order
    }

    /// Walked schemas resolved against `document`.
    pub fn schemas<'d>(&'d self, document: &'d Document) -> impl Iterator<Item = &'d Schema> + 'd {
        self.order.iter().filter_map(move |id| document.schema(*id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn roots(document: &Document) -> Vec<&SchemaProxy> {
    let mut roots = Vec::new();
    for component in &document.components.entries {
        if let crate::document::ComponentTarget::Schema(proxy) = &component.target {
            roots.push(proxy);
        }
    }
    roots.extend(document.parameters().iter().filter_map(|p| p.schema.as_ref()));
    roots.extend(document.headers().iter().filter_map(|h| h.schema.as_ref()));
    roots.extend(document.media_types().iter().filter_map(|m| m.schema.as_ref()));
    roots.extend(document.responses().iter().filter_map(|r| r.schema.as_ref()));
    roots
}

/// Direct sub-schema slots of `schema`, in declaration order.
pub fn children(schema: &Schema) -> Vec<&SchemaProxy> {
    let mut out: Vec<&SchemaProxy> = schema.properties.iter().map(|(_, p)| p).collect();
    if let Some(Items::Schema(items)) = &schema.items {
        out.push(items);
    }
    if let Some(Items::Schema(additional)) = &schema.additional_properties {
        out.push(additional);
    }
    if let Some(not) = &schema.not {
        out.push(not);
    }
    out.extend(schema.branches());
    out
}

fn walk(document: &Document) -> Vec<SchemaId> {
    let mut order = Vec::new();
    let mut visited: HashSet<SchemaId> = HashSet::new();
    let mut seen: HashSet<DedupKey> = HashSet::new();

    for root in roots(document) {
        let mut stack: Vec<(&SchemaProxy, usize)> = vec![(root, 0)];
        while let Some((proxy, depth)) = stack.pop() {
            if depth > MAX_WALK_DEPTH {
                continue;
            }
            let Some(schema) = document.resolve_schema(proxy) else {
                continue;
            };
            if !visited.insert(schema.id) {
                continue;
            }
            if seen.insert(DedupKey::of(document, schema)) {
                order.push(schema.id);
            }
            // reversed so the first child is walked first
            for child in children(schema).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    order
}
