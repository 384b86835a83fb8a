//! Reference index: every `$ref` in the document, where it sits, and what it points at.

use std::collections::HashMap;

use super::model::{NodeRef, Origin};

/// Ceiling on `$ref` -> `$ref` hops when resolving a pointer.
pub const MAX_REFERENCE_HOPS: usize = 10;

/// One `$ref` occurrence
#[derive(Debug, Clone)]
pub struct Reference {
    /// The `$ref` text as written
    pub definition: String,
    /// The slot that holds the `$ref`
    pub origin: Origin,
    /// Resolved target, `None` for external or dangling references
    pub target: Option<NodeRef>,
}

/// Maps JSON pointers of built objects (and of `$ref` slots) to their targets.
#[derive(Debug, Clone, Default)]
pub struct PointerIndex {
    objects: HashMap<String, NodeRef>,
    aliases: HashMap<String, String>,
}

impl PointerIndex {
    pub fn register(&mut self, pointer: String, node: NodeRef) {
        self.objects.entry(pointer).or_insert(node);
    }

    pub fn register_alias(&mut self, pointer: String, reference: String) {
        self.aliases.insert(pointer, reference);
    }

    /// The object built exactly at `pointer`, without following `$ref`s.
    pub fn object_at(&self, pointer: &str) -> Option<NodeRef> {
        self.objects.get(pointer).copied()
    }

    /// Resolve a local reference, following `$ref` chains.
    pub fn resolve(&self, reference: &str) -> Option<NodeRef> {
        let mut current = reference;
        for _ in 0..MAX_REFERENCE_HOPS {
            if !current.starts_with('#') {
                return None;
            }
            if let Some(node) = self.objects.get(current) {
                return Some(*node);
            }
            current = self.aliases.get(current)?;
        }
        None
    }
}

/// All references in a document with a reverse map from target to referrers
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    references: Vec<Reference>,
    referrers: HashMap<NodeRef, Vec<usize>>,
}

impl ReferenceIndex {
    pub(crate) fn push(&mut self, reference: Reference) {
        if let Some(target) = reference.target {
            self.referrers
                .entry(target)
                .or_default()
                .push(self.references.len());
        }
        self.references.push(reference);
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// References that point at `target`, in document order.
    pub fn referrers(&self, target: NodeRef) -> impl Iterator<Item = &Reference> {
        self.referrers
            .get(&target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter_map(|i| self.references.get(*i))
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.target.is_none())
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
