//! # Document Module
//!
//! Loads an OpenAPI 2.0 / 3.0 / 3.1 document into an immutable, position-aware model.
//!
//! ## Pipeline
//!
//! 1. [`node::Node::parse`] turns YAML or JSON text into a node tree with line/column marks
//! 2. [`load`] builds typed arenas (schemas, parameters, headers, media types, examples,
//!    request bodies, responses) plus path items and components
//! 3. Every `$ref` is recorded in the [`ReferenceIndex`] with its resolved target
//!
//! Once built, a [`Document`] is never mutated. Rules share it behind an `Arc` and read
//! it without locking.

mod index;
mod load;
mod location;
mod model;
mod node;

pub use index::{PointerIndex, Reference, ReferenceIndex, MAX_REFERENCE_HOPS};
pub use location::{Location, Segment};
pub use model::*;
pub use node::{Mark, Node, Value, MAX_CONVERSION_DEPTH};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Errors raised while reading a document into the model
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("document is empty")]
    Empty,

    #[error("document root must be a mapping")]
    NotAMapping,

    #[error("document declares neither `openapi` nor `swagger` version")]
    MissingVersion,

    #[error("alias expansion limit reached at line {line}, column {column}")]
    AliasLimit { line: usize, column: usize },
}

/// A fully built OpenAPI document
#[derive(Debug, Clone)]
pub struct Document {
    /// Version string as declared, e.g. `3.0.3` or `2.0`
    pub version: String,
    pub spec_version: SpecVersion,
    /// Absolute path of the source file, when loaded from disk
    pub source: Option<PathBuf>,
    /// The raw node tree
    pub root: Node,
    /// Names from the global `tags` list
    pub tags: Vec<String>,
    pub paths: Vec<PathItem>,
    pub components: Components,
    schemas: Vec<Schema>,
    parameters: Vec<Parameter>,
    headers: Vec<Header>,
    media_types: Vec<MediaType>,
    examples: Vec<Example>,
    request_bodies: Vec<RequestBody>,
    responses: Vec<Response>,
    pointers: PointerIndex,
    index: ReferenceIndex,
}

impl Document {
    /// Parse a document from YAML or JSON text.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let root = Node::parse(source)?;
        load::build(root, None)
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let root = Node::parse(&text)?;
        let document = load::build(root, Some(absolute))?;
        info!(
            path = %path.display(),
            version = %document.version,
            paths = document.paths.len(),
            "Loaded OpenAPI document"
        );
        Ok(document)
    }

    /// Identity of the source used in deduplication keys.
    pub fn identity(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    pub fn is_version_30(&self) -> bool {
        self.version.starts_with("3.0")
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
        self.schemas.get(id.0)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, id: ParameterId) -> Option<&Parameter> {
        self.parameters.get(id.0)
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header(&self, id: HeaderId) -> Option<&Header> {
        self.headers.get(id.0)
    }

    pub fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    pub fn media_type(&self, id: MediaTypeId) -> Option<&MediaType> {
        self.media_types.get(id.0)
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn example(&self, id: ExampleId) -> Option<&Example> {
        self.examples.get(id.0)
    }

    pub fn request_body(&self, id: RequestBodyId) -> Option<&RequestBody> {
        self.request_bodies.get(id.0)
    }

    pub fn response(&self, id: ResponseId) -> Option<&Response> {
        self.responses.get(id.0)
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn reference_index(&self) -> &ReferenceIndex {
        &self.index
    }

    /// Resolve a local reference to the model node it names.
    pub fn resolve_reference(&self, reference: &str) -> Option<NodeRef> {
        self.pointers.resolve(reference)
    }

    /// The model node built exactly at `location`, if any.
    pub fn object_at(&self, location: &Location) -> Option<NodeRef> {
        self.pointers.object_at(&location.pointer())
    }

    /// Follow a schema slot to the schema it holds.
    pub fn resolve_schema(&self, proxy: &SchemaProxy) -> Option<&Schema> {
        match (&proxy.inline, &proxy.reference) {
            (Some(id), _) => self.schema(*id),
            (None, Some(reference)) => match self.resolve_reference(reference)? {
                NodeRef::Schema(id) => self.schema(id),
                _ => None,
            },
            (None, None) => None,
        }
    }

    /// Resolve an optional `items`/`additionalProperties` slot.
    pub fn resolve_items(&self, items: Option<&Items>) -> Option<&Schema> {
        match items? {
            Items::Schema(proxy) => self.resolve_schema(proxy),
            Items::Bool(_) => None,
        }
    }

    /// Parent schema of `schema`, when it is nested inside another schema.
    pub fn parent_schema(&self, schema: &Schema) -> Option<&Schema> {
        match schema.parent {
            SchemaParent::Schema(id) => self.schema(id),
            _ => None,
        }
    }

    /// Source coordinates of any addressable model node.
    pub fn origin_of(&self, node: NodeRef) -> Option<&Origin> {
        match node {
            NodeRef::Document => None,
            NodeRef::Schema(id) => self.schema(id).map(|s| &s.origin),
            NodeRef::Parameter(id) => self.parameter(id).map(|p| &p.origin),
            NodeRef::Header(id) => self.header(id).map(|h| &h.origin),
            NodeRef::MediaType(id) => self.media_type(id).map(|m| &m.origin),
            NodeRef::Example(id) => self.example(id).map(|e| &e.origin),
            NodeRef::PathItem(i) => self.paths.get(i).map(|p| &p.origin),
            NodeRef::Component(i) => self.components.entries.get(i).map(|c| &c.origin),
        }
    }

    /// Operations in document order with the path item that owns them.
    pub fn operations(&self) -> impl Iterator<Item = (&PathItem, &Operation)> {
        self.paths
            .iter()
            .flat_map(|item| item.operations.iter().map(move |op| (item, op)))
    }
}

#[cfg(test)]
mod tests;
