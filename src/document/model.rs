//! Typed OpenAPI model built on top of the node tree.
//!
//! Every object lives in an arena owned by [`super::Document`] and is addressed by a
//! small copyable id. `$ref` values are never inlined: a [`SchemaProxy`] records
//! either an inline schema id or the reference text, and resolution goes through the
//! document's pointer index. Two references to the same component therefore resolve
//! to the same [`SchemaId`].

use std::collections::BTreeMap;

use super::location::Location;
use super::node::{Mark, Node};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Index into the document's schema arena
    SchemaId
);
arena_id!(ParameterId);
arena_id!(HeaderId);
arena_id!(MediaTypeId);
arena_id!(ExampleId);
arena_id!(RequestBodyId);
arena_id!(ResponseId);

/// OpenAPI family of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    Swagger2,
    OpenApi30,
    OpenApi31,
}

impl SpecVersion {
    pub fn from_version_string(version: &str) -> Self {
        if version.starts_with("2.") {
            SpecVersion::Swagger2
        } else if version.starts_with("3.0") {
            SpecVersion::OpenApi30
        } else {
            SpecVersion::OpenApi31
        }
    }
}

/// Source coordinates shared by every model object
#[derive(Debug, Clone, Default)]
pub struct Origin {
    pub location: Location,
    /// Key node under which the object is stored (equal to `mark` for sequence items)
    pub key_mark: Mark,
    /// Start of the value node
    pub mark: Mark,
    /// End of the value node
    pub end: Mark,
}

/// A slot that holds a schema, either inline or through `$ref`
#[derive(Debug, Clone)]
pub struct SchemaProxy {
    pub inline: Option<SchemaId>,
    pub reference: Option<String>,
    pub origin: Origin,
}

impl SchemaProxy {
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

/// `items` may be a schema or a boolean in 3.1
#[derive(Debug, Clone)]
pub enum Items {
    Schema(SchemaProxy),
    Bool(bool),
}

/// `exclusiveMinimum`/`exclusiveMaximum`: boolean in 3.0, numeric in 3.1
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExclusiveBound {
    Flag(bool),
    Value(f64),
}

/// Which object owns a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaParent {
    /// A named entry in `components.schemas` or `definitions`
    Component(String),
    Schema(SchemaId),
    Parameter(ParameterId),
    Header(HeaderId),
    MediaType(MediaTypeId),
    /// Swagger 2.0 response `schema`
    Response(ResponseId),
}

/// The central composite entity
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: SchemaId,
    pub origin: Origin,
    pub parent: SchemaParent,
    /// Component or property name, when the schema has one
    pub name: Option<String>,
    pub schema_type: Vec<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: Vec<(String, SchemaProxy)>,
    pub items: Option<Items>,
    pub additional_properties: Option<Items>,
    pub not: Option<SchemaProxy>,
    pub required: Vec<String>,
    pub dependent_required: Vec<(String, Vec<String>)>,
    pub enumeration: Option<Vec<Node>>,
    pub const_value: Option<Node>,
    pub default: Option<Node>,
    pub example: Option<Node>,
    pub examples: Option<Vec<Node>>,
    pub all_of: Vec<SchemaProxy>,
    pub any_of: Vec<SchemaProxy>,
    pub one_of: Vec<SchemaProxy>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<ExclusiveBound>,
    pub exclusive_maximum: Option<ExclusiveBound>,
    pub multiple_of: Option<f64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub pattern: Option<String>,
    pub min_items: Option<i64>,
    pub max_items: Option<i64>,
    pub min_contains: Option<i64>,
    pub max_contains: Option<i64>,
    pub min_properties: Option<i64>,
    pub max_properties: Option<i64>,
    pub nullable: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub deprecated: Option<bool>,
    pub extensions: Vec<(String, Node)>,
    /// Key node positions for every keyword present on the schema
    pub keyword_marks: BTreeMap<String, Mark>,
    /// The raw mapping this schema was built from
    pub node: Node,
}

impl Schema {
    pub fn has_type(&self, name: &str) -> bool {
        self.schema_type.iter().any(|t| t == name)
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keyword_marks.contains_key(keyword)
    }

    /// Position of a keyword's key node, falling back to the schema itself.
    pub fn keyword_mark(&self, keyword: &str) -> Mark {
        self.keyword_marks
            .get(keyword)
            .copied()
            .unwrap_or(self.origin.key_mark)
    }

    pub fn has_example(&self) -> bool {
        self.example.is_some() || self.examples.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_extension(&self, key: &str) -> bool {
        self.extensions.iter().any(|(k, _)| k == key)
    }

    /// All polymorphic branches in declaration order (`allOf`, `anyOf`, `oneOf`).
    pub fn branches(&self) -> impl Iterator<Item = &SchemaProxy> {
        self.all_of
            .iter()
            .chain(self.any_of.iter())
            .chain(self.one_of.iter())
    }

    pub fn property(&self, name: &str) -> Option<&SchemaProxy> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: ParameterId,
    pub origin: Origin,
    pub name: String,
    /// Value of `in`; absent on malformed parameters
    pub location_in: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub schema: Option<SchemaProxy>,
    pub example: Option<Node>,
    pub examples: Vec<(String, ExampleId)>,
    pub content: Vec<(String, MediaTypeId)>,
}

#[derive(Debug, Clone)]
pub struct Header {
    pub id: HeaderId,
    pub origin: Origin,
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<SchemaProxy>,
    pub example: Option<Node>,
    pub examples: Vec<(String, ExampleId)>,
    pub content: Vec<(String, MediaTypeId)>,
}

/// What a media type entry hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTypeParent {
    RequestBody(RequestBodyId),
    Response(ResponseId),
    Parameter(ParameterId),
    Header(HeaderId),
}

#[derive(Debug, Clone)]
pub struct MediaType {
    pub id: MediaTypeId,
    pub origin: Origin,
    /// The media type string, e.g. `application/json`
    pub name: String,
    pub parent: MediaTypeParent,
    pub schema: Option<SchemaProxy>,
    pub example: Option<Node>,
    pub examples: Vec<(String, ExampleId)>,
}

#[derive(Debug, Clone)]
pub struct Example {
    pub id: ExampleId,
    pub origin: Origin,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub value: Option<Node>,
    pub external_value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestBody {
    pub id: RequestBodyId,
    pub origin: Origin,
    pub description: Option<String>,
    pub required: bool,
    pub content: Vec<(String, MediaTypeId)>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub id: ResponseId,
    pub origin: Origin,
    pub description: Option<String>,
    pub headers: Vec<(String, HeaderId)>,
    pub content: Vec<(String, MediaTypeId)>,
    /// Swagger 2.0 keeps the schema on the response itself
    pub schema: Option<SchemaProxy>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub method: String,
    pub origin: Origin,
    pub operation_id: Option<String>,
    pub parameters: Vec<ParameterId>,
    pub request_body: Option<RequestBodyId>,
    pub responses: Vec<(String, ResponseId)>,
}

#[derive(Debug, Clone)]
pub struct PathItem {
    /// URL template, e.g. `/pets/{id}`
    pub path: String,
    pub origin: Origin,
    pub parameters: Vec<ParameterId>,
    pub operations: Vec<Operation>,
}

/// The component maps, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Schemas,
    Parameters,
    RequestBodies,
    Responses,
    Examples,
    Headers,
    Links,
    SecuritySchemes,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Schemas,
        ComponentKind::Parameters,
        ComponentKind::RequestBodies,
        ComponentKind::Responses,
        ComponentKind::Examples,
        ComponentKind::Headers,
        ComponentKind::Links,
        ComponentKind::SecuritySchemes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Schemas => "schemas",
            ComponentKind::Parameters => "parameters",
            ComponentKind::RequestBodies => "requestBodies",
            ComponentKind::Responses => "responses",
            ComponentKind::Examples => "examples",
            ComponentKind::Headers => "headers",
            ComponentKind::Links => "links",
            ComponentKind::SecuritySchemes => "securitySchemes",
        }
    }
}

/// What a component entry resolved to
#[derive(Debug, Clone)]
pub enum ComponentTarget {
    Schema(SchemaProxy),
    Parameter(ParameterId),
    RequestBody(RequestBodyId),
    Response(ResponseId),
    Example(ExampleId),
    Header(HeaderId),
    /// Links and security schemes are only checked for descriptions
    Opaque,
    /// A `$ref` that could not be followed
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    pub origin: Origin,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub target: ComponentTarget,
}

#[derive(Debug, Clone, Default)]
pub struct Components {
    pub entries: Vec<Component>,
}

impl Components {
    pub fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.entries.iter().filter(move |c| c.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifies the model node a finding is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    Document,
    Schema(SchemaId),
    Parameter(ParameterId),
    Header(HeaderId),
    MediaType(MediaTypeId),
    Example(ExampleId),
    /// Index into the document's path items
    PathItem(usize),
    /// Index into the component entries
    Component(usize),
}
