//! Builds the typed model from a node tree.
//!
//! Components are built before `paths` so that operation-level `$ref`s to
//! parameters, request bodies, responses, headers and examples resolve as they are
//! met. Schema references stay lazy and are resolved on demand through the pointer
//! index. Every `$ref` is recorded and resolved once more at the end to build the
//! reference index.

use std::path::PathBuf;

use tracing::debug;

use super::index::{PointerIndex, Reference, ReferenceIndex};
use super::location::Location;
use super::model::*;
use super::node::{Node, Value};
use super::{Document, LoadError};

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

pub(super) fn build(root: Node, source: Option<PathBuf>) -> Result<Document, LoadError> {
    if !root.is_mapping() {
        return Err(LoadError::NotAMapping);
    }
    let version = root
        .get("openapi")
        .or_else(|| root.get("swagger"))
        .map(version_text)
        .ok_or(LoadError::MissingVersion)?;
    let spec_version = SpecVersion::from_version_string(&version);

    let mut builder = Builder::new(spec_version);
    let top = Location::root();

    match spec_version {
        SpecVersion::Swagger2 => builder.swagger_components(&root, &top),
        _ => {
            if let Some(components) = root.get("components") {
                builder.components(components, &top.field("components"));
            }
        }
    }

    let tags = root
        .get("tags")
        .and_then(Node::as_sequence)
        .unwrap_or(&[])
        .iter()
        .filter_map(|t| t.get("name").and_then(Node::as_str).map(String::from))
        .collect();

    let mut paths = Vec::new();
    if let Some(path_map) = root.get("paths") {
        let paths_loc = top.field("paths");
        for (template, key, item) in path_map.entries() {
            if template.starts_with("x-") {
                continue;
            }
            let origin = origin_of(paths_loc.key(&template), key, item);
            paths.push(builder.path_item(template, item, origin));
        }
    }

    let Builder {
        schemas,
        parameters,
        headers,
        media_types,
        examples,
        request_bodies,
        responses,
        mut components,
        pointers,
        pending,
        ..
    } = builder;

    let mut index = ReferenceIndex::default();
    for (definition, origin) in pending {
        let target = pointers.resolve(&definition);
        if target.is_none() {
            debug!(reference = %definition, path = %origin.location, "Unresolved reference");
        }
        index.push(Reference {
            definition,
            origin,
            target,
        });
    }

    for component in components.entries.iter_mut() {
        let Some(reference) = &component.reference else {
            continue;
        };
        if matches!(component.target, ComponentTarget::Schema(_)) {
            continue;
        }
        component.target = match pointers.resolve(reference) {
            Some(NodeRef::Parameter(id)) => ComponentTarget::Parameter(id),
            Some(NodeRef::Header(id)) => ComponentTarget::Header(id),
            Some(NodeRef::Example(id)) => ComponentTarget::Example(id),
            Some(NodeRef::Component(_)) => ComponentTarget::Opaque,
            _ => ComponentTarget::Unresolved,
        };
    }

    debug!(
        version = %version,
        schemas = schemas.len(),
        parameters = parameters.len(),
        media_types = media_types.len(),
        paths = paths.len(),
        references = index.len(),
        "Document model built"
    );

    Ok(Document {
        version,
        spec_version,
        source,
        root,
        tags,
        paths,
        components,
        schemas,
        parameters,
        headers,
        media_types,
        examples,
        request_bodies,
        responses,
        pointers,
        index,
    })
}

fn version_text(node: &Node) -> String {
    match &node.value {
        Value::Float(f) => format!("{f:?}"),
        _ => node.key_text(),
    }
}

fn origin_of(location: Location, key: &Node, value: &Node) -> Origin {
    Origin {
        location,
        key_mark: key.mark,
        mark: value.mark,
        end: value.end,
    }
}

fn item_origin(location: Location, value: &Node) -> Origin {
    origin_of(location, value, value)
}

fn reference_of(node: &Node) -> Option<String> {
    node.get("$ref").and_then(Node::as_str).map(String::from)
}

fn string_of(node: &Node, key: &str) -> Option<String> {
    node.get(key).and_then(Node::as_str).map(String::from)
}

fn bool_of(node: &Node, key: &str) -> Option<bool> {
    node.get(key).and_then(Node::as_bool)
}

fn int_of(node: &Node, key: &str) -> Option<i64> {
    let value = node.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
}

fn strings_of(node: &Node) -> Vec<String> {
    match &node.value {
        Value::Sequence(items) => items.iter().map(Node::key_text).collect(),
        Value::Null => Vec::new(),
        _ => vec![node.key_text()],
    }
}

struct Builder {
    version: SpecVersion,
    schemas: Vec<Schema>,
    parameters: Vec<Parameter>,
    headers: Vec<Header>,
    media_types: Vec<MediaType>,
    examples: Vec<Example>,
    request_bodies: Vec<RequestBody>,
    responses: Vec<Response>,
    components: Components,
    pointers: PointerIndex,
    pending: Vec<(String, Origin)>,
}

impl Builder {
    fn new(version: SpecVersion) -> Self {
        Self {
            version,
            schemas: Vec::new(),
            parameters: Vec::new(),
            headers: Vec::new(),
            media_types: Vec::new(),
            examples: Vec::new(),
            request_bodies: Vec::new(),
            responses: Vec::new(),
            components: Components::default(),
            pointers: PointerIndex::default(),
            pending: Vec::new(),
        }
    }

    /// Record a `$ref` slot and try to resolve it against what is built so far.
    fn reference(&mut self, reference: &str, origin: &Origin) -> Option<NodeRef> {
        self.pointers
            .register_alias(origin.location.pointer(), reference.to_string());
        self.pending.push((reference.to_string(), origin.clone()));
        self.pointers.resolve(reference)
    }

    fn components(&mut self, node: &Node, base: &Location) {
        for kind in ComponentKind::ALL {
            let Some(map) = node.get(kind.as_str()) else {
                continue;
            };
            let kind_loc = base.field(kind.as_str());
            for (name, key, value) in map.entries() {
                let origin = origin_of(kind_loc.key(&name), key, value);
                self.component(kind, name, value, origin);
            }
        }
    }

    fn swagger_components(&mut self, root: &Node, top: &Location) {
        let sections = [
            ("definitions", ComponentKind::Schemas),
            ("parameters", ComponentKind::Parameters),
            ("responses", ComponentKind::Responses),
            ("securityDefinitions", ComponentKind::SecuritySchemes),
        ];
        for (field, kind) in sections {
            let Some(map) = root.get(field) else {
                continue;
            };
            let section_loc = top.field(field);
            for (name, key, value) in map.entries() {
                let origin = origin_of(section_loc.key(&name), key, value);
                self.component(kind, name, value, origin);
            }
        }
    }

    fn component(&mut self, kind: ComponentKind, name: String, value: &Node, origin: Origin) {
        let reference = reference_of(value);
        let description = string_of(value, "description");
        let index = self.components.entries.len();
        let target = match kind {
            ComponentKind::Schemas => ComponentTarget::Schema(self.schema_proxy(
                value,
                origin.clone(),
                SchemaParent::Component(name.clone()),
                Some(name.clone()),
            )),
            _ if reference.is_some() => {
                // resolved once every component is registered
                if let Some(reference) = &reference {
                    self.reference(reference, &origin);
                }
                ComponentTarget::Unresolved
            }
            ComponentKind::Parameters => {
                ComponentTarget::Parameter(self.parameter(value, origin.clone()))
            }
            ComponentKind::RequestBodies => {
                ComponentTarget::RequestBody(self.request_body(value, origin.clone()))
            }
            ComponentKind::Responses => {
                ComponentTarget::Response(self.response(value, origin.clone()))
            }
            ComponentKind::Examples => {
                ComponentTarget::Example(self.example(name.clone(), value, origin.clone()))
            }
            ComponentKind::Headers => {
                ComponentTarget::Header(self.header(name.clone(), value, origin.clone()))
            }
            ComponentKind::Links | ComponentKind::SecuritySchemes => {
                self.pointers
                    .register(origin.location.pointer(), NodeRef::Component(index));
                ComponentTarget::Opaque
            }
        };
        self.components.entries.push(Component {
            kind,
            name,
            origin,
            description,
            reference,
            target,
        });
    }

    fn schema_proxy(
        &mut self,
        node: &Node,
        origin: Origin,
        parent: SchemaParent,
        name: Option<String>,
    ) -> SchemaProxy {
        if let Some(reference) = reference_of(node) {
            self.reference(&reference, &origin);
            return SchemaProxy {
                inline: None,
                reference: Some(reference),
                origin,
            };
        }
        let id = self.schema(node, origin.clone(), parent, name, true);
        SchemaProxy {
            inline: Some(id),
            reference: None,
            origin,
        }
    }

    fn schema(
        &mut self,
        node: &Node,
        origin: Origin,
        parent: SchemaParent,
        name: Option<String>,
        register: bool,
    ) -> SchemaId {
        let id = SchemaId(self.schemas.len());
        if register {
            self.pointers
                .register(origin.location.pointer(), NodeRef::Schema(id));
        }
        let loc = origin.location.clone();
        let mut schema = Schema {
            id,
            origin,
            parent,
            name,
            schema_type: node.get("type").map(strings_of).unwrap_or_default(),
            format: string_of(node, "format"),
            title: string_of(node, "title"),
            description: string_of(node, "description"),
            properties: Vec::new(),
            items: None,
            additional_properties: None,
            not: None,
            required: node
                .get("required")
                .and_then(Node::as_sequence)
                .map(|names| names.iter().map(Node::key_text).collect())
                .unwrap_or_default(),
            dependent_required: Vec::new(),
            enumeration: node
                .get("enum")
                .and_then(Node::as_sequence)
                .map(<[Node]>::to_vec),
            const_value: node.get("const").cloned(),
            default: node.get("default").cloned(),
            example: node.get("example").cloned(),
            examples: node
                .get("examples")
                .and_then(Node::as_sequence)
                .map(<[Node]>::to_vec),
            all_of: Vec::new(),
            any_of: Vec::new(),
            one_of: Vec::new(),
            minimum: node.get("minimum").and_then(Node::as_f64),
            maximum: node.get("maximum").and_then(Node::as_f64),
            exclusive_minimum: node.get("exclusiveMinimum").and_then(exclusive_bound),
            exclusive_maximum: node.get("exclusiveMaximum").and_then(exclusive_bound),
            multiple_of: node.get("multipleOf").and_then(Node::as_f64),
            min_length: int_of(node, "minLength"),
            max_length: int_of(node, "maxLength"),
            pattern: string_of(node, "pattern"),
            min_items: int_of(node, "minItems"),
            max_items: int_of(node, "maxItems"),
            min_contains: int_of(node, "minContains"),
            max_contains: int_of(node, "maxContains"),
            min_properties: int_of(node, "minProperties"),
            max_properties: int_of(node, "maxProperties"),
            nullable: bool_of(node, "nullable"),
            read_only: bool_of(node, "readOnly"),
            write_only: bool_of(node, "writeOnly"),
            deprecated: bool_of(node, "deprecated"),
            extensions: Vec::new(),
            keyword_marks: Default::default(),
            node: node.clone(),
        };
        for (key, key_node, value) in node.entries() {
            schema.keyword_marks.insert(key.clone(), key_node.mark);
            if key.starts_with("x-") || key.starts_with("X-") {
                schema.extensions.push((key, value.clone()));
            }
        }
        if let Some(deps) = node.get("dependentRequired") {
            schema.dependent_required = deps
                .entries()
                .map(|(key, _, names)| (key, strings_of(names)))
                .collect();
        }
        // placeholder first so children can name their parent
        self.schemas.push(schema);

        let child_parent = SchemaParent::Schema(id);
        let mut properties = Vec::new();
        if let Some(props) = node.get("properties") {
            let props_loc = loc.field("properties");
            for (prop, key, value) in props.entries() {
                let origin = origin_of(props_loc.key(&prop), key, value);
                let proxy =
                    self.schema_proxy(value, origin, child_parent.clone(), Some(prop.clone()));
                properties.push((prop, proxy));
            }
        }
        let items = self.items(node, "items", &loc, &child_parent);
        let additional = self.items(node, "additionalProperties", &loc, &child_parent);
        let not = node.entry("not").map(|(key, value)| {
            self.schema_proxy(
                value,
                origin_of(loc.field("not"), key, value),
                child_parent.clone(),
                None,
            )
        });
        let all_of = self.combinator(node, "allOf", &loc, &child_parent);
        let any_of = self.combinator(node, "anyOf", &loc, &child_parent);
        let one_of = self.combinator(node, "oneOf", &loc, &child_parent);

        if let Some(schema) = self.schemas.get_mut(id.0) {
            schema.properties = properties;
            schema.items = items;
            schema.additional_properties = additional;
            schema.not = not;
            schema.all_of = all_of;
            schema.any_of = any_of;
            schema.one_of = one_of;
        }
        id
    }

    fn items(
        &mut self,
        node: &Node,
        keyword: &str,
        loc: &Location,
        parent: &SchemaParent,
    ) -> Option<Items> {
        let (key, value) = node.entry(keyword)?;
        match &value.value {
            Value::Bool(b) => Some(Items::Bool(*b)),
            Value::Mapping(_) => Some(Items::Schema(self.schema_proxy(
                value,
                origin_of(loc.field(keyword), key, value),
                parent.clone(),
                None,
            ))),
            _ => None,
        }
    }

    fn combinator(
        &mut self,
        node: &Node,
        keyword: &str,
        loc: &Location,
        parent: &SchemaParent,
    ) -> Vec<SchemaProxy> {
        let Some(entries) = node.get(keyword).and_then(Node::as_sequence) else {
            return Vec::new();
        };
        let base = loc.field(keyword);
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_mapping())
            .map(|(i, entry)| {
                self.schema_proxy(entry, item_origin(base.index(i), entry), parent.clone(), None)
            })
            .collect()
    }

    fn parameter_slot(&mut self, node: &Node, origin: Origin) -> Option<ParameterId> {
        match reference_of(node) {
            Some(reference) => match self.reference(&reference, &origin) {
                Some(NodeRef::Parameter(id)) => Some(id),
                _ => None,
            },
            None => Some(self.parameter(node, origin)),
        }
    }

    fn parameter(&mut self, node: &Node, origin: Origin) -> ParameterId {
        let id = ParameterId(self.parameters.len());
        self.pointers
            .register(origin.location.pointer(), NodeRef::Parameter(id));
        let loc = origin.location.clone();
        let name = string_of(node, "name").unwrap_or_default();
        let location_in = string_of(node, "in");
        self.parameters.push(Parameter {
            id,
            origin: origin.clone(),
            name: name.clone(),
            location_in: location_in.clone(),
            description: string_of(node, "description"),
            required: bool_of(node, "required").unwrap_or(false),
            schema: None,
            example: node.get("example").cloned(),
            examples: Vec::new(),
            content: Vec::new(),
        });

        let schema = match node.entry("schema") {
            Some((key, value)) => Some(self.schema_proxy(
                value,
                origin_of(loc.field("schema"), key, value),
                SchemaParent::Parameter(id),
                Some(name.clone()),
            )),
            // Swagger 2.0 keeps the type of non-body parameters on the parameter itself
            None if self.version == SpecVersion::Swagger2
                && location_in.as_deref() != Some("body")
                && node.contains_key("type") =>
            {
                let schema_id =
                    self.schema(node, origin, SchemaParent::Parameter(id), Some(name), false);
                Some(SchemaProxy {
                    inline: Some(schema_id),
                    reference: None,
                    origin: self.schemas[schema_id.0].origin.clone(),
                })
            }
            None => None,
        };
        let examples = self.examples_map(node, &loc);
        let content = self.content(node, &loc, MediaTypeParent::Parameter(id));
        if let Some(parameter) = self.parameters.get_mut(id.0) {
            parameter.schema = schema;
            parameter.examples = examples;
            parameter.content = content;
        }
        id
    }

    fn header_slot(&mut self, name: String, node: &Node, origin: Origin) -> Option<HeaderId> {
        match reference_of(node) {
            Some(reference) => match self.reference(&reference, &origin) {
                Some(NodeRef::Header(id)) => Some(id),
                _ => None,
            },
            None => Some(self.header(name, node, origin)),
        }
    }

    fn header(&mut self, name: String, node: &Node, origin: Origin) -> HeaderId {
        let id = HeaderId(self.headers.len());
        self.pointers
            .register(origin.location.pointer(), NodeRef::Header(id));
        let loc = origin.location.clone();
        self.headers.push(Header {
            id,
            origin: origin.clone(),
            name: name.clone(),
            description: string_of(node, "description"),
            schema: None,
            example: node.get("example").cloned(),
            examples: Vec::new(),
            content: Vec::new(),
        });
        let schema = match node.entry("schema") {
            Some((key, value)) => Some(self.schema_proxy(
                value,
                origin_of(loc.field("schema"), key, value),
                SchemaParent::Header(id),
                Some(name),
            )),
            None if self.version == SpecVersion::Swagger2 && node.contains_key("type") => {
                let schema_id =
                    self.schema(node, origin, SchemaParent::Header(id), Some(name), false);
                Some(SchemaProxy {
                    inline: Some(schema_id),
                    reference: None,
                    origin: self.schemas[schema_id.0].origin.clone(),
                })
            }
            None => None,
        };
        let examples = self.examples_map(node, &loc);
        let content = self.content(node, &loc, MediaTypeParent::Header(id));
        if let Some(header) = self.headers.get_mut(id.0) {
            header.schema = schema;
            header.examples = examples;
            header.content = content;
        }
        id
    }

    fn content(
        &mut self,
        node: &Node,
        loc: &Location,
        parent: MediaTypeParent,
    ) -> Vec<(String, MediaTypeId)> {
        let Some(content) = node.get("content") else {
            return Vec::new();
        };
        let content_loc = loc.field("content");
        content
            .entries()
            .map(|(name, key, value)| {
                let origin = origin_of(content_loc.key(&name), key, value);
                let id = self.media_type(name.clone(), value, origin, parent);
                (name, id)
            })
            .collect()
    }

    fn media_type(
        &mut self,
        name: String,
        node: &Node,
        origin: Origin,
        parent: MediaTypeParent,
    ) -> MediaTypeId {
        let id = MediaTypeId(self.media_types.len());
        self.pointers
            .register(origin.location.pointer(), NodeRef::MediaType(id));
        let loc = origin.location.clone();
        self.media_types.push(MediaType {
            id,
            origin,
            name,
            parent,
            schema: None,
            example: node.get("example").cloned(),
            examples: Vec::new(),
        });
        let schema = node.entry("schema").map(|(key, value)| {
            self.schema_proxy(
                value,
                origin_of(loc.field("schema"), key, value),
                SchemaParent::MediaType(id),
                None,
            )
        });
        let examples = self.examples_map(node, &loc);
        if let Some(media_type) = self.media_types.get_mut(id.0) {
            media_type.schema = schema;
            media_type.examples = examples;
        }
        id
    }

    fn examples_map(&mut self, node: &Node, loc: &Location) -> Vec<(String, ExampleId)> {
        let Some(examples) = node.get("examples").filter(|e| e.is_mapping()) else {
            return Vec::new();
        };
        let examples_loc = loc.field("examples");
        let mut out = Vec::new();
        for (name, key, value) in examples.entries() {
            let origin = origin_of(examples_loc.key(&name), key, value);
            let id = match reference_of(value) {
                Some(reference) => match self.reference(&reference, &origin) {
                    Some(NodeRef::Example(id)) => Some(id),
                    _ => None,
                },
                None => Some(self.example(name.clone(), value, origin)),
            };
            if let Some(id) = id {
                out.push((name, id));
            }
        }
        out
    }

    fn example(&mut self, name: String, node: &Node, origin: Origin) -> ExampleId {
        let id = ExampleId(self.examples.len());
        self.pointers
            .register(origin.location.pointer(), NodeRef::Example(id));
        self.examples.push(Example {
            id,
            origin,
            name,
            summary: string_of(node, "summary"),
            description: string_of(node, "description"),
            value: node.get("value").cloned(),
            external_value: string_of(node, "externalValue"),
        });
        id
    }

    fn request_body_slot(&mut self, node: &Node, origin: Origin) -> Option<RequestBodyId> {
        match reference_of(node) {
            Some(reference) => {
                self.reference(&reference, &origin);
                self.components
                    .entries
                    .iter()
                    .find(|c| c.origin.location.pointer() == reference)
                    .and_then(|c| match c.target {
                        ComponentTarget::RequestBody(id) => Some(id),
                        _ => None,
                    })
            }
            None => Some(self.request_body(node, origin)),
        }
    }

    fn request_body(&mut self, node: &Node, origin: Origin) -> RequestBodyId {
        let id = RequestBodyId(self.request_bodies.len());
        let loc = origin.location.clone();
        self.request_bodies.push(RequestBody {
            id,
            origin,
            description: string_of(node, "description"),
            required: bool_of(node, "required").unwrap_or(false),
            content: Vec::new(),
        });
        let content = self.content(node, &loc, MediaTypeParent::RequestBody(id));
        if let Some(body) = self.request_bodies.get_mut(id.0) {
            body.content = content;
        }
        id
    }

    fn response_slot(&mut self, node: &Node, origin: Origin) -> Option<ResponseId> {
        match reference_of(node) {
            Some(reference) => {
                self.reference(&reference, &origin);
                self.components
                    .entries
                    .iter()
                    .find(|c| c.origin.location.pointer() == reference)
                    .and_then(|c| match c.target {
                        ComponentTarget::Response(id) => Some(id),
                        _ => None,
                    })
            }
            None => Some(self.response(node, origin)),
        }
    }

    fn response(&mut self, node: &Node, origin: Origin) -> ResponseId {
        let id = ResponseId(self.responses.len());
        let loc = origin.location.clone();
        self.responses.push(Response {
            id,
            origin,
            description: string_of(node, "description"),
            headers: Vec::new(),
            content: Vec::new(),
            schema: None,
        });
        let mut headers = Vec::new();
        if let Some(map) = node.get("headers") {
            let headers_loc = loc.field("headers");
            for (name, key, value) in map.entries() {
                let origin = origin_of(headers_loc.key(&name), key, value);
                if let Some(header) = self.header_slot(name.clone(), value, origin) {
                    headers.push((name, header));
                }
            }
        }
        let content = self.content(node, &loc, MediaTypeParent::Response(id));
        let schema = match self.version {
            SpecVersion::Swagger2 => node.entry("schema").map(|(key, value)| {
                self.schema_proxy(
                    value,
                    origin_of(loc.field("schema"), key, value),
                    SchemaParent::Response(id),
                    None,
                )
            }),
            _ => None,
        };
        if let Some(response) = self.responses.get_mut(id.0) {
            response.headers = headers;
            response.content = content;
            response.schema = schema;
        }
        id
    }

    fn parameters_list(&mut self, node: &Node, loc: &Location) -> Vec<ParameterId> {
        let Some(list) = node.get("parameters").and_then(Node::as_sequence) else {
            return Vec::new();
        };
        let base = loc.field("parameters");
        list.iter()
            .enumerate()
            .filter_map(|(i, param)| self.parameter_slot(param, item_origin(base.index(i), param)))
            .collect()
    }

    fn path_item(&mut self, path: String, node: &Node, origin: Origin) -> PathItem {
        let loc = origin.location.clone();
        let parameters = self.parameters_list(node, &loc);
        let mut operations = Vec::new();
        for (method, key, value) in node.entries() {
            if !METHODS.contains(&method.as_str()) {
                continue;
            }
            let op_origin = origin_of(loc.field(&method), key, value);
            operations.push(self.operation(method, value, op_origin));
        }
        PathItem {
            path,
            origin,
            parameters,
            operations,
        }
    }

    fn operation(&mut self, method: String, node: &Node, origin: Origin) -> Operation {
        let loc = origin.location.clone();
        let parameters = self.parameters_list(node, &loc);
        let request_body = node.entry("requestBody").and_then(|(key, value)| {
            self.request_body_slot(value, origin_of(loc.field("requestBody"), key, value))
        });
        let mut responses = Vec::new();
        if let Some(map) = node.get("responses") {
            let responses_loc = loc.field("responses");
            for (code, key, value) in map.entries() {
                let origin = origin_of(responses_loc.key(&code), key, value);
                if let Some(response) = self.response_slot(value, origin) {
                    responses.push((code, response));
                }
            }
        }
        Operation {
            method,
            origin,
            operation_id: string_of(node, "operationId"),
            parameters,
            request_body,
            responses,
        }
    }
}

fn exclusive_bound(node: &Node) -> Option<ExclusiveBound> {
    match &node.value {
        Value::Bool(b) => Some(ExclusiveBound::Flag(*b)),
        _ => node.as_f64().map(ExclusiveBound::Value),
    }
}
