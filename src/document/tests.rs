#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

const PETSTORE: &str = r#"openapi: 3.0.3
info:
  title: Pets
  version: "1.0"
tags:
  - name: pets
paths:
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema:
          type: integer
    get:
      parameters:
        - $ref: '#/components/parameters/Limit'
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  parameters:
    Limit:
      name: limit
      in: query
      schema:
        type: integer
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id:
          type: integer
        born: 2020-01-01
        tags:
          type: array
          items:
            type: string
"#;

#[test]
fn test_node_marks_are_one_based() {
    let node = Node::parse("a: 1\nb:\n  c: true\n").unwrap();
    let (key, value) = node.entry("b").unwrap();
    assert_eq!(key.mark, Mark::new(2, 1));
    let (inner_key, inner_value) = value.entry("c").unwrap();
    assert_eq!(inner_key.mark, Mark::new(3, 3));
    assert_eq!(inner_value.as_bool(), Some(true));
}

#[test]
fn test_scalar_resolution() {
    let node = Node::parse(
        "int: 42\nfloat: 1.5\nquoted: '42'\nnull_value: ~\ndate: 2024-01-01\nword: inf\n",
    )
    .unwrap();
    assert_eq!(node.get("int").unwrap().value, Value::Integer(42));
    assert_eq!(node.get("float").unwrap().value, Value::Float(1.5));
    assert_eq!(node.get("quoted").unwrap().as_str(), Some("42"));
    assert!(node.get("null_value").unwrap().is_null());
    assert_eq!(node.get("date").unwrap().as_str(), Some("2024-01-01"));
    assert_eq!(node.get("word").unwrap().as_str(), Some("inf"));
}

#[test]
fn test_to_json_coerces_keys() {
    let node = Node::parse("200: ok\ntrue: yes\n2024-01-01: day\n").unwrap();
    let json = node.to_json();
    assert_eq!(json["200"], "ok");
    assert_eq!(json["true"], "yes");
    assert_eq!(json["2024-01-01"], "day");
}

#[test]
fn test_anchors_expand() {
    let node = Node::parse("base: &b\n  type: string\ncopy: *b\n").unwrap();
    assert_eq!(
        node.get("copy").unwrap().get("type").unwrap().as_str(),
        Some("string")
    );
}

#[test]
fn test_alias_expansion_is_capped() {
    let mut yaml = String::from("l0: &l0 [lol, lol, lol, lol, lol, lol, lol, lol, lol, lol]\n");
    for level in 1..9 {
        let previous = format!("*l{}", level - 1);
        let items = vec![previous.as_str(); 10].join(", ");
        yaml.push_str(&format!("l{level}: &l{level} [{items}]\n", level = level, items = items));
    }
    let err = Node::parse(&yaml).unwrap_err();
    assert!(matches!(err, LoadError::AliasLimit { .. }), "got {err:?}");
}

#[test]
fn test_syntax_error_is_reported_with_position() {
    let err = Node::parse("a: [1, 2\nb: 3\n").unwrap_err();
    assert!(matches!(err, LoadError::Syntax { .. }), "got {err:?}");
}

#[test]
fn test_missing_version_is_rejected() {
    let err = Document::parse("info: {}\n").unwrap_err();
    assert!(matches!(err, LoadError::MissingVersion));
}

#[test]
fn test_document_model() {
    let doc = Document::parse(PETSTORE).unwrap();
    assert_eq!(doc.version, "3.0.3");
    assert_eq!(doc.spec_version, SpecVersion::OpenApi30);
    assert!(doc.is_version_30());
    assert_eq!(doc.tags, vec!["pets".to_string()]);
    assert_eq!(doc.paths.len(), 1);

    let item = &doc.paths[0];
    assert_eq!(item.path, "/pets/{petId}");
    assert_eq!(item.parameters.len(), 1);
    assert_eq!(item.operations.len(), 1);
    assert_eq!(item.operations[0].method, "get");

    let op_param = doc.parameter(item.operations[0].parameters[0]).unwrap();
    assert_eq!(op_param.name, "limit");
    assert_eq!(
        op_param.origin.location.path(),
        "$.components.parameters['Limit']"
    );
}

#[test]
fn test_schema_locations_and_refs() {
    let doc = Document::parse(PETSTORE).unwrap();
    let pet = doc
        .schemas()
        .iter()
        .find(|s| s.name.as_deref() == Some("Pet"))
        .unwrap();
    assert_eq!(pet.origin.location.path(), "$.components.schemas['Pet']");
    assert_eq!(pet.origin.location.pointer(), "#/components/schemas/Pet");
    assert_eq!(pet.required, vec!["id".to_string()]);
    assert_eq!(pet.properties.len(), 3);

    let tags = doc.resolve_schema(pet.property("tags").unwrap()).unwrap();
    assert!(tags.has_type("array"));
    let items = doc.resolve_items(tags.items.as_ref()).unwrap();
    assert_eq!(
        items.origin.location.path(),
        "$.components.schemas['Pet'].properties['tags'].items"
    );
    assert_eq!(doc.parent_schema(items).unwrap().id, tags.id);

    let media = &doc.media_types()[0];
    let resolved = doc.resolve_schema(media.schema.as_ref().unwrap()).unwrap();
    assert_eq!(resolved.id, pet.id);

    let referrers: Vec<_> = doc
        .reference_index()
        .referrers(NodeRef::Schema(pet.id))
        .map(|r| r.origin.location.path())
        .collect();
    assert_eq!(
        referrers,
        vec!["$.paths['/pets/{petId}'].get.responses['200'].content['application/json'].schema"]
    );
}

#[test]
fn test_unresolved_references_are_kept() {
    let doc = Document::parse(
        r#"openapi: 3.1.0
paths: {}
components:
  schemas:
    A:
      $ref: 'other.yaml#/components/schemas/B'
    C:
      $ref: '#/components/schemas/Missing'
"#,
    )
    .unwrap();
    assert_eq!(doc.reference_index().len(), 2);
    assert_eq!(doc.reference_index().unresolved().count(), 2);
}

#[test]
fn test_swagger_definitions() {
    let doc = Document::parse(
        r#"swagger: "2.0"
paths:
  /items:
    get:
      parameters:
        - name: limit
          in: query
          type: integer
      responses:
        200:
          description: ok
          schema:
            $ref: '#/definitions/Item'
definitions:
  Item:
    type: object
"#,
    )
    .unwrap();
    assert_eq!(doc.spec_version, SpecVersion::Swagger2);
    let item = doc
        .schemas()
        .iter()
        .find(|s| s.name.as_deref() == Some("Item"))
        .unwrap();
    assert_eq!(item.origin.location.path(), "$.definitions['Item']");
    let limit = &doc.parameters()[0];
    let schema = doc.resolve_schema(limit.schema.as_ref().unwrap()).unwrap();
    assert!(schema.has_type("integer"));
    assert_eq!(doc.responses().len(), 1);
    assert!(doc.responses()[0].schema.is_some());
}
