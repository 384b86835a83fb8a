#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Unit tests for the built-in rules

use std::sync::Arc;

use super::*;
use crate::document::Document;
use crate::linter::{Finding, RuleContext};

fn evaluate_with(function: &dyn RuleFunction, rule: Rule, spec: &str) -> Vec<Finding> {
    let document = Arc::new(Document::parse(spec).expect("parse spec"));
    let context = RuleContext::for_document(document, rule, function);
    function.evaluate(&context)
}

fn evaluate(function: &dyn RuleFunction, spec: &str) -> Vec<Finding> {
    let rule = default_rule(function.schema().name).expect("built-in rule");
    evaluate_with(function, rule, spec)
}

fn messages(findings: &[Finding]) -> Vec<&str> {
    let mut out: Vec<&str> = findings.iter().map(|f| f.message.as_str()).collect();
    out.sort_unstable();
    out
}

#[test]
fn test_every_definition_has_a_function() {
    let functions = builtin_functions();
    for definition in DEFINITIONS.iter() {
        let function = functions
            .iter()
            .find(|f| f.schema().name == definition.id)
            .unwrap_or_else(|| panic!("no function for {}", definition.id));
        assert_eq!(function.category(), crate::linter::CATEGORY_OPENAPI);
    }
    assert_eq!(functions.len(), DEFINITIONS.len());
    assert_eq!(default_rules().len(), 10);
    assert_eq!(definition("schemaTypeCheck").unwrap().severity, Severity::Error);
    assert_eq!(definition("camelCaseProperties").unwrap().severity, Severity::Warn);
    assert!(definition("noSuchRule").is_none());
}

#[test]
fn test_camel_case_properties() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Order:
      type: object
      properties:
        orderId:
          type: string
        created_at:
          type: string
        CreatedAt:
          type: string
        x-tenant-id:
          type: string
"#;
    let findings = evaluate(&CamelCaseProperties, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "property `CreatedAt` is `PascalCase` not `camelCase`",
            "property `created_at` is `snake_case` not `camelCase`",
        ]
    );
    let snake = findings
        .iter()
        .find(|f| f.message.contains("created_at"))
        .unwrap();
    assert_eq!(snake.path, "$.components.schemas['Order'].properties['created_at']");
    assert_eq!(snake.start_line, 9);
    assert_eq!(snake.severity, Severity::Warn);
}

#[test]
fn test_detect_case_type() {
    assert!(camel_case_properties::is_camel_case("petId"));
    assert!(!camel_case_properties::is_camel_case("pet_id"));
    assert_eq!(camel_case_properties::detect_case_type("pet-id"), "kebab-case");
    assert_eq!(camel_case_properties::detect_case_type("PetId"), "PascalCase");
    assert_eq!(camel_case_properties::detect_case_type("1pet"), "non-camelCase");
}

const COMPONENTS: &str = r#"openapi: 3.0.3
components:
  schemas:
    Pet:
      type: object
      description: A pet
    Owner:
      type: object
    Alias:
      $ref: '#/components/schemas/Pet'
  parameters:
    Limit:
      name: limit
      in: query
      description: How many pets to return at most
      schema:
        type: integer
"#;

#[test]
fn test_component_descriptions_missing() {
    let findings = evaluate(&ComponentDescriptions, COMPONENTS);
    assert_eq!(
        messages(&findings),
        vec!["`schemas` component `Owner` is missing a description"]
    );
    assert_eq!(findings[0].path, "$.components.schemas['Owner']");
}

#[test]
fn test_component_descriptions_min_words() {
    let rule = default_rule("oasComponentDescriptions")
        .unwrap()
        .with_option("minWords", "3");
    let findings = evaluate_with(&ComponentDescriptions, rule, COMPONENTS);
    assert_eq!(
        messages(&findings),
        vec![
            "`schemas` component `Owner` is missing a description",
            "`schemas` component `Pet` description must be at least `3` words long",
        ]
    );
}

#[test]
fn test_component_descriptions_invalid_option() {
    let rule = default_rule("oasComponentDescriptions")
        .unwrap()
        .with_option("minWords", "many");
    let findings = evaluate_with(&ComponentDescriptions, rule, COMPONENTS);
    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0].message,
        "oasComponentDescriptions: `minWords` must be an integer"
    );
    assert_eq!(findings[0].path, "$");
    assert_eq!((findings[0].start_line, findings[0].start_column), (1, 1));
}

#[test]
fn test_parameter_descriptions() {
    let spec = r#"openapi: 3.0.3
paths:
  /pets:
    get:
      parameters:
        - $ref: '#/components/parameters/Limit'
        - name: offset
          in: query
          description: Where to start
          schema:
            type: integer
      responses:
        '200':
          description: ok
    post:
      parameters:
        - $ref: '#/components/parameters/Limit'
      responses:
        '201':
          description: created
components:
  parameters:
    Limit:
      name: limit
      in: query
      schema:
        type: integer
"#;
    let findings = evaluate(&ParameterDescriptions, spec);
    assert_eq!(
        messages(&findings),
        vec!["the parameter `limit` does not contain a description"]
    );
    assert_eq!(findings[0].path, "$.components.parameters['Limit']");
}

#[test]
fn test_example_external_and_value() {
    let spec = r#"openapi: 3.1.0
paths:
  /herbs:
    get:
      requestBody:
        content:
          application/json:
            examples:
              herbs:
                value:
                  id: 1
                externalValue: https://example.com/herbs.json
              spices:
                value:
                  id: 2
      responses:
        '200':
          description: ok
"#;
    let findings = evaluate(&ExamplesExternal, spec);
    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0].message,
        "media type example contains both `externalValue` and `value`"
    );
    assert_eq!(
        findings[0].path,
        "$.paths['/herbs'].get.requestBody.content['application/json'].examples['herbs']"
    );
    assert_eq!(findings[0].severity, Severity::Error);
}

#[test]
fn test_ambiguous_paths_literal_against_variable() {
    let spec = r#"openapi: 3.0.3
paths:
  /foo/{x}:
    get:
      responses:
        '200':
          description: ok
  /foo/bar:
    get:
      responses:
        '200':
          description: ok
"#;
    let findings = evaluate(&NoAmbiguousPaths, spec);
    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0].message,
        "paths are ambiguous with one another: `/foo/{x}` and `/foo/bar`"
    );
    assert_eq!(findings[0].path, "$.paths['/foo/bar']");
}

#[test]
fn test_ambiguous_paths_opposite_mix() {
    let spec = r#"openapi: 3.0.3
paths:
  /a/{x}/b/c/{y}:
    get:
      responses:
        '200':
          description: ok
  /a/{x}/b/{z}/d:
    get:
      responses:
        '200':
          description: ok
"#;
    assert!(evaluate(&NoAmbiguousPaths, spec).is_empty());
}

#[test]
fn test_required_satisfied_through_all_of() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    BaseSchema:
      type: object
      properties:
        id:
          type: string
        name:
          type: string
    ExtendedSchema:
      type: object
      properties:
        extra:
          type: string
    Composed:
      type: object
      allOf:
        - $ref: '#/components/schemas/BaseSchema'
        - $ref: '#/components/schemas/ExtendedSchema'
      required: [id, name, extra, missing]
"#;
    let findings = evaluate(&SchemaTypeCheck, spec);
    assert_eq!(
        messages(&findings),
        vec!["`required` field `missing` is not defined in `properties`"]
    );
    assert_eq!(findings[0].path, "$.components.schemas['Composed'].required[3]");
    assert!(!findings
        .iter()
        .any(|f| f.message.contains("no `properties`")));
}

#[test]
fn test_required_without_properties() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Empty:
      type: object
      required: [id]
"#;
    let findings = evaluate(&SchemaTypeCheck, spec);
    assert_eq!(
        messages(&findings),
        vec!["object contains `required` fields but no `properties`"]
    );
    assert_eq!(findings[0].path, "$.components.schemas['Empty'].required");
}

#[test]
fn test_dependent_required() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Card:
      type: object
      properties:
        number:
          type: string
        billing:
          type: string
      dependentRequired:
        number: [billing, cvv]
        billing: [billing]
        ghost: [number]
"#;
    let findings = evaluate(&SchemaTypeCheck, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "circular dependency detected: property `billing` requires itself in `dependentRequired`",
            "property `cvv` referenced in `dependentRequired` does not exist in schema `properties`",
            "property `ghost` referenced in `dependentRequired` does not exist in schema `properties`",
        ]
    );
    let cvv = findings.iter().find(|f| f.message.contains("cvv")).unwrap();
    assert_eq!(
        cvv.path,
        "$.components.schemas['Card'].dependentRequired['number']"
    );
}

#[test]
fn test_string_bounds_and_pattern() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Code:
      type: string
      minLength: 5
      maxLength: 2
    Negative:
      type: string
      minLength: -1
    Broken:
      type: string
      pattern: '[a-'
    Lookbehind:
      type: string
      pattern: '(?<=\$)\d+'
"#;
    let findings = evaluate(&SchemaTypeCheck, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "`maxLength` should be greater than or equal to `minLength`",
            "`minLength` should be a non-negative number",
            "schema `pattern` should be a ECMA-262 regular expression dialect",
        ]
    );
    let pattern = findings
        .iter()
        .find(|f| f.message.contains("pattern"))
        .unwrap();
    assert_eq!(pattern.path, "$.components.schemas['Broken'].pattern");
}

#[test]
fn test_numeric_and_array_bounds() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Price:
      type: number
      multipleOf: 0
      minimum: 10
      maximum: 1
    Window:
      type: integer
      exclusiveMinimum: 10
      exclusiveMaximum: 5
    Basket:
      type: array
      minItems: 3
      maxItems: 1
      minContains: 2
      maxContains: 1
"#;
    let findings = evaluate(&SchemaTypeCheck, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "`exclusiveMaximum` should be greater than or equal to `exclusiveMinimum`",
            "`maxContains` should be greater than or equal to `minContains`",
            "`maxItems` should be greater than or equal to `minItems`",
            "`maximum` should be a number greater than or equal to `minimum`",
            "`multipleOf` should be a number greater than `0`",
        ]
    );
}

#[test]
fn test_unknown_type_and_swagger_file() {
    let spec = r#"openapi: 3.0.3
components:
  schemas:
    Typo:
      type: strng
"#;
    let findings = evaluate(&SchemaTypeCheck, spec);
    assert_eq!(messages(&findings), vec!["unknown schema type: `strng`"]);
    assert_eq!(findings[0].path, "$.components.schemas['Typo'].type");

    let swagger = r#"swagger: "2.0"
paths:
  /upload:
    post:
      parameters:
        - name: data
          in: formData
          type: file
      responses:
        '200':
          description: ok
"#;
    assert!(evaluate(&SchemaTypeCheck, swagger).is_empty());
}

#[test]
fn test_single_entry_combinator() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Pet:
      type: object
    Wrapped:
      description: Just a pet
      allOf:
        - $ref: '#/components/schemas/Pet'
    Choice:
      oneOf:
        - type: string
        - type: integer
"#;
    let findings = evaluate(&UnnecessaryCombinator, spec);
    assert_eq!(
        messages(&findings),
        vec!["schema with `allOf` combinator containing only one item should be replaced with the item directly"]
    );
    assert_eq!(findings[0].path, "$.components.schemas['Wrapped'].allOf");
}

#[test]
fn test_single_all_of_with_ref_siblings_is_allowed_on_30() {
    let spec = r#"openapi: 3.0.3
components:
  schemas:
    Pet:
      type: object
    Wrapped:
      description: Just a pet
      nullable: true
      allOf:
        - $ref: '#/components/schemas/Pet'
    Bare:
      allOf:
        - $ref: '#/components/schemas/Pet'
"#;
    let findings = evaluate(&UnnecessaryCombinator, spec);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].path, "$.components.schemas['Bare'].allOf");
}

#[test]
fn test_example_missing_enum_parameter() {
    let spec = r#"openapi: 3.0.3
paths:
  /answers:
    get:
      parameters:
        - name: answer
          in: query
          schema:
            type: string
            enum: [yes, no]
      responses:
        '204':
          description: ok
"#;
    assert!(evaluate(&ExamplesMissing, spec).is_empty());
}

#[test]
fn test_example_missing_parameter() {
    let spec = r#"openapi: 3.0.3
paths:
  /search:
    get:
      parameters:
        - name: filter
          in: query
          schema:
            type: object
        - name: covered
          in: query
          example: {}
          schema:
            type: object
      responses:
        '204':
          description: ok
"#;
    let findings = evaluate(&ExamplesMissing, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "parameter is missing `examples` or `example`",
            "schema is missing `examples` or `example`",
        ]
    );
    let parameter = findings
        .iter()
        .find(|f| f.message.starts_with("parameter"))
        .unwrap();
    assert_eq!(parameter.path, "$.paths['/search'].get.parameters[0]");
}

#[test]
fn test_example_missing_media_type_property() {
    let spec = r#"openapi: 3.1.0
paths:
  /pets:
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name:
                  type: string
                  example: Rex
                owner:
                  type: object
                  properties:
                    address:
                      type: object
      responses:
        '204':
          description: ok
"#;
    let findings = evaluate(&ExamplesMissing, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "media type is missing `examples` or `example`",
            "media type schema property `owner` is missing `examples` or `example`",
            "schema is missing `examples` or `example`",
        ]
    );
    let property = findings
        .iter()
        .find(|f| f.message.contains("`owner`"))
        .unwrap();
    assert_eq!(
        property.path,
        "$.paths['/pets'].post.requestBody.content['application/json'].schema.properties['owner']"
    );
}

#[test]
fn test_example_missing_inferred_from_items_and_defaults() {
    let spec = r#"openapi: 3.1.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  type: object
                  properties:
                    id:
                      type: integer
                      example: 7
                    meta:
                      type: object
                      default: {}
"#;
    assert!(evaluate(&ExamplesMissing, spec).is_empty());
}

#[test]
fn test_example_missing_typed_items_need_examples() {
    let spec = r#"openapi: 3.1.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  type: object
                  properties:
                    id:
                      type: integer
                    meta:
                      type: object
                      default: {}
"#;
    let findings = evaluate(&ExamplesMissing, spec);
    let messages = messages(&findings);
    assert!(messages.contains(&"media type is missing `examples` or `example`"));
    assert!(messages.contains(&"schema property `id` is missing `examples` or `example`"));
}

#[test]
fn test_example_missing_array_items_with_property_examples() {
    let spec = r##"openapi: 3.1.1
paths:
  /things:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Thing"
components:
  schemas:
    Thing:
      type: object
      properties:
        id:
          type: integer
          example: 1
        name:
          type: string
          example: "Widget"
"##;
    assert!(evaluate(&ExamplesMissing, spec).is_empty());
}

#[test]
fn test_example_missing_array_items_without_examples() {
    let spec = r##"openapi: 3.1.1
paths:
  /things:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Thing"
components:
  schemas:
    Thing:
      type: object
      properties:
        id:
          type: integer
        name:
          type: string
"##;
    let findings = evaluate(&ExamplesMissing, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "media type is missing `examples` or `example`",
            "schema is missing `examples` or `example`",
            "schema property `id` is missing `examples` or `example`",
        ]
    );
    let media_type = findings
        .iter()
        .find(|f| f.message.starts_with("media type"))
        .unwrap();
    assert_eq!(
        media_type.path,
        "$.paths['/things'].get.responses['200'].content['application/json']"
    );
    let schema = findings
        .iter()
        .find(|f| f.message.starts_with("schema is"))
        .unwrap();
    assert_eq!(schema.path, "$.components.schemas['Thing']");
}

#[test]
fn test_example_missing_primitive_properties_are_not_examples() {
    let spec = r#"openapi: 3.1.0
paths:
  /pizza:
    get:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              description: I need an example
components:
  schemas:
    Pizza:
      type: object
      properties:
        id:
          type: integer
        name:
          type: string
"#;
    let findings = evaluate(&ExamplesMissing, spec);
    assert_eq!(
        messages(&findings),
        vec![
            "media type is missing `examples` or `example`",
            "schema is missing `examples` or `example`",
            "schema property `id` is missing `examples` or `example`",
        ]
    );
    let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
    assert!(paths.contains(&"$.paths['/pizza'].get.requestBody.content['application/json']"));
    assert!(paths.contains(&"$.components.schemas['Pizza']"));
    assert!(paths.contains(&"$.components.schemas['Pizza'].properties['id']"));
}

#[test]
fn test_example_missing_nested_first_property_example() {
    let spec = r#"openapi: 3.1.0
paths: {}
components:
  schemas:
    Order:
      type: object
      properties:
        customer:
          type: object
          properties:
            name:
              type: string
              example: Ada
        total:
          type: number
          const: 10
"#;
    assert!(evaluate(&ExamplesMissing, spec).is_empty());
}

#[test]
fn test_example_missing_reports_component_schema_once() {
    let spec = r#"openapi: 3.1.0
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              example: {}
              schema:
                $ref: '#/components/schemas/Thing'
  /b:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              example: {}
              schema:
                $ref: '#/components/schemas/Thing'
components:
  schemas:
    Thing:
      type: object
"#;
    let findings = evaluate(&ExamplesMissing, spec);
    assert_eq!(messages(&findings), vec!["schema is missing `examples` or `example`"]);
    assert_eq!(findings[0].path, "$.components.schemas['Thing']");
}

const INVALID_EXAMPLES: &str = r#"openapi: 3.0.3
paths:
  /pets:
    get:
      parameters:
        - name: limit
          in: query
          example: many
          schema:
            type: integer
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
              examples:
                rex:
                  summary: A dog
                  value:
                    id: rex
                tom:
                  summary: A cat
                  value:
                    id: 7
                    nickname: null
            application/xml:
              schema:
                $ref: '#/components/schemas/Pet'
              example: <pet/>
components:
  schemas:
    Pet:
      type: object
      properties:
        id:
          type: integer
        nickname:
          type: string
          nullable: true
      example:
        id: 1
"#;

#[test]
fn test_example_schema_validation() {
    let findings = evaluate(&ExamplesSchema, INVALID_EXAMPLES);
    assert_eq!(findings.len(), 2, "{:?}", messages(&findings));

    let limit = findings
        .iter()
        .find(|f| f.message.starts_with("Example for `limit` is not valid: "))
        .unwrap();
    assert_eq!(limit.path, "$.paths['/pets'].get.parameters[0].example");

    let rex = findings
        .iter()
        .find(|f| f.message.starts_with("Example for `rex` is not valid: "))
        .unwrap();
    assert_eq!(
        rex.path,
        "$.paths['/pets'].get.responses['200'].content['application/json'].examples['rex']"
    );
    assert_eq!(rex.severity, Severity::Error);
}

#[test]
fn test_example_schema_on_schema_itself() {
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id:
          type: integer
      examples:
        - id: 1
        - name: rex
"#;
    let findings = evaluate(&ExamplesSchema, spec);
    assert_eq!(findings.len(), 1, "{:?}", messages(&findings));
    assert!(findings[0].message.starts_with("Example for `Pet` is not valid: "));
    assert_eq!(findings[0].path, "$.components.schemas['Pet'].examples[1]");
}

#[test]
fn test_examples_rule() {
    let spec = r#"openapi: 3.1.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  id:
                    type: integer
              examples:
                good:
                  summary: A pet
                  value:
                    id: 1
                wrong:
                  summary: Not a pet
                  value:
                    id: one
                both:
                  summary: Confused
                  value:
                    id: 2
                  externalValue: https://example.com/pet.json
                bare:
                  value:
                    id: 3
                empty:
                  summary: Nothing here
"#;
    let findings = evaluate(&Examples, spec);
    let mut found = messages(&findings);
    found.retain(|m| !m.starts_with("Example for"));
    assert_eq!(
        found,
        vec![
            "example `bare` is missing a `summary`, examples need explaining",
            "example `both` contains both `externalValue` and `value`",
            "example `empty` has no `value` or `externalValue`",
        ]
    );
    let invalid: Vec<_> = findings
        .iter()
        .filter(|f| f.message.starts_with("Example for `wrong` is not valid: "))
        .collect();
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].path.ends_with(".examples['wrong'].value"));
}

#[test]
fn test_message_override_replaces_every_message() {
    let rule = default_rule("camelCaseProperties")
        .unwrap()
        .with_message("use camelCase");
    let spec = r#"openapi: 3.1.0
components:
  schemas:
    Order:
      type: object
      properties:
        created_at:
          type: string
        Updated:
          type: string
"#;
    let findings = evaluate_with(&CamelCaseProperties, rule, spec);
    assert_eq!(messages(&findings), vec!["use camelCase", "use camelCase"]);
}

#[test]
fn test_rules_are_deterministic() {
    for function in builtin_functions() {
        let first = messages(&evaluate(function.as_ref(), INVALID_EXAMPLES))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let second = messages(&evaluate(function.as_ref(), INVALID_EXAMPLES))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert_eq!(first, second, "{}", function.schema().name);
    }
}

#[test]
fn test_implicit_examples() {
    let document = Document::parse(
        r#"openapi: 3.1.0
components:
  schemas:
    Flag:
      type: boolean
    Status:
      enum: [on, off]
    Open:
      type: string
      x-extensible-enum: [a]
    Thing:
      type: object
"#,
    )
    .unwrap();
    let implicit: Vec<_> = document
        .schemas()
        .iter()
        .filter(|s| is_implicit(s))
        .filter_map(|s| s.name.as_deref())
        .collect();
    assert_eq!(implicit, vec!["Flag", "Status", "Open"]);
}
