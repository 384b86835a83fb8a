use crate::document::{NodeRef, Schema, SchemaProxy};
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};

pub(super) const SINGLE_ENTRY: &str =
    "schema with `{}` combinator containing only one item should be replaced with the item directly";

/// Fields that OpenAPI 3.0 ignores next to a bare `$ref`, which a single-entry
/// `allOf` legitimately works around.
const DESCRIPTIVE_SIBLINGS: [&str; 11] = [
    "description",
    "title",
    "default",
    "example",
    "externalDocs",
    "nullable",
    "readOnly",
    "writeOnly",
    "deprecated",
    "xml",
    "enum",
];

fn has_descriptive_siblings(schema: &Schema) -> bool {
    DESCRIPTIVE_SIBLINGS.iter().any(|k| schema.has_keyword(k)) || !schema.extensions.is_empty()
}

/// `allOf`, `anyOf` and `oneOf` with a single entry add nothing.
pub struct UnnecessaryCombinator;

impl RuleFunction for UnnecessaryCombinator {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "oasUnnecessaryCombinator",
            options: Vec::new(),
            error_message: "oasUnnecessaryCombinator takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };
        let version_30 = document.is_version_30();
        let mut findings = Vec::new();
        for schema in context.walker().schemas(document) {
            let combinators: [(&str, &[SchemaProxy]); 3] = [
                ("allOf", &schema.all_of),
                ("anyOf", &schema.any_of),
                ("oneOf", &schema.one_of),
            ];
            for (keyword, entries) in combinators {
                let [only] = entries else {
                    continue;
                };
                if keyword == "allOf"
                    && version_30
                    && only.is_reference()
                    && has_descriptive_siblings(schema)
                {
                    continue;
                }
                let mark = schema.keyword_mark(keyword);
                findings.push(context.finding_at(
                    context.message(SINGLE_ENTRY, &[keyword]),
                    &schema.origin.location.field(keyword),
                    mark,
                    mark,
                    NodeRef::Schema(schema.id),
                ));
            }
        }
        findings
    }
}
