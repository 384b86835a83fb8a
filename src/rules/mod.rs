//! # Built-in Rules
//!
//! | Rule id | Default severity | Checks |
//! |---------|------------------|--------|
//! | `camelCaseProperties` | warn | property names are camelCase |
//! | `oasComponentDescriptions` | warn | components carry a description of `minWords` or more |
//! | `examples` | warn | named examples per operation: validity, summary, value |
//! | `oasExampleExternal` | error | examples do not set both `value` and `externalValue` |
//! | `oasExampleMissing` | warn | parameters, headers, media types and schemas have examples |
//! | `oasExampleSchema` | error | examples validate against their schema |
//! | `noAmbiguousPaths` | error | no two path templates match the same URL |
//! | `schemaTypeCheck` | error | schema keywords are consistent with the declared type |
//! | `oasParamDescriptions` | warn | parameters have a description |
//! | `oasUnnecessaryCombinator` | warn | no single-entry `allOf`/`anyOf`/`oneOf` |
//!
//! Every rule id is also the name of the function implementing it.

mod camel_case_properties;
mod component_descriptions;
mod examples;
mod examples_external;
mod examples_missing;
mod examples_schema;
mod no_ambiguous_paths;
mod parameter_descriptions;
mod schema_type;
mod unnecessary_combinator;

pub use camel_case_properties::CamelCaseProperties;
pub use component_descriptions::ComponentDescriptions;
pub use examples::Examples;
pub use examples_external::ExamplesExternal;
pub use examples_missing::ExamplesMissing;
pub use examples_schema::ExamplesSchema;
pub use no_ambiguous_paths::NoAmbiguousPaths;
pub use parameter_descriptions::ParameterDescriptions;
pub use schema_type::SchemaTypeCheck;
pub use unnecessary_combinator::UnnecessaryCombinator;

use std::sync::Arc;

use crate::document::Schema;
use crate::linter::{Rule, RuleFunction, Severity};

#[cfg(test)]
mod tests;

/// Static description of a built-in rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDefinition {
    pub id: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

pub static DEFINITIONS: [RuleDefinition; 10] = [
    RuleDefinition {
        id: "camelCaseProperties",
        severity: Severity::Warn,
        description: "Schema property names should be camelCase",
    },
    RuleDefinition {
        id: "oasComponentDescriptions",
        severity: Severity::Warn,
        description: "Components should have a description",
    },
    RuleDefinition {
        id: "examples",
        severity: Severity::Warn,
        description: "Named examples should be valid, summarized and carry a value",
    },
    RuleDefinition {
        id: "oasExampleExternal",
        severity: Severity::Error,
        description: "Examples cannot use both `value` and `externalValue`",
    },
    RuleDefinition {
        id: "oasExampleMissing",
        severity: Severity::Warn,
        description: "Parameters, headers, media types and schemas should have examples",
    },
    RuleDefinition {
        id: "oasExampleSchema",
        severity: Severity::Error,
        description: "Examples must validate against their schema",
    },
    RuleDefinition {
        id: "noAmbiguousPaths",
        severity: Severity::Error,
        description: "Paths should not match the same URLs",
    },
    RuleDefinition {
        id: "schemaTypeCheck",
        severity: Severity::Error,
        description: "Schema keywords must be consistent with the schema type",
    },
    RuleDefinition {
        id: "oasParamDescriptions",
        severity: Severity::Warn,
        description: "Parameters should have a description",
    },
    RuleDefinition {
        id: "oasUnnecessaryCombinator",
        severity: Severity::Warn,
        description: "Combinators with a single entry should be replaced by the entry",
    },
];

/// Every message template a built-in rule renders, preloaded before a run.
pub const MESSAGE_TEMPLATES: &[&str] = &[
    camel_case_properties::PROPERTY_CASE,
    component_descriptions::MISSING_DESCRIPTION,
    component_descriptions::SHORT_DESCRIPTION,
    examples::EXAMPLE_INVALID,
    examples::BOTH_VALUES,
    examples::MISSING_SUMMARY,
    examples::NO_VALUE,
    examples_missing::PROPERTY_MISSING,
    examples_missing::MEDIA_TYPE_PROPERTY_MISSING,
    examples_missing::CONTAINER_MISSING,
    no_ambiguous_paths::AMBIGUOUS,
    parameter_descriptions::MISSING_DESCRIPTION,
    schema_type::NON_NEGATIVE,
    schema_type::NOT_BELOW,
    schema_type::UNKNOWN_TYPE,
    schema_type::REQUIRED_UNDEFINED,
    schema_type::DEPENDENT_UNDEFINED,
    schema_type::DEPENDENT_CIRCULAR,
    unnecessary_combinator::SINGLE_ENTRY,
];

/// One instance of every built-in rule function.
pub fn builtin_functions() -> Vec<Arc<dyn RuleFunction>> {
    vec![
        Arc::new(CamelCaseProperties),
        Arc::new(ComponentDescriptions),
        Arc::new(Examples),
        Arc::new(ExamplesExternal),
        Arc::new(ExamplesMissing),
        Arc::new(ExamplesSchema),
        Arc::new(NoAmbiguousPaths),
        Arc::new(SchemaTypeCheck),
        Arc::new(ParameterDescriptions),
        Arc::new(UnnecessaryCombinator),
    ]
}

pub fn definition(id: &str) -> Option<&'static RuleDefinition> {
    DEFINITIONS.iter().find(|d| d.id == id)
}

/// The built-in rule `id` at its default severity.
pub fn default_rule(id: &str) -> Option<Rule> {
    definition(id).map(|d| {
        let mut rule = Rule::new(d.id, d.id, d.severity);
        rule.description = d.description.to_string();
        rule
    })
}

/// Every built-in rule at its default severity.
pub fn default_rules() -> Vec<Rule> {
    DEFINITIONS
        .iter()
        .filter_map(|d| default_rule(d.id))
        .collect()
}

/// Types whose examples are trivially implicit.
const IMPLICIT_TYPES: [&str; 4] = ["boolean", "string", "number", "integer"];

/// Whether an example can be taken for granted from the type or an enumeration.
pub(crate) fn is_implicit(schema: &Schema) -> bool {
    IMPLICIT_TYPES.iter().any(|t| schema.has_type(t))
        || schema.enumeration.as_ref().is_some_and(|e| !e.is_empty())
        || schema.has_extension("x-extensible-enum")
}

/// Vendor extension keys are exempt from naming rules.
pub(crate) fn is_extension(key: &str) -> bool {
    key.starts_with("x-") || key.starts_with("X-")
}
