use once_cell::sync::Lazy;
use regex::Regex;

use super::is_extension;
use crate::document::NodeRef;
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};

pub(super) const PROPERTY_CASE: &str = "property `{}` is `{}` not `camelCase`";

static CAMEL_CASE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").ok());
static PASCAL_CASE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").ok());

fn matches(re: &Lazy<Option<Regex>>, name: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(name))
}

pub fn is_camel_case(name: &str) -> bool {
    matches(&CAMEL_CASE, name)
}

/// Name the casing convention `name` follows instead of camelCase.
pub fn detect_case_type(name: &str) -> &'static str {
    if name.contains('_') {
        "snake_case"
    } else if name.contains('-') {
        "kebab-case"
    } else if matches(&PASCAL_CASE, name) {
        "PascalCase"
    } else {
        "non-camelCase"
    }
}

/// Schema property names must be camelCase.
pub struct CamelCaseProperties;

impl RuleFunction for CamelCaseProperties {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "camelCaseProperties",
            options: Vec::new(),
            error_message: "camelCaseProperties takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };
        let mut findings = Vec::new();
        for schema in context.walker().schemas(document) {
            for (name, property) in &schema.properties {
                if is_extension(name) || is_camel_case(name) {
                    continue;
                }
                let message = context.message(PROPERTY_CASE, &[name, detect_case_type(name)]);
                findings.push(context.finding_at(
                    message,
                    &property.origin.location,
                    property.origin.key_mark,
                    property.origin.key_mark,
                    NodeRef::Schema(schema.id),
                ));
            }
        }
        findings
    }
}
