use crate::document::NodeRef;
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema, RuleOption};

pub(super) const MISSING_DESCRIPTION: &str = "`{}` component `{}` is missing a description";
pub(super) const SHORT_DESCRIPTION: &str =
    "`{}` component `{}` description must be at least `{}` words long";

/// Every component should explain itself in at least `minWords` words.
///
/// Components that are nothing but a `$ref` inherit the target's description and
/// are skipped.
pub struct ComponentDescriptions;

impl RuleFunction for ComponentDescriptions {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "oasComponentDescriptions",
            options: vec![RuleOption {
                name: "minWords",
                description: "Minimum number of words a description must contain",
            }],
            error_message: "oasComponentDescriptions: `minWords` must be an integer",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };
        let min_words = match context.int_option("minWords") {
            Ok(value) => value.unwrap_or(0).max(0) as usize,
            Err(invalid) => return vec![context.invalid_options(&invalid)],
        };

        let mut findings = Vec::new();
        for (index, component) in document.components.entries.iter().enumerate() {
            if component.reference.is_some() {
                continue;
            }
            let kind = component.kind.as_str();
            let description = component.description.as_deref().map(str::trim).unwrap_or("");
            let message = if description.is_empty() {
                context.message(MISSING_DESCRIPTION, &[kind, &component.name])
            } else if description.split_whitespace().count() < min_words {
                context.message(
                    SHORT_DESCRIPTION,
                    &[kind, &component.name, &min_words.to_string()],
                )
            } else {
                continue;
            };
            findings.push(context.finding(message, &component.origin, NodeRef::Component(index)));
        }
        findings
    }
}
