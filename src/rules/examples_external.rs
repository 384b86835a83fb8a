use std::collections::HashSet;

use crate::document::{Document, ExampleId, NodeRef};
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};

const PARAMETER_BOTH: &str = "parameter example contains both `externalValue` and `value`";
const HEADER_BOTH: &str = "header example contains both `externalValue` and `value`";
const MEDIA_TYPE_BOTH: &str = "media type example contains both `externalValue` and `value`";

/// Named examples may carry an inline `value` or an `externalValue`, never both.
pub struct ExamplesExternal;

impl RuleFunction for ExamplesExternal {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "oasExampleExternal",
            options: Vec::new(),
            error_message: "oasExampleExternal takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };

        let mut seen: HashSet<ExampleId> = HashSet::new();
        let mut findings = Vec::new();
        let mut check = |examples: &[(String, ExampleId)], template: &str| {
            for (_, id) in examples {
                if !seen.insert(*id) {
                    continue;
                }
                if let Some(finding) = conflicting(context, document, *id, template) {
                    findings.push(finding);
                }
            }
        };

        for parameter in document.parameters() {
            check(&parameter.examples[..], PARAMETER_BOTH);
        }
        for header in document.headers() {
            check(&header.examples[..], HEADER_BOTH);
        }
        for media_type in document.media_types() {
            check(&media_type.examples[..], MEDIA_TYPE_BOTH);
        }
        findings
    }
}

fn conflicting(
    context: &RuleContext,
    document: &Document,
    id: ExampleId,
    template: &str,
) -> Option<Finding> {
    let example = document.example(id)?;
    if example.value.is_none() || example.external_value.is_none() {
        return None;
    }
    Some(context.finding(
        context.message(template, &[]),
        &example.origin,
        NodeRef::Example(id),
    ))
}
