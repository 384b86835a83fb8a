use std::collections::HashSet;

use crate::document::{ComponentKind, ComponentTarget, NodeRef, ParameterId};
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};

pub(super) const MISSING_DESCRIPTION: &str = "the parameter `{}` does not contain a description";

/// Parameters with an `in` location must be described.
///
/// Component parameters are checked first, then path-level and operation-level
/// parameters. A parameter reached through several `$ref`s is reported once.
pub struct ParameterDescriptions;

impl RuleFunction for ParameterDescriptions {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "oasParamDescriptions",
            options: Vec::new(),
            error_message: "oasParamDescriptions takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };

        let components = document
            .components
            .of_kind(ComponentKind::Parameters)
            .filter_map(|c| match c.target {
                ComponentTarget::Parameter(id) => Some(id),
                _ => None,
            });
        let in_paths = document.paths.iter().flat_map(|item| {
            item.parameters
                .iter()
                .chain(item.operations.iter().flat_map(|op| op.parameters.iter()))
                .copied()
        });

        let mut seen: HashSet<ParameterId> = HashSet::new();
        let mut findings = Vec::new();
        for id in components.chain(in_paths) {
            if !seen.insert(id) {
                continue;
            }
            let Some(parameter) = document.parameter(id) else {
                continue;
            };
            if parameter.location_in.is_none() {
                continue;
            }
            let described = parameter
                .description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty());
            if !described {
                let message = context.message(MISSING_DESCRIPTION, &[&parameter.name]);
                findings.push(context.finding(message, &parameter.origin, NodeRef::Parameter(id)));
            }
        }
        findings
    }
}
