use crate::ambiguity::ambiguous_pairs;
use crate::document::NodeRef;
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};

pub(super) const AMBIGUOUS: &str = "paths are ambiguous with one another: `{}` and `{}`";

/// No two path templates may match the same concrete URL.
///
/// The finding is placed on the later of the two path items.
pub struct NoAmbiguousPaths;

impl RuleFunction for NoAmbiguousPaths {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "noAmbiguousPaths",
            options: Vec::new(),
            error_message: "noAmbiguousPaths takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };
        ambiguous_pairs(document)
            .into_iter()
            .filter_map(|(earlier, later)| {
                let first = document.paths.get(earlier)?;
                let second = document.paths.get(later)?;
                let message = context.message(AMBIGUOUS, &[&first.path, &second.path]);
                Some(context.finding_at(
                    message,
                    &second.origin.location,
                    second.origin.key_mark,
                    second.origin.key_mark,
                    NodeRef::PathItem(later),
                ))
            })
            .collect()
    }
}
