use std::sync::Arc;

use tracing::debug;

use super::examples::{verdict_findings, Container};
use crate::document::{NodeRef, Schema, SchemaId};
use crate::example_validator::ExampleValidator;
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};
use crate::worker_pool::Job;

/// Every example must validate against the schema it illustrates.
///
/// Covers `example`/`examples` on schemas as well as on parameters, headers and
/// media types. One job runs per schema or container; all of them share a single
/// validator so each schema is compiled once.
pub struct ExamplesSchema;

impl RuleFunction for ExamplesSchema {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "oasExampleSchema",
            options: Vec::new(),
            error_message: "oasExampleSchema takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };
        let validator = Arc::new(ExampleValidator::new(document));

        let mut jobs: Vec<Job<Finding>> = Vec::new();
        for id in context.walker().ids().iter().copied() {
            let (context, validator) = (context.clone(), Arc::clone(&validator));
            jobs.push(Box::new(move || check_schema(&context, &validator, id)));
        }
        let containers = document
            .parameters()
            .iter()
            .map(|p| Container::Parameter(p.id))
            .chain(document.headers().iter().map(|h| Container::Header(h.id)))
            .chain(document.media_types().iter().map(|m| Container::MediaType(m.id)));
        for container in containers {
            let (context, validator) = (context.clone(), Arc::clone(&validator));
            jobs.push(Box::new(move || {
                check_container(&context, &validator, container)
            }));
        }

        let findings = context.pool("examples").run(jobs);
        debug!(findings = findings.len(), "Examples validated");
        findings
    }
}

fn schema_name(schema: &Schema) -> &str {
    schema.name.as_deref().unwrap_or("schema")
}

fn check_schema(context: &RuleContext, validator: &ExampleValidator, id: SchemaId) -> Vec<Finding> {
    let Some(document) = context.document() else {
        return Vec::new();
    };
    let Some(schema) = document.schema(id) else {
        return Vec::new();
    };
    let name = schema_name(schema);
    let target = NodeRef::Schema(id);
    let mut findings = Vec::new();

    if let Some(example) = &schema.example {
        let verdict = validator.validate(document, schema, example);
        findings.extend(verdict_findings(
            context,
            &verdict,
            name,
            &schema.origin.location.field("example"),
            schema.keyword_mark("example"),
            example.end,
            target,
        ));
    }
    let base = schema.origin.location.field("examples");
    for (i, example) in schema.examples.iter().flatten().enumerate() {
        let verdict = validator.validate(document, schema, example);
        findings.extend(verdict_findings(
            context,
            &verdict,
            name,
            &base.index(i),
            example.mark,
            example.end,
            target,
        ));
    }
    findings
}

fn check_container(
    context: &RuleContext,
    validator: &ExampleValidator,
    container: Container,
) -> Vec<Finding> {
    let Some(document) = context.document() else {
        return Vec::new();
    };
    let Some(holder) = container.holder(document) else {
        return Vec::new();
    };
    if holder.xml {
        return Vec::new();
    }
    let Some(schema) = holder.schema.and_then(|proxy| document.resolve_schema(proxy)) else {
        return Vec::new();
    };

    if !holder.examples.is_empty() {
        let base = holder.origin.location.field("examples");
        return holder
            .examples
            .iter()
            .filter_map(|(key, id)| Some((key, *id, document.example(*id)?)))
            .flat_map(|(key, id, example)| {
                let Some(value) = &example.value else {
                    return Vec::new();
                };
                let verdict = validator.validate(document, schema, value);
                verdict_findings(
                    context,
                    &verdict,
                    key,
                    &base.key(key),
                    example.origin.key_mark,
                    example.origin.end,
                    NodeRef::Example(id),
                )
            })
            .collect();
    }

    let Some(example) = holder.example else {
        return Vec::new();
    };
    let verdict = validator.validate(document, schema, example);
    verdict_findings(
        context,
        &verdict,
        holder.name,
        &holder.origin.location.field("example"),
        example.mark,
        example.end,
        holder.target,
    )
}
