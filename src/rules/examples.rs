//! `examples`: named examples of every operation and reusable component are
//! checked for a valid value, a summary, and exactly one of `value` or
//! `externalValue`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::document::{
    ComponentKind, ComponentTarget, Document, ExampleId, HeaderId, Location, Mark, MediaTypeId,
    Node, NodeRef, Origin, ParameterId, RequestBodyId, ResponseId, SchemaProxy,
};
use crate::example_validator::{ExampleValidator, Verdict};
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};
use crate::worker_pool::Job;

pub(super) const EXAMPLE_INVALID: &str = "Example for `{}` is not valid: {}";
pub(super) const BOTH_VALUES: &str = "example `{}` contains both `externalValue` and `value`";
pub(super) const MISSING_SUMMARY: &str = "example `{}` is missing a `summary`, examples need explaining";
pub(super) const NO_VALUE: &str = "example `{}` has no `value` or `externalValue`";

/// An object that may carry `example`/`examples` next to a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum Container {
    Parameter(ParameterId),
    Header(HeaderId),
    MediaType(MediaTypeId),
}

/// Borrowed view of a container's example slots
pub(super) struct Holder<'d> {
    pub name: &'d str,
    pub origin: &'d Origin,
    pub schema: Option<&'d SchemaProxy>,
    pub example: Option<&'d Node>,
    pub examples: &'d [(String, ExampleId)],
    pub target: NodeRef,
    /// XML payloads are strings that cannot be checked against a JSON schema
    pub xml: bool,
}

impl Container {
    pub(super) fn holder(self, document: &Document) -> Option<Holder<'_>> {
        Some(match self {
            Container::Parameter(id) => {
                let parameter = document.parameter(id)?;
                Holder {
                    name: &parameter.name,
                    origin: &parameter.origin,
                    schema: parameter.schema.as_ref(),
                    example: parameter.example.as_ref(),
                    examples: &parameter.examples,
                    target: NodeRef::Parameter(id),
                    xml: false,
                }
            }
            Container::Header(id) => {
                let header = document.header(id)?;
                Holder {
                    name: &header.name,
                    origin: &header.origin,
                    schema: header.schema.as_ref(),
                    example: header.example.as_ref(),
                    examples: &header.examples,
                    target: NodeRef::Header(id),
                    xml: false,
                }
            }
            Container::MediaType(id) => {
                let media_type = document.media_type(id)?;
                Holder {
                    name: &media_type.name,
                    origin: &media_type.origin,
                    schema: media_type.schema.as_ref(),
                    example: media_type.example.as_ref(),
                    examples: &media_type.examples,
                    target: NodeRef::MediaType(id),
                    xml: media_type.name.to_ascii_lowercase().contains("xml"),
                }
            }
        })
    }
}

/// One finding per reason a value failed validation.
///
/// Cyclic schemas were never validated and yield nothing.
pub(super) fn verdict_findings(
    context: &RuleContext,
    verdict: &Verdict,
    name: &str,
    location: &Location,
    start: Mark,
    end: Mark,
    target: NodeRef,
) -> Vec<Finding> {
    let unconvertible: [String; 1];
    let reasons: &[String] = match verdict {
        Verdict::Valid | Verdict::Cyclic => return Vec::new(),
        Verdict::Invalid(reasons) => reasons,
        Verdict::Unconvertible(error) => {
            unconvertible = [format!("schema cannot be compiled: {error}")];
            &unconvertible
        }
    };
    reasons
        .iter()
        .map(|reason| {
            let message = context.message(EXAMPLE_INVALID, &[name, reason]);
            context.finding_at(message, location, start, end, target)
        })
        .collect()
}

/// Named examples are valid, explained, and carry exactly one value.
pub struct Examples;

impl RuleFunction for Examples {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "examples",
            options: Vec::new(),
            error_message: "examples takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };

        let mut plan = Plan::default();
        for (_, operation) in document.operations() {
            let mut group = Vec::new();
            for id in &operation.parameters {
                group.extend(parameter_containers(document, *id));
            }
            if let Some(id) = operation.request_body {
                group.extend(request_body_containers(document, id));
            }
            for (_, id) in &operation.responses {
                group.extend(response_containers(document, *id));
            }
            plan.add(group);
        }
        for component in &document.components.entries {
            let group = match (component.kind, &component.target) {
                (ComponentKind::Parameters, ComponentTarget::Parameter(id)) => {
                    parameter_containers(document, *id)
                }
                (ComponentKind::Headers, ComponentTarget::Header(id)) => {
                    vec![Container::Header(*id)]
                }
                (ComponentKind::RequestBodies, ComponentTarget::RequestBody(id)) => {
                    request_body_containers(document, *id)
                }
                (ComponentKind::Responses, ComponentTarget::Response(id)) => {
                    response_containers(document, *id)
                }
                _ => continue,
            };
            plan.add(group);
        }

        let validator = Arc::new(ExampleValidator::new(document));
        let jobs: Vec<Job<Finding>> = plan
            .groups
            .into_iter()
            .map(|group| {
                let context = context.clone();
                let validator = Arc::clone(&validator);
                Box::new(move || {
                    let Some(document) = context.document() else {
                        return Vec::new();
                    };
                    group
                        .into_iter()
                        .flat_map(|container| check(&context, document, &validator, container))
                        .collect()
                }) as Job<Finding>
            })
            .collect();
        context.pool("operations").run(jobs)
    }
}

/// Containers grouped per operation, each container planned once.
#[derive(Default)]
struct Plan {
    seen: HashSet<Container>,
    groups: Vec<Vec<Container>>,
}

impl Plan {
    fn add(&mut self, group: Vec<Container>) {
        let fresh: Vec<Container> = group
            .into_iter()
            .filter(|container| self.seen.insert(*container))
            .collect();
        if !fresh.is_empty() {
            self.groups.push(fresh);
        }
    }
}

fn parameter_containers(document: &Document, id: ParameterId) -> Vec<Container> {
    let mut out = vec![Container::Parameter(id)];
    if let Some(parameter) = document.parameter(id) {
        out.extend(parameter.content.iter().map(|(_, m)| Container::MediaType(*m)));
    }
    out
}

fn request_body_containers(document: &Document, id: RequestBodyId) -> Vec<Container> {
    document
        .request_body(id)
        .map(|body| {
            body.content
                .iter()
                .map(|(_, m)| Container::MediaType(*m))
                .collect()
        })
        .unwrap_or_default()
}

fn response_containers(document: &Document, id: ResponseId) -> Vec<Container> {
    let Some(response) = document.response(id) else {
        return Vec::new();
    };
    let mut out: Vec<Container> = Vec::new();
    for (_, header) in &response.headers {
        out.push(Container::Header(*header));
        if let Some(header) = document.header(*header) {
            out.extend(header.content.iter().map(|(_, m)| Container::MediaType(*m)));
        }
    }
    out.extend(response.content.iter().map(|(_, m)| Container::MediaType(*m)));
    out
}

fn check(
    context: &RuleContext,
    document: &Document,
    validator: &ExampleValidator,
    container: Container,
) -> Vec<Finding> {
    let Some(holder) = container.holder(document) else {
        return Vec::new();
    };
    let schema = holder
        .schema
        .and_then(|proxy| document.resolve_schema(proxy))
        .filter(|_| !holder.xml);

    let mut findings = Vec::new();
    for (name, id) in holder.examples {
        let Some(example) = document.example(*id) else {
            continue;
        };
        let target = NodeRef::Example(*id);
        let origin = &example.origin;
        match (&example.value, &example.external_value) {
            (Some(_), Some(_)) => {
                let message = context.message(BOTH_VALUES, &[name]);
                findings.push(context.finding(message, origin, target));
            }
            (None, None) => {
                let message = context.message(NO_VALUE, &[name]);
                findings.push(context.finding(message, origin, target));
            }
            _ => {}
        }
        if let (Some(value), Some(schema)) = (&example.value, schema) {
            let verdict = validator.validate(document, schema, value);
            findings.extend(verdict_findings(
                context,
                &verdict,
                name,
                &origin.location.field("value"),
                value.mark,
                value.end,
                target,
            ));
        }
        if example.summary.as_deref().is_none_or(|s| s.trim().is_empty()) {
            let message = context.message(MISSING_SUMMARY, &[name]);
            findings.push(context.finding(message, origin, target));
        }
    }
    findings
}
