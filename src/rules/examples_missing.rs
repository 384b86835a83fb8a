//! `oasExampleMissing`: anything that can carry an example should have one, unless
//! an example can be inferred.
//!
//! The check runs in two passes. Parameters, headers and media types are checked
//! first, one job per container. Every covered container contributes its key to a
//! seen-set so the schema it holds is not flagged again. Schemas from the walker are
//! then judged in parallel and merged in walk order, which keeps the seen-set
//! decisions deterministic.

use std::collections::HashSet;

use tracing::debug;

use super::is_implicit;
use crate::document::{
    Document, HeaderId, MediaTypeId, Node, NodeRef, Origin, ParameterId, Schema, SchemaParent,
    SchemaProxy, MAX_REFERENCE_HOPS,
};
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};
use crate::walker::DedupKey;
use crate::worker_pool::Job;

pub(super) const PROPERTY_MISSING: &str = "schema property `{}` is missing `examples` or `example`";
pub(super) const MEDIA_TYPE_PROPERTY_MISSING: &str =
    "media type schema property `{}` is missing `examples` or `example`";
pub(super) const CONTAINER_MISSING: &str = "{} is missing `examples` or `example`";

/// Every parameter, header, media type and schema should have an example.
pub struct ExamplesMissing;

impl RuleFunction for ExamplesMissing {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "oasExampleMissing",
            options: Vec::new(),
            error_message: "oasExampleMissing takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };

        let mut jobs: Vec<Job<Outcome>> = Vec::new();
        for parameter in document.parameters() {
            let (context, id) = (context.clone(), parameter.id);
            jobs.push(Box::new(move || check_parameter(&context, id).into_iter().collect()));
        }
        for header in document.headers() {
            let (context, id) = (context.clone(), header.id);
            jobs.push(Box::new(move || check_header(&context, id).into_iter().collect()));
        }
        for media_type in document.media_types() {
            let (context, id) = (context.clone(), media_type.id);
            jobs.push(Box::new(move || check_media_type(&context, id).into_iter().collect()));
        }

        let mut findings = Vec::new();
        let mut seen: HashSet<DedupKey> = HashSet::new();
        for outcome in context.pool("containers").run(jobs) {
            seen.extend(outcome.seen);
            findings.extend(outcome.findings);
        }

        let mut jobs: Vec<Job<(usize, Judgement)>> = Vec::new();
        for (position, id) in context.walker().ids().iter().copied().enumerate() {
            let context = context.clone();
            jobs.push(Box::new(move || {
                let Some(document) = context.document() else {
                    return Vec::new();
                };
                let Some(schema) = document.schema(id) else {
                    return Vec::new();
                };
                vec![(position, judge(&context, document, schema))]
            }));
        }
        let mut judgements = context.pool("schemas").run(jobs);
        judgements.sort_by_key(|(position, _)| *position);

        for (_, judgement) in judgements {
            let Judgement::Missing {
                key,
                property,
                findings: flagged,
            } = judgement
            else {
                continue;
            };
            if !seen.insert(key) {
                continue;
            }
            if let Some(property) = property {
                seen.insert(property);
            }
            findings.extend(flagged);
        }
        debug!(findings = findings.len(), "Missing examples checked");
        findings
    }
}

/// What a container job learned
#[derive(Default)]
struct Outcome {
    findings: Vec<Finding>,
    seen: Vec<DedupKey>,
}

impl Outcome {
    fn covered(key: DedupKey) -> Self {
        Self {
            findings: Vec::new(),
            seen: vec![key],
        }
    }

    fn flagged(finding: Finding) -> Self {
        Self {
            findings: vec![finding],
            seen: Vec::new(),
        }
    }
}

enum Judgement {
    Covered,
    Missing {
        key: DedupKey,
        /// Key of the property reported in place of the schema
        property: Option<DedupKey>,
        findings: Vec<Finding>,
    },
}

fn has_value(example: Option<&Node>) -> bool {
    example.is_some_and(|node| !node.is_null())
}

/// Whether an example can be taken for granted for `schema`.
pub(crate) fn infers_example(document: &Document, schema: &Schema) -> bool {
    if schema.has_example()
        || is_implicit(schema)
        || schema.const_value.is_some()
        || schema.default.is_some()
        || schema.schema_type.is_empty()
    {
        return true;
    }
    if schema.has_type("array") {
        return document
            .resolve_items(schema.items.as_ref())
            .is_some_and(|items| items_covered(document, items));
    }
    !schema.properties.is_empty()
        && schema
            .properties
            .iter()
            .all(|(_, proxy)| property_covered(document, proxy))
}

/// Array items vouch for the array when they carry an example themselves or every
/// one of their properties does.
fn items_covered(document: &Document, items: &Schema) -> bool {
    if explicit_example(document, items, 0)
        || items.enumeration.as_ref().is_some_and(|e| !e.is_empty())
    {
        return true;
    }
    !items.properties.is_empty()
        && items
            .properties
            .iter()
            .all(|(_, proxy)| property_covered(document, proxy))
}

fn property_covered(document: &Document, proxy: &SchemaProxy) -> bool {
    document
        .resolve_schema(proxy)
        .is_none_or(|property| explicit_example(document, property, 0))
}

/// `example`, `examples`, `const` or `default` written on the schema, or on its
/// first property, followed down.
fn explicit_example(document: &Document, schema: &Schema, depth: usize) -> bool {
    if schema.has_example() || schema.const_value.is_some() || schema.default.is_some() {
        return true;
    }
    if depth >= MAX_REFERENCE_HOPS {
        return false;
    }
    schema
        .properties
        .first()
        .and_then(|(_, proxy)| document.resolve_schema(proxy))
        .is_some_and(|first| explicit_example(document, first, depth + 1))
}

/// First property of `schema` without an explicit example.
fn first_uncovered<'d>(document: &'d Document, schema: &'d Schema) -> Option<(&'d str, &'d SchemaProxy)> {
    schema
        .properties
        .iter()
        .find(|(_, proxy)| !property_covered(document, proxy))
        .map(|(name, proxy)| (name.as_str(), proxy))
}

/// Key of the schema held by `proxy`, used to silence it in the schema pass.
fn property_key(document: &Document, proxy: &SchemaProxy) -> Option<DedupKey> {
    let id = proxy.inline?;
    document.schema(id).map(|schema| DedupKey::of(document, schema))
}

fn container_missing(context: &RuleContext, kind: &str, origin: &Origin, target: NodeRef) -> Outcome {
    let message = context.message(CONTAINER_MISSING, &[kind]);
    Outcome::flagged(context.finding(message, origin, target))
}

fn check_parameter(context: &RuleContext, id: ParameterId) -> Option<Outcome> {
    let document = context.document()?;
    let parameter = document.parameter(id)?;
    let key = DedupKey::at(document, parameter.origin.key_mark);

    let schema_covered = parameter
        .schema
        .as_ref()
        .and_then(|proxy| document.resolve_schema(proxy))
        .is_some_and(|schema| infers_example(document, schema));
    let content_covered = parameter.content.iter().any(|(_, media_id)| {
        document
            .media_type(*media_id)
            .is_some_and(|media| has_value(media.example.as_ref()) || !media.examples.is_empty())
    });
    if schema_covered
        || content_covered
        || has_value(parameter.example.as_ref())
        || !parameter.examples.is_empty()
    {
        return Some(Outcome::covered(key));
    }
    Some(container_missing(
        context,
        "parameter",
        &parameter.origin,
        NodeRef::Parameter(id),
    ))
}

fn check_header(context: &RuleContext, id: HeaderId) -> Option<Outcome> {
    let document = context.document()?;
    let header = document.header(id)?;
    let schema = document.resolve_schema(header.schema.as_ref()?)?;
    let key = DedupKey::at(document, header.origin.key_mark);

    if infers_example(document, schema)
        || has_value(header.example.as_ref())
        || !header.examples.is_empty()
    {
        return Some(Outcome::covered(key));
    }
    Some(container_missing(context, "header", &header.origin, NodeRef::Header(id)))
}

fn check_media_type(context: &RuleContext, id: MediaTypeId) -> Option<Outcome> {
    let document = context.document()?;
    let media_type = document.media_type(id)?;
    let key = DedupKey::at(document, media_type.origin.key_mark);

    if has_value(media_type.example.as_ref()) || !media_type.examples.is_empty() {
        return Some(Outcome::covered(key));
    }
    let schema = media_type
        .schema
        .as_ref()
        .and_then(|proxy| document.resolve_schema(proxy));
    if schema.is_some_and(|schema| infers_example(document, schema)) {
        return Some(Outcome::covered(key));
    }

    let mut outcome = container_missing(
        context,
        "media type",
        &media_type.origin,
        NodeRef::MediaType(id),
    );
    outcome.seen.push(key);
    if let Some((name, proxy)) = schema.and_then(|schema| first_uncovered(document, schema)) {
        let message = context.message(MEDIA_TYPE_PROPERTY_MISSING, &[name]);
        let target = document
            .resolve_schema(proxy)
            .map_or(NodeRef::MediaType(id), |property| NodeRef::Schema(property.id));
        outcome.findings.insert(0, context.finding(message, &proxy.origin, target));
        outcome.seen.extend(property_key(document, proxy));
    }
    Some(outcome)
}

/// The key that stands for `schema` in the seen-set: its container's key when the
/// schema sits directly in a parameter, header or media type.
fn schema_key(document: &Document, schema: &Schema) -> DedupKey {
    let container = match schema.parent {
        SchemaParent::Parameter(id) => document.parameter(id).map(|p| p.origin.key_mark),
        SchemaParent::Header(id) => document.header(id).map(|h| h.origin.key_mark),
        SchemaParent::MediaType(id) => document.media_type(id).map(|m| m.origin.key_mark),
        _ => None,
    };
    match container {
        Some(mark) => DedupKey::at(document, mark),
        None => DedupKey::of(document, schema),
    }
}

/// Whether an enclosing schema already accounts for an example.
fn parent_covers(document: &Document, schema: &Schema) -> bool {
    let mut cursor = document.parent_schema(schema);
    let mut depth = 0;
    while let Some(parent) = cursor {
        if depth > MAX_REFERENCE_HOPS {
            return false;
        }
        if parent.has_example() || is_implicit(parent) || parent.schema_type.is_empty() {
            return true;
        }
        cursor = document.parent_schema(parent);
        depth += 1;
    }
    false
}

fn judge(context: &RuleContext, document: &Document, schema: &Schema) -> Judgement {
    if infers_example(document, schema) || parent_covers(document, schema) {
        return Judgement::Covered;
    }
    let key = schema_key(document, schema);
    let target = NodeRef::Schema(schema.id);
    let mut findings = Vec::new();
    let mut property = None;
    if let Some((name, proxy)) = first_uncovered(document, schema) {
        let message = context.message(PROPERTY_MISSING, &[name]);
        findings.push(context.finding(message, &proxy.origin, target));
        property = property_key(document, proxy);
    }
    let message = context.message(CONTAINER_MISSING, &["schema"]);
    findings.push(context.finding(message, &schema.origin, target));
    Judgement::Missing {
        key,
        property,
        findings,
    }
}
