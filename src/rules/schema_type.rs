//! `schemaTypeCheck`: keywords must make sense for the type they accompany.
//!
//! Each entry of `type` selects a family of checks:
//!
//! - `string`: length bounds and an ECMA-262 `pattern`
//! - `integer`/`number`: `multipleOf`, `minimum`/`maximum`, numeric exclusive bounds
//! - `array`: item and contains bounds
//! - `object`: property bounds, `required`, `dependentRequired`
//! - `boolean`, `null` (and `file` in Swagger 2.0): nothing to check
//!
//! A property counts as defined when the schema or any schema reachable through
//! `allOf`/`anyOf`/`oneOf` declares it.

use std::collections::HashSet;

use crate::document::{
    Document, ExclusiveBound, Location, Mark, NodeRef, Schema, SchemaId, SpecVersion,
    MAX_REFERENCE_HOPS,
};
use crate::linter::{Finding, RuleContext, RuleFunction, RuleFunctionSchema};

pub(super) const NON_NEGATIVE: &str = "`{}` should be a non-negative number";
pub(super) const NOT_BELOW: &str = "`{}` should be greater than or equal to `{}`";
pub(super) const UNKNOWN_TYPE: &str = "unknown schema type: `{}`";
pub(super) const REQUIRED_UNDEFINED: &str = "`required` field `{}` is not defined in `properties`";
pub(super) const DEPENDENT_UNDEFINED: &str =
    "property `{}` referenced in `dependentRequired` does not exist in schema `properties`";
pub(super) const DEPENDENT_CIRCULAR: &str =
    "circular dependency detected: property `{}` requires itself in `dependentRequired`";

const INVALID_PATTERN: &str = "schema `pattern` should be a ECMA-262 regular expression dialect";
const MULTIPLE_OF: &str = "`multipleOf` should be a number greater than `0`";
const MAXIMUM: &str = "`maximum` should be a number greater than or equal to `minimum`";
const REQUIRED_WITHOUT_PROPERTIES: &str = "object contains `required` fields but no `properties`";

/// Schema keywords must be consistent with the declared type.
pub struct SchemaTypeCheck;

impl RuleFunction for SchemaTypeCheck {
    fn schema(&self) -> RuleFunctionSchema {
        RuleFunctionSchema {
            name: "schemaTypeCheck",
            options: Vec::new(),
            error_message: "schemaTypeCheck takes no options",
        }
    }

    fn evaluate(&self, context: &RuleContext) -> Vec<Finding> {
        let Some(document) = context.document() else {
            return Vec::new();
        };
        let mut findings = Vec::new();
        for schema in context.walker().schemas(document) {
            let mut check = Check {
                context,
                document,
                schema,
                findings: &mut findings,
            };
            for schema_type in &schema.schema_type {
                match schema_type.as_str() {
                    "string" => check.string(),
                    "integer" | "number" => check.number(),
                    "array" => check.array(),
                    "object" => check.object(),
                    "boolean" | "null" => {}
                    "file" if document.spec_version == SpecVersion::Swagger2 => {}
                    other => {
                        let message = context.message(UNKNOWN_TYPE, &[other]);
                        check.report("type", message);
                    }
                }
            }
        }
        findings
    }
}

struct Check<'a> {
    context: &'a RuleContext,
    document: &'a Document,
    schema: &'a Schema,
    findings: &'a mut Vec<Finding>,
}

impl Check<'_> {
    fn report(&mut self, keyword: &str, message: String) {
        let location = self.schema.origin.location.field(keyword);
        let mark = self.schema.keyword_mark(keyword);
        self.push(message, &location, mark);
    }

    fn push(&mut self, message: String, location: &Location, mark: Mark) {
        self.findings.push(self.context.finding_at(
            message,
            location,
            mark,
            mark,
            NodeRef::Schema(self.schema.id),
        ));
    }

    fn non_negative(&mut self, keyword: &str, value: Option<i64>) {
        if value.is_some_and(|v| v < 0) {
            let message = self.context.message(NON_NEGATIVE, &[keyword]);
            self.report(keyword, message);
        }
    }

    fn ordered(&mut self, min_keyword: &str, min: Option<i64>, max_keyword: &str, max: Option<i64>) {
        if let (Some(min), Some(max)) = (min, max) {
            if max < min {
                let message = self.context.message(NOT_BELOW, &[max_keyword, min_keyword]);
                self.report(max_keyword, message);
            }
        }
    }

    fn fixed(&mut self, keyword: &str, text: &str) {
        let message = self.context.message(text, &[]);
        self.report(keyword, message);
    }

    fn string(&mut self) {
        let schema = self.schema;
        self.non_negative("minLength", schema.min_length);
        self.non_negative("maxLength", schema.max_length);
        self.ordered("minLength", schema.min_length, "maxLength", schema.max_length);
        if let Some(pattern) = &schema.pattern {
            if regress::Regex::new(pattern).is_err() {
                self.fixed("pattern", INVALID_PATTERN);
            }
        }
    }

    fn number(&mut self) {
        let schema = self.schema;
        if schema.multiple_of.is_some_and(|m| m <= 0.0) {
            self.fixed("multipleOf", MULTIPLE_OF);
        }
        if let (Some(min), Some(max)) = (schema.minimum, schema.maximum) {
            if max < min {
                self.fixed("maximum", MAXIMUM);
            }
        }
        if let (Some(ExclusiveBound::Value(min)), Some(ExclusiveBound::Value(max))) =
            (schema.exclusive_minimum, schema.exclusive_maximum)
        {
            if max < min {
                let message = self
                    .context
                    .message(NOT_BELOW, &["exclusiveMaximum", "exclusiveMinimum"]);
                self.report("exclusiveMaximum", message);
            }
        }
    }

    fn array(&mut self) {
        let schema = self.schema;
        self.non_negative("minItems", schema.min_items);
        self.non_negative("maxItems", schema.max_items);
        self.non_negative("minContains", schema.min_contains);
        self.non_negative("maxContains", schema.max_contains);
        self.ordered("minItems", schema.min_items, "maxItems", schema.max_items);
        self.ordered("minContains", schema.min_contains, "maxContains", schema.max_contains);
    }

    fn object(&mut self) {
        let schema = self.schema;
        self.non_negative("minProperties", schema.min_properties);
        self.non_negative("maxProperties", schema.max_properties);
        self.ordered(
            "minProperties",
            schema.min_properties,
            "maxProperties",
            schema.max_properties,
        );

        if schema.required.is_empty() && schema.dependent_required.is_empty() {
            return;
        }
        let defined = defined_properties(self.document, schema);
        self.required(&defined);
        self.dependent_required(&defined);
    }

    fn required(&mut self, defined: &HashSet<&str>) {
        let schema = self.schema;
        if schema.required.is_empty() {
            return;
        }
        if defined.is_empty() {
            self.fixed("required", REQUIRED_WITHOUT_PROPERTIES);
            return;
        }
        let mark = schema.keyword_mark("required");
        let base = schema.origin.location.field("required");
        for (i, name) in schema.required.iter().enumerate() {
            if defined.contains(name.as_str()) {
                continue;
            }
            let message = self.context.message(REQUIRED_UNDEFINED, &[name]);
            self.push(message, &base.index(i), mark);
        }
    }

    fn dependent_required(&mut self, defined: &HashSet<&str>) {
        let schema = self.schema;
        let mark = schema.keyword_mark("dependentRequired");
        let base = schema.origin.location.field("dependentRequired");
        for (key, names) in &schema.dependent_required {
            let location = base.key(key);
            if !defined.contains(key.as_str()) {
                let message = self.context.message(DEPENDENT_UNDEFINED, &[key]);
                self.push(message, &location, mark);
            }
            for name in names {
                if name == key {
                    let message = self.context.message(DEPENDENT_CIRCULAR, &[key]);
                    self.push(message, &location, mark);
                } else if !defined.contains(name.as_str()) {
                    let message = self.context.message(DEPENDENT_UNDEFINED, &[name]);
                    self.push(message, &location, mark);
                }
            }
        }
    }
}

/// Property names declared on `schema` or on any schema reachable through its
/// polymorphic branches.
pub(crate) fn defined_properties<'d>(document: &'d Document, schema: &'d Schema) -> HashSet<&'d str> {
    let mut defined = HashSet::new();
    let mut visited: HashSet<SchemaId> = HashSet::new();
    collect(document, schema, 0, &mut visited, &mut defined);
    defined
}

fn collect<'d>(
    document: &'d Document,
    schema: &'d Schema,
    depth: usize,
    visited: &mut HashSet<SchemaId>,
    defined: &mut HashSet<&'d str>,
) {
    if depth > MAX_REFERENCE_HOPS || !visited.insert(schema.id) {
        return;
    }
    defined.extend(schema.properties.iter().map(|(name, _)| name.as_str()));
    for branch in schema.branches() {
        if let Some(branch) = document.resolve_schema(branch) {
            collect(document, branch, depth + 1, visited, defined);
        }
    }
}
