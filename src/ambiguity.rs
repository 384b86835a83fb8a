//! # Ambiguous Path Analysis
//!
//! Two URL templates are ambiguous when at least one concrete URL matches both.
//! Templates are compared segment by segment; a `{variable}` segment matches a
//! literal only when the literal parses as the variable's declared type, and two
//! variables match unless their declared types are incompatible.
//!
//! A pair that mixes orientations (a literal facing a variable at one position and
//! a variable facing a literal at another) is not reported: each template pins a
//! segment the other leaves open.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Document, PathItem};

static VARIABLE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\{([^{}]+)\}$").ok());

/// Declared types of a template's path parameters, keyed by parameter name.
pub type ParameterTypes = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part<'a> {
    Literal(&'a str),
    Variable(&'a str),
}

fn parts(template: &str) -> Vec<Part<'_>> {
    template
        .split('/')
        .skip(1)
        .map(|segment| {
            let variable = VARIABLE
                .as_ref()
                .and_then(|re| re.captures(segment))
                .and_then(|c| c.get(1));
            match variable {
                Some(name) => Part::Variable(name.as_str()),
                None => Part::Literal(segment),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// First template holds the variable
    VariableLiteral,
    /// Second template holds the variable
    LiteralVariable,
}

/// Whether `literal` could be a value of a parameter declared as `declared`.
pub fn literal_fits(literal: &str, declared: Option<&str>) -> bool {
    match declared.unwrap_or_default() {
        "integer" => {
            let digits = literal.strip_prefix('-').unwrap_or(literal);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        "number" => {
            let digits = literal.strip_prefix('-').unwrap_or(literal);
            digits.chars().any(|c| c.is_ascii_digit())
                && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
                && digits.matches('.').count() <= 1
        }
        "boolean" => literal == "true" || literal == "false",
        _ => true,
    }
}

fn types_compatible(a: &str, b: &str) -> bool {
    let numeric = |t: &str| t == "integer" || t == "number";
    a == b || (numeric(a) && numeric(b))
}

/// Whether two templates can match the same URL.
pub fn ambiguous(a: &str, a_types: &ParameterTypes, b: &str, b_types: &ParameterTypes) -> bool {
    let a_parts = parts(a);
    let b_parts = parts(b);
    if a_parts.len() != b_parts.len() {
        return false;
    }

    let mut mixed: Vec<Orientation> = Vec::new();
    for (left, right) in a_parts.iter().zip(b_parts.iter()) {
        match (left, right) {
            (Part::Literal(x), Part::Literal(y)) => {
                if x != y {
                    return false;
                }
            }
            (Part::Variable(x), Part::Variable(y)) => {
                if let (Some(tx), Some(ty)) = (a_types.get(*x), b_types.get(*y)) {
                    if !types_compatible(tx, ty) {
                        return false;
                    }
                }
            }
            (Part::Variable(x), Part::Literal(literal)) => {
                if !literal_fits(literal, a_types.get(*x).map(String::as_str)) {
                    return false;
                }
                mixed.push(Orientation::VariableLiteral);
            }
            (Part::Literal(literal), Part::Variable(y)) => {
                if !literal_fits(literal, b_types.get(*y).map(String::as_str)) {
                    return false;
                }
                mixed.push(Orientation::LiteralVariable);
            }
        }
    }

    let opposed = mixed.contains(&Orientation::VariableLiteral)
        && mixed.contains(&Orientation::LiteralVariable);
    !opposed
}

/// Path parameter types of a path item: path-level parameters first, then each
/// operation's, the first declaration of a name winning.
pub fn parameter_types(document: &Document, item: &PathItem) -> ParameterTypes {
    let mut types = ParameterTypes::new();
    let declared = item
        .parameters
        .iter()
        .chain(item.operations.iter().flat_map(|op| op.parameters.iter()));
    for id in declared {
        let Some(parameter) = document.parameter(*id) else {
            continue;
        };
        if parameter.location_in.as_deref() != Some("path") || types.contains_key(&parameter.name) {
            continue;
        }
        let declared_type = parameter
            .schema
            .as_ref()
            .and_then(|proxy| document.resolve_schema(proxy))
            .and_then(|schema| schema.schema_type.first().cloned());
        if let Some(declared_type) = declared_type {
            types.insert(parameter.name.clone(), declared_type);
        }
    }
    types
}

/// Every ambiguous pair of path items as `(earlier, later)` indexes into `document.paths`.
pub fn ambiguous_pairs(document: &Document) -> Vec<(usize, usize)> {
    let types: Vec<ParameterTypes> = document
        .paths
        .iter()
        .map(|item| parameter_types(document, item))
        .collect();
    let mut pairs = Vec::new();
    for (later, item) in document.paths.iter().enumerate() {
        for (earlier, seen) in document.paths[..later].iter().enumerate() {
            if ambiguous(&seen.path, &types[earlier], &item.path, &types[later]) {
                pairs.push((earlier, later));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn untyped(a: &str, b: &str) -> bool {
        ambiguous(a, &ParameterTypes::new(), b, &ParameterTypes::new())
    }

    fn typed(pairs: &[(&str, &str)]) -> ParameterTypes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_literal_against_variable() {
        assert!(untyped("/foo/{x}", "/foo/bar"));
        assert!(untyped("/foo/bar", "/foo/{x}"));
    }

    #[test]
    fn test_opposite_orientations_never_collide() {
        assert!(!untyped("/a/{x}/b/c/{y}", "/a/{x}/b/{z}/d"));
    }

    #[test]
    fn test_different_lengths_and_literals() {
        assert!(!untyped("/foo", "/foo/{x}"));
        assert!(!untyped("/foo/bar", "/foo/baz"));
        assert!(untyped("/foo/bar", "/foo/bar"));
    }

    #[test]
    fn test_literal_must_parse_as_declared_type() {
        let ids = typed(&[("id", "integer")]);
        assert!(!ambiguous("/pets/{id}", &ids, "/pets/mine", &ParameterTypes::new()));
        assert!(ambiguous("/pets/{id}", &ids, "/pets/42", &ParameterTypes::new()));
        assert!(ambiguous("/pets/{id}", &ids, "/pets/-3", &ParameterTypes::new()));
    }

    #[test]
    fn test_variable_types_must_agree() {
        let int = typed(&[("id", "integer")]);
        let num = typed(&[("key", "number")]);
        let text = typed(&[("name", "string")]);
        assert!(ambiguous("/p/{id}", &int, "/p/{key}", &num));
        assert!(!ambiguous("/p/{id}", &int, "/p/{name}", &text));
        assert!(ambiguous("/p/{id}", &int, "/p/{other}", &ParameterTypes::new()));
    }

    #[test]
    fn test_literal_fits() {
        assert!(literal_fits("12", Some("integer")));
        assert!(!literal_fits("1.5", Some("integer")));
        assert!(literal_fits("1.5", Some("number")));
        assert!(!literal_fits("1.5.1", Some("number")));
        assert!(!literal_fits("-", Some("number")));
        assert!(literal_fits("true", Some("boolean")));
        assert!(!literal_fits("yes", Some("boolean")));
        assert!(literal_fits("anything", Some("string")));
        assert!(literal_fits("anything", None));
    }

    #[test]
    fn test_parameter_types_from_document() {
        let source = r#"openapi: 3.0.3
paths:
  /pets/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema:
          type: integer
    get:
      responses: {}
  /pets/mine:
    get:
      responses: {}
  /owners/{owner}:
    get:
      parameters:
        - name: owner
          in: path
          required: true
          schema:
            type: string
      responses: {}
"#;
        let doc = Document::parse(source).unwrap();
        let types = parameter_types(&doc, &doc.paths[0]);
        assert_eq!(types.get("id").map(String::as_str), Some("integer"));
        let types = parameter_types(&doc, &doc.paths[2]);
        assert_eq!(types.get("owner").map(String::as_str), Some("string"));
        assert!(ambiguous_pairs(&doc).is_empty());
    }
}
