//! # Position-Aware YAML Node Tree
//!
//! The linter needs line/column information for every key and value it reports on,
//! which `serde_yaml` does not expose. This module drives `yaml-rust2`'s marked
//! event stream and assembles a small tree where every node remembers where it
//! started and ended in the source.
//!
//! Scalars are resolved with the YAML 1.2 core schema. Quoted scalars and scalars
//! tagged `!!str` or `!!timestamp` always stay strings, so a bare date such as
//! `2024-01-01` never turns into anything other than text.

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use super::LoadError;

/// Depth ceiling for key-normalization and JSON conversion passes.
pub const MAX_CONVERSION_DEPTH: usize = 500;

/// Ceiling on the number of nodes a document may copy in through aliases.
pub const MAX_ALIAS_NODES: usize = 100_000;

/// A 1-based line/column position in the source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mark {
    pub line: usize,
    pub column: usize,
}

impl Mark {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn from_marker(marker: &Marker) -> Self {
        Self {
            line: marker.line(),
            column: marker.col() + 1,
        }
    }
}

/// The value held by a [`Node`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Node>),
    /// Ordered entries; keys are full nodes so their marks survive.
    Mapping(Vec<(Node, Node)>),
}

/// One node of the parsed document
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: Value,
    /// Where the node starts
    pub mark: Mark,
    /// Where the node ends (best effort for scalars)
    pub end: Mark,
}

impl Node {
    pub fn new(value: Value, mark: Mark, end: Mark) -> Self {
        Self { value, mark, end }
    }

    /// Parse a YAML (or JSON) document into a node tree.
    ///
    /// Only the first document of a multi-document stream is read.
    pub fn parse(source: &str) -> Result<Node, LoadError> {
        let mut builder = TreeBuilder::default();
        let mut parser = Parser::new_from_str(source);
        parser
            .load(&mut builder, false)
            .map_err(|e| LoadError::Syntax {
                line: e.marker().line(),
                column: e.marker().col() + 1,
                message: e.to_string(),
            })?;
        if let Some(mark) = builder.exhausted {
            return Err(LoadError::AliasLimit {
                line: mark.line,
                column: mark.column,
            });
        }
        builder.root.ok_or(LoadError::Empty)
    }

    /// Look up the value stored under `key` in a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entry(key).map(|(_, v)| v)
    }

    /// Look up the key node and value node stored under `key`.
    pub fn entry(&self, key: &str) -> Option<(&Node, &Node)> {
        match &self.value {
            Value::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(k, v)| (k, v)),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.value {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.value {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.value {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.value, Value::Mapping(_))
    }

    /// Iterate the string keys of a mapping node with their key and value nodes.
    pub fn entries(&self) -> impl Iterator<Item = (String, &Node, &Node)> {
        self.as_mapping()
            .unwrap_or(&[])
            .iter()
            .map(|(k, v)| (k.key_text(), k, v))
    }

    /// Render a node as a mapping key. Non-string scalars are coerced to their
    /// textual form; collections used as keys collapse to compact JSON.
    pub fn key_text(&self) -> String {
        match &self.value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(_) | Value::Mapping(_) => self.to_json().to_string(),
        }
    }

    /// Convert to a JSON value, coercing every mapping key to a string.
    pub fn to_json(&self) -> JsonValue {
        self.to_json_bounded(0)
    }

    fn to_json_bounded(&self, depth: usize) -> JsonValue {
        if depth > MAX_CONVERSION_DEPTH {
            return JsonValue::Null;
        }
        match &self.value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Sequence(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| item.to_json_bounded(depth + 1))
                    .collect(),
            ),
            Value::Mapping(entries) => {
                let mut map = JsonMap::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k.key_text(), v.to_json_bounded(depth + 1));
                }
                JsonValue::Object(map)
            }
        }
    }
}

enum Frame {
    Sequence {
        items: Vec<Node>,
        mark: Mark,
        anchor: usize,
    },
    Mapping {
        entries: Vec<(Node, Node)>,
        pending_key: Option<Node>,
        mark: Mark,
        anchor: usize,
    },
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    /// Anchored nodes with their node counts
    anchors: HashMap<usize, (Node, usize)>,
    /// Nodes copied in through aliases so far
    expanded: usize,
    /// Where the alias budget ran out
    exhausted: Option<Mark>,
    root: Option<Node>,
}

fn node_count(node: &Node) -> usize {
    let mut count = 0;
    let mut pending = vec![node];
    while let Some(node) = pending.pop() {
        count += 1;
        match &node.value {
            Value::Sequence(items) => pending.extend(items),
            Value::Mapping(entries) => {
                for (k, v) in entries {
                    pending.push(k);
                    pending.push(v);
                }
            }
            _ => {}
        }
    }
    count
}

impl TreeBuilder {
    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => *pending_key = Some(node),
            },
        }
    }

    fn remember(&mut self, anchor: usize, node: &Node) {
        if anchor > 0 {
            self.anchors.insert(anchor, (node.clone(), node_count(node)));
        }
    }

    /// The anchored node for `id`, or null once the alias budget is spent.
    fn expand(&mut self, id: usize, mark: Mark) -> Node {
        let null = Node::new(Value::Null, mark, mark);
        if self.exhausted.is_some() {
            return null;
        }
        // unknown anchors degrade to null rather than failing the load
        let Some((node, size)) = self.anchors.get(&id) else {
            return null;
        };
        if self.expanded + size > MAX_ALIAS_NODES {
            self.exhausted = Some(mark);
            return null;
        }
        self.expanded += size;
        node.clone()
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        let mark = Mark::from_marker(&marker);
        match ev {
            Event::Scalar(text, style, anchor, tag) => {
                let forced_string = tag
                    .as_ref()
                    .map(|t| matches!(t.suffix.as_str(), "str" | "timestamp" | "binary"))
                    .unwrap_or(false);
                let end = Mark::new(mark.line, mark.column + text.chars().count());
                let value = if forced_string || style != TScalarStyle::Plain {
                    Value::String(text)
                } else {
                    resolve_plain(text)
                };
                let node = Node::new(value, mark, end);
                self.remember(anchor, &node);
                self.push(node);
            }
            Event::SequenceStart(anchor, _) => self.stack.push(Frame::Sequence {
                items: Vec::new(),
                mark,
                anchor,
            }),
            Event::MappingStart(anchor, _) => self.stack.push(Frame::Mapping {
                entries: Vec::new(),
                pending_key: None,
                mark,
                anchor,
            }),
            Event::SequenceEnd | Event::MappingEnd => {
                let node = match self.stack.pop() {
                    Some(Frame::Sequence {
                        items,
                        mark: start,
                        anchor,
                    }) => (Node::new(Value::Sequence(items), start, mark), anchor),
                    Some(Frame::Mapping {
                        entries,
                        mark: start,
                        anchor,
                        ..
                    }) => (Node::new(Value::Mapping(entries), start, mark), anchor),
                    None => return,
                };
                self.remember(node.1, &node.0);
                self.push(node.0);
            }
            Event::Alias(id) => {
                let node = self.expand(id, mark);
                self.push(node);
            }
            _ => {}
        }
    }
}

fn resolve_plain(text: String) -> Value {
    match text.as_str() {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Value::Float(f64::INFINITY)
        }
        "-.inf" | "-.Inf" | "-.INF" => return Value::Float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Value::Float(f64::NAN),
        _ => {}
    }
    if let Some(hex) = text.strip_prefix("0x") {
        if let Ok(i) = i64::from_str_radix(hex, 16) {
            return Value::Integer(i);
        }
    }
    if let Some(oct) = text.strip_prefix("0o") {
        if let Ok(i) = i64::from_str_radix(oct, 8) {
            return Value::Integer(i);
        }
    }
    if looks_numeric(&text) {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(text)
}

/// Guards against Rust's float parser accepting words like `inf` or `NaN`.
fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => {}
        Some('.') => {
            if !chars.next().is_some_and(|c| c.is_ascii_digit()) {
                return false;
            }
        }
        _ => return false,
    }
    body.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}
