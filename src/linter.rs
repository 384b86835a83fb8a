//! # Rule Host
//!
//! Runs a set of rules against an immutable OpenAPI document and collects findings.
//!
//! ## Pieces
//!
//! 1. **[`RuleFunction`]** - a named, stateless check: declares its option schema and
//!    category, and turns a [`RuleContext`] into findings
//! 2. **[`Rule`]** - a configured use of a function: id, severity, message override
//!    and string-valued options
//! 3. **[`RuleContext`]** - everything a function may read: the document, the schema
//!    walk, the rule metadata, the cached options and the message-template cache
//! 4. **[`Linter`]** - the host; evaluates every enabled rule concurrently and
//!    aggregates a [`LintReport`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oaslint::document::Document;
//! use oaslint::linter::Linter;
//!
//! let document = Document::from_path("openapi.yaml".as_ref())?;
//! let report = Linter::with_defaults().lint(Arc::new(document));
//! for finding in report.findings() {
//!     eprintln!("{}:{} {} {}", finding.start_line, finding.start_column, finding.rule_id, finding.message);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::{Document, Location, Mark, NodeRef, Origin, SpecVersion};
use crate::locator::{locate, Located};
use crate::rules;
use crate::runtime_config::RuntimeConfig;
use crate::walker::SchemaWalker;
use crate::worker_pool::{Cancellation, Job, WorkerPool, WorkerPoolConfig};


/// Category every rule in this crate belongs to
pub const CATEGORY_OPENAPI: &str = "openapi";

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed
    Error,
    /// Should be fixed
    Warn,
    /// Worth knowing
    Info,
    /// Stylistic nudge
    Hint,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warn" | "warning" => Some(Severity::Warn),
            "info" => Some(Severity::Info),
            "hint" => Some(Severity::Hint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }

    /// True when `self` is as severe as `threshold` or more.
    pub fn at_least(&self, threshold: Severity) -> bool {
        *self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic emitted by a rule for one document location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub message: String,
    pub rule_id: String,
    pub severity: Severity,
    /// Canonical JSON path of the offending node
    pub path: String,
    /// Every equivalent path, canonical first; only set when there is more than one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Unix time in milliseconds
    pub timestamp: u64,
    /// Model node the finding is attached to
    #[serde(skip)]
    pub target: NodeRef,
}

impl Finding {
    pub fn start(&self) -> Mark {
        Mark::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> Mark {
        Mark::new(self.end_line, self.end_column)
    }
}

/// An option a rule function recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOption {
    pub name: &'static str,
    pub description: &'static str,
}

/// What a rule function declares about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFunctionSchema {
    pub name: &'static str,
    pub options: Vec<RuleOption>,
    /// Reported when an option fails type coercion
    pub error_message: &'static str,
}

/// A named, stateless check over a document
pub trait RuleFunction: Send + Sync {
    fn schema(&self) -> RuleFunctionSchema;

    fn category(&self) -> &'static str {
        CATEGORY_OPENAPI
    }

    /// Evaluate against the context. Must never panic on malformed documents and
    /// must be safe to run alongside other rules.
    fn evaluate(&self, context: &RuleContext) -> Vec<Finding>;
}

/// A configured rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    /// Name of the function that implements it
    pub function: String,
    pub description: String,
    pub severity: Severity,
    /// Replaces the function's default message on every finding
    pub message: Option<String>,
    pub options: BTreeMap<String, String>,
}

impl Rule {
    pub fn new(id: impl Into<String>, function: impl Into<String>, severity: Severity) -> Self {
        Rule {
            id: id.into(),
            function: function.into(),
            description: String::new(),
            severity,
            message: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Slot,
}

/// Cache of parsed message templates.
///
/// Templates use `{}` slots filled positionally. Parsing happens once per distinct
/// template; rendering only concatenates.
#[derive(Debug, Default)]
pub struct StringTemplates {
    parsed: RwLock<HashMap<String, Arc<[Piece]>>>,
}

impl StringTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and cache templates ahead of a run so the cache is read-only afterwards.
    pub fn preload<'a>(&self, templates: impl IntoIterator<Item = &'a str>) {
        for template in templates {
            self.pieces(template);
        }
    }

    fn pieces(&self, template: &str) -> Arc<[Piece]> {
        if let Ok(cache) = self.parsed.read() {
            if let Some(pieces) = cache.get(template) {
                return Arc::clone(pieces);
            }
        }
        let mut pieces = Vec::new();
        let mut rest = template;
        while let Some(at) = rest.find("{}") {
            if at > 0 {
                pieces.push(Piece::Literal(rest[..at].to_string()));
            }
            pieces.push(Piece::Slot);
            rest = &rest[at + 2..];
        }
        if !rest.is_empty() {
            pieces.push(Piece::Literal(rest.to_string()));
        }
        let pieces: Arc<[Piece]> = pieces.into();
        if let Ok(mut cache) = self.parsed.write() {
            cache.insert(template.to_string(), Arc::clone(&pieces));
        }
        pieces
    }

    /// Fill `template`'s slots with `args`; missing args leave the slot empty.
    pub fn render(&self, template: &str, args: &[&str]) -> String {
        let mut out = String::with_capacity(template.len() + 16);
        let mut args = args.iter();
        for piece in self.pieces(template).iter() {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Slot => out.push_str(args.next().copied().unwrap_or_default()),
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.parsed.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A malformed option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOption {
    pub name: String,
    pub value: String,
}

/// Immutable view handed to a rule function
#[derive(Clone)]
pub struct RuleContext {
    document: Option<Arc<Document>>,
    walker: SchemaWalker,
    rule: Arc<Rule>,
    options: Arc<BTreeMap<String, String>>,
    error_message: &'static str,
    templates: Arc<StringTemplates>,
    pool: WorkerPoolConfig,
    cancellation: Cancellation,
}

impl fmt::Debug for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("rule", &self.rule.id)
            .field("has_document", &self.document.is_some())
            .field("schemas", &self.walker.len())
            .finish()
    }
}

impl RuleContext {
    /// Build a context for `rule` run by `function`.
    ///
    /// Options the function does not declare are dropped here, so the cached
    /// accessor only ever sees recognized names.
    pub fn new(
        document: Option<Arc<Document>>,
        walker: SchemaWalker,
        rule: Arc<Rule>,
        schema: &RuleFunctionSchema,
        templates: Arc<StringTemplates>,
        pool: WorkerPoolConfig,
        cancellation: Cancellation,
    ) -> Self {
        let options = rule
            .options
            .iter()
            .filter(|(name, _)| schema.options.iter().any(|o| o.name == name.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            document,
            walker,
            rule,
            options: Arc::new(options),
            error_message: schema.error_message,
            templates,
            pool,
            cancellation,
        }
    }

    /// Context for a one-off evaluation, mostly useful in tests.
    pub fn for_document(document: Arc<Document>, rule: Rule, function: &dyn RuleFunction) -> Self {
        let walker = SchemaWalker::new(&document);
        Self::new(
            Some(document),
            walker,
            Arc::new(rule),
            &function.schema(),
            Arc::new(StringTemplates::new()),
            WorkerPoolConfig::default(),
            Cancellation::new(),
        )
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_deref()
    }

    pub fn spec_version(&self) -> Option<SpecVersion> {
        self.document.as_ref().map(|d| d.spec_version)
    }

    pub fn walker(&self) -> &SchemaWalker {
        &self.walker
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn templates(&self) -> &StringTemplates {
        &self.templates
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Value of a recognized option.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Integer value of a recognized option, `Ok(None)` when unset.
    pub fn int_option(&self, name: &str) -> Result<Option<i64>, InvalidOption> {
        match self.option(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| InvalidOption {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// A worker pool for fanning this rule's work out.
    pub fn pool(&self, name: &str) -> WorkerPool {
        WorkerPool::new(
            format!("{}:{}", self.rule.id, name),
            self.pool,
            self.cancellation.clone(),
        )
    }

    /// The configured message override, or `template` filled with `args`.
    pub fn message(&self, template: &str, args: &[&str]) -> String {
        match &self.rule.message {
            Some(message) => message.clone(),
            None => self.templates.render(template, args),
        }
    }

    /// Build a finding at `location`, anchored on `start`..`end`.
    pub fn finding_at(
        &self,
        message: String,
        location: &Location,
        start: Mark,
        end: Mark,
        target: NodeRef,
    ) -> Finding {
        let located = match self.document() {
            Some(document) => locate(document, location),
            None => Located {
                path: location.path(),
                paths: vec![location.path()],
            },
        };
        Finding {
            message,
            rule_id: self.rule.id.clone(),
            severity: self.rule.severity,
            paths: located.alternates(),
            path: located.path,
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
            origin: None,
            timestamp: now_millis(),
            target,
        }
    }

    /// Build a finding for a model object anchored on its key node.
    pub fn finding(&self, message: String, origin: &Origin, target: NodeRef) -> Finding {
        self.finding_at(message, &origin.location, origin.key_mark, origin.end, target)
    }

    /// The single finding a rule emits when its options cannot be coerced.
    pub fn invalid_options(&self, invalid: &InvalidOption) -> Finding {
        warn!(
            rule = %self.rule.id,
            option = %invalid.name,
            value = %invalid.value,
            "Invalid rule option"
        );
        self.finding_at(
            self.error_message.to_string(),
            &Location::root(),
            Mark::new(1, 1),
            Mark::new(1, 1),
            NodeRef::Document,
        )
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Findings of one run, with an index from model node to attached findings
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    findings: Vec<Finding>,
    attached: HashMap<NodeRef, Vec<usize>>,
    rules_run: usize,
}

impl LintReport {
    fn new(mut findings: Vec<Finding>, rules_run: usize) -> Self {
        findings.sort_by(|a, b| {
            (&a.rule_id, &a.path, a.start_line, a.start_column, &a.message).cmp(&(
                &b.rule_id,
                &b.path,
                b.start_line,
                b.start_column,
                &b.message,
            ))
        });
        let mut attached: HashMap<NodeRef, Vec<usize>> = HashMap::new();
        for (i, finding) in findings.iter().enumerate() {
            attached.entry(finding.target).or_default().push(i);
        }
        Self {
            findings,
            attached,
            rules_run,
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    /// Findings attached to a model node.
    pub fn findings_for(&self, node: NodeRef) -> Vec<&Finding> {
        self.attached
            .get(&node)
            .map(|ids| ids.iter().filter_map(|i| self.findings.get(*i)).collect())
            .unwrap_or_default()
    }

    pub fn by_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// True when any finding is at least as severe as `threshold`.
    pub fn has_at_least(&self, threshold: Severity) -> bool {
        self.findings.iter().any(|f| f.severity.at_least(threshold))
    }

    pub fn rules_run(&self) -> usize {
        self.rules_run
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }
}

/// The rule host
pub struct Linter {
    functions: HashMap<&'static str, Arc<dyn RuleFunction>>,
    rules: Vec<Arc<Rule>>,
    runtime: RuntimeConfig,
    cancellation: Cancellation,
}

impl Linter {
    /// Host for `rules` backed by the built-in functions.
    pub fn new(rules: Vec<Rule>, runtime: RuntimeConfig) -> Self {
        let functions = rules::builtin_functions()
            .into_iter()
            .map(|f| (f.schema().name, f))
            .collect();
        Self {
            functions,
            rules: rules.into_iter().map(Arc::new).collect(),
            runtime,
            cancellation: Cancellation::new(),
        }
    }

    /// Every built-in rule with its default severity and runtime settings from the environment.
    pub fn with_defaults() -> Self {
        Self::new(rules::default_rules(), RuntimeConfig::from_env())
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Handle that stops the run between sub-tasks.
    pub fn cancellation(&self) -> Cancellation {
        self.cancellation.clone()
    }

    /// Evaluate every rule against `document`.
    pub fn lint(&self, document: Arc<Document>) -> LintReport {
        self.run(Some(document))
    }

    /// Evaluate with no document model available. Every rule returns nothing.
    pub fn lint_nothing(&self) -> LintReport {
        self.run(None)
    }

    fn run(&self, document: Option<Arc<Document>>) -> LintReport {
        // shared caches are filled here and only read once rules start
        let walker = document
            .as_deref()
            .map(SchemaWalker::new)
            .unwrap_or_default();
        let templates = Arc::new(StringTemplates::new());
        templates.preload(rules::MESSAGE_TEMPLATES.iter().copied());

        let rule_pool = WorkerPoolConfig::new(
            self.runtime.workers,
            self.runtime.stack_size,
            None,
        );
        let inner_pool = WorkerPoolConfig::from(self.runtime);

        let mut jobs: Vec<Job<Finding>> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let Some(function) = self.functions.get(rule.function.as_str()) else {
                warn!(rule = %rule.id, function = %rule.function, "No such rule function, skipping");
                continue;
            };
            let function = Arc::clone(function);
            let context = RuleContext::new(
                document.clone(),
                walker.clone(),
                Arc::clone(rule),
                &function.schema(),
                Arc::clone(&templates),
                inner_pool,
                self.cancellation.clone(),
            );
            jobs.push(Box::new(move || {
                let findings = function.evaluate(&context);
                debug!(
                    rule = %context.rule().id,
                    findings = findings.len(),
                    "Rule evaluated"
                );
                findings
            }));
        }

        let rules_run = jobs.len();
        let pool = WorkerPool::new("rules", rule_pool, self.cancellation.clone());
        let report = LintReport::new(pool.run(jobs), rules_run);
        info!(
            rules = rules_run,
            findings = report.len(),
            errors = report.count(Severity::Error),
            warnings = report.count(Severity::Warn),
            "Lint run complete"
        );
        report
    }
}
