//! Rule configuration
//!
//! A ruleset is a YAML file that switches built-in rules on or off, changes their
//! severity, overrides their message, and passes options:
//!
//! ```yaml
//! rules:
//!   camelCaseProperties: false
//!   schemaTypeCheck: warn
//!   oasComponentDescriptions:
//!     severity: error
//!     message: "describe your components"
//!     options:
//!       minWords: 3
//! ```
//!
//! Rules not mentioned keep their defaults. Unknown rule ids are logged and ignored.
//! When no ruleset is given on the command line, `.oaslint.yaml` next to the
//! document is picked up if present.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::linter::{Rule, Severity};
use crate::rules;

/// File name looked up alongside the document
pub const RULESET_FILE_NAME: &str = ".oaslint.yaml";

#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("failed to read ruleset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ruleset: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("rule `{rule}`: unknown severity `{value}`")]
    InvalidSeverity { rule: String, value: String },

    #[error("rule `{rule}`: option `{name}` must be a string, number or boolean")]
    InvalidOption { rule: String, name: String },
}

/// How one rule is configured
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleEntry {
    /// `rule: true` / `rule: false`
    Toggle(bool),
    /// `rule: warn`, or `rule: off` to disable
    Level(String),
    /// Full form
    Full(RuleConfig),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// A parsed ruleset file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Ruleset {
    #[serde(default)]
    pub rules: BTreeMap<String, RuleEntry>,
}

impl Ruleset {
    pub fn parse(text: &str) -> Result<Self, RulesetError> {
        // an empty file is an empty ruleset
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, RulesetError> {
        let text = std::fs::read_to_string(path).map_err(|source| RulesetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loading ruleset");
        Self::parse(&text)
    }

    /// The default rules with this ruleset applied, in definition order.
    pub fn apply(&self) -> Result<Vec<Rule>, RulesetError> {
        for id in self.rules.keys() {
            if rules::definition(id).is_none() {
                warn!(rule = %id, "Unknown rule in ruleset, ignoring");
            }
        }

        let mut out = Vec::new();
        for rule in rules::default_rules() {
            let Some(entry) = self.rules.get(&rule.id) else {
                out.push(rule);
                continue;
            };
            if let Some(rule) = configure(rule, entry)? {
                out.push(rule);
            }
        }
        Ok(out)
    }
}

fn severity(rule: &str, value: &str) -> Result<Severity, RulesetError> {
    Severity::parse(value).ok_or_else(|| RulesetError::InvalidSeverity {
        rule: rule.to_string(),
        value: value.to_string(),
    })
}

fn option_value(rule: &str, name: &str, value: &serde_yaml::Value) -> Result<String, RulesetError> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(RulesetError::InvalidOption {
            rule: rule.to_string(),
            name: name.to_string(),
        }),
    }
}

/// `None` when the entry disables the rule.
fn configure(mut rule: Rule, entry: &RuleEntry) -> Result<Option<Rule>, RulesetError> {
    match entry {
        RuleEntry::Toggle(enabled) => Ok(enabled.then_some(rule)),
        RuleEntry::Level(level) if level.eq_ignore_ascii_case("off") => Ok(None),
        RuleEntry::Level(level) => {
            rule.severity = severity(&rule.id, level)?;
            Ok(Some(rule))
        }
        RuleEntry::Full(config) => {
            if !config.enabled {
                return Ok(None);
            }
            if let Some(level) = &config.severity {
                rule.severity = severity(&rule.id, level)?;
            }
            if let Some(message) = &config.message {
                rule.message = Some(message.clone());
            }
            for (name, value) in &config.options {
                let value = option_value(&rule.id, name, value)?;
                rule.options.insert(name.clone(), value);
            }
            Ok(Some(rule))
        }
    }
}

/// `.oaslint.yaml` in the document's directory, if there is one
pub fn auto_detect_ruleset(spec_path: &Path) -> Option<PathBuf> {
    let path = spec_path.parent()?.join(RULESET_FILE_NAME);
    path.exists().then_some(path)
}

/// Rules for a run
///
/// Priority:
/// 1. Explicitly provided ruleset
/// 2. Ruleset auto-detected alongside the document
/// 3. Built-in defaults
pub fn resolve_rules(explicit: Option<&Path>, spec_path: &Path) -> Result<Vec<Rule>, RulesetError> {
    match explicit
        .map(Path::to_path_buf)
        .or_else(|| auto_detect_ruleset(spec_path))
    {
        Some(path) => Ruleset::from_path(&path)?.apply(),
        None => Ok(rules::default_rules()),
    }
}
