use crate::document::Document;
use crate::linter::{Linter, RuleOption, Severity, CATEGORY_OPENAPI};
use crate::report::{self, OutputFormat};
use crate::rules;
use crate::ruleset;
use crate::runtime_config::RuntimeConfig;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Command-line interface for oaslint
#[derive(Parser, Debug)]
#[command(name = "oaslint", version)]
#[command(about = "Lint OpenAPI documents", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint an OpenAPI specification
    ///
    /// Runs every enabled rule and prints the findings. The exit code is non-zero
    /// when any finding reaches the fail severity.
    Lint {
        /// Path to the OpenAPI document (YAML or JSON)
        spec: PathBuf,

        /// Ruleset file; `.oaslint.yaml` next to the document is used when omitted
        #[arg(long)]
        ruleset: Option<PathBuf>,

        /// Run only these rules (repeatable)
        #[arg(long = "rule", value_name = "ID")]
        rules: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Lowest severity that fails the run
        #[arg(long, value_enum, default_value_t = FailSeverity::Error)]
        fail_severity: FailSeverity,

        /// Show only errors (hide warnings, info and hints)
        #[arg(long, default_value_t = false)]
        errors_only: bool,

        /// Worker coroutines per pool
        #[arg(long)]
        workers: Option<usize>,

        /// Deadline for a single rule in milliseconds, 0 disables it
        #[arg(long)]
        rule_timeout_ms: Option<u64>,
    },
    /// List the built-in rules
    Rules {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Threshold for a failing exit code
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailSeverity {
    Error,
    Warn,
    Info,
    Hint,
    /// Never fail on findings
    None,
}

impl FailSeverity {
    pub fn threshold(self) -> Option<Severity> {
        match self {
            FailSeverity::Error => Some(Severity::Error),
            FailSeverity::Warn => Some(Severity::Warn),
            FailSeverity::Info => Some(Severity::Info),
            FailSeverity::Hint => Some(Severity::Hint),
            FailSeverity::None => None,
        }
    }
}

/// How a command ended
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// Findings reached the fail severity
    Failed,
}

/// One row of `oaslint rules`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    pub id: &'static str,
    pub function: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub options: Vec<RuleOption>,
}

/// Every built-in rule, in definition order
pub fn rule_summaries() -> Vec<RuleSummary> {
    let functions = rules::builtin_functions();
    rules::DEFINITIONS
        .iter()
        .map(|definition| {
            let function = functions
                .iter()
                .find(|f| f.schema().name == definition.id);
            RuleSummary {
                id: definition.id,
                function: function.map_or(definition.id, |f| f.schema().name),
                category: function.map_or(CATEGORY_OPENAPI, |f| f.category()),
                severity: definition.severity,
                description: definition.description,
                options: function.map(|f| f.schema().options).unwrap_or_default(),
            }
        })
        .collect()
}

/// Execute the CLI command, writing the report to `out`
///
/// # Errors
///
/// Returns an error if:
/// - The OpenAPI document cannot be read or parsed
/// - The ruleset cannot be read or is invalid
/// - `--rule` names a rule that does not exist
/// - Writing the report fails
pub fn run_cli<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<Outcome> {
    match &cli.command {
        Commands::Lint {
            spec,
            ruleset,
            rules: only,
            format,
            fail_severity,
            errors_only,
            workers,
            rule_timeout_ms,
        } => {
            let mut selected = ruleset::resolve_rules(ruleset.as_deref(), spec)
                .context("Failed to load ruleset")?;
            if !only.is_empty() {
                for id in only {
                    if rules::definition(id).is_none() {
                        bail!("unknown rule `{}`", id);
                    }
                }
                selected.retain(|rule| only.contains(&rule.id));
            }

            let mut runtime = RuntimeConfig::from_env();
            if let Some(workers) = workers {
                runtime.workers = (*workers).max(1);
            }
            if let Some(ms) = rule_timeout_ms {
                runtime.rule_timeout = (*ms > 0).then(|| Duration::from_millis(*ms));
            }

            let document = Document::from_path(spec)
                .with_context(|| format!("Failed to load {}", spec.display()))?;
            let lint_report = Linter::new(selected, runtime).lint(Arc::new(document));
            info!(
                spec = %spec.display(),
                rules = lint_report.rules_run(),
                findings = lint_report.len(),
                errors = lint_report.count(Severity::Error),
                "Lint finished"
            );

            let mut findings = lint_report.into_findings();
            if *errors_only {
                findings.retain(|f| f.severity == Severity::Error);
            }
            report::write_report(out, *format, &findings).context("Failed to write report")?;

            if report::should_fail(&findings, fail_severity.threshold()) {
                Ok(Outcome::Failed)
            } else {
                Ok(Outcome::Clean)
            }
        }
        Commands::Rules { format } => {
            let summaries = rule_summaries();
            match format {
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &summaries)?;
                    writeln!(out)?;
                }
                OutputFormat::Text => {
                    for summary in &summaries {
                        writeln!(
                            out,
                            "{:<26} {:<6} {}",
                            summary.id,
                            summary.severity.as_str(),
                            summary.description
                        )?;
                        for option in &summary.options {
                            writeln!(out, "{:<26} option `{}`: {}", "", option.name, option.description)?;
                        }
                    }
                }
            }
            Ok(Outcome::Clean)
        }
    }
}
