//! # CLI Module
//!
//! Command-line interface of the `oaslint` binary.
//!
//! ## Commands
//!
//! ### `lint`
//!
//! Lint an OpenAPI 2.0, 3.0 or 3.1 document:
//!
//! ```bash
//! oaslint lint openapi.yaml
//! ```
//!
//! Options:
//! - `--ruleset <FILE>` - Rule configuration; defaults to `.oaslint.yaml` next to the document
//! - `--rule <ID>` - Run only this rule (repeatable)
//! - `--format <text|json>` - Output format (default: text)
//! - `--fail-severity <error|warn|info|hint|none>` - Exit non-zero when a finding is at
//!   least this severe (default: error)
//! - `--errors-only` - Show only error findings
//! - `--workers <N>` / `--rule-timeout-ms <MS>` - Override `OASLINT_WORKERS` and
//!   `OASLINT_RULE_TIMEOUT_MS`
//!
//! ### `rules`
//!
//! List every built-in rule with its default severity and options:
//!
//! ```bash
//! oaslint rules --format json
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use oaslint::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let outcome = run_cli(&cli, &mut std::io::stdout().lock())?;
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands, FailSeverity, Outcome, RuleSummary};
