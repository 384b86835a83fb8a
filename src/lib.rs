//! # oaslint
//!
//! **oaslint** is a rule-based linter for OpenAPI 2.0 (Swagger), 3.0 and 3.1 documents.
//!
//! ## Overview
//!
//! A document is loaded once into an immutable, position-aware model. A set of
//! configured rules then runs over it concurrently on `may` coroutines, and every
//! rule emits findings carrying a message, a canonical JSON path and a line/column
//! range.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`document`]** - YAML/JSON loading, the document model, `$ref` resolution and the reference index
//! - **[`walker`]** - Collects every distinct schema in the document, once
//! - **[`locator`]** - Maps a node to every JSON path under which it is reachable
//! - **[`linter`]** - The rule host: rule function contract, evaluation context, findings and reports
//! - **[`rules`]** - The built-in rules
//! - **[`example_validator`]** - Validates example values against JSON Schema
//! - **[`ambiguity`]** - Decides whether two path templates can match the same URL
//! - **[`ruleset`]** - YAML rule configuration
//! - **[`report`]** - Text and JSON output
//! - **[`worker_pool`]** - Coroutine pools rules fan their work out to
//! - **[`runtime_config`]** / **[`logging`]** - Environment-driven configuration
//! - **[`cli`]** - The `oaslint` command line
//!
//! ### Lint Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(oaslint lint)
//!     participant Doc as document::Document
//!     participant Host as linter::Linter
//!     participant Pool as worker_pool::WorkerPool
//!     participant Rule as rules::*
//!
//!     User->>CLI: oaslint lint openapi.yaml
//!     CLI->>CLI: ruleset::resolve_rules
//!     CLI->>Doc: Document::from_path
//!     Doc->>Doc: Parse with marks, build model,<br/>resolve $ref, index references
//!     CLI->>Host: lint(document)
//!     Host->>Host: Walk schemas, preload templates
//!     Host->>Pool: one job per rule
//!     Pool->>Rule: evaluate(context)
//!     Rule->>Pool: sub-jobs (examples, schemas)
//!     Rule-->>Host: findings
//!     Host-->>CLI: LintReport (sorted)
//!     CLI-->>User: text or JSON, exit code
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oaslint::document::Document;
//! use oaslint::linter::{Linter, Severity};
//!
//! let document = Document::from_path("openapi.yaml".as_ref())?;
//! let report = Linter::with_defaults().lint(Arc::new(document));
//! if report.has_at_least(Severity::Error) {
//!     std::process::exit(1);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod ambiguity;
pub mod cli;
pub mod document;
pub mod example_validator;
pub mod linter;
pub mod locator;
pub mod logging;
pub mod report;
pub mod rules;
pub mod ruleset;
pub mod runtime_config;
pub mod walker;
pub mod worker_pool;

pub use document::{Document, LoadError};
pub use linter::{Finding, LintReport, Linter, Rule, Severity};
pub use ruleset::{Ruleset, RulesetError};
