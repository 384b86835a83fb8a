//! Structured logging for the linter
//!
//! Logs go to stderr so that report output on stdout stays machine-readable.
//! Everything is configured from the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `OASLINT_LOG_LEVEL` | `warn` | trace/debug/info/warn/error |
//! | `OASLINT_LOG_FORMAT` | `pretty` | `json` or `pretty` |
//! | `OASLINT_LOG_ASYNC` | `false` | buffer output through a background writer |
//! | `OASLINT_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `OASLINT_LOG_INCLUDE_LOCATION` | `false` | add file:line to every event |
//!
//! `RUST_LOG`, when set, replaces the level entirely.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for pipelines, pretty-print for people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Enable async buffered logging
    pub async_logging: bool,
    /// Module filter (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("OASLINT_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("OASLINT_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: lookup("OASLINT_LOG_ASYNC")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: lookup("OASLINT_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("OASLINT_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// The configured level, falling back to `warn` for anything unrecognized
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }

    /// Extra filter directives, in order; malformed entries are dropped
    pub fn directives(&self) -> Vec<String> {
        let Some(filter) = &self.target_filter else {
            return Vec::new();
        };
        filter
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .filter(|d| {
                let valid = d.parse::<tracing_subscriber::filter::Directive>().is_ok();
                if !valid {
                    eprintln!("Warning: Invalid log filter directive: {}", d);
                }
                valid
            })
            .map(str::to_string)
            .collect()
    }
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    for directive in config.directives() {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Install the global subscriber.
///
/// With async logging enabled the returned guard owns the background writer; keep
/// it alive until the process is done logging so buffered lines are flushed.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Pretty); // Default
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level(), Level::WARN);
        assert!(!config.async_logging);
        assert!(config.directives().is_empty());
    }

    #[test]
    fn test_log_config_from_variables() {
        let config = LogConfig::from_lookup(lookup(&[
            ("OASLINT_LOG_LEVEL", "DEBUG"),
            ("OASLINT_LOG_FORMAT", "json"),
            ("OASLINT_LOG_ASYNC", "true"),
            ("OASLINT_LOG_INCLUDE_LOCATION", "true"),
            ("OASLINT_LOG_TARGET_FILTER", "oaslint::rules=trace, may=off"),
        ]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.async_logging);
        assert!(config.include_location);
        assert_eq!(
            config.directives(),
            vec!["oaslint::rules=trace".to_string(), "may=off".to_string()]
        );
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = LogConfig::from_lookup(lookup(&[
            ("OASLINT_LOG_LEVEL", "loud"),
            ("OASLINT_LOG_ASYNC", "sometimes"),
            ("OASLINT_LOG_TARGET_FILTER", "  "),
        ]));
        assert_eq!(config.level(), Level::WARN);
        assert!(!config.async_logging);
        assert_eq!(config.target_filter, None);
    }

    #[test]
    fn test_invalid_directive_dropped() {
        let config = LogConfig {
            target_filter: Some("oaslint=debug,oaslint::rules=loud".to_string()),
            ..LogConfig::default()
        };
        assert_eq!(config.directives(), vec!["oaslint=debug".to_string()]);
    }
}
