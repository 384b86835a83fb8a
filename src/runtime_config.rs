//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the linter's worker runtime.
//!
//! ## Environment Variables
//!
//! ### `OASLINT_WORKERS`
//!
//! Number of worker coroutines used by the rule host and by rules that fan out
//! (example validation, missing-example inference). Default: `4`.
//!
//! ### `OASLINT_STACK_SIZE`
//!
//! Stack size for worker coroutines. Accepts values in:
//! - Decimal: `1048576` (1 MB)
//! - Hexadecimal: `0x100000` (1 MB)
//!
//! Default: `0x100000` (1 MB)
//!
//! JSON Schema compilation recurses once per nesting level of the schema being
//! compiled, so deeply nested documents need more than the usual coroutine stack.
//!
//! ### `OASLINT_RULE_TIMEOUT_MS`
//!
//! Deadline for a single rule, in milliseconds. Once reached, workers stop picking
//! up new jobs and the rule returns what it has found so far. `0` disables the
//! deadline. Default: `10000`.
//!
//! ## Example Configuration
//!
//! ```bash
//! export OASLINT_WORKERS=8
//! export OASLINT_STACK_SIZE=0x200000
//! oaslint lint openapi.yaml
//! ```

use std::env;
use std::time::Duration;

/// Default coroutine stack size (1 MB)
pub const DEFAULT_STACK_SIZE: usize = 0x100000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Worker coroutines per pool (default: 4)
    pub workers: usize,
    /// Stack size for coroutines in bytes (default: 1 MB / 0x100000)
    pub stack_size: usize,
    /// Per-rule deadline, `None` when disabled
    pub rule_timeout: Option<Duration>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let workers = env::var("OASLINT_WORKERS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(4);

        let stack_size = env::var("OASLINT_STACK_SIZE")
            .ok()
            .and_then(|s| parse_size(&s))
            .unwrap_or(DEFAULT_STACK_SIZE);

        let rule_timeout = match env::var("OASLINT_RULE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => Some(Duration::from_millis(10_000)),
        };

        Self {
            workers,
            stack_size,
            rule_timeout,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            stack_size: DEFAULT_STACK_SIZE,
            rule_timeout: Some(Duration::from_millis(10_000)),
        }
    }
}

/// Parse a byte size given in decimal or `0x` hexadecimal.
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
