//! Printing findings
//!
//! Text output groups findings per severity for people; JSON output is a flat array
//! for tools.

use std::io::{self, Write};

use crate::linter::{Finding, Severity};

/// Output format of the `lint` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const GROUPS: [(Severity, &str); 4] = [
    (Severity::Error, "❌ Errors (must fix):"),
    (Severity::Warn, "⚠️  Warnings (should fix):"),
    (Severity::Info, "ℹ️  Info (best practices):"),
    (Severity::Hint, "💡 Hints:"),
];

/// Write findings grouped by severity.
pub fn write_text<W: Write>(out: &mut W, findings: &[Finding]) -> io::Result<()> {
    if findings.is_empty() {
        writeln!(out, "✅ No lint issues found!")?;
        return Ok(());
    }

    let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();
    writeln!(out, "\n📋 Lint Results:")?;
    writeln!(
        out,
        "   {} error(s), {} warning(s), {} info(s), {} hint(s)\n",
        count(Severity::Error),
        count(Severity::Warn),
        count(Severity::Info),
        count(Severity::Hint)
    )?;

    for (severity, heading) in GROUPS {
        let group: Vec<_> = findings.iter().filter(|f| f.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        writeln!(out, "{}", heading)?;
        for finding in group {
            writeln!(
                out,
                "   {}:{} [{}] {}",
                finding.start_line, finding.start_column, finding.rule_id, finding.path
            )?;
            writeln!(out, "      {}", finding.message)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write findings as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: &mut W, findings: &[Finding]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, findings).map_err(io::Error::other)?;
    writeln!(out)
}

pub fn write_report<W: Write>(out: &mut W, format: OutputFormat, findings: &[Finding]) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, findings),
        OutputFormat::Json => write_json(out, findings),
    }
}

/// True when any finding reaches `threshold`; `None` never fails.
pub fn should_fail(findings: &[Finding], threshold: Option<Severity>) -> bool {
    threshold.is_some_and(|threshold| findings.iter().any(|f| f.severity.at_least(threshold)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::document::NodeRef;

    fn finding(rule_id: &str, severity: Severity, line: usize) -> Finding {
        Finding {
            message: format!("{rule_id} says no"),
            rule_id: rule_id.to_string(),
            severity,
            path: "$.paths['/pets']".to_string(),
            paths: None,
            start_line: line,
            start_column: 3,
            end_line: line,
            end_column: 9,
            origin: None,
            timestamp: 1,
            target: NodeRef::Document,
        }
    }

    fn text(findings: &[Finding]) -> String {
        let mut out = Vec::new();
        write_text(&mut out, findings).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_no_findings() {
        assert_eq!(text(&[]), "✅ No lint issues found!\n");
    }

    #[test]
    fn test_text_groups_by_severity() {
        let output = text(&[
            finding("examples", Severity::Warn, 7),
            finding("schemaTypeCheck", Severity::Error, 12),
        ]);
        assert!(output.contains("1 error(s), 1 warning(s), 0 info(s), 0 hint(s)"));
        let errors = output.find("❌ Errors").unwrap();
        let warnings = output.find("⚠️  Warnings").unwrap();
        assert!(errors < warnings);
        assert!(output.contains("   12:3 [schemaTypeCheck] $.paths['/pets']\n      schemaTypeCheck says no\n"));
        assert!(!output.contains("Hints"));
    }

    #[test]
    fn test_json_array() {
        let mut out = Vec::new();
        write_report(
            &mut out,
            OutputFormat::Json,
            &[finding("examples", Severity::Hint, 2)],
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["ruleId"], "examples");
        assert_eq!(array[0]["severity"], "hint");
        assert_eq!(array[0]["startLine"], 2);
        assert_eq!(array[0]["endColumn"], 9);
    }

    #[test]
    fn test_should_fail() {
        let findings = [finding("examples", Severity::Warn, 1)];
        assert!(should_fail(&findings, Some(Severity::Warn)));
        assert!(should_fail(&findings, Some(Severity::Hint)));
        assert!(!should_fail(&findings, Some(Severity::Error)));
        assert!(!should_fail(&findings, None));
        assert!(!should_fail(&[], Some(Severity::Hint)));
    }
}
