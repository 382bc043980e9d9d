//! Report rendering.
//!
//! Both formats are pure functions of the report: no clock, no host
//! lookups, no colour. The same report always renders to the same bytes.

use std::fmt::Write as _;
use std::str::FromStr;

use permdoc_core::{DiagnosticReport, FileState, PermdocError, Result, Severity};

/// Output format of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Sectioned plain text for people
    #[default]
    Text,
    /// Pretty-printed JSON with stable field names
    Structured,
}

impl FromStr for ReportFormat {
    type Err = PermdocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "human" | "pretty" => Ok(Self::Text),
            "structured" | "json" => Ok(Self::Structured),
            other => Err(PermdocError::InvalidFormat(other.to_string())),
        }
    }
}

/// Render `report` in `format`.
pub fn render(report: &DiagnosticReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Structured => render_structured(report),
    }
}

/// JSON form, parseable back with [`parse_structured`].
pub fn render_structured(report: &DiagnosticReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn parse_structured(input: &str) -> Result<DiagnosticReport> {
    Ok(serde_json::from_str(input)?)
}

/// Human-readable form. Sections appear in check order.
#[must_use]
pub fn render_text(report: &DiagnosticReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &DiagnosticReport) -> std::fmt::Result {
    let principal = report.principal();

    writeln!(out, "Target")?;
    writeln!(
        out,
        "  request:    {} (as {})",
        report.request().target(),
        report.treated_as()
    )?;
    if let Some(location) = report.resolution() {
        writeln!(
            out,
            "  resolved:   {} (entry #{})",
            location.path,
            location.entry_index + 1
        )?;
    }
    writeln!(out, "  principal:  {principal}")?;
    writeln!(
        out,
        "  captured:   {}",
        principal.captured_at().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "  platform:   {} (policy {})", report.platform(), report.policy())?;

    if let Some(state) = report.state() {
        writeln!(out)?;
        writeln!(out, "State")?;
        write_state(out, state)?;
        if let Some(chain) = report.link_chain() {
            writeln!(out, "  chain:      {} [{}]", chain.describe(), chain.terminal)?;
        }
        if let Some(target) = report.link_target() {
            writeln!(out, "  target:")?;
            write_state(out, target)?;
        }
    }

    if let Some(caps) = report.capabilities() {
        writeln!(out)?;
        writeln!(out, "Access (as {})", caps.class)?;
        writeln!(
            out,
            "  read: {}  write: {}  execute: {}",
            yes_no(caps.can_read),
            yes_no(caps.can_write),
            yes_no(caps.can_execute)
        )?;
    }

    if let Some(parent) = report.parent() {
        let verdict = match parent.traversable {
            Some(true) => "traversable",
            Some(false) => "NOT traversable",
            None => "unknown",
        };
        writeln!(out)?;
        writeln!(out, "Parent")?;
        writeln!(out, "  {}: {verdict}", parent.path)?;
    }

    writeln!(out)?;
    writeln!(out, "Findings ({})", report.findings().len())?;
    if report.findings().is_empty() {
        writeln!(out, "  none")?;
    }
    for (i, finding) in report.findings().iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<7} {}",
            i + 1,
            finding.severity.to_string(),
            finding.code
        )?;
        writeln!(out, "      {}", finding.message)?;
    }

    if !report.suggestions().is_empty() {
        writeln!(out)?;
        writeln!(out, "Suggestions")?;
        for (i, suggestion) in report.suggestions().iter().enumerate() {
            writeln!(
                out,
                "  {:>2}. [{} #{}] {}",
                i + 1,
                suggestion.code,
                suggestion.finding_index + 1,
                suggestion.action
            )?;
            if let Some(cmd) = &suggestion.command {
                writeln!(out, "      $ {cmd}")?;
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Result: {} error(s), {} warning(s), {} info; exit status {}",
        report.count(Severity::Error),
        report.count(Severity::Warning),
        report.count(Severity::Info),
        report.exit_code()
    )
}

fn write_state(out: &mut String, state: &FileState) -> std::fmt::Result {
    writeln!(out, "  path:       {}", state.path())?;
    writeln!(out, "  kind:       {}", state.kind())?;
    if let Some(meta) = state.meta() {
        writeln!(out, "  owner:      {}", meta.owner)?;
        writeln!(out, "  group:      {}", meta.group)?;
        writeln!(out, "  mode:       {}", meta.mode)?;
        writeln!(out, "  links:      {}", meta.nlink)?;
    }
    if let Some(link) = state.link() {
        let health = if link.resolves { "resolves" } else { "broken" };
        writeln!(out, "  points to:  {} ({health})", link.target)?;
    }
    Ok(())
}

const fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Diagnostics;
    use permdoc_core::{AccessRequest, Identity, Principal};
    use permdoc_inspect::{MemoryHost, UnixPolicy};

    fn report() -> DiagnosticReport {
        let bob = Principal::new(Identity::new(1001, "bob"), Identity::new(1001, "bob"), vec![]);
        let host = MemoryHost::new(bob)
            .dir("/srv", 0, 0, 0o755)
            .dir("/srv/locked", 0, 0, 0o700);
        let policy = UnixPolicy::strict();
        Diagnostics::new(&host, &policy).diagnose(&AccessRequest::path("/srv/locked").unwrap())
    }

    #[test]
    fn structured_output_is_byte_identical() {
        let report = report();
        let first = render(&report, ReportFormat::Structured).unwrap();
        let second = render(&report, ReportFormat::Structured).unwrap();
        assert_eq!(first, second);
        assert_eq!(render_text(&report), render_text(&report));
    }

    #[test]
    fn structured_output_round_trips() {
        let report = report();
        let json = render_structured(&report).unwrap();
        assert!(json.contains("\"OTHER_NO_EXECUTE\""));
        assert_eq!(parse_structured(&json).unwrap(), report);
    }

    #[test]
    fn text_sections_follow_finding_order() {
        let text = render_text(&report());
        let not_owner = text.find("NOT_OWNER").unwrap();
        let no_read = text.find("OTHER_NO_READ").unwrap();
        let denied = text.find("ACCESS_DENIED").unwrap();
        assert!(not_owner < no_read && no_read < denied);
        assert!(text.contains("Suggestions"));
        assert!(text.contains("exit status 1"));
    }

    #[test]
    fn format_names() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Structured);
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
