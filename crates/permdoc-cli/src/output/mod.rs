//! Output formatting for different formats.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use permdoc::{render, DiagnosticReport, ReportFormat, Severity};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Coloured summary with tables
    #[default]
    Pretty,
    /// Plain sectioned report, stable across runs
    Text,
    /// JSON report with stable field names
    #[value(alias = "structured")]
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    /// Whether the format is meant for people rather than programs.
    pub const fn is_human(self) -> bool {
        matches!(self, Self::Pretty | Self::Text)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "text" | "plain" => Ok(Self::Text),
            "json" | "structured" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, text, json, yaml",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Severity tag, coloured.
pub fn severity_tag(severity: Severity) -> ColoredString {
    let tag = format!("{:<7}", severity.to_string());
    match severity {
        Severity::Error => tag.red().bold(),
        Severity::Warning => tag.yellow(),
        Severity::Info => tag.dimmed(),
    }
}

/// Print a diagnostic report in `format`.
pub fn print_report(report: &DiagnosticReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render(report, ReportFormat::Text)?),
        OutputFormat::Json => println!("{}", render(report, ReportFormat::Structured)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
        OutputFormat::Pretty => print_pretty(report),
    }
    Ok(())
}

fn print_pretty(report: &DiagnosticReport) {
    let target = report.inspected_path().unwrap_or(report.request().target());
    println!("{} {}", "Target:".bold(), target.cyan());
    if let Some(location) = report.resolution() {
        println!(
            "  {} '{}' via search path entry #{}",
            "resolved from".dimmed(),
            report.request().target(),
            location.entry_index + 1
        );
    }
    println!("{} {}", "As:".bold(), report.principal());

    if let Some(state) = report.link_target().or(report.state()) {
        if let Some(meta) = state.meta() {
            println!(
                "{} {} {}:{} {}",
                "Entry:".bold(),
                state.kind(),
                meta.owner.name,
                meta.group.name,
                meta.mode.to_string().cyan()
            );
        }
    }
    if let Some(chain) = report.link_chain() {
        println!("{} {}", "Links:".bold(), chain.describe());
    }
    if let Some(caps) = report.capabilities() {
        let flag = |ok: bool, c: &str| if ok { c.green() } else { "-".red() };
        println!(
            "{} {}{}{} (as {})",
            "Access:".bold(),
            flag(caps.can_read, "r"),
            flag(caps.can_write, "w"),
            flag(caps.can_execute, "x"),
            caps.class
        );
    }

    println!();
    if report.findings().is_empty() {
        println!("{}", "No findings.".green());
    }
    for finding in report.findings() {
        println!("  {} {}", severity_tag(finding.severity), finding.code.to_string().bold());
        println!("          {}", finding.message);
    }

    if !report.suggestions().is_empty() {
        println!();
        println!("{}", "How to fix:".bold().underline());
        for (i, suggestion) in report.suggestions().iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion.action);
            if let Some(cmd) = &suggestion.command {
                println!("     {}", format!("$ {cmd}").cyan());
            }
        }
    }

    println!();
    if report.has_errors() {
        println!(
            "{} {} error(s), {} warning(s)",
            "Blocked:".red().bold(),
            report.count(Severity::Error),
            report.count(Severity::Warning)
        );
    } else {
        println!(
            "{} {} warning(s)",
            "Accessible:".green().bold(),
            report.count(Severity::Warning)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("structured".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for f in [OutputFormat::Pretty, OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
            assert_eq!(f.to_string().parse::<OutputFormat>().unwrap(), f);
        }
    }
}
