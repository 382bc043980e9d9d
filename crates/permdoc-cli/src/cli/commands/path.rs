//! `permdoc path` - audit the command search path.

use anyhow::Result;
use colored::Colorize;
use permdoc::inspect::path_model;
use permdoc::{Finding, SearchPath, SystemHost, EXIT_OK};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::PathArgs;
use crate::education::Explain;
use crate::output::{severity_tag, OutputFormat};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Serialize)]
struct PathAudit<'a> {
    search_path: &'a SearchPath,
    findings: &'a [Finding],
    cleaned: String,
}

pub fn execute(ctx: &Context, args: PathArgs) -> Result<i32> {
    let host = SystemHost::new();
    let search_path = match &args.value {
        Some(raw) => SearchPath::parse(raw, ctx.config.platform()?),
        None => ctx.search_path(&host)?,
    };

    if args.clean {
        println!("{}", search_path.clean());
        return Ok(EXIT_OK);
    }

    if ctx.show_explanation() {
        Explain::path_audit().print();
    }

    let findings = path_model::audit(&host, &search_path);
    let audit = PathAudit {
        search_path: &search_path,
        findings: &findings,
        cleaned: search_path.clean().to_string(),
    };

    match ctx.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&audit)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&audit)?),
        OutputFormat::Text => {
            for finding in &findings {
                println!("{finding}");
            }
        }
        OutputFormat::Pretty => print_pretty(&host, &search_path, &findings),
    }

    // Search path findings are informational only.
    Ok(EXIT_OK)
}

fn print_pretty(host: &SystemHost, search_path: &SearchPath, findings: &[Finding]) {
    let duplicates = search_path.find_duplicates();
    let rows: Vec<EntryRow> = search_path
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let status = if entry.is_empty() {
                "empty (current directory)".to_string()
            } else {
                let probe = path_model::probe(host, entry);
                let mut notes = Vec::new();
                if !entry.is_absolute() {
                    notes.push("relative");
                }
                if !probe.exists {
                    notes.push("missing");
                } else if !probe.is_directory {
                    notes.push("not a directory");
                }
                if duplicates.iter().any(|d| d.trim_end_matches('/') == entry.raw().trim_end_matches('/')) {
                    notes.push("duplicate");
                }
                if notes.is_empty() {
                    "ok".to_string()
                } else {
                    notes.join(", ")
                }
            };
            EntryRow {
                position: i + 1,
                entry: entry.raw().to_string(),
                status,
            }
        })
        .collect();

    println!("{}", "Search Path:".bold().underline());
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    if findings.is_empty() {
        println!("{}", "No problems found.".green());
        return;
    }
    for finding in findings {
        println!("  {} {}", severity_tag(finding.severity), finding.message);
    }
    println!();
    println!("{} export PATH=\"{}\"", "Cleaned:".bold(), search_path.clean());
}
