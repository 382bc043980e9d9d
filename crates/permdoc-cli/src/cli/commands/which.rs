//! `permdoc which` - show which file a command name resolves to.

use anyhow::Result;
use colored::Colorize;
use permdoc::inspect::path_model;
use permdoc::{SystemHost, EXIT_FINDINGS, EXIT_OK};

use super::Context;
use crate::cli::args::WhichArgs;
use crate::education::Explain;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: WhichArgs) -> Result<i32> {
    if ctx.show_explanation() {
        Explain::which(&args.name).print();
    }

    let host = SystemHost::new();
    let search_path = ctx.search_path(&host)?;

    let matches = if args.all {
        path_model::resolve_all(&host, &search_path, &args.name)
    } else {
        path_model::resolve(&host, &search_path, &args.name)
            .into_iter()
            .collect()
    };

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&matches)?);
        }
        OutputFormat::Text => {
            for location in &matches {
                println!("{}", location.path);
            }
        }
        OutputFormat::Pretty => {
            if matches.is_empty() {
                println!(
                    "{} '{}' not found in {} search path entries",
                    "Not found:".red().bold(),
                    args.name,
                    search_path.len()
                );
            }
            for (i, location) in matches.iter().enumerate() {
                let label = if i == 0 {
                    "runs".green().bold()
                } else {
                    "shadowed".dimmed()
                };
                println!(
                    "  {:<9} {} {}",
                    label,
                    location.path.cyan(),
                    format!("(entry #{})", location.entry_index + 1).dimmed()
                );
            }
        }
    }

    Ok(if matches.is_empty() { EXIT_FINDINGS } else { EXIT_OK })
}
