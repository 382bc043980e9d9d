//! `permdoc config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;
use permdoc::{Platform, EXIT_OK};

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<i32> {
    match args.command {
        ConfigCommands::Show => show_config(ctx)?,
        ConfigCommands::Set { key, value } => set_config(&key, &value)?,
        ConfigCommands::Path => show_path()?,
    }
    Ok(EXIT_OK)
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Pretty | OutputFormat::Text => {
            let platform = config.platform()?;
            let unset = |default: String| format!("{default} (default)").dimmed().to_string();

            println!("{}", "Current Configuration:".bold());
            println!();
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or(OutputFormat::Pretty)
            );
            println!("  {} {}", "explain_by_default:".bold(), config.explain_by_default);
            println!(
                "  {} {}",
                "root_bypass:".bold(),
                config.root_bypass.map_or_else(
                    || unset(platform.default_root_bypass().to_string()),
                    |b| b.to_string()
                )
            );
            println!("  {} {}", "check_parent:".bold(), config.check_parent);
            println!("  {} {}", "check_hard_links:".bold(), config.check_hard_links);
            println!("  {} {}", "max_link_depth:".bold(), config.max_link_depth);
            println!(
                "  {} {}",
                "platform:".bold(),
                config
                    .platform
                    .clone()
                    .unwrap_or_else(|| unset(Platform::detect().to_string()))
            );
        }
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;

    match key {
        "output_format" | "output" => {
            config.output_format = Some(value.parse()?);
        }
        "explain_by_default" | "explain" => {
            config.explain_by_default = value.parse()?;
        }
        "root_bypass" => {
            config.root_bypass = if value == "default" {
                None
            } else {
                Some(value.parse()?)
            };
        }
        "check_parent" => {
            config.check_parent = value.parse()?;
        }
        "check_hard_links" => {
            config.check_hard_links = value.parse()?;
        }
        "max_link_depth" => {
            let depth: usize = value.parse()?;
            if depth == 0 {
                anyhow::bail!("max_link_depth must be at least 1");
            }
            config.max_link_depth = depth;
        }
        "platform" => {
            config.platform = if value == "default" {
                None
            } else {
                Some(value.parse::<Platform>()?.to_string())
            };
        }
        _ => {
            anyhow::bail!(
                "Unknown config key: {}\n\n\
                 Available keys:\n  \
                 output_format      - Default output format (pretty/text/json/yaml)\n  \
                 explain_by_default - Always explain commands (true/false)\n  \
                 root_bypass        - Superuser bypasses read/write checks (true/false/default)\n  \
                 check_parent       - Check parent directory traversal (true/false)\n  \
                 check_hard_links   - Report hard links (true/false)\n  \
                 max_link_depth     - Symlink hops before reporting a cycle\n  \
                 platform           - linux/macos/bsd/unix/default",
                key
            );
        }
    }

    config.save()?;
    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());

    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}
