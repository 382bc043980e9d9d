//! Command implementations.

pub mod check;
pub mod config;
pub mod path;
pub mod which;

use anyhow::{Context as _, Result};
use permdoc::{Host, SearchPath};

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Whether to show educational explanations
    pub explain: bool,

    /// Loaded configuration
    pub config: Config,
}

impl Context {
    /// Whether an explanation should be printed before the results.
    ///
    /// Machine-readable output is never prefixed with prose.
    pub const fn show_explanation(&self) -> bool {
        self.explain && self.output_format.is_human()
    }

    /// The host's search path, parsed for the configured platform.
    pub fn search_path(&self, host: &dyn Host) -> Result<SearchPath> {
        let raw = host
            .search_path()
            .context("PATH is not set in the environment")?;
        Ok(SearchPath::parse(&raw, self.config.platform()?))
    }
}

/// Expand `~` and `$VAR` in a user-supplied target.
pub fn expand(target: &str) -> Result<String> {
    let expanded = shellexpand::full(target)
        .with_context(|| format!("cannot expand '{target}'"))?;
    Ok(expanded.into_owned())
}
