//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Explain why a file, directory or command is not accessible
///
/// Checks existence, symlinks, permission bits, parent traversal and
/// the command search path, then tells you the smallest change that fixes
/// each problem. Use --explain on any command to learn what it checks.
#[derive(Parser, Debug)]
#[command(name = "permdoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Explain what this command does (educational mode)
    #[arg(long, global = true)]
    pub explain: bool,

    /// Increase verbosity (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Diagnose access to a path or command
    Check(CheckArgs),

    /// Show which file a command name resolves to
    Which(WhichArgs),

    /// Audit the command search path
    Path(PathArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File, directory or command name (`~` and `$VAR` are expanded)
    pub target: String,

    /// Treat the target as a command name and search PATH
    #[arg(long, conflicts_with = "path")]
    pub command: bool,

    /// Treat the target as a filesystem path even without a '/'
    #[arg(long)]
    pub path: bool,
}

// ============================================================================
// Which command
// ============================================================================

#[derive(Args, Debug)]
pub struct WhichArgs {
    /// Command name to resolve
    pub name: String,

    /// List every match, not just the one that runs
    #[arg(short, long)]
    pub all: bool,
}

// ============================================================================
// Path command
// ============================================================================

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Print the de-duplicated search path instead of the audit
    #[arg(long)]
    pub clean: bool,

    /// Audit this value instead of $PATH
    #[arg(long, value_name = "PATH")]
    pub value: Option<String>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
