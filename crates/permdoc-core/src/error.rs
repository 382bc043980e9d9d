use std::io;

use thiserror::Error;

/// Result type alias for permdoc operations
pub type Result<T> = std::result::Result<T, PermdocError>;

/// Errors that can occur outside the finding taxonomy.
///
/// A diagnosis itself never fails: anything that goes wrong while
/// inspecting a target becomes a finding. These errors cover malformed
/// input and the plumbing around a run (config, rendering).
#[derive(Error, Debug)]
pub enum PermdocError {
    /// The target string was empty or only whitespace
    #[error("target must not be empty")]
    EmptyTarget,

    /// A permission mode string could not be parsed
    #[error("invalid mode '{0}': expected octal (0755) or symbolic (rwxr-xr-x)")]
    InvalidMode(String),

    /// Unknown report or output format
    #[error("unknown format: {0}")]
    InvalidFormat(String),

    /// Unknown platform name
    #[error("unknown platform: {0}")]
    InvalidPlatform(String),

    /// Filesystem error on a specific path
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was performed on
        path: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl PermdocError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error stems from bad user input rather than
    /// the environment.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyTarget | Self::InvalidMode(_) | Self::InvalidFormat(_) | Self::InvalidPlatform(_)
        )
    }
}
