use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a symlink chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkHop {
    pub path: String,
    pub exists: bool,
}

/// How a symlink chain ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LinkTerminal {
    /// Chain ends at a regular file
    File,
    /// Chain ends at a directory
    Directory,
    /// Chain ends at a device, fifo or socket
    Special,
    /// Final target does not exist
    Broken,
    /// Depth limit exceeded
    Cycle { depth: usize },
    /// A hop could not be inspected
    Unreadable { path: String, reason: String },
}

impl LinkTerminal {
    /// True for the outcomes that end a diagnosis.
    #[must_use]
    pub const fn is_structural_failure(&self) -> bool {
        matches!(self, Self::Broken | Self::Cycle { .. })
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::File | Self::Directory | Self::Special)
    }
}

impl fmt::Display for LinkTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "regular file"),
            Self::Directory => write!(f, "directory"),
            Self::Special => write!(f, "special file"),
            Self::Broken => write!(f, "broken"),
            Self::Cycle { depth } => write!(f, "cycle (gave up after {depth} hops)"),
            Self::Unreadable { path, reason } => write!(f, "unreadable at {path}: {reason}"),
        }
    }
}

/// Result of following a path through its symlinks.
///
/// `hops[0]` is the starting path; the last hop is the final target
/// (or the last path reached before giving up).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkChain {
    pub hops: Vec<LinkHop>,
    pub terminal: LinkTerminal,
}

impl LinkChain {
    /// Number of links followed.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.hops.len().saturating_sub(1)
    }

    /// Last path reached.
    pub fn final_path(&self) -> Option<&str> {
        self.hops.last().map(|h| h.path.as_str())
    }

    /// `a -> b -> c`
    #[must_use]
    pub fn describe(&self) -> String {
        self.hops
            .iter()
            .map(|h| h.path.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
