use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PermdocError, Result};

/// How the target string should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetHint {
    /// Resolve the target through the search path first
    AsCommand,
    /// Inspect the target as a filesystem path
    AsPath,
}

impl fmt::Display for TargetHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsCommand => write!(f, "command"),
            Self::AsPath => write!(f, "path"),
        }
    }
}

/// What the caller wants diagnosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint: Option<TargetHint>,
}

impl AccessRequest {
    /// Build a request, rejecting an empty target before any diagnosis.
    pub fn new(target: impl Into<String>, hint: Option<TargetHint>) -> Result<Self> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(PermdocError::EmptyTarget);
        }
        Ok(Self { target, hint })
    }

    pub fn path(target: impl Into<String>) -> Result<Self> {
        Self::new(target, Some(TargetHint::AsPath))
    }

    pub fn command(target: impl Into<String>) -> Result<Self> {
        Self::new(target, Some(TargetHint::AsCommand))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub const fn hint(&self) -> Option<TargetHint> {
        self.hint
    }

    /// The treatment actually applied.
    ///
    /// Without a hint, a target containing no `/` is a command name,
    /// the same rule the shell uses to decide whether to search `PATH`.
    #[must_use]
    pub fn effective_hint(&self) -> TargetHint {
        self.hint.unwrap_or_else(|| {
            if self.target.contains('/') {
                TargetHint::AsPath
            } else {
                TargetHint::AsCommand
            }
        })
    }
}
