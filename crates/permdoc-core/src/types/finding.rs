use serde::{Deserialize, Serialize};
use std::fmt;

use super::mode::{PermissionBit, PermissionClass};

/// How serious a finding is.
///
/// Only `Error` affects the exit status of a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Broad family a finding code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingCategory {
    /// Stops further checks on the branch (nothing left to inspect)
    Structural,
    /// Independently collected access problems
    Permission,
    /// Observations that never change the outcome
    Informational,
    /// A host query failed; the diagnosis is partial
    Degraded,
}

/// Stable identifier of a diagnostic observation.
///
/// Serialized as `SCREAMING_SNAKE_CASE`; these strings are part of the
/// structured report format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    // Search path hygiene
    EmptyPathSegment,
    RelativePathEntry,
    MissingPathEntry,
    PathEntryNotDirectory,
    DuplicatePathEntry,

    // Resolution and existence
    CommandNotFound,
    CommandResolved,
    TargetMissing,
    UnknownState,

    // Structural link failures
    DanglingSymlink,
    LinkCycle,

    // Ownership
    NotOwner,
    SuperuserBypass,

    // Per-bit permission gaps
    OwnerNoRead,
    OwnerNoWrite,
    OwnerNoExecute,
    GroupNoRead,
    GroupNoWrite,
    GroupNoExecute,
    OtherNoRead,
    OtherNoWrite,
    OtherNoExecute,
    /// Superuser, but no execute bit set anywhere
    NoExecute,
    AccessDenied,

    // Parent directory
    ParentNotTraversable,

    // Link health
    SymlinkResolved,
    HardLinkPresent,
}

impl FindingCode {
    /// The per-bit code for a missing bit in the given class.
    #[must_use]
    pub const fn missing_bit(class: PermissionClass, bit: PermissionBit) -> Self {
        match (class, bit) {
            (PermissionClass::Owner, PermissionBit::Read) => Self::OwnerNoRead,
            (PermissionClass::Owner, PermissionBit::Write) => Self::OwnerNoWrite,
            (PermissionClass::Owner, PermissionBit::Execute) => Self::OwnerNoExecute,
            (PermissionClass::Group, PermissionBit::Read) => Self::GroupNoRead,
            (PermissionClass::Group, PermissionBit::Write) => Self::GroupNoWrite,
            (PermissionClass::Group, PermissionBit::Execute) => Self::GroupNoExecute,
            (PermissionClass::Other, PermissionBit::Read) => Self::OtherNoRead,
            (PermissionClass::Other, PermissionBit::Write) => Self::OtherNoWrite,
            (PermissionClass::Other, PermissionBit::Execute) => Self::OtherNoExecute,
        }
    }

    /// Class and bit for the per-bit codes.
    #[must_use]
    pub const fn class_and_bit(self) -> Option<(PermissionClass, PermissionBit)> {
        use PermissionBit::{Execute, Read, Write};
        use PermissionClass::{Group, Other, Owner};
        match self {
            Self::OwnerNoRead => Some((Owner, Read)),
            Self::OwnerNoWrite => Some((Owner, Write)),
            Self::OwnerNoExecute => Some((Owner, Execute)),
            Self::GroupNoRead => Some((Group, Read)),
            Self::GroupNoWrite => Some((Group, Write)),
            Self::GroupNoExecute => Some((Group, Execute)),
            Self::OtherNoRead => Some((Other, Read)),
            Self::OtherNoWrite => Some((Other, Write)),
            Self::OtherNoExecute => Some((Other, Execute)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn category(self) -> FindingCategory {
        match self {
            Self::CommandNotFound | Self::TargetMissing | Self::DanglingSymlink | Self::LinkCycle => {
                FindingCategory::Structural
            }
            Self::OwnerNoRead
            | Self::OwnerNoWrite
            | Self::OwnerNoExecute
            | Self::GroupNoRead
            | Self::GroupNoWrite
            | Self::GroupNoExecute
            | Self::OtherNoRead
            | Self::OtherNoWrite
            | Self::OtherNoExecute
            | Self::NoExecute
            | Self::AccessDenied
            | Self::ParentNotTraversable => FindingCategory::Permission,
            Self::UnknownState => FindingCategory::Degraded,
            Self::EmptyPathSegment
            | Self::RelativePathEntry
            | Self::MissingPathEntry
            | Self::PathEntryNotDirectory
            | Self::DuplicatePathEntry
            | Self::CommandResolved
            | Self::NotOwner
            | Self::SuperuserBypass
            | Self::SymlinkResolved
            | Self::HardLinkPresent => FindingCategory::Informational,
        }
    }

    /// Severity a finding with this code carries.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self.category() {
            FindingCategory::Structural => Severity::Error,
            FindingCategory::Permission => match self {
                Self::ParentNotTraversable | Self::AccessDenied => Severity::Error,
                _ => Severity::Warning,
            },
            FindingCategory::Degraded => Severity::Warning,
            FindingCategory::Informational => Severity::Info,
        }
    }

    /// The stable string form (`PARENT_NOT_TRAVERSABLE`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyPathSegment => "EMPTY_PATH_SEGMENT",
            Self::RelativePathEntry => "RELATIVE_PATH_ENTRY",
            Self::MissingPathEntry => "MISSING_PATH_ENTRY",
            Self::PathEntryNotDirectory => "PATH_ENTRY_NOT_DIRECTORY",
            Self::DuplicatePathEntry => "DUPLICATE_PATH_ENTRY",
            Self::CommandNotFound => "COMMAND_NOT_FOUND",
            Self::CommandResolved => "COMMAND_RESOLVED",
            Self::TargetMissing => "TARGET_MISSING",
            Self::UnknownState => "UNKNOWN_STATE",
            Self::DanglingSymlink => "DANGLING_SYMLINK",
            Self::LinkCycle => "LINK_CYCLE",
            Self::NotOwner => "NOT_OWNER",
            Self::SuperuserBypass => "SUPERUSER_BYPASS",
            Self::OwnerNoRead => "OWNER_NO_READ",
            Self::OwnerNoWrite => "OWNER_NO_WRITE",
            Self::OwnerNoExecute => "OWNER_NO_EXECUTE",
            Self::GroupNoRead => "GROUP_NO_READ",
            Self::GroupNoWrite => "GROUP_NO_WRITE",
            Self::GroupNoExecute => "GROUP_NO_EXECUTE",
            Self::OtherNoRead => "OTHER_NO_READ",
            Self::OtherNoWrite => "OTHER_NO_WRITE",
            Self::OtherNoExecute => "OTHER_NO_EXECUTE",
            Self::NoExecute => "NO_EXECUTE",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::ParentNotTraversable => "PARENT_NOT_TRAVERSABLE",
            Self::SymlinkResolved => "SYMLINK_RESOLVED",
            Self::HardLinkPresent => "HARD_LINK_PRESENT",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: FindingCode,
    pub message: String,
    /// Path the finding is about, when it is not the target itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Finding {
    /// A finding with the code's standard severity.
    pub fn new(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            subject: None,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Raise the severity; a finding is never downgraded below its code's.
    #[must_use]
    pub fn escalate(mut self, severity: Severity) -> Self {
        self.severity = self.severity.max(severity);
        self
    }

    /// Whether a remediation step can be proposed for this finding.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.severity > Severity::Info
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

/// A remediation step tied to the finding that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Index of the originating finding in the report
    pub finding_index: usize,
    /// Code of the originating finding
    pub code: FindingCode,
    /// What to change, in prose
    pub action: String,
    /// Shell command that performs the change, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_screaming() {
        let json = serde_json::to_string(&FindingCode::ParentNotTraversable).unwrap();
        assert_eq!(json, "\"PARENT_NOT_TRAVERSABLE\"");
        assert_eq!(FindingCode::ParentNotTraversable.as_str(), "PARENT_NOT_TRAVERSABLE");
    }

    #[test]
    fn as_str_matches_serde_for_every_code() {
        let codes = [
            FindingCode::EmptyPathSegment,
            FindingCode::PathEntryNotDirectory,
            FindingCode::CommandNotFound,
            FindingCode::UnknownState,
            FindingCode::DanglingSymlink,
            FindingCode::SuperuserBypass,
            FindingCode::GroupNoExecute,
            FindingCode::NoExecute,
            FindingCode::AccessDenied,
            FindingCode::HardLinkPresent,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json.trim_matches('"'), code.as_str());
        }
    }

    #[test]
    fn severities_follow_taxonomy() {
        assert_eq!(FindingCode::TargetMissing.severity(), Severity::Error);
        assert_eq!(FindingCode::LinkCycle.severity(), Severity::Error);
        assert_eq!(FindingCode::OwnerNoRead.severity(), Severity::Warning);
        assert_eq!(FindingCode::ParentNotTraversable.severity(), Severity::Error);
        assert_eq!(FindingCode::DuplicatePathEntry.severity(), Severity::Info);
        assert_eq!(FindingCode::HardLinkPresent.severity(), Severity::Info);
        assert_eq!(FindingCode::UnknownState.severity(), Severity::Warning);
    }

    #[test]
    fn escalate_never_lowers() {
        let unknown = Finding::new(FindingCode::UnknownState, "x").escalate(Severity::Error);
        assert_eq!(unknown.severity, Severity::Error);
        let missing = Finding::new(FindingCode::TargetMissing, "x").escalate(Severity::Info);
        assert_eq!(missing.severity, Severity::Error);
    }

    #[test]
    fn missing_bit_round_trips_class_and_bit() {
        for class in PermissionClass::ALL {
            for bit in PermissionBit::ALL {
                let code = FindingCode::missing_bit(class, bit);
                assert_eq!(code.class_and_bit(), Some((class, bit)));
            }
        }
        assert_eq!(FindingCode::NoExecute.class_and_bit(), None);
    }

    #[test]
    fn info_is_not_actionable() {
        assert!(!Finding::new(FindingCode::HardLinkPresent, "x").is_actionable());
        assert!(Finding::new(FindingCode::OtherNoWrite, "x").is_actionable());
    }
}
