use serde::{Deserialize, Serialize};
use std::fmt;

use super::identity::Identity;
use super::mode::Mode;

/// What kind of entry a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    /// Device, fifo or socket
    Special,
    Missing,
}

impl FileKind {
    #[must_use]
    pub const fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "regular file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symbolic link"),
            Self::Special => write!(f, "special file"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

/// Ownership and permission attributes of an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub owner: Identity,
    pub group: Identity,
    pub mode: Mode,
    /// Hard link count
    pub nlink: u64,
}

/// Link information recorded when the entry itself is a symlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Raw link target as stored in the link
    pub target: String,
    /// Whether the target currently resolves
    pub resolves: bool,
}

/// Snapshot of one filesystem entry.
///
/// A missing entry carries no metadata at all: `meta()` returns `None`
/// rather than a zeroed owner or mode, so "absent" is never confused
/// with "no permission".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    path: String,
    kind: FileKind,
    meta: Option<EntryMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<LinkInfo>,
}

impl FileState {
    /// State of a path that does not exist.
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Missing,
            meta: None,
            link: None,
        }
    }

    /// State of an existing entry. Passing `FileKind::Missing` here
    /// yields a missing state and drops `meta`.
    pub fn present(path: impl Into<String>, kind: FileKind, meta: EntryMeta) -> Self {
        if kind.is_missing() {
            return Self::missing(path);
        }
        Self {
            path: path.into(),
            kind,
            meta: Some(meta),
            link: None,
        }
    }

    /// Attach symlink details. Ignored unless the entry is a symlink.
    #[must_use]
    pub fn with_link(mut self, link: LinkInfo) -> Self {
        if self.kind == FileKind::Symlink {
            self.link = Some(link);
        }
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn kind(&self) -> FileKind {
        self.kind
    }

    pub const fn meta(&self) -> Option<&EntryMeta> {
        self.meta.as_ref()
    }

    pub const fn link(&self) -> Option<&LinkInfo> {
        self.link.as_ref()
    }

    #[must_use]
    pub const fn exists(&self) -> bool {
        !self.kind.is_missing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> EntryMeta {
        EntryMeta {
            owner: Identity::new(0, "root"),
            group: Identity::new(0, "root"),
            mode: Mode::from_bits(0o755),
            nlink: 1,
        }
    }

    #[test]
    fn missing_has_no_metadata() {
        let state = FileState::missing("/nope");
        assert!(!state.exists());
        assert!(state.meta().is_none());
        let json = serde_json::to_value(&state).unwrap();
        assert!(json["meta"].is_null());
    }

    #[test]
    fn present_with_missing_kind_is_missing() {
        let state = FileState::present("/x", FileKind::Missing, meta());
        assert!(state.meta().is_none());
    }

    #[test]
    fn link_only_kept_for_symlinks() {
        let link = LinkInfo {
            target: "/etc/passwd".into(),
            resolves: true,
        };
        let file = FileState::present("/x", FileKind::File, meta()).with_link(link.clone());
        assert!(file.link().is_none());
        let sym = FileState::present("/y", FileKind::Symlink, meta()).with_link(link);
        assert_eq!(sym.link().unwrap().target, "/etc/passwd");
    }
}
