//! Host facilities: file metadata, identity lookups and the search path.
//!
//! Everything permdoc learns about the machine goes through [`Host`], so a
//! diagnosis can run against the live system ([`SystemHost`]) or an
//! in-memory tree ([`crate::memory::MemoryHost`]).

use std::fs::Metadata;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::unistd::{Gid, Group, Uid, User};
use permdoc_core::{FileKind, Identity, Principal};
use tracing::{debug, warn};

/// Raw metadata of a filesystem entry, before names are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMeta {
    pub kind: FileKind,
    pub uid: u32,
    pub gid: u32,
    /// `st_mode` bits (file type bits may be present)
    pub mode: u32,
    pub nlink: u64,
}

impl RawMeta {
    /// Convert std metadata; symlink-ness is taken from the metadata
    /// itself, so pass `symlink_metadata` output to see links.
    #[must_use]
    pub fn from_metadata(meta: &Metadata) -> Self {
        let ft = meta.file_type();
        let kind = if ft.is_symlink() {
            FileKind::Symlink
        } else if ft.is_dir() {
            FileKind::Directory
        } else if ft.is_file() {
            FileKind::File
        } else {
            FileKind::Special
        };

        Self {
            kind,
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
            nlink: meta.nlink(),
        }
    }
}

/// Query facility for everything host-dependent.
pub trait Host {
    /// Metadata of the entry itself, not following a final symlink.
    fn symlink_metadata(&self, path: &Path) -> io::Result<RawMeta>;

    /// Metadata after following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<RawMeta>;

    /// Target stored in a symlink.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Name for a uid, if the account database has one.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Name for a gid, if the group database has one.
    fn group_name(&self, gid: u32) -> Option<String>;

    /// Snapshot of the invoking identity.
    fn current_principal(&self) -> Principal;

    /// Raw search path string (`PATH`), if set.
    fn search_path(&self) -> Option<String>;

    /// uid with its name, falling back to the number.
    fn user_identity(&self, uid: u32) -> Identity {
        self.user_name(uid)
            .map_or_else(|| Identity::unnamed(uid), |name| Identity::new(uid, name))
    }

    /// gid with its name, falling back to the number.
    fn group_identity(&self, gid: u32) -> Identity {
        self.group_name(gid)
            .map_or_else(|| Identity::unnamed(gid), |name| Identity::new(gid, name))
    }
}

/// True for errors that mean "nothing is there": `ENOENT`, and `ENOTDIR`
/// when a path component is not a directory.
#[must_use]
pub fn is_absent(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound || err.raw_os_error() == Some(Errno::ENOTDIR as i32)
}

/// The live system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn supplementary_gids() -> Vec<u32> {
        #[cfg(not(target_vendor = "apple"))]
        {
            match nix::unistd::getgroups() {
                Ok(gids) => gids.into_iter().map(Gid::as_raw).collect(),
                Err(e) => {
                    warn!(error = %e, "could not read supplementary groups");
                    Vec::new()
                }
            }
        }
        #[cfg(target_vendor = "apple")]
        {
            debug!("supplementary group lookup not supported on this platform");
            Vec::new()
        }
    }
}

impl Host for SystemHost {
    fn symlink_metadata(&self, path: &Path) -> io::Result<RawMeta> {
        std::fs::symlink_metadata(path).map(|m| RawMeta::from_metadata(&m))
    }

    fn metadata(&self, path: &Path) -> io::Result<RawMeta> {
        std::fs::metadata(path).map(|m| RawMeta::from_metadata(&m))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                debug!(uid, error = %e, "passwd lookup failed");
                None
            }
        }
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        match Group::from_gid(Gid::from_raw(gid)) {
            Ok(group) => group.map(|g| g.name),
            Err(e) => {
                debug!(gid, error = %e, "group lookup failed");
                None
            }
        }
    }

    fn current_principal(&self) -> Principal {
        let uid = Uid::effective().as_raw();
        let gid = Gid::effective().as_raw();
        let user = self.user_identity(uid);
        let primary = self.group_identity(gid);
        let supplementary = Self::supplementary_gids()
            .into_iter()
            .map(|g| self.group_identity(g))
            .collect();

        let principal = Principal::new(user, primary, supplementary);
        debug!(principal = %principal, "captured principal");
        principal
    }

    fn search_path(&self) -> Option<String> {
        std::env::var_os("PATH").map(|v| v.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_covers_enotdir() {
        assert!(is_absent(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(is_absent(&io::Error::from(Errno::ENOTDIR)));
        assert!(!is_absent(&io::Error::from(Errno::EACCES)));
    }

    #[test]
    fn system_host_reads_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();

        let host = SystemHost::new();
        let meta = host.symlink_metadata(&file).unwrap();
        assert_eq!(meta.kind, FileKind::File);
        assert_eq!(meta.nlink, 1);
        assert_eq!(host.symlink_metadata(dir.path()).unwrap().kind, FileKind::Directory);
    }

    #[test]
    fn current_principal_matches_process() {
        let principal = SystemHost::new().current_principal();
        assert_eq!(principal.uid(), Uid::effective().as_raw());
        assert!(principal.in_group(Gid::effective().as_raw()));
    }
}
