//! In-memory [`Host`] for tests and dry runs.
//!
//! Paths are absolute and compared after lexical normalisation (`.` and
//! `..` collapsed, trailing slashes dropped). Only the final component is
//! checked for symlinks; parent directories are looked up by name.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};

use nix::errno::Errno;
use permdoc_core::{FileKind, Identity, Principal};

use crate::host::{Host, RawMeta};

/// Depth after which [`MemoryHost::metadata`] reports `ELOOP`.
const FOLLOW_LIMIT: usize = 40;

#[derive(Debug, Clone)]
struct Node {
    meta: RawMeta,
    link_target: Option<PathBuf>,
}

/// A fake filesystem and account database.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    nodes: BTreeMap<PathBuf, Node>,
    denied: HashSet<PathBuf>,
    users: HashMap<u32, String>,
    groups: HashMap<u32, String>,
    principal: Principal,
    search_path: Option<String>,
}

impl MemoryHost {
    /// A host with `/` (root-owned, 0755) and the given principal.
    pub fn new(principal: Principal) -> Self {
        let mut host = Self {
            nodes: BTreeMap::new(),
            denied: HashSet::new(),
            users: HashMap::new(),
            groups: HashMap::new(),
            principal,
            search_path: None,
        };
        host.users.insert(0, "root".into());
        host.groups.insert(0, "root".into());
        let p = host.principal.clone();
        host.add_identity(p.user(), p.primary_group());
        for g in p.supplementary_groups() {
            host.groups.insert(g.id, g.name.clone());
        }
        host.insert("/", FileKind::Directory, 0, 0, 0o755, None)
    }

    fn add_identity(&mut self, user: &Identity, group: &Identity) {
        self.users.insert(user.id, user.name.clone());
        self.groups.insert(group.id, group.name.clone());
    }

    fn insert(
        mut self,
        path: &str,
        kind: FileKind,
        uid: u32,
        gid: u32,
        mode: u32,
        link_target: Option<PathBuf>,
    ) -> Self {
        let nlink = if kind == FileKind::Directory { 2 } else { 1 };
        self.nodes.insert(
            normalize(Path::new(path)),
            Node {
                meta: RawMeta {
                    kind,
                    uid,
                    gid,
                    mode,
                    nlink,
                },
                link_target,
            },
        );
        self
    }

    /// Add a regular file.
    #[must_use]
    pub fn file(self, path: &str, uid: u32, gid: u32, mode: u32) -> Self {
        self.insert(path, FileKind::File, uid, gid, mode, None)
    }

    /// Add a directory.
    #[must_use]
    pub fn dir(self, path: &str, uid: u32, gid: u32, mode: u32) -> Self {
        self.insert(path, FileKind::Directory, uid, gid, mode, None)
    }

    /// Add a symlink owned by root.
    #[must_use]
    pub fn symlink(self, path: &str, target: &str) -> Self {
        self.insert(path, FileKind::Symlink, 0, 0, 0o777, Some(PathBuf::from(target)))
    }

    /// Add a fifo.
    #[must_use]
    pub fn special(self, path: &str, uid: u32, gid: u32, mode: u32) -> Self {
        self.insert(path, FileKind::Special, uid, gid, mode, None)
    }

    /// Set the hard link count of an existing entry.
    #[must_use]
    pub fn nlink(mut self, path: &str, nlink: u64) -> Self {
        if let Some(node) = self.nodes.get_mut(&normalize(Path::new(path))) {
            node.meta.nlink = nlink;
        }
        self
    }

    /// Make every query on `path` fail with `EACCES`.
    #[must_use]
    pub fn deny(mut self, path: &str) -> Self {
        self.denied.insert(normalize(Path::new(path)));
        self
    }

    #[must_use]
    pub fn user(mut self, uid: u32, name: &str) -> Self {
        self.users.insert(uid, name.to_string());
        self
    }

    #[must_use]
    pub fn group(mut self, gid: u32, name: &str) -> Self {
        self.groups.insert(gid, name.to_string());
        self
    }

    #[must_use]
    pub fn with_search_path(mut self, raw: &str) -> Self {
        self.search_path = Some(raw.to_string());
        self
    }

    fn lookup(&self, path: &Path) -> io::Result<&Node> {
        let key = normalize(path);
        if self.denied.contains(&key) {
            return Err(io::Error::from(Errno::EACCES));
        }
        self.nodes
            .get(&key)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

impl Host for MemoryHost {
    fn symlink_metadata(&self, path: &Path) -> io::Result<RawMeta> {
        self.lookup(path).map(|n| n.meta)
    }

    fn metadata(&self, path: &Path) -> io::Result<RawMeta> {
        let mut current = normalize(path);
        for _ in 0..=FOLLOW_LIMIT {
            let node = self.lookup(&current)?;
            match &node.link_target {
                Some(target) => current = join_link(&current, target),
                None => return Ok(node.meta),
            }
        }
        Err(io::Error::from(Errno::ELOOP))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.lookup(path)?
            .link_target
            .clone()
            .ok_or_else(|| io::Error::from(Errno::EINVAL))
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        self.groups.get(&gid).cloned()
    }

    fn current_principal(&self) -> Principal {
        self.principal.clone()
    }

    fn search_path(&self) -> Option<String> {
        self.search_path.clone()
    }
}

/// Resolve a link target relative to the directory holding the link.
fn join_link(link: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        normalize(target)
    } else {
        let parent = link.parent().unwrap_or_else(|| Path::new("/"));
        normalize(&parent.join(target))
    }
}

/// Lexical normalisation. Relative paths are taken from `/`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MemoryHost {
        let p = Principal::new(Identity::new(1000, "alice"), Identity::new(1000, "alice"), vec![]);
        MemoryHost::new(p)
    }

    #[test]
    fn normalizes_lookups() {
        let h = host().dir("/usr", 0, 0, 0o755).file("/usr/bin", 0, 0, 0o644);
        assert_eq!(h.symlink_metadata(Path::new("/usr/./bin/")).unwrap().kind, FileKind::File);
        assert_eq!(h.symlink_metadata(Path::new("/usr/x/../bin")).unwrap().kind, FileKind::File);
    }

    #[test]
    fn follows_relative_links() {
        let h = host()
            .dir("/opt", 0, 0, 0o755)
            .file("/opt/real", 0, 0, 0o755)
            .symlink("/opt/alias", "real");
        assert_eq!(h.metadata(Path::new("/opt/alias")).unwrap().kind, FileKind::File);
        assert_eq!(h.symlink_metadata(Path::new("/opt/alias")).unwrap().kind, FileKind::Symlink);
    }

    #[test]
    fn cyclic_links_report_eloop() {
        let h = host().symlink("/a", "/b").symlink("/b", "/a");
        let err = h.metadata(Path::new("/a")).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(Errno::ELOOP as i32));
    }

    #[test]
    fn denied_paths_fail_with_eacces() {
        let h = host().dir("/secret", 0, 0, 0o700).deny("/secret");
        let err = h.symlink_metadata(Path::new("/secret")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
