//! Symlink chain resolution and hard link detection.

use std::io;
use std::path::{Path, PathBuf};

use permdoc_core::{EntryMeta, FileKind, LinkChain, LinkHop, LinkTerminal};
use tracing::debug;

use crate::host::{is_absent, Host};

/// Hop limit matching the usual kernel `MAXSYMLINKS`.
pub const DEFAULT_MAX_DEPTH: usize = 40;

/// Follows symlinks one hop at a time up to a fixed depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkResolver {
    max_depth: usize,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl LinkResolver {
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Follow `path` until it reaches a non-link, a missing entry, an
    /// unreadable entry, or the depth limit.
    ///
    /// Always terminates: at most `max_depth` links are followed.
    pub fn resolve(&self, host: &dyn Host, path: &str) -> LinkChain {
        let mut hops = Vec::new();
        let mut current = PathBuf::from(path);
        let mut followed = 0usize;

        let terminal = loop {
            let shown = current.to_string_lossy().into_owned();
            let raw = match host.symlink_metadata(&current) {
                Ok(raw) => raw,
                Err(e) if is_absent(&e) => {
                    hops.push(LinkHop { path: shown, exists: false });
                    break LinkTerminal::Broken;
                }
                Err(e) => {
                    hops.push(LinkHop { path: shown.clone(), exists: false });
                    break unreadable(shown, &e);
                }
            };

            hops.push(LinkHop { path: shown.clone(), exists: true });
            match raw.kind {
                FileKind::File => break LinkTerminal::File,
                FileKind::Directory => break LinkTerminal::Directory,
                FileKind::Special => break LinkTerminal::Special,
                FileKind::Missing => break LinkTerminal::Broken,
                FileKind::Symlink => {}
            }

            if followed >= self.max_depth {
                debug!(path, depth = followed, "symlink depth limit reached");
                break LinkTerminal::Cycle { depth: followed };
            }

            let target = match host.read_link(&current) {
                Ok(target) => target,
                Err(e) => break unreadable(shown, &e),
            };
            current = next_hop(&current, &target);
            followed += 1;
        };

        LinkChain { hops, terminal }
    }
}

fn unreadable(path: String, err: &io::Error) -> LinkTerminal {
    LinkTerminal::Unreadable {
        path,
        reason: err.to_string(),
    }
}

/// Relative targets are relative to the directory containing the link.
fn next_hop(link: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    match link.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(target),
        _ => target.to_path_buf(),
    }
}

/// Whether a non-directory entry has other names (link count above one).
///
/// Directories always have a count of two or more, so they never qualify.
#[must_use]
pub fn has_other_names(kind: FileKind, meta: &EntryMeta) -> bool {
    kind != FileKind::Directory && meta.nlink > 1
}

/// [`has_other_names`] for a path, without following a final symlink.
pub fn distinguish_hard_link(host: &dyn Host, path: &str) -> io::Result<bool> {
    let raw = host.symlink_metadata(Path::new(path))?;
    Ok(raw.kind != FileKind::Directory && raw.nlink > 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SystemHost;
    use crate::memory::MemoryHost;
    use permdoc_core::{Identity, Principal};

    fn host() -> MemoryHost {
        let p = Principal::new(Identity::new(1000, "alice"), Identity::new(1000, "alice"), vec![]);
        MemoryHost::new(p)
            .dir("/etc", 0, 0, 0o755)
            .dir("/etc/alternatives", 0, 0, 0o755)
            .dir("/usr", 0, 0, 0o755)
            .dir("/usr/bin", 0, 0, 0o755)
            .file("/usr/bin/vim.basic", 0, 0, 0o755)
            .symlink("/usr/bin/vi", "/etc/alternatives/vi")
            .symlink("/etc/alternatives/vi", "../../usr/bin/vim.basic")
            .symlink("/usr/bin/loop1", "loop2")
            .symlink("/usr/bin/loop2", "loop1")
            .symlink("/usr/bin/dangling", "/opt/gone")
    }

    #[test]
    fn follows_multi_hop_chain() {
        let chain = LinkResolver::default().resolve(&host(), "/usr/bin/vi");
        assert_eq!(chain.terminal, LinkTerminal::File);
        assert_eq!(chain.link_count(), 2);
        assert!(chain.hops.iter().all(|h| h.exists));
        assert!(chain.describe().starts_with("/usr/bin/vi -> /etc/alternatives/vi"));
    }

    #[test]
    fn cycle_terminates_within_bound() {
        let resolver = LinkResolver::new(8);
        let chain = resolver.resolve(&host(), "/usr/bin/loop1");
        assert_eq!(chain.terminal, LinkTerminal::Cycle { depth: 8 });
        assert_eq!(chain.hops.len(), 9);
    }

    #[test]
    fn dangling_link_is_broken() {
        let chain = LinkResolver::default().resolve(&host(), "/usr/bin/dangling");
        assert_eq!(chain.terminal, LinkTerminal::Broken);
        assert_eq!(chain.final_path(), Some("/opt/gone"));
        assert!(!chain.hops.last().unwrap().exists);
    }

    #[test]
    fn real_cycle_on_disk_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::os::unix::fs::symlink(&b, &a).unwrap();
        std::os::unix::fs::symlink(&a, &b).unwrap();

        let chain = LinkResolver::default().resolve(&SystemHost::new(), a.to_str().unwrap());
        assert_eq!(chain.terminal, LinkTerminal::Cycle { depth: DEFAULT_MAX_DEPTH });
    }

    #[test]
    fn hard_links_detected_for_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original");
        std::fs::write(&original, b"data").unwrap();
        let host = SystemHost::new();
        assert!(!distinguish_hard_link(&host, original.to_str().unwrap()).unwrap());

        std::fs::hard_link(&original, dir.path().join("alias")).unwrap();
        assert!(distinguish_hard_link(&host, original.to_str().unwrap()).unwrap());
        assert!(!distinguish_hard_link(&host, dir.path().to_str().unwrap()).unwrap());
    }
}
