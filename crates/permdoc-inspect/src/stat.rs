//! Build [`FileState`] snapshots from host metadata.

use std::io;
use std::path::Path;

use permdoc_core::{EntryMeta, FileKind, FileState, LinkInfo, Mode};

use crate::host::{is_absent, Host, RawMeta};

/// State of the entry at `path` without following a final symlink.
///
/// An absent path is `Ok(FileState::missing)`; any other failure (for
/// example `EACCES` on a parent) is returned so the caller can report it.
pub fn entry_state(host: &dyn Host, path: &str) -> io::Result<FileState> {
    let raw = match host.symlink_metadata(Path::new(path)) {
        Ok(raw) => raw,
        Err(e) if is_absent(&e) => return Ok(FileState::missing(path)),
        Err(e) => return Err(e),
    };

    let state = FileState::present(path, raw.kind, entry_meta(host, &raw));
    if raw.kind != FileKind::Symlink {
        return Ok(state);
    }

    let target = host
        .read_link(Path::new(path))?
        .to_string_lossy()
        .into_owned();
    let resolves = host.metadata(Path::new(path)).is_ok();
    Ok(state.with_link(LinkInfo { target, resolves }))
}

/// State of whatever `path` finally points to, following symlinks.
///
/// The returned state keeps `path` as given; its kind is never
/// `Symlink`.
pub fn followed_state(host: &dyn Host, path: &str) -> io::Result<FileState> {
    match host.metadata(Path::new(path)) {
        Ok(raw) => Ok(FileState::present(path, raw.kind, entry_meta(host, &raw))),
        Err(e) if is_absent(&e) => Ok(FileState::missing(path)),
        Err(e) => Err(e),
    }
}

/// Attach names to raw metadata.
pub fn entry_meta(host: &dyn Host, raw: &RawMeta) -> EntryMeta {
    EntryMeta {
        owner: host.user_identity(raw.uid),
        group: host.group_identity(raw.gid),
        mode: Mode::from_bits(raw.mode),
        nlink: raw.nlink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use permdoc_core::{Identity, Principal};

    fn host() -> MemoryHost {
        let p = Principal::new(Identity::new(1000, "alice"), Identity::new(1000, "alice"), vec![]);
        MemoryHost::new(p)
            .user(33, "www-data")
            .dir("/srv", 0, 0, 0o755)
            .file("/srv/index.html", 33, 33, 0o640)
            .symlink("/srv/current", "/srv/index.html")
            .symlink("/srv/stale", "/srv/gone")
            .deny("/srv/private")
    }

    #[test]
    fn names_owner_and_falls_back_to_number() {
        let state = entry_state(&host(), "/srv/index.html").unwrap();
        let meta = state.meta().unwrap();
        assert_eq!(meta.owner.name, "www-data");
        assert_eq!(meta.group.name, "33");
        assert_eq!(meta.mode.bits(), 0o640);
    }

    #[test]
    fn symlink_records_target_and_health() {
        let h = host();
        let ok = entry_state(&h, "/srv/current").unwrap();
        assert_eq!(ok.kind(), FileKind::Symlink);
        assert!(ok.link().unwrap().resolves);

        let stale = entry_state(&h, "/srv/stale").unwrap();
        assert_eq!(stale.link().unwrap().target, "/srv/gone");
        assert!(!stale.link().unwrap().resolves);
    }

    #[test]
    fn followed_state_sees_through_links() {
        let state = followed_state(&host(), "/srv/current").unwrap();
        assert_eq!(state.kind(), FileKind::File);
        assert_eq!(state.path(), "/srv/current");
        assert!(!followed_state(&host(), "/srv/stale").unwrap().exists());
    }

    #[test]
    fn missing_and_denied_differ() {
        let h = host();
        assert!(!entry_state(&h, "/srv/nope").unwrap().exists());
        assert!(entry_state(&h, "/srv/private").is_err());
    }
}
