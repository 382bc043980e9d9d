//! Command resolution against a search path.
//!
//! Resolution only answers "where is it"; whether the match can be run is
//! left to the permission checks, so "not found anywhere" and "found but
//! not runnable" stay distinguishable.

use std::path::Path;

use permdoc_core::{
    EntryStatus, FileKind, Finding, FindingCode, PathEntry, ResolvedLocation, SearchPath,
};
use tracing::debug;

use crate::host::Host;

/// Candidate path for `name` in one entry.
fn candidate(entry: &PathEntry, name: &str) -> String {
    Path::new(entry.directory())
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn is_regular_file(host: &dyn Host, path: &str) -> bool {
    host.metadata(Path::new(path))
        .is_ok_and(|m| m.kind == FileKind::File)
}

/// Whether `name` is looked up through the search path at all.
///
/// Like the shell, a name containing `/` is never searched for.
pub fn is_searchable(name: &str) -> bool {
    !name.is_empty() && !name.contains('/')
}

/// First entry, in search order, holding a regular file named `name`.
pub fn resolve(host: &dyn Host, search_path: &SearchPath, name: &str) -> Option<ResolvedLocation> {
    if !is_searchable(name) {
        debug!(name, "name contains '/', not searched");
        return None;
    }
    search_path
        .entries()
        .iter()
        .enumerate()
        .find_map(|(index, entry)| locate(host, index, entry, name))
}

/// Every entry holding a regular file named `name`, in search order.
/// The first element, if any, equals [`resolve`].
pub fn resolve_all(host: &dyn Host, search_path: &SearchPath, name: &str) -> Vec<ResolvedLocation> {
    if !is_searchable(name) {
        return Vec::new();
    }
    search_path
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| locate(host, index, entry, name))
        .collect()
}

fn locate(host: &dyn Host, index: usize, entry: &PathEntry, name: &str) -> Option<ResolvedLocation> {
    let path = candidate(entry, name);
    if is_regular_file(host, &path) {
        debug!(name, path = %path, index, "command match");
        Some(ResolvedLocation {
            entry_index: index,
            directory: entry.directory().to_string(),
            path,
        })
    } else {
        None
    }
}

/// Whether an entry exists and is a directory (following symlinks).
pub fn probe(host: &dyn Host, entry: &PathEntry) -> EntryStatus {
    match host.metadata(Path::new(entry.directory())) {
        Ok(meta) => EntryStatus {
            exists: true,
            is_directory: meta.kind == FileKind::Directory,
        },
        Err(_) => EntryStatus {
            exists: false,
            is_directory: false,
        },
    }
}

/// Hygiene findings for a search path: per-entry problems in entry
/// order, then one finding per duplicated entry.
pub fn audit(host: &dyn Host, search_path: &SearchPath) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, entry) in search_path.entries().iter().enumerate() {
        let position = index + 1;
        if entry.is_empty() {
            findings.push(Finding::new(
                FindingCode::EmptyPathSegment,
                format!(
                    "entry #{position} is empty; the shell searches the current directory there"
                ),
            ));
            continue;
        }

        if !entry.is_absolute() {
            findings.push(
                Finding::new(
                    FindingCode::RelativePathEntry,
                    format!(
                        "entry #{position} '{entry}' is relative; what it finds depends on the current directory"
                    ),
                )
                .with_subject(entry.raw()),
            );
        }

        let status = probe(host, entry);
        if !status.exists {
            findings.push(
                Finding::new(
                    FindingCode::MissingPathEntry,
                    format!("entry #{position} '{entry}' does not exist"),
                )
                .with_subject(entry.raw()),
            );
        } else if !status.is_directory {
            findings.push(
                Finding::new(
                    FindingCode::PathEntryNotDirectory,
                    format!("entry #{position} '{entry}' is not a directory"),
                )
                .with_subject(entry.raw()),
            );
        }
    }

    for duplicate in search_path.find_duplicates() {
        findings.push(
            Finding::new(
                FindingCode::DuplicatePathEntry,
                format!("'{duplicate}' appears more than once; later copies are never reached"),
            )
            .with_subject(duplicate),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use permdoc_core::{Identity, Principal};

    fn host() -> MemoryHost {
        let p = Principal::new(Identity::new(1000, "alice"), Identity::new(1000, "alice"), vec![]);
        MemoryHost::new(p)
            .dir("/usr", 0, 0, 0o755)
            .dir("/usr/local", 0, 0, 0o755)
            .dir("/usr/local/bin", 0, 0, 0o755)
            .dir("/usr/bin", 0, 0, 0o755)
            .dir("/bin", 0, 0, 0o755)
            .file("/usr/bin/foo", 0, 0, 0o755)
            .file("/bin/foo", 0, 0, 0o755)
            .dir("/usr/local/bin/bar", 0, 0, 0o755)
            .file("/bin/bar", 0, 0, 0o644)
    }

    fn standard() -> SearchPath {
        SearchPath::from_entries(["/usr/local/bin", "/usr/bin", "/bin"])
    }

    #[test]
    fn first_match_wins() {
        let loc = resolve(&host(), &standard(), "foo").unwrap();
        assert_eq!(loc.path, "/usr/bin/foo");
        assert_eq!(loc.entry_index, 1);
    }

    #[test]
    fn directories_are_skipped_and_mode_ignored() {
        // /usr/local/bin/bar is a directory; /bin/bar is not executable but
        // resolution does not look at permissions.
        let loc = resolve(&host(), &standard(), "bar").unwrap();
        assert_eq!(loc.path, "/bin/bar");
    }

    #[test]
    fn names_with_slash_are_not_searched() {
        let h = host().dir("/opt", 0, 0, 0o755).file("/opt/foo", 0, 0, 0o755);
        assert!(resolve(&h, &standard(), "/opt/foo").is_none());
        assert!(resolve_all(&h, &standard(), "/opt/foo").is_empty());
        // /usr joined with bin/foo exists, but is not a search path match
        assert!(resolve(&h, &SearchPath::from_entries(["/usr"]), "bin/foo").is_none());
        assert!(!is_searchable(""));
        assert!(is_searchable("foo"));
    }

    #[test]
    fn no_match_is_none() {
        assert!(resolve(&host(), &standard(), "nonexistent").is_none());
    }

    #[test]
    fn resolve_all_lists_shadowed_matches() {
        let all = resolve_all(&host(), &standard(), "foo");
        let paths: Vec<&str> = all.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, ["/usr/bin/foo", "/bin/foo"]);
        assert_eq!(Some(&all[0]), resolve(&host(), &standard(), "foo").as_ref());
    }

    #[test]
    fn audit_reports_in_entry_order_then_duplicates() {
        let sp = SearchPath::parse_with("/usr/bin::bin:/opt/missing:/bin/foo:/usr/bin", ':');
        let codes: Vec<FindingCode> = audit(&host(), &sp).iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            [
                FindingCode::EmptyPathSegment,
                FindingCode::RelativePathEntry,
                FindingCode::MissingPathEntry,
                FindingCode::PathEntryNotDirectory,
                FindingCode::DuplicatePathEntry,
            ]
        );
    }

    #[test]
    fn clean_path_has_no_findings() {
        assert!(audit(&host(), &standard()).is_empty());
    }
}
