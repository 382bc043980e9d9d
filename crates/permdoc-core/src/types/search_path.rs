use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::platform::Platform;

/// One directory string from a search path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathEntry {
    raw: String,
}

impl PathEntry {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The entry exactly as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// An empty entry, which the shell treats as the current directory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.raw.starts_with('/')
    }

    /// Directory to search: `.` for an empty entry.
    pub fn directory(&self) -> &str {
        if self.raw.is_empty() {
            "."
        } else {
            &self.raw
        }
    }

    /// Comparison key: trailing slashes removed, `/` kept as is.
    fn key(&self) -> &str {
        let trimmed = self.raw.trim_end_matches('/');
        if trimmed.is_empty() && !self.raw.is_empty() {
            "/"
        } else {
            trimmed
        }
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Filesystem status of a search path entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatus {
    pub exists: bool,
    pub is_directory: bool,
}

/// Ordered list of directories consulted to resolve a command name.
///
/// Order is kept exactly as authored and duplicates are kept; only
/// [`SearchPath::clean`] removes them, producing a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPath {
    entries: Vec<PathEntry>,
    separator: char,
}

impl SearchPath {
    /// Split a raw search path on the platform separator. Empty segments
    /// are preserved.
    #[must_use]
    pub fn parse(raw: &str, platform: Platform) -> Self {
        Self::parse_with(raw, platform.path_separator())
    }

    #[must_use]
    pub fn parse_with(raw: &str, separator: char) -> Self {
        Self {
            entries: raw.split(separator).map(PathEntry::new).collect(),
            separator,
        }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(PathEntry::new).collect(),
            separator: Platform::detect().path_separator(),
        }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Indices of empty segments.
    pub fn empty_segments(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Entries that appear more than once, in order of first occurrence.
    ///
    /// `/usr/bin` and `/usr/bin/` count as the same entry. Empty segments
    /// are left to [`SearchPath::empty_segments`].
    pub fn find_duplicates(&self) -> Vec<String> {
        let mut first_seen: Vec<(&str, &str)> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for entry in self.entries.iter().filter(|e| !e.is_empty()) {
            let key = entry.key();
            *counts.entry(key).or_insert_with(|| {
                first_seen.push((key, entry.raw()));
                0
            }) += 1;
        }

        first_seen
            .into_iter()
            .filter(|(key, _)| counts.get(key).copied().unwrap_or(0) > 1)
            .map(|(_, raw)| raw.to_string())
            .collect()
    }

    /// A new search path with later duplicates removed, first-seen
    /// order preserved.
    #[must_use]
    pub fn clean(&self) -> Self {
        let mut seen = HashSet::new();
        let entries = self
            .entries
            .iter()
            .filter(|e| seen.insert(e.key().to_string()))
            .cloned()
            .collect();
        Self {
            entries,
            separator: self.separator,
        }
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = self.separator.to_string();
        let joined: Vec<&str> = self.entries.iter().map(PathEntry::raw).collect();
        f.write_str(&joined.join(&sep))
    }
}

/// Where a command name resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Zero-based index of the matching entry
    pub entry_index: usize,
    /// Directory searched (`.` for an empty entry)
    pub directory: String,
    /// Full path of the match
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_order_and_empty_segments() {
        let sp = SearchPath::parse_with("/usr/local/bin::/usr/bin:", ':');
        let raw: Vec<&str> = sp.entries().iter().map(PathEntry::raw).collect();
        assert_eq!(raw, ["/usr/local/bin", "", "/usr/bin", ""]);
        assert_eq!(sp.empty_segments(), vec![1, 3]);
        assert_eq!(sp.to_string(), "/usr/local/bin::/usr/bin:");
    }

    #[test]
    fn duplicates_reported_once() {
        let sp = SearchPath::from_entries(["/bin", "/usr/bin", "/bin"]);
        assert_eq!(sp.find_duplicates(), vec!["/bin".to_string()]);
    }

    #[test]
    fn duplicates_in_first_occurrence_order() {
        let sp = SearchPath::from_entries(["/a", "/b", "/b", "/a", "/c", "/c"]);
        assert_eq!(sp.find_duplicates(), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn trailing_slash_counts_as_duplicate() {
        let sp = SearchPath::from_entries(["/usr/bin/", "/usr/bin", "/", "//"]);
        assert_eq!(sp.find_duplicates(), vec!["/usr/bin/", "/"]);
    }

    #[test]
    fn clean_returns_new_path_in_first_seen_order() {
        let sp = SearchPath::parse_with("/bin:/usr/bin:/bin:/sbin:/usr/bin", ':');
        let cleaned = sp.clean();
        assert_eq!(cleaned.to_string(), "/bin:/usr/bin:/sbin");
        // original untouched
        assert_eq!(sp.len(), 5);
    }

    #[test]
    fn empty_entry_searches_current_directory() {
        assert_eq!(PathEntry::new("").directory(), ".");
        assert_eq!(PathEntry::new("/bin").directory(), "/bin");
    }
}
