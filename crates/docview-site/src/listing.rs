//! Directory listings merged across priority-ordered storage roots.

use std::collections::HashMap;
use std::time::SystemTime;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use docview_storage::{Storage, StorageError, vpath};
use regex::Regex;
use serde::Serialize;

use crate::SiteConfigError;

/// Default pattern for both hidden-name and hidden-path sets.
pub const DEFAULT_HIDDEN: &str = r"^\.[^/]";

/// Default strftime pattern for entry timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%F %T";

const SELF_ENTRY: &str = "./";
const PARENT_ENTRY: &str = "../";

/// One row of a merged listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Entry name; directories carry a trailing `/`.
    pub name: String,
    /// Link relative to the listed directory.
    pub path: String,
    /// Modification time formatted with the configured pattern.
    pub stamp: String,
}

/// Merges directory contents of several roots.
///
/// Earlier roots shadow later ones: for an ordinary name only the first root
/// providing it contributes. The synthetic `./` and `../` entries take the
/// latest modification time seen across all roots.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    roots: Vec<String>,
    hidden: Vec<Regex>,
    path_hidden: Vec<Regex>,
    timestamp_format: String,
}

fn compile(patterns: &[impl AsRef<str>]) -> Result<Vec<Regex>, SiteConfigError> {
    patterns
        .iter()
        .map(|p| Regex::new(p.as_ref()).map_err(SiteConfigError::from))
        .collect()
}

fn is_synthetic(name: &str) -> bool {
    name == SELF_ENTRY || name == PARENT_ENTRY
}

/// Sort key: directories first, then the name without its marker.
fn sort_key(name: &str) -> (bool, &str) {
    let is_file = !name.ends_with('/');
    (is_file, name.trim_end_matches('/'))
}

impl DirectoryListing {
    /// Create a listing over `roots` (virtual paths, highest priority first)
    /// with the default hidden patterns and timestamp format.
    #[must_use]
    pub fn new(roots: &[impl AsRef<str>]) -> Self {
        let hidden = vec![Regex::new(DEFAULT_HIDDEN).expect("default hidden pattern compiles")];
        Self {
            roots: roots
                .iter()
                .map(|r| vpath::set_dir(&vpath::clean(r.as_ref())))
                .collect(),
            hidden: hidden.clone(),
            path_hidden: hidden,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }

    /// Replace the patterns matched against immediate entry names.
    ///
    /// # Errors
    ///
    /// Returns [`SiteConfigError::Pattern`] if a pattern doesn't compile.
    pub fn with_hidden(mut self, patterns: &[impl AsRef<str>]) -> Result<Self, SiteConfigError> {
        self.hidden = compile(patterns)?;
        Ok(self)
    }

    /// Replace the patterns matched against root-relative entry paths
    /// (e.g. `"/guide/drafts/"`).
    ///
    /// # Errors
    ///
    /// Returns [`SiteConfigError::Pattern`] if a pattern doesn't compile.
    pub fn with_path_hidden(
        mut self,
        patterns: &[impl AsRef<str>],
    ) -> Result<Self, SiteConfigError> {
        self.path_hidden = compile(patterns)?;
        Ok(self)
    }

    /// Set the strftime pattern used for entry timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`SiteConfigError::TimestampFormat`] if chrono rejects the pattern.
    pub fn with_timestamp_format(mut self, format: &str) -> Result<Self, SiteConfigError> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(SiteConfigError::TimestampFormat(format.to_owned()));
        }
        self.timestamp_format = format.to_owned();
        Ok(self)
    }

    /// Configured roots, highest priority first.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// List `rel_dir` across all roots.
    ///
    /// The `./` entry is only included when `include_self` is set. Roots where
    /// the directory is missing or unreadable are skipped.
    #[must_use]
    pub fn list(
        &self,
        storage: &dyn Storage,
        rel_dir: &str,
        include_self: bool,
    ) -> Vec<DirectoryEntry> {
        let rel_dir = vpath::set_dir(&vpath::clean(&format!("/{rel_dir}")));

        let mut merged: Vec<(String, SystemTime)> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for root in &self.roots {
            let full_dir = vpath::join(root, &rel_dir);
            let entries = match self.root_entries(storage, &full_dir, &rel_dir) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::debug!(dir = %full_dir, error = %err, "Skipping root in listing");
                    continue;
                }
            };

            for (name, modified) in entries {
                if let Some(&i) = seen.get(&name) {
                    if is_synthetic(&name) && modified > merged[i].1 {
                        merged[i].1 = modified;
                    }
                    continue;
                }
                seen.insert(name.clone(), merged.len());
                merged.push((name, modified));
            }
        }

        let mut listing: Vec<DirectoryEntry> = merged
            .into_iter()
            .filter(|(name, _)| include_self || name != SELF_ENTRY)
            .map(|(name, modified)| {
                let path = if is_synthetic(&name) {
                    name.clone()
                } else {
                    format!("./{name}")
                };
                DirectoryEntry {
                    stamp: self.format_time(modified),
                    name,
                    path,
                }
            })
            .collect();

        listing.sort_by(|a, b| sort_key(&a.name).cmp(&sort_key(&b.name)));
        listing
    }

    /// Latest modification time of `rel_dir` itself across all roots.
    ///
    /// Returns `None` when no root has the directory.
    #[must_use]
    pub fn dir_mod_time(&self, storage: &dyn Storage, rel_dir: &str) -> Option<DateTime<Utc>> {
        let rel_dir = vpath::set_dir(&vpath::clean(&format!("/{rel_dir}")));

        self.roots
            .iter()
            .filter_map(|root| storage.stat(&vpath::join(root, &rel_dir)).ok())
            .filter(|info| info.is_dir)
            .map(|info| DateTime::<Utc>::from(info.modified))
            .max()
    }

    /// Entries of one root, filtered, with the synthetic entries appended.
    fn root_entries(
        &self,
        storage: &dyn Storage,
        full_dir: &str,
        rel_dir: &str,
    ) -> Result<Vec<(String, SystemTime)>, StorageError> {
        let mut entries = Vec::new();

        for info in storage.read_dir(full_dir)? {
            if self.hidden.iter().any(|re| re.is_match(&info.name)) {
                continue;
            }
            let name = if info.is_dir {
                vpath::set_dir(&info.name)
            } else {
                info.name
            };
            let rel_name = format!("{rel_dir}{name}");
            if self.path_hidden.iter().any(|re| re.is_match(&rel_name)) {
                continue;
            }
            entries.push((name, info.modified));
        }

        let own = storage.stat(full_dir)?;
        entries.push((SELF_ENTRY.to_owned(), own.modified));

        if rel_dir != "/" {
            let parent = storage.stat(&vpath::parent(full_dir))?;
            entries.push((PARENT_ENTRY.to_owned(), parent.modified));
        }

        Ok(entries)
    }

    fn format_time(&self, time: SystemTime) -> String {
        DateTime::<Utc>::from(time)
            .format(&self.timestamp_format)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use docview_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    fn two_roots() -> MockStorage {
        MockStorage::new()
            .with_file("/a/docs/notes.txt", "a")
            .with_mtime("/a/docs/notes.txt", 1_000)
            .with_file("/a/docs/zeta.md", "z")
            .with_file("/a/docs/.secret", "s")
            .with_dir("/a/docs/images")
            .with_mtime("/a/docs", 10)
            .with_mtime("/a", 5)
            .with_file("/b/docs/notes.txt", "b")
            .with_mtime("/b/docs/notes.txt", 2_000)
            .with_file("/b/docs/alpha.md", "a")
            .with_dir("/b/docs/images")
            .with_dir("/b/docs/archive")
            .with_mtime("/b/docs", 20)
            .with_mtime("/b", 30)
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_first_root_wins_for_ordinary_names() {
        let listing = DirectoryListing::new(&["/a", "/b"])
            .with_timestamp_format("%s")
            .unwrap();

        let entries = listing.list(&two_roots(), "/docs/", false);

        let notes = entries.iter().find(|e| e.name == "notes.txt").unwrap();
        assert_eq!(notes.stamp, "1000");
        assert_eq!(
            entries.iter().filter(|e| e.name == "notes.txt").count(),
            1
        );
    }

    #[test]
    fn test_sorted_dirs_first_and_unique() {
        let listing = DirectoryListing::new(&["/a", "/b"]);

        let entries = listing.list(&two_roots(), "/docs", true);

        assert_eq!(
            names(&entries),
            vec![
                "./",
                "../",
                "archive/",
                "images/",
                "alpha.md",
                "notes.txt",
                "zeta.md"
            ]
        );
    }

    #[test]
    fn test_self_entry_only_on_request() {
        let listing = DirectoryListing::new(&["/a", "/b"]);

        let entries = listing.list(&two_roots(), "/docs/", false);

        assert!(!entries.iter().any(|e| e.name == "./"));
        assert!(entries.iter().any(|e| e.name == "../"));
    }

    #[test]
    fn test_synthetic_entries_take_latest_time() {
        let listing = DirectoryListing::new(&["/a", "/b"])
            .with_timestamp_format("%s")
            .unwrap();

        let entries = listing.list(&two_roots(), "/docs/", true);

        let current = entries.iter().find(|e| e.name == "./").unwrap();
        let parent = entries.iter().find(|e| e.name == "../").unwrap();
        assert_eq!(current.stamp, "20");
        assert_eq!(parent.stamp, "30");
    }

    #[test]
    fn test_links() {
        let listing = DirectoryListing::new(&["/a"]);

        let entries = listing.list(&two_roots(), "/docs/", true);

        let links: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            links,
            vec![
                ("./", "./"),
                ("../", "../"),
                ("images/", "./images/"),
                ("notes.txt", "./notes.txt"),
                ("zeta.md", "./zeta.md"),
            ]
        );
    }

    #[test]
    fn test_hidden_names_are_filtered() {
        let listing = DirectoryListing::new(&["/a"]);

        let entries = listing.list(&two_roots(), "/docs/", false);

        assert!(!entries.iter().any(|e| e.name == ".secret"));
    }

    #[test]
    fn test_hidden_paths_are_filtered() {
        let listing = DirectoryListing::new(&["/a", "/b"])
            .with_path_hidden(&[r"^/docs/archive/$", r"\.md$"])
            .unwrap();

        let entries = listing.list(&two_roots(), "/docs/", false);

        assert_eq!(names(&entries), vec!["../", "images/", "notes.txt"]);
    }

    #[test]
    fn test_root_listing_has_no_parent() {
        let listing = DirectoryListing::new(&["/a/docs"]);

        let entries = listing.list(&two_roots(), "/", true);

        assert_eq!(&names(&entries)[..2], &["./", "images/"]);
        assert!(!entries.iter().any(|e| e.name == "../"));
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let listing = DirectoryListing::new(&["/missing", "/a"]);

        let entries = listing.list(&two_roots(), "/docs/", false);

        assert!(entries.iter().any(|e| e.name == "zeta.md"));
    }

    #[test]
    fn test_dir_mod_time_is_latest_across_roots() {
        let listing = DirectoryListing::new(&["/a", "/b"]);

        assert_eq!(
            listing.dir_mod_time(&two_roots(), "/docs/"),
            DateTime::from_timestamp(20, 0)
        );
        assert_eq!(listing.dir_mod_time(&two_roots(), "/nowhere/"), None);
    }

    #[test]
    fn test_default_timestamp_format() {
        let listing = DirectoryListing::new(&["/a"]);

        let entries = listing.list(&two_roots(), "/docs/", false);

        let notes = entries.iter().find(|e| e.name == "notes.txt").unwrap();
        assert_eq!(notes.stamp, "1970-01-01 00:16:40");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            DirectoryListing::new(&["/a"]).with_hidden(&["("]),
            Err(SiteConfigError::Pattern(_))
        ));
        assert!(matches!(
            DirectoryListing::new(&["/a"]).with_timestamp_format("%Q"),
            Err(SiteConfigError::TimestampFormat(_))
        ));
    }
}
