//! Breadcrumb links for a request path.

use docview_storage::vpath;
use serde::Serialize;

/// One breadcrumb: a path segment and a link to it relative to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathLink {
    /// Segment label (`"/"` for the root).
    pub name: String,
    /// Relative link; empty for the current page.
    pub path: String,
}

/// Build breadcrumbs for `path`.
///
/// Relative links are computed so that they work from the page itself: for a
/// directory page the current directory is `""`, for a file page its
/// directory is `"."`. Returns an empty list for relative paths.
///
/// ```
/// use docview_site::path_links;
///
/// let links = path_links("/a/b.md");
/// let paths: Vec<&str> = links.iter().map(|l| l.path.as_str()).collect();
/// assert_eq!(paths, ["..", ".", ""]);
/// ```
#[must_use]
pub fn path_links(path: &str) -> Vec<PathLink> {
    if !path.starts_with('/') {
        return Vec::new();
    }
    let path = vpath::clean(path);
    let is_dir = vpath::is_dir(&path);

    let names: Vec<&str> = std::iter::once("/")
        .chain(path.split('/').filter(|s| !s.is_empty()))
        .collect();
    let last = names.len() - 1;

    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let rev = last - i;
            let link = match (is_dir, rev) {
                (_, 0) => String::new(),
                (false, 1) => ".".to_owned(),
                (true, n) => format!("{}..", "../".repeat(n - 1)),
                (false, n) => format!("{}..", "../".repeat(n - 2)),
            };
            PathLink {
                name: (*name).to_owned(),
                path: link,
            }
        })
        .collect()
}
