//! Slash-separated virtual paths with a trailing directory marker.
//!
//! Unlike [`std::path::Path`], a trailing `/` is significant here: `"/docs/"`
//! names a directory while `"/docs"` names whatever `stat` finds. Cleaning keeps
//! the marker so that request semantics survive normalization.

/// Check whether a path carries the directory marker.
#[must_use]
pub fn is_dir(path: &str) -> bool {
    path.ends_with('/')
}

/// Append the directory marker if missing.
#[must_use]
pub fn set_dir(path: &str) -> String {
    if is_dir(path) {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}

/// Normalize a path lexically.
///
/// Collapses repeated separators, `.` and `..` segments. Rooted paths never
/// climb above `/`. The directory marker is kept, and added when the last
/// segment was `.` or `..`.
///
/// ```
/// use docview_storage::vpath::clean;
///
/// assert_eq!(clean("/a/./b/../c/"), "/a/c/");
/// assert_eq!(clean("/../etc/passwd"), "/etc/passwd");
/// assert_eq!(clean("/a/b/.."), "/a/");
/// ```
#[must_use]
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let last = path.rsplit('/').next().unwrap_or("");
    let dir_marker = path.ends_with('/') || last == "." || last == "..";

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            name => parts.push(name),
        }
    }

    let mut out = String::with_capacity(path.len() + 1);
    if rooted {
        out.push('/');
    }
    out.push_str(&parts.join("/"));

    if out.is_empty() {
        out.push('.');
    }
    if dir_marker && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Join a relative path onto a base and clean the result.
///
/// An absolute `rel` is still appended below `base`. Client paths must be
/// cleaned on their own first so that their `..` segments stop at `/`.
#[must_use]
pub fn join(base: &str, rel: &str) -> String {
    clean(&format!("{base}/{rel}"))
}

/// Split into the directory part (with its marker) and the file name.
///
/// ```
/// use docview_storage::vpath::split;
///
/// assert_eq!(split("/docs/a.md"), ("/docs/", "a.md"));
/// assert_eq!(split("/docs/"), ("/docs/", ""));
/// ```
#[must_use]
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..=i], &path[i + 1..]),
        None => ("", path),
    }
}

/// Parent directory of a directory path (`"/"` is its own parent).
#[must_use]
pub fn parent(dir: &str) -> String {
    clean(&format!("{}/..", dir.trim_end_matches('/')))
}

/// Last path segment without the directory marker (`"/"` for the root).
#[must_use]
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "" } else { "/" };
    }
    split(trimmed).1
}

/// Extension of the last segment, without the dot.
///
/// Returns an empty string for directories and names without a dot.
#[must_use]
pub fn ext(path: &str) -> &str {
    let (_, name) = split(path);
    name.rfind('.').map_or("", |i| &name[i + 1..])
}
