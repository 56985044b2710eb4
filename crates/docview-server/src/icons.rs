//! Memoized SVG icon reads for the `svg_icon` template function.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use docview_storage::{Storage, vpath};
use regex::Regex;

static ICON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_\-]+$").expect("icon name pattern compiles"));

/// Icon contents by name.
///
/// Failed reads are cached as the empty string. Two requests racing on the
/// same uncached name may both read the file; the second insert wins with an
/// identical value.
pub(crate) struct IconCache {
    storage: Arc<dyn Storage>,
    dir: String,
    icons: DashMap<String, String>,
}

impl IconCache {
    /// Cache icons from the virtual directory `dir`.
    pub(crate) fn new(storage: Arc<dyn Storage>, dir: &str) -> Self {
        Self {
            storage,
            dir: vpath::set_dir(&vpath::clean(dir)),
            icons: DashMap::new(),
        }
    }

    /// SVG markup of `<dir>/<name>.svg` with trailing whitespace trimmed.
    ///
    /// Returns an empty string for invalid names and unreadable files.
    pub(crate) fn get(&self, name: &str) -> String {
        if !ICON_NAME.is_match(name) {
            return String::new();
        }
        if let Some(svg) = self.icons.get(name) {
            return svg.clone();
        }

        let path = vpath::join(&self.dir, &format!("{name}.svg"));
        let svg = match self.storage.read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).trim_end().to_owned(),
            Err(err) => {
                tracing::debug!(path = %path, error = %err, "Icon not available");
                String::new()
            }
        };
        self.icons.insert(name.to_owned(), svg.clone());
        svg
    }
}
