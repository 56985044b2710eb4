//! Configuration management for docview.
//!
//! Parses `docview.toml` with serde and provides auto-discovery of the config
//! file in parent directories. CLI settings can be applied during load via
//! [`CliSettings`].
//!
//! Loading happens in two phases: the main file is parsed, expanded and its
//! paths resolved against the config directory; then the documents it imports
//! (MIME table, markdown configuration and through it the emoji mapping and
//! embed rules) are read. [`Config::mod_time`] is the newest modification
//! time of the whole set.
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`:
//!
//! - `server.host`
//! - `view.document_root`, `view.cache_control`, `view.url_top_path`,
//!   `view.url_lib_path`, `view.icon_path`
//! - `directory_view.roots`
//! - `authz.user_header`

mod expand;
mod imports;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use docview_renderer::{MarkdownConfig, RenderConfigError};
use docview_site::{ContentTypes, DEFAULT_TIMESTAMP_FORMAT, SiteConfigError};
use serde::{Deserialize, Serialize};

use imports::ImportTracker;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the document root.
    pub document_root: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docview.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Page view configuration (paths as written).
    view: ViewConfigRaw,
    /// Directory listing configuration (paths as written).
    directory_view: DirectoryViewConfigRaw,
    /// Personalization.
    pub authz: AuthzConfig,

    /// Resolved view configuration (set after loading).
    #[serde(skip)]
    pub view_resolved: ViewConfig,
    /// Resolved directory view configuration (set after loading).
    #[serde(skip)]
    pub directory_view_resolved: DirectoryViewConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    #[serde(skip)]
    mod_time: Option<SystemTime>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Theme selection exposed to templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeStyle {
    /// Theme picked with radio buttons.
    #[default]
    Radio,
    /// Follow the OS preference.
    Os,
}

/// Location navigation exposed to templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationNavi {
    /// Breadcrumb links.
    #[default]
    Dirs,
    /// No navigation.
    None,
}

/// How plain text documents are served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextViewMode {
    /// Embedded in the page template.
    #[default]
    Html,
    /// Served as-is.
    Raw,
}

/// Whether a directory listing accompanies a page, and whether it starts open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryViewMode {
    /// Never list.
    None,
    /// List for directory requests only.
    #[default]
    Autoindex,
    /// Always list, collapsed.
    Close,
    /// Always list, open for directory requests.
    Auto,
    /// Always list, open.
    Open,
}

impl DirectoryViewMode {
    /// True when a listing is shown for the request.
    ///
    /// `directory_target` is true when the request names a directory, whether
    /// or not an index document is rendered in its place.
    #[must_use]
    pub fn shows(self, directory_target: bool) -> bool {
        match self {
            Self::None => false,
            Self::Autoindex => directory_target,
            Self::Close | Self::Auto | Self::Open => true,
        }
    }

    /// True when a shown listing starts open.
    #[must_use]
    pub fn opens(self, directory_target: bool) -> bool {
        match self {
            Self::None | Self::Close => false,
            Self::Auto => directory_target,
            Self::Autoindex | Self::Open => true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ViewConfigRaw {
    document_root: Option<String>,
    index_name: Option<String>,
    cache_control: Option<String>,
    url_top_path: Option<String>,
    url_lib_path: Option<String>,
    template_paths: Option<Vec<String>>,
    main_template: Option<String>,
    icon_path: Option<String>,
    mime_table: Option<String>,
    markdown_extensions: Option<Vec<String>>,
    markdown_config: Option<String>,
    theme_style: ThemeStyle,
    location_navi: LocationNavi,
    text_view_mode: TextViewMode,
    raw_passthrough: Option<bool>,
}

/// Resolved page view configuration.
#[derive(Debug)]
pub struct ViewConfig {
    /// Served directory.
    pub document_root: PathBuf,
    /// Document substituted for directory requests.
    pub index_name: String,
    /// `Cache-Control` value; empty to omit the header.
    pub cache_control: String,
    /// URL of the site root, for templates.
    pub url_top_path: String,
    /// URL of static assets, for templates.
    pub url_lib_path: String,
    /// Template files; empty for the packaged page template.
    pub template_paths: Vec<PathBuf>,
    /// Name of the page template.
    pub main_template: String,
    /// Directory of SVG icons.
    pub icon_path: PathBuf,
    /// Extension classification, with the MIME table import applied.
    pub content_types: ContentTypes,
    /// Render configuration, with its imports applied.
    pub markdown: MarkdownConfig,
    pub theme_style: ThemeStyle,
    pub location_navi: LocationNavi,
    pub text_view_mode: TextViewMode,
    /// Serve non-text documents; refused with 415 when false.
    pub raw_passthrough: bool,

    mime_table: Option<PathBuf>,
    markdown_config: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("docs"),
            index_name: "README.md".to_owned(),
            cache_control: String::new(),
            url_top_path: "/".to_owned(),
            url_lib_path: "/".to_owned(),
            template_paths: Vec::new(),
            main_template: "page.html".to_owned(),
            icon_path: PathBuf::from("icons"),
            content_types: ContentTypes::new(),
            markdown: MarkdownConfig::default(),
            theme_style: ThemeStyle::default(),
            location_navi: LocationNavi::default(),
            text_view_mode: TextViewMode::default(),
            raw_passthrough: true,
            mime_table: None,
            markdown_config: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DirectoryViewConfigRaw {
    mode: DirectoryViewMode,
    roots: Option<Vec<String>>,
    hidden: Option<Vec<String>>,
    path_hidden: Option<Vec<String>>,
    timestamp_format: Option<String>,
}

/// Resolved directory listing configuration.
#[derive(Debug)]
pub struct DirectoryViewConfig {
    pub mode: DirectoryViewMode,
    /// Merged roots in priority order; the document root when not configured.
    pub roots: Vec<PathBuf>,
    /// Hidden name patterns; empty for the default.
    pub hidden: Vec<String>,
    /// Hidden path patterns; empty for the default.
    pub path_hidden: Vec<String>,
    /// strftime pattern for entry timestamps.
    pub timestamp_format: String,
}

impl Default for DirectoryViewConfig {
    fn default() -> Self {
        Self {
            mode: DirectoryViewMode::default(),
            roots: Vec::new(),
            hidden: Vec::new(),
            path_hidden: Vec::new(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }
}

/// Personalization settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Request header carrying the user identity.
    pub user_header: String,
    /// Use the identity for templates and validators.
    pub personalize: bool,
    /// Known users and their groups.
    pub users: BTreeMap<String, Vec<String>>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            user_header: "X-Forwarded-User".to_owned(),
            personalize: false,
            users: BTreeMap::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`view.document_root`").
        field: String,
        /// Error message (e.g., "${`DOCS`} not set").
        message: String,
    },
    /// An imported document could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    ImportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An imported document is not valid TOML.
    #[error("Invalid {}: {source}", path.display())]
    ImportParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Invalid render configuration.
    #[error(transparent)]
    Render(#[from] RenderConfigError),
    /// Invalid MIME table.
    #[error(transparent)]
    Site(#[from] SiteConfigError),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL path field to be absolute.
fn require_url_path(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!("{field} must start with /")));
    }
    Ok(())
}

/// Require a filesystem path to be valid UTF-8.
fn require_utf8(path: &Path, field: &str) -> Result<(), ConfigError> {
    if path.to_str().is_none() {
        return Err(ConfigError::Validation(format!(
            "{field} is not valid UTF-8: {}",
            path.display()
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docview.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, an
    /// import is invalid or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Newest modification time of the config file and its imports.
    ///
    /// `UNIX_EPOCH` without a config file.
    #[must_use]
    pub fn mod_time(&self) -> SystemTime {
        self.mod_time.unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(document_root) = &settings.document_root {
            // listing follows the document root unless roots were configured
            if self.directory_view.roots.is_none() {
                self.directory_view_resolved.roots = vec![document_root.clone()];
            }
            self.view_resolved.document_root.clone_from(document_root);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            server: ServerConfig::default(),
            view: ViewConfigRaw::default(),
            directory_view: DirectoryViewConfigRaw::default(),
            authz: AuthzConfig::default(),
            view_resolved: ViewConfig::default(),
            directory_view_resolved: DirectoryViewConfig::default(),
            config_path: None,
            mod_time: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut tracker = ImportTracker::default();
        let content = tracker.read(path).map_err(|err| match err {
            ConfigError::ImportIo { source, .. } => ConfigError::Io(source),
            other => other,
        })?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.resolve_imports(&mut tracker)?;
        config.mod_time = tracker.mod_time();
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_view()?;
        self.validate_directory_view()?;
        if self.authz.personalize {
            require_non_empty(&self.authz.user_header, "authz.user_header")?;
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_view(&self) -> Result<(), ConfigError> {
        let view = &self.view_resolved;

        require_non_empty(&view.index_name, "view.index_name")?;
        if view.index_name.contains('/') {
            return Err(ConfigError::Validation(
                "view.index_name cannot contain /".to_owned(),
            ));
        }
        require_non_empty(&view.main_template, "view.main_template")?;
        require_url_path(&view.url_top_path, "view.url_top_path")?;
        require_url_path(&view.url_lib_path, "view.url_lib_path")?;
        require_utf8(&view.document_root, "view.document_root")?;
        require_utf8(&view.icon_path, "view.icon_path")?;
        for path in &view.template_paths {
            require_utf8(path, "view.template_paths")?;
        }
        Ok(())
    }

    fn validate_directory_view(&self) -> Result<(), ConfigError> {
        let dv = &self.directory_view_resolved;

        require_non_empty(&dv.timestamp_format, "directory_view.timestamp_format")?;
        if dv.roots.is_empty() {
            return Err(ConfigError::Validation(
                "directory_view.roots cannot be empty".to_owned(),
            ));
        }
        for root in &dv.roots {
            require_utf8(root, "directory_view.roots")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
            if let Some(v) = value {
                *v = expand::expand_env(v, field)?;
            }
            Ok(())
        }

        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let view = &mut self.view;
        expand_opt(&mut view.document_root, "view.document_root")?;
        expand_opt(&mut view.cache_control, "view.cache_control")?;
        expand_opt(&mut view.url_top_path, "view.url_top_path")?;
        expand_opt(&mut view.url_lib_path, "view.url_lib_path")?;
        expand_opt(&mut view.icon_path, "view.icon_path")?;

        if let Some(roots) = &mut self.directory_view.roots {
            for root in roots {
                *root = expand::expand_env(root, "directory_view.roots")?;
            }
        }

        self.authz.user_header = expand::expand_env(&self.authz.user_header, "authz.user_header")?;

        Ok(())
    }

    /// Resolve relative paths against the config directory and apply defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));
        let view = &self.view;
        let defaults = ViewConfig::default();

        let document_root = resolve(view.document_root.as_deref(), "docs");
        self.view_resolved = ViewConfig {
            index_name: view.index_name.clone().unwrap_or(defaults.index_name),
            cache_control: view.cache_control.clone().unwrap_or_default(),
            url_top_path: view.url_top_path.clone().unwrap_or(defaults.url_top_path),
            url_lib_path: view.url_lib_path.clone().unwrap_or(defaults.url_lib_path),
            template_paths: view
                .template_paths
                .iter()
                .flatten()
                .map(|p| config_dir.join(p))
                .collect(),
            main_template: view.main_template.clone().unwrap_or(defaults.main_template),
            icon_path: resolve(view.icon_path.as_deref(), "icons"),
            theme_style: view.theme_style,
            location_navi: view.location_navi,
            text_view_mode: view.text_view_mode,
            raw_passthrough: view.raw_passthrough.unwrap_or(true),
            mime_table: view.mime_table.as_deref().map(|p| config_dir.join(p)),
            markdown_config: view.markdown_config.as_deref().map(|p| config_dir.join(p)),
            document_root: document_root.clone(),
            content_types: defaults.content_types,
            markdown: defaults.markdown,
        };

        let dv = &self.directory_view;
        self.directory_view_resolved = DirectoryViewConfig {
            mode: dv.mode,
            roots: dv.roots.as_ref().map_or_else(
                || vec![document_root],
                |roots| roots.iter().map(|r| config_dir.join(r)).collect(),
            ),
            hidden: dv.hidden.clone().unwrap_or_default(),
            path_hidden: dv.path_hidden.clone().unwrap_or_default(),
            timestamp_format: dv
                .timestamp_format
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMESTAMP_FORMAT.to_owned()),
        };
    }

    /// Second phase: load imported documents.
    fn resolve_imports(&mut self, tracker: &mut ImportTracker) -> Result<(), ConfigError> {
        let view = &mut self.view_resolved;

        let mut types: ContentTypes = tracker.import(view.mime_table.as_deref())?;
        if let Some(exts) = &self.view.markdown_extensions {
            types = types.with_markdown_extensions(exts);
        }
        view.content_types = types;
        view.markdown = tracker.import(view.markdown_config.as_deref())?;

        // fail at startup rather than on the first markdown request
        docview_renderer::Converter::new(&view.markdown)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use docview_site::ContentKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, text: &str, secs: u64) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.view_resolved.document_root, PathBuf::from("/test/docs"));
        assert_eq!(config.view_resolved.icon_path, PathBuf::from("/test/icons"));
        assert_eq!(config.view_resolved.index_name, "README.md");
        assert_eq!(config.view_resolved.main_template, "page.html");
        assert!(config.view_resolved.raw_passthrough);
        assert_eq!(
            config.directory_view_resolved.roots,
            vec![PathBuf::from("/test/docs")]
        );
        assert_eq!(config.directory_view_resolved.mode, DirectoryViewMode::Autoindex);
        assert_eq!(config.directory_view_resolved.timestamp_format, "%F %T");
        assert_eq!(config.authz.user_header, "X-Forwarded-User");
        assert_eq!(config.mod_time(), SystemTime::UNIX_EPOCH);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[view]
document_root = "site"
index_name = "index.md"
cache_control = "no-cache"
template_paths = ["tmpl/page.html"]
theme_style = "os"
location_navi = "none"
text_view_mode = "raw"
raw_passthrough = false

[directory_view]
mode = "open"
roots = ["site", "/shared"]
hidden = ['^_']

[authz]
personalize = true
[authz.users]
alice = ["staff", "ops"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        let view = &config.view_resolved;
        assert_eq!(config.server.port, 9000);
        assert_eq!(view.document_root, PathBuf::from("/project/site"));
        assert_eq!(view.index_name, "index.md");
        assert_eq!(view.cache_control, "no-cache");
        assert_eq!(view.template_paths, vec![PathBuf::from("/project/tmpl/page.html")]);
        assert_eq!(view.theme_style, ThemeStyle::Os);
        assert_eq!(view.location_navi, LocationNavi::None);
        assert_eq!(view.text_view_mode, TextViewMode::Raw);
        assert!(!view.raw_passthrough);

        let dv = &config.directory_view_resolved;
        assert_eq!(dv.mode, DirectoryViewMode::Open);
        assert_eq!(
            dv.roots,
            vec![PathBuf::from("/project/site"), PathBuf::from("/shared")]
        );
        assert_eq!(dv.hidden, vec!["^_".to_owned()]);
        assert!(config.authz.personalize);
        assert_eq!(config.authz.users["alice"], vec!["staff", "ops"]);
    }

    #[test]
    fn test_invalid_mode_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[directory_view]\nmode = \"sideways\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_load_resolves_imports_and_mod_time() {
        let dir = TempDir::new().unwrap();
        write(&dir, "mime.conf", "adoc text/asciidoc\n", 500);
        write(&dir, "markdown.toml", "[extension]\nmath = true\n", 2_000);
        let path = write(
            &dir,
            CONFIG_FILENAME,
            "[view]\nmime_table = \"mime.conf\"\nmarkdown_config = \"markdown.toml\"\n\
             markdown_extensions = [\"md\", \"mkd\"]\n",
            1_000,
        );

        let config = Config::load(Some(&path), None).unwrap();
        let view = &config.view_resolved;

        assert_eq!(view.content_types.lookup("adoc").0, ContentKind::Text);
        assert_eq!(view.content_types.lookup("mkd").0, ContentKind::Markdown);
        assert!(view.markdown.extension().math);
        assert_eq!(
            config.mod_time(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(2_000)
        );
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_rejects_unknown_id_strategy() {
        let dir = TempDir::new().unwrap();
        write(&dir, "markdown.toml", "[auto_ids]\ntype = \"github\"\n", 1);
        let path = write(&dir, CONFIG_FILENAME, "[view]\nmarkdown_config = \"markdown.toml\"\n", 1);

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Render(RenderConfigError::UnknownIdStrategy(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_mime_table() {
        let dir = TempDir::new().unwrap();
        write(&dir, "mime.conf", "txt text/plain", 1);
        let path = write(&dir, CONFIG_FILENAME, "[view]\nmime_table = \"mime.conf\"\n", 1);

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Site(SiteConfigError::MimeTable { .. })));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/docview.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            document_root: Some(PathBuf::from("/custom")),
        });

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.view_resolved.document_root, PathBuf::from("/custom"));
        assert_eq!(
            config.directory_view_resolved.roots,
            vec![PathBuf::from("/custom")]
        );
    }

    #[test]
    fn test_cli_document_root_keeps_configured_roots() {
        let mut config: Config =
            toml::from_str("[directory_view]\nroots = [\"/a\", \"/b\"]\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        config.apply_cli_settings(&CliSettings {
            document_root: Some(PathBuf::from("/custom")),
            ..Default::default()
        });

        assert_eq!(
            config.directory_view_resolved.roots,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("DOCVIEW_TEST_DOCS", "/env/docs");
        }
        let mut config: Config =
            toml::from_str("[view]\ndocument_root = \"${DOCVIEW_TEST_DOCS}\"\n").unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.view_resolved.document_root, PathBuf::from("/env/docs"));
        unsafe {
            std::env::remove_var("DOCVIEW_TEST_DOCS");
        }
    }

    #[test]
    fn test_validate_index_name_with_slash() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.view_resolved.index_name = "a/README.md".to_owned();

        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_url_paths() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.view_resolved.url_lib_path = "static".to_owned();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("view.url_lib_path"));
    }

    #[test]
    fn test_validate_personalize_requires_header() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.authz.personalize = true;
        config.authz.user_header = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_directory_view_visibility() {
        use DirectoryViewMode::{Auto, Autoindex, Close, None, Open};

        let table = [
            (None, [(false, false), (false, false)]),
            (Autoindex, [(true, true), (false, true)]),
            (Close, [(true, false), (true, false)]),
            (Auto, [(true, true), (true, false)]),
            (Open, [(true, true), (true, true)]),
        ];
        for (mode, [dir, file]) in table {
            assert_eq!((mode.shows(true), mode.opens(true)), dir, "{mode:?} directory");
            assert_eq!((mode.shows(false), mode.opens(false)), file, "{mode:?} file");
        }
    }
}
