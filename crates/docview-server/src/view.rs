//! Request dispatcher.
//!
//! [`View::write_view`] turns a request path into a response:
//!
//! 1. Resolve the path; failures map to 400, 404 or 500.
//! 2. Classify the document. Anything that is not a directory, markdown, text
//!    or HTML is passed through unrendered (or refused with 415).
//! 3. Fold the directory and configuration times into the effective time and
//!    compute the validator; a matching `If-None-Match` ends with 304.
//! 4. Read the document and evaluate it as a template, so its content can
//!    depend on the requesting user. Convert markdown, then render the page
//!    template.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode, header};
use chrono::{DateTime, Utc};
use docview_config::{Config, DirectoryViewMode, LocationNavi, TextViewMode, ThemeStyle};
use docview_renderer::{Converter, MarkdownOptions};
use docview_site::{
    CacheValidator, ContentKind, ContentTypes, DirectoryEntry, DirectoryListing, Fingerprint,
    PathLink, RequestTarget, ResolveError, path_links,
};
use docview_storage::{Storage, vpath};
use serde::Serialize;

use crate::authz::{UserDirectory, UserMap};
use crate::error::ViewError;
use crate::icons::IconCache;
use crate::sink::{DumpSink, ResponseSink};
use crate::templates::{TemplateFunctions, Templates};

const PAGE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// How a resolved request is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Directory,
    Markdown,
    PlainText,
    Html,
}

#[derive(Debug, Serialize)]
struct PageOptions {
    theme_style: ThemeStyle,
    directory_view: bool,
    location_navi: LocationNavi,
}

/// Parameters handed to the page template.
#[derive(Debug, Serialize)]
struct PageParams<'a> {
    options: PageOptions,
    markdown: &'a MarkdownOptions,
    title: String,
    top: &'a str,
    lib: &'a str,
    path: String,
    path_links: Vec<PathLink>,
    text: String,
    text_type: &'static str,
    toc: String,
    files: Vec<DirectoryEntry>,
    is_open: bool,
    user_name: &'a str,
}

/// Page settings taken from the configuration.
#[derive(Debug)]
struct Settings {
    index_name: String,
    cache_control: String,
    url_top_path: String,
    url_lib_path: String,
    theme_style: ThemeStyle,
    location_navi: LocationNavi,
    text_view_mode: TextViewMode,
    raw_passthrough: bool,
    mode: DirectoryViewMode,
    personalize: bool,
    user_header: String,
    markdown: MarkdownOptions,
}

impl Settings {
    fn from_config(config: &Config) -> Self {
        let view = &config.view_resolved;
        Self {
            index_name: view.index_name.clone(),
            cache_control: view.cache_control.clone(),
            url_top_path: view.url_top_path.clone(),
            url_lib_path: view.url_lib_path.clone(),
            theme_style: view.theme_style,
            location_navi: view.location_navi,
            text_view_mode: view.text_view_mode,
            raw_passthrough: view.raw_passthrough,
            mode: config.directory_view_resolved.mode,
            personalize: config.authz.personalize,
            user_header: config.authz.user_header.clone(),
            markdown: view.markdown.options.clone(),
        }
    }

    /// Page parameters without a document, used for the fingerprint.
    fn empty_params(&self) -> PageParams<'_> {
        PageParams {
            options: PageOptions {
                theme_style: self.theme_style,
                directory_view: self.mode != DirectoryViewMode::None,
                location_navi: self.location_navi,
            },
            markdown: &self.markdown,
            title: String::new(),
            top: &self.url_top_path,
            lib: &self.url_lib_path,
            path: self.url_top_path.clone(),
            path_links: path_links("/"),
            text: String::new(),
            text_type: "",
            toc: String::new(),
            files: Vec::new(),
            is_open: false,
            user_name: "",
        }
    }
}

/// Map a configured OS path to a virtual path on a `/`-based storage.
fn virtual_path(path: &Path) -> Result<String, ViewError> {
    let unusable = || ViewError::Path(path.display().to_string());
    let absolute = std::path::absolute(path).map_err(|_| unusable())?;
    let text = absolute.to_str().ok_or_else(unusable)?;
    Ok(vpath::clean(&text.replace('\\', "/")))
}

/// Everything needed to answer requests, built once at startup.
///
/// A `View` is immutable apart from its icon cache and can be shared between
/// request workers.
pub struct View {
    storage: Arc<dyn Storage>,
    root: String,
    types: Arc<ContentTypes>,
    listing: DirectoryListing,
    converter: Converter,
    templates: Templates,
    validator: CacheValidator,
    config_mod_time: DateTime<Utc>,
    settings: Settings,
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("root", &self.root)
            .field("roots", &self.listing.roots())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl View {
    /// Build the view for `config` over `storage`.
    ///
    /// Configured paths become virtual paths of `storage`, which is expected
    /// to expose the host filesystem at `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if templates, patterns or the render configuration
    /// are unusable.
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Result<Self, ViewError> {
        let view = &config.view_resolved;
        let dv = &config.directory_view_resolved;

        let root = virtual_path(&view.document_root)?;
        let roots = dv
            .roots
            .iter()
            .map(|r| virtual_path(r))
            .collect::<Result<Vec<_>, _>>()?;
        let mut listing =
            DirectoryListing::new(&roots).with_timestamp_format(&dv.timestamp_format)?;
        if !dv.hidden.is_empty() {
            listing = listing.with_hidden(&dv.hidden)?;
        }
        if !dv.path_hidden.is_empty() {
            listing = listing.with_path_hidden(&dv.path_hidden)?;
        }

        let types = Arc::new(view.content_types.clone());
        let users: Arc<dyn UserDirectory> = Arc::new(UserMap::new(&config.authz.users));
        let icons = Arc::new(IconCache::new(
            Arc::clone(&storage),
            &virtual_path(&view.icon_path)?,
        ));
        let template_paths = view
            .template_paths
            .iter()
            .map(|p| virtual_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        let templates = Templates::load(
            storage.as_ref(),
            &template_paths,
            &view.main_template,
            TemplateFunctions {
                icons,
                types: Arc::clone(&types),
                users,
            },
        )?;

        let settings = Settings::from_config(config);
        let empty_page = templates.render_page(settings.empty_params())?;
        let render_config = serde_json::to_vec(&view.markdown)?;
        let fingerprint = Fingerprint::digest([empty_page.as_bytes(), render_config.as_slice()]);
        tracing::info!(fingerprint = %fingerprint.to_hex(), root = %root, "View ready");

        Ok(Self {
            storage,
            root,
            types,
            listing,
            converter: Converter::new(&view.markdown)?,
            templates,
            validator: CacheValidator::new(fingerprint),
            config_mod_time: config.mod_time().into(),
            settings,
        })
    }

    /// Answer a GET for `path` (decoded, root-relative) into `sink`.
    pub fn write_view(&self, path: &str, headers: &HeaderMap, sink: &mut dyn ResponseSink) {
        let storage = self.storage.as_ref();
        let settings = &self.settings;

        let mut target = match RequestTarget::resolve(
            storage,
            &self.types,
            &self.root,
            path,
            &settings.index_name,
        ) {
            Ok(target) => target,
            Err(ResolveError::NotFound(_)) => {
                return sink.error(StatusCode::NOT_FOUND, "not found");
            }
            Err(ResolveError::BadRequestType(_)) => {
                return sink.error(StatusCode::BAD_REQUEST, "bad request path");
            }
            Err(err) => {
                tracing::error!(path, error = %err, "Cannot resolve request");
                return sink.error(StatusCode::INTERNAL_SERVER_ERROR, "file read error");
            }
        };
        if let Some(dir_time) = self.listing.dir_mod_time(storage, target.dir()) {
            target.update_mod_time(dir_time);
        }

        let page = match (target.has_document(), target.kind()) {
            (false, _) => Page::Directory,
            (true, Some(ContentKind::Markdown)) => Page::Markdown,
            (true, Some(ContentKind::Html)) => Page::Html,
            (true, Some(ContentKind::Text)) if settings.text_view_mode != TextViewMode::Raw => {
                Page::PlainText
            }
            _ => return self.pass_through(&target, sink),
        };

        let user_name = if settings.personalize {
            headers
                .get(settings.user_header.as_str())
                .and_then(|value| value.to_str().ok())
                .unwrap_or("")
        } else {
            ""
        };

        let mod_time = target.mod_time().max(self.config_mod_time);
        let tag = self
            .validator
            .make(mod_time, settings.personalize.then_some(user_name));
        let last_modified = target.last_modified();

        let not_modified = headers
            .get(header::IF_NONE_MATCH)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| CacheValidator::matches(value, &tag));
        if not_modified {
            sink.set_header(header::LAST_MODIFIED, &last_modified);
            sink.set_header(header::ETAG, &tag);
            return sink.write(StatusCode::NOT_MODIFIED, Vec::new());
        }

        let source = match target.full_document_path() {
            Some(doc) => match storage.read(&doc) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::error!(path = %doc, error = %err, "Cannot read document");
                    return sink.error(StatusCode::INTERNAL_SERVER_ERROR, "document file read error");
                }
            },
            None => Vec::new(),
        };

        let request_path = vpath::join(&settings.url_top_path, target.request_path());
        let shows = settings.mode.shows(target.is_dir());
        let files = if shows {
            self.listing.list(storage, target.dir(), !target.is_dir())
        } else {
            Vec::new()
        };
        let mut params = PageParams {
            options: PageOptions {
                theme_style: settings.theme_style,
                directory_view: shows,
                location_navi: settings.location_navi,
            },
            markdown: &settings.markdown,
            title: format!("View: {request_path}"),
            top: &settings.url_top_path,
            lib: &settings.url_lib_path,
            path: request_path,
            path_links: path_links(target.request_path()),
            text: String::new(),
            text_type: "",
            toc: String::new(),
            files,
            is_open: settings.mode.opens(target.is_dir()),
            user_name,
        };

        // documents are templates themselves, evaluated before conversion
        let expanded = if page == Page::Directory {
            String::new()
        } else {
            let source = String::from_utf8_lossy(&source);
            match self.templates.render_inline(target.name(), &source, &params) {
                Ok(expanded) => expanded,
                Err(err) => {
                    tracing::error!(path = %params.path, error = %err, "Document template failed");
                    return sink.error(StatusCode::SERVICE_UNAVAILABLE, "template execute error");
                }
            }
        };

        let (body, content_type) = match page {
            Page::Html => (expanded, target.mime()),
            Page::Markdown => {
                match self.converter.convert(expanded.as_bytes()) {
                    Ok(doc) => {
                        if !doc.title.is_empty() {
                            params.title = doc.title;
                        }
                        params.text = doc.html;
                        params.toc = doc.toc_html;
                    }
                    Err(err) => {
                        tracing::error!(path = %params.path, error = %err, "Markdown conversion failed");
                        return sink.error(StatusCode::INTERNAL_SERVER_ERROR, "conversion failed");
                    }
                }
                match self.render_page(&params, sink) {
                    Some(body) => (body, PAGE_CONTENT_TYPE),
                    None => return,
                }
            }
            Page::PlainText | Page::Directory => {
                if page == Page::PlainText {
                    params.text = expanded;
                    params.text_type = "plaintext";
                }
                match self.render_page(&params, sink) {
                    Some(body) => (body, PAGE_CONTENT_TYPE),
                    None => return,
                }
            }
        };

        sink.set_header(header::CONTENT_TYPE, content_type);
        sink.set_header(header::LAST_MODIFIED, &last_modified);
        sink.set_header(header::ETAG, &tag);
        self.set_cache_control(sink);
        sink.write(StatusCode::OK, body.into_bytes());
    }

    /// Render `path` (relative to the document root) to `out`, errors to `err`.
    ///
    /// Returns the response status code.
    ///
    /// # Errors
    ///
    /// Returns the first write error on either stream.
    pub fn dump<O: Write, E: Write>(&self, path: &str, out: O, err: E) -> io::Result<u16> {
        let mut sink = DumpSink::new(out, err);
        self.write_view(&vpath::join("/", path), &HeaderMap::new(), &mut sink);
        sink.finish().map(|status| status.as_u16())
    }

    fn pass_through(&self, target: &RequestTarget, sink: &mut dyn ResponseSink) {
        if !self.settings.raw_passthrough {
            return sink.error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported media type");
        }
        let Some(doc) = target.full_document_path() else {
            return sink.error(StatusCode::NOT_FOUND, "not found");
        };
        sink.set_header(header::CONTENT_TYPE, target.mime());
        self.set_cache_control(sink);
        sink.serve_file(self.storage.as_ref(), &doc);
    }

    /// Render the page template, answering 503 on failure.
    fn render_page(&self, params: &PageParams<'_>, sink: &mut dyn ResponseSink) -> Option<String> {
        match self.templates.render_page(params) {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::error!(path = %params.path, error = %err, "Template execution failed");
                sink.error(StatusCode::SERVICE_UNAVAILABLE, "template execute error");
                None
            }
        }
    }

    fn set_cache_control(&self, sink: &mut dyn ResponseSink) {
        if !self.settings.cache_control.is_empty() {
            sink.set_header(header::CACHE_CONTROL, &self.settings.cache_control);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::http::HeaderValue;
    use docview_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Captures what the dispatcher writes.
    #[derive(Debug, Default)]
    struct Recorder {
        headers: HeaderMap,
        status: Option<StatusCode>,
        body: String,
        served: Option<String>,
    }

    impl ResponseSink for Recorder {
        fn set_header(&mut self, name: axum::http::HeaderName, value: &str) {
            self.headers.insert(name, HeaderValue::from_str(value).unwrap());
        }

        fn write(&mut self, status: StatusCode, body: Vec<u8>) {
            self.status = Some(status);
            self.body = String::from_utf8(body).unwrap();
        }

        fn error(&mut self, status: StatusCode, message: &str) {
            self.status = Some(status);
            self.body = message.to_owned();
        }

        fn serve_file(&mut self, _storage: &dyn Storage, path: &str) {
            self.status = Some(StatusCode::OK);
            self.served = Some(path.to_owned());
        }
    }

    fn storage() -> MockStorage {
        MockStorage::new()
            .with_file("/docs/README.md", "# Welcome\n\n## Install\n\n### Linux\n\n## Usage\n")
            .with_mtime("/docs/README.md", 2_000)
            .with_file("/docs/guide/intro.md", "Just text.\n")
            .with_file("/docs/notes.txt", "a < b\n")
            .with_file("/docs/page.html", "<p>{{ title }} at {{ path }}</p>")
            .with_file("/docs/logo.png", vec![0x89, b'P'])
            .with_dir("/docs/empty")
            .with_mtime("/docs", 1_000)
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.view_resolved.document_root = PathBuf::from("/docs");
        config.view_resolved.icon_path = PathBuf::from("/icons");
        config.directory_view_resolved.roots = vec![PathBuf::from("/docs")];
        config
    }

    fn view_with(storage: MockStorage, config: &Config) -> View {
        View::new(Arc::new(storage), config).unwrap()
    }

    fn get(view: &View, path: &str, headers: &HeaderMap) -> Recorder {
        let mut recorder = Recorder::default();
        view.write_view(path, headers, &mut recorder);
        recorder
    }

    #[test]
    fn test_directory_with_index_renders_markdown() {
        let view = view_with(storage(), &config());
        let response = get(&view, "/", &HeaderMap::new());

        assert_eq!(response.status, Some(StatusCode::OK));
        assert_eq!(response.headers[header::CONTENT_TYPE], PAGE_CONTENT_TYPE);
        assert!(response.body.contains("<title>Welcome</title>"));
        assert!(response.body.contains("<a href=\"#linux\">Linux</a>"));
        assert!(response.body.contains("<h2 id=\"install\">Install</h2>"));
        assert!(response.headers.contains_key(header::ETAG));
        assert_eq!(
            response.headers[header::LAST_MODIFIED],
            "Thu, 01 Jan 1970 00:33:20 GMT"
        );
    }

    #[test]
    fn test_missing_path_is_404() {
        let view = view_with(storage(), &config());

        assert_eq!(get(&view, "/nope.md", &HeaderMap::new()).status, Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_file_with_directory_marker_is_400() {
        let view = view_with(storage(), &config());

        assert_eq!(
            get(&view, "/notes.txt/", &HeaderMap::new()).status,
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn test_matching_validator_is_304() {
        let view = view_with(storage(), &config());
        let first = get(&view, "/guide/intro.md", &HeaderMap::new());
        let tag = first.headers[header::ETAG].to_str().unwrap().to_owned();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(&format!("\"abc\", {tag}")).unwrap(),
        );
        let second = get(&view, "/guide/intro.md", &headers);

        assert_eq!(second.status, Some(StatusCode::NOT_MODIFIED));
        assert_eq!(second.body, "");
        assert_eq!(second.headers[header::ETAG], tag.as_str());
    }

    #[test]
    fn test_stale_validator_renders() {
        let view = view_with(storage(), &config());
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"abc\""));

        assert_eq!(get(&view, "/guide/intro.md", &headers).status, Some(StatusCode::OK));
    }

    #[test]
    fn test_plain_text_is_escaped_in_page() {
        let view = view_with(storage(), &config());
        let response = get(&view, "/notes.txt", &HeaderMap::new());

        assert_eq!(response.status, Some(StatusCode::OK));
        assert!(response.body.contains("<pre class=\"plaintext\">a &lt; b\n</pre>"));
        assert!(response.body.contains("<title>View: "));
        assert!(response.body.contains("notes.txt</title>"));
    }

    #[test]
    fn test_raw_text_mode_passes_text_through() {
        let mut config = config();
        config.view_resolved.text_view_mode = TextViewMode::Raw;
        let view = view_with(storage(), &config);
        let response = get(&view, "/notes.txt", &HeaderMap::new());

        assert_eq!(response.served.as_deref(), Some("/docs/notes.txt"));
    }

    #[test]
    fn test_binary_passthrough_and_refusal() {
        let view = view_with(storage(), &config());
        let response = get(&view, "/logo.png", &HeaderMap::new());
        assert_eq!(response.served.as_deref(), Some("/docs/logo.png"));
        assert_eq!(response.headers[header::CONTENT_TYPE], "image/png");

        let mut config = config();
        config.view_resolved.raw_passthrough = false;
        let view = view_with(storage(), &config);
        assert_eq!(
            get(&view, "/logo.png", &HeaderMap::new()).status,
            Some(StatusCode::UNSUPPORTED_MEDIA_TYPE)
        );
    }

    #[test]
    fn test_html_document_rendered_as_template() {
        let view = view_with(storage(), &config());
        let response = get(&view, "/page.html", &HeaderMap::new());

        assert_eq!(response.status, Some(StatusCode::OK));
        assert!(response.body.starts_with("<p>View: "));
        assert!(response.body.ends_with("page.html</p>"));
        assert!(response.headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn test_broken_html_template_is_503() {
        let storage = storage().with_file("/docs/broken.html", "{% for %}");
        let view = view_with(storage, &config());

        assert_eq!(
            get(&view, "/broken.html", &HeaderMap::new()).status,
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[test]
    fn test_markdown_evaluated_per_user() {
        let storage = storage().with_file(
            "/docs/team.md",
            "{% if in_user() %}secret{% else %}public{% endif %} for {{ user_name }}\n",
        );
        let mut config = config();
        config.authz.personalize = true;
        config
            .authz
            .users
            .insert("alice".to_owned(), vec!["staff".to_owned()]);
        let view = view_with(storage, &config);
        let mut alice = HeaderMap::new();
        alice.insert("x-forwarded-user", HeaderValue::from_static("alice"));

        let known = get(&view, "/team.md", &alice);
        let anonymous = get(&view, "/team.md", &HeaderMap::new());

        assert_eq!(known.status, Some(StatusCode::OK));
        assert!(known.body.contains("<p>secret for alice</p>"));
        assert!(anonymous.body.contains("<p>public for"));
        assert!(!anonymous.body.contains("secret"));
    }

    #[test]
    fn test_plain_text_evaluated_as_template() {
        let storage = storage().with_file("/docs/hello.txt", "hi {{ 1 + 2 }} < 4\n");
        let view = view_with(storage, &config());

        let response = get(&view, "/hello.txt", &HeaderMap::new());

        assert!(response.body.contains("<pre class=\"plaintext\">hi 3 &lt; 4\n</pre>"));
    }

    #[test]
    fn test_broken_document_template_is_503() {
        let storage = storage().with_file("/docs/broken.md", "# Title\n\n{% if %}\n");
        let view = view_with(storage, &config());

        assert_eq!(
            get(&view, "/broken.md", &HeaderMap::new()).status,
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[test]
    fn test_directory_under_index_name_is_listed() {
        let storage = storage().with_dir("/docs/odd/README.md");
        let view = view_with(storage, &config());

        let response = get(&view, "/odd/", &HeaderMap::new());

        assert_eq!(response.status, Some(StatusCode::OK));
        assert!(response.body.contains("<details class=\"files\" open>"));
        assert!(response.body.contains("README.md"));
    }

    #[test]
    fn test_autoindex_lists_directories_only() {
        let view = view_with(storage(), &config());

        let dir = get(&view, "/guide/", &HeaderMap::new());
        assert!(dir.body.contains("<details class=\"files\" open>"));
        assert!(dir.body.contains("intro.md"));

        let file = get(&view, "/guide/intro.md", &HeaderMap::new());
        assert!(!file.body.contains("<details"));
    }

    #[test]
    fn test_close_mode_lists_collapsed_for_files() {
        let mut config = config();
        config.directory_view_resolved.mode = DirectoryViewMode::Close;
        let view = view_with(storage(), &config);

        let file = get(&view, "/guide/intro.md", &HeaderMap::new());

        assert!(file.body.contains("<details class=\"files\">"));
        assert!(file.body.contains("intro.md"));
    }

    #[test]
    fn test_directory_without_index() {
        let view = view_with(storage(), &config());
        let response = get(&view, "/empty", &HeaderMap::new());

        assert_eq!(response.status, Some(StatusCode::OK));
        assert!(response.body.contains("<details class=\"files\" open>"));
    }

    #[test]
    fn test_validator_stable_across_identical_views() {
        let view = view_with(storage(), &config());
        let before = get(&view, "/guide/intro.md", &HeaderMap::new());

        let same = view_with(storage(), &config());
        let again = get(&same, "/guide/intro.md", &HeaderMap::new());

        assert_eq!(before.headers[header::ETAG], again.headers[header::ETAG]);
    }

    #[test]
    fn test_personalized_validators_differ_per_user() {
        let mut config = config();
        config.authz.personalize = true;
        let view = view_with(storage(), &config);

        let mut alice = HeaderMap::new();
        alice.insert("x-forwarded-user", HeaderValue::from_static("alice"));
        let mut bob = HeaderMap::new();
        bob.insert("x-forwarded-user", HeaderValue::from_static("bob"));

        let a = get(&view, "/guide/intro.md", &alice);
        let b = get(&view, "/guide/intro.md", &bob);
        let a2 = get(&view, "/guide/intro.md", &alice);

        assert_ne!(a.headers[header::ETAG], b.headers[header::ETAG]);
        assert_eq!(a.headers[header::ETAG], a2.headers[header::ETAG]);
    }

    #[test]
    fn test_identity_ignored_without_personalize() {
        let view = view_with(storage(), &config());
        let mut alice = HeaderMap::new();
        alice.insert("x-forwarded-user", HeaderValue::from_static("alice"));

        let a = get(&view, "/guide/intro.md", &alice);
        let anon = get(&view, "/guide/intro.md", &HeaderMap::new());

        assert_eq!(a.headers[header::ETAG], anon.headers[header::ETAG]);
    }

    #[test]
    fn test_cache_control_passthrough() {
        let mut config = config();
        config.view_resolved.cache_control = "no-cache".to_owned();
        let view = view_with(storage(), &config);

        assert_eq!(
            get(&view, "/guide/intro.md", &HeaderMap::new()).headers[header::CACHE_CONTROL],
            "no-cache"
        );
    }

    #[test]
    fn test_dump_writes_page() {
        let view = view_with(storage(), &config());
        let mut out = Vec::new();
        let mut err = Vec::new();

        let status = view.dump("guide/intro.md", &mut out, &mut err).unwrap();

        assert_eq!(status, 200);
        assert!(String::from_utf8(out).unwrap().contains("<p>Just text.</p>"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_dump_reports_missing() {
        let view = view_with(storage(), &config());
        let mut err = Vec::new();

        let status = view.dump("missing.md", io::sink(), &mut err).unwrap();

        assert_eq!(status, 404);
        assert_eq!(String::from_utf8(err).unwrap(), "404 not found\n");
    }
}
