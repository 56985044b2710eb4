//! Page templates.
//!
//! One `minijinja` environment is built at startup. Besides the page
//! parameters, templates can call:
//!
//! - `svg_icon(name)`: inline SVG from the icon directory
//! - `file_type(name)`: icon class of a listing entry
//! - `in_user()`: whether the requesting identity is a known user
//! - `in_group(group)`: whether it belongs to `group`

use std::sync::Arc;

use docview_site::ContentTypes;
use docview_storage::{Storage, vpath};
use minijinja::value::Value;
use minijinja::{Environment, State};
use serde::Serialize;

use crate::authz::UserDirectory;
use crate::error::ViewError;
use crate::icons::IconCache;

/// Page template used when no template paths are configured.
const DEFAULT_TEMPLATE: &str = include_str!("../templates/page.html");
const DEFAULT_TEMPLATE_NAME: &str = "page.html";

/// Shared state captured by the template functions.
pub(crate) struct TemplateFunctions {
    pub(crate) icons: Arc<IconCache>,
    pub(crate) types: Arc<ContentTypes>,
    pub(crate) users: Arc<dyn UserDirectory>,
}

/// Identity of the current render, read back from the `user_name` parameter.
fn current_user(state: &State) -> String {
    state
        .lookup("user_name")
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_default()
}

pub(crate) struct Templates {
    env: Environment<'static>,
    main: String,
}

impl Templates {
    /// Load `paths` (virtual paths) from storage, each registered under its
    /// file name, with `main` as the page template.
    ///
    /// Without paths the packaged page template is used and `main` is ignored.
    pub(crate) fn load(
        storage: &dyn Storage,
        paths: &[String],
        main: &str,
        functions: TemplateFunctions,
    ) -> Result<Self, ViewError> {
        let mut env = Environment::new();
        // documents rendered inline keep their final newline
        env.set_keep_trailing_newline(true);

        let main = if paths.is_empty() {
            env.add_template(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
            DEFAULT_TEMPLATE_NAME.to_owned()
        } else {
            for path in paths {
                let source = String::from_utf8(storage.read(path)?)
                    .map_err(|_| ViewError::TemplateEncoding(path.clone()))?;
                env.add_template_owned(vpath::base_name(path).to_owned(), source)?;
            }
            // fail at startup when the main template is missing
            env.get_template(main)?;
            main.to_owned()
        };

        let TemplateFunctions { icons, types, users } = functions;
        env.add_function("svg_icon", move |name: &str| {
            Value::from_safe_string(icons.get(name))
        });
        env.add_function("file_type", move |name: &str| types.file_type(name).to_owned());
        let known = Arc::clone(&users);
        env.add_function("in_user", move |state: &State| known.is_known(&current_user(state)));
        env.add_function("in_group", move |state: &State, group: &str| {
            users.in_group(&current_user(state), group)
        });

        Ok(Self { env, main })
    }

    /// Render the page template.
    pub(crate) fn render_page<S: Serialize>(&self, params: S) -> Result<String, minijinja::Error> {
        self.env.get_template(&self.main)?.render(params)
    }

    /// Render a document as a one-off template named `name`.
    pub(crate) fn render_inline<S: Serialize>(
        &self,
        name: &str,
        source: &str,
        params: S,
    ) -> Result<String, minijinja::Error> {
        self.env.render_named_str(name, source, params)
    }
}
