//! Template rendering.
//!
//! The page tree never talks to a template engine directly. It hands a
//! template name and a context value to a [`TemplateEngine`], so the engine
//! can be swapped or stubbed in tests. [`JinjaEngine`] is the real one, built
//! on MiniJinja.
//!
//! ## Template Names
//!
//! A page's template name is its stored path relative to the source root
//! (`blog/2013/06/a.html`). The loader looks the name up in each template
//! search-path directory in order and falls back to the source root, so
//! base templates (`_post.html`) and content files share one namespace.
//!
//! ## Context
//!
//! Each page renders with its own [`Page::context`] merged with the run's
//! [`StandardFields`]. Standard fields win on a name clash: a content file
//! cannot override `root_path` by declaring a marker of the same name.
//!
//! Undefined variables are errors, not empty strings.

use crate::config::SiteInfo;
use crate::naming;
use crate::page::Page;
use chrono::{DateTime, Utc};
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Timestamp format for the `timestamp` field and feed build dates.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot render {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Render a named template, or inline template text, against a context.
pub trait TemplateEngine {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError>;

    /// Render template source that is not stored under a name. `label`
    /// identifies the source in errors.
    fn render_str(&self, label: &str, source: &str, context: &Value) -> Result<String, RenderError>;
}

/// MiniJinja-backed engine loading templates from the filesystem.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    /// Engine loading from `search_path` directories in order, then `root`.
    pub fn new(search_path: &[PathBuf], root: &Path) -> Self {
        let mut dirs = search_path.to_vec();
        dirs.push(root.to_path_buf());

        let mut env = Environment::new();
        env.set_loader(move |name| load_template(&dirs, name));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_function("month_name", month_name);
        Self { env }
    }
}

fn load_template(dirs: &[PathBuf], name: &str) -> Result<Option<String>, minijinja::Error> {
    let Some(path) = dirs.iter().map(|dir| dir.join(name)).find(|p| p.is_file()) else {
        return Ok(None);
    };
    fs::read_to_string(&path).map(Some).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot read template {}: {e}", path.display()),
        )
    })
}

fn month_name(month: &str) -> Result<String, minijinja::Error> {
    naming::month_name(month).map(String::from).ok_or_else(|| {
        minijinja::Error::new(ErrorKind::InvalidOperation, format!("not a month: '{month}'"))
    })
}

impl TemplateEngine for JinjaEngine {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        let template = |source| RenderError::Template {
            name: name.to_string(),
            source,
        };
        self.env
            .get_template(name)
            .map_err(template)?
            .render(context)
            .map_err(template)
    }

    fn render_str(&self, label: &str, source: &str, context: &Value) -> Result<String, RenderError> {
        self.env
            .render_str(source, context)
            .map_err(|source| RenderError::Template {
                name: label.to_string(),
                source,
            })
    }
}

/// Run-wide fields every template sees.
///
/// The timestamp is taken once per run so every page and feed agrees on it.
#[derive(Debug, Clone, Serialize)]
pub struct StandardFields {
    pub site: String,
    pub today: String,
    pub timestamp: String,
    pub contact_email: String,
    pub twitter_name: String,
    pub twitter_url: String,
}

impl StandardFields {
    /// `today` defaults to the date of `now`.
    pub fn new(site: &str, today: Option<&str>, info: &SiteInfo, now: DateTime<Utc>) -> Self {
        Self {
            site: site.trim_end_matches('/').to_string(),
            today: today
                .map(String::from)
                .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            contact_email: info.contact_email.clone(),
            twitter_name: info.twitter_name.clone(),
            twitter_url: info.twitter_url.clone(),
        }
    }

    /// Standard fields for one page, adding `filename` and `root_path`.
    pub fn for_page(&self, path: &Path) -> Value {
        self.with(naming::url_path(path), naming::root_path(path))
    }

    /// Standard fields with an explicit root path, for content rendered
    /// outside the tree (feed items link against the site itself).
    pub fn with(&self, filename: String, root_path: String) -> Value {
        let mut fields = serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()));
        if let Value::Object(map) = &mut fields {
            map.insert("filename".into(), filename.into());
            map.insert("root_path".into(), root_path.into());
        }
        fields
    }
}

/// Page context with standard fields merged over it.
pub fn page_context(page: &Page, standard: &StandardFields) -> Value {
    let mut context = page.context();
    if let (Value::Object(map), Value::Object(fields)) = (&mut context, standard.for_page(&page.path)) {
        map.extend(fields);
    }
    context
}

/// Render `page` and its subtree into `output_dir`, parent before children.
///
/// Returns the number of files written. Output already written stays in
/// place if a later page fails.
pub fn render_tree(
    engine: &dyn TemplateEngine,
    page: &Page,
    standard: &StandardFields,
    output_dir: &Path,
) -> Result<usize, RenderError> {
    let name = naming::url_path(&page.path);
    let html = engine.render(&name, &page_context(page, standard))?;

    let dest = output_dir.join(&page.path);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&dest, html).map_err(|source| RenderError::Io {
        path: dest.clone(),
        source,
    })?;
    info!(page = %name, dest = %dest.display(), "rendered");

    let mut written = 1;
    for child in &page.children {
        written += render_tree(engine, child, standard, output_dir)?;
    }
    Ok(written)
}
