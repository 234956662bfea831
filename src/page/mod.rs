//! The page tree.
//!
//! Every content file becomes one [`Page`]. Construction follows a fixed
//! protocol, the same for every kind:
//!
//! ```text
//! 1. Load              read the file once
//! 2. Extract metadata  apply the kind's field schema to the marker tags
//! 3. Finalize self     kind-specific derived fields (slug, dates, excerpt, sort key)
//! 4. Load children     subfile markers in declared order, then subglob matches
//! 5. Finalize children prev/next sibling links (and post index grouping)
//! ```
//!
//! ## Child Order
//!
//! Children named by `subfile` markers keep their declared order. As soon as
//! a `subglob` pattern discovers at least one file, the whole child list is
//! sorted by [`SortKey`]. The sort is stable and pattern matches are taken in
//! lexical path order, so the result never depends on filesystem enumeration
//! order.
//!
//! A file named by a `subfile` marker and also matched by a `subglob` pattern
//! is built once, in its declared position.
//!
//! ## Ownership
//!
//! A page owns its children. The parent is recorded by path, and siblings by
//! the link they render with, so the tree has no reference cycles. A page
//! that includes one of its own ancestors is a fatal error.

pub mod event;
pub mod kinds;
pub mod post;
pub mod tutorial;

pub use kinds::PageKind;

use crate::config::FeedConfig;
use crate::metadata::{self, MarkerScanner, Metadata, MetadataError};
use crate::naming;
use crate::registry::Registries;
use crate::resolve::{KindResolver, ResolveError};
use crate::translate::{TranslateError, Translations};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error("Required field '{field}' missing in {path}")]
    MissingField { field: &'static str, path: PathBuf },
    #[error("Invalid value '{value}' for field '{field}' in {path}")]
    BadValue {
        field: &'static str,
        value: String,
        path: PathBuf,
    },
    #[error("Bad date range {start} -- {end} in {path}")]
    BadDateRange {
        start: String,
        end: String,
        path: PathBuf,
    },
    #[error("No {block} block found in {path}")]
    MissingBlock { block: &'static str, path: PathBuf },
    #[error("{path} is not laid out as <year>/<month>/<name>")]
    BadPostPath { path: PathBuf },
    #[error("{path} includes {via}, which is one of its own ancestors")]
    Cycle { path: PathBuf, via: PathBuf },
    #[error("{child} (named in {path}) is outside the source root")]
    OutsideRoot { child: PathBuf, path: PathBuf },
    #[error("Invalid subglob pattern '{pattern}' in {path}: {source}")]
    Pattern {
        pattern: String,
        path: PathBuf,
        source: glob::PatternError,
    },
    #[error("Cannot enumerate subglob '{pattern}' in {path}: {source}")]
    Glob {
        pattern: String,
        path: PathBuf,
        source: glob::GlobError,
    },
}

/// Orders siblings once pattern discovery is involved.
///
/// Kinds without a natural order sort first and tie with each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Unordered,
    Event { start: NaiveDate, venue: String },
    Post(u64),
}

/// Kind-specific derived fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    Generic,
    Event(event::EventDetails),
    TutorialIndex(tutorial::TutorialIndex),
    TutorialTopic(tutorial::TutorialTopic),
    PostIndex(post::PostIndex),
    Post(post::PostDetails),
}

impl Details {
    fn sort_key(&self) -> SortKey {
        match self {
            Details::Event(event) => SortKey::Event {
                start: event.start,
                venue: event.venue.clone(),
            },
            Details::Post(post) => SortKey::Post(post.post_id),
            _ => SortKey::Unordered,
        }
    }
}

/// One node of the content tree.
#[derive(Debug, Clone)]
pub struct Page {
    /// Path relative to the source root. Unique within a run.
    pub path: PathBuf,
    pub kind: PageKind,
    pub text: String,
    pub metadata: Metadata,
    pub details: Details,
    pub sort_key: SortKey,
    pub children: Vec<Page>,
    /// Stored path of the owning page, if any.
    pub parent: Option<PathBuf>,
    /// Link to the previous sibling.
    pub prev: Option<String>,
    /// Link to the next sibling.
    pub next: Option<String>,
}

impl Page {
    pub fn title(&self) -> Option<&str> {
        self.metadata.single("title")
    }

    /// URL used to reach this page from a sibling.
    pub fn link(&self) -> String {
        match &self.details {
            Details::TutorialIndex(index) => index.link(),
            Details::Post(post) => post.link(),
            _ => naming::base_name(&self.path),
        }
    }

    /// URL back up to this page's logical parent index.
    pub fn uplink(&self) -> &'static str {
        self.kind.uplink()
    }

    pub fn slug(&self) -> Option<&str> {
        match &self.details {
            Details::Event(event) => Some(&event.slug),
            Details::TutorialIndex(index) => Some(&index.slug),
            Details::TutorialTopic(topic) => Some(&topic.slug),
            _ => None,
        }
    }

    /// Posts of one period, for post index pages.
    pub fn posts(&self, year: &str, month: &str) -> Vec<&Page> {
        match &self.details {
            Details::PostIndex(index) => index.posts(&self.children, year, month),
            _ => Vec::new(),
        }
    }

    /// This page and all descendants, parent before children.
    pub fn walk(&self) -> Vec<&Page> {
        let mut pages = vec![self];
        for child in &self.children {
            pages.extend(child.walk());
        }
        pages
    }

    /// Template view of this page and its subtree.
    ///
    /// Metadata fields come first; derived fields of the same name win.
    pub fn context(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in self.metadata.iter() {
            map.insert(name.to_string(), to_value(value));
        }

        let derived = match &self.details {
            Details::Generic => Value::Null,
            Details::Event(event) => to_value(event),
            Details::TutorialIndex(index) => to_value(index),
            Details::TutorialTopic(topic) => to_value(topic),
            Details::PostIndex(index) => index.context(&self.children),
            Details::Post(post) => to_value(post),
        };
        if let Value::Object(fields) = derived {
            map.extend(fields);
        }

        map.insert("path".into(), naming::url_path(&self.path).into());
        map.insert("kind".into(), self.kind.name().into());
        map.insert("link".into(), self.link().into());
        map.insert("uplink".into(), self.uplink().into());
        map.insert("prev".into(), self.prev.clone().into());
        map.insert("next".into(), self.next.clone().into());
        map.insert(
            "children".into(),
            Value::Array(self.children.iter().map(Page::context).collect()),
        );
        Value::Object(map)
    }

    /// Link siblings by final child order, then apply kind-specific grouping.
    fn finalize_children(&mut self, feed: &FeedConfig) -> Result<(), PageError> {
        let links: Vec<String> = self.children.iter().map(Page::link).collect();
        for (i, child) in self.children.iter_mut().enumerate() {
            child.prev = i.checked_sub(1).map(|j| links[j].clone());
            child.next = links.get(i + 1).cloned();
        }

        if self.kind == PageKind::PostIndex {
            let index = post::PostIndex::group(&self.children, feed.history_length)?;
            self.details = Details::PostIndex(index);
        }
        Ok(())
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    // Derived fields are plain strings, numbers and lists.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Builds page trees for one run.
///
/// Holds the run's kind resolver so base templates are resolved once across
/// every tree built with the same builder.
pub struct TreeBuilder<'a> {
    root: PathBuf,
    resolver: KindResolver,
    scanner: &'a dyn MarkerScanner,
    translations: &'a Translations,
    feed: &'a FeedConfig,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        search_path: Vec<PathBuf>,
        scanner: &'a dyn MarkerScanner,
        translations: &'a Translations,
        feed: &'a FeedConfig,
    ) -> Self {
        Self {
            root: root.into(),
            resolver: KindResolver::new(search_path),
            scanner,
            translations,
            feed,
        }
    }

    /// Build the tree rooted at `path` (relative to the source root).
    pub fn build(&mut self, path: &Path, registries: &mut Registries) -> Result<Page, PageError> {
        let stored = naming::normalize(path).ok_or_else(|| PageError::OutsideRoot {
            child: path.to_path_buf(),
            path: path.to_path_buf(),
        })?;
        self.construct(stored, &mut Vec::new(), registries)
    }

    /// `ancestors` holds the stored paths of every page above this one.
    fn construct(
        &mut self,
        path: PathBuf,
        ancestors: &mut Vec<PathBuf>,
        registries: &mut Registries,
    ) -> Result<Page, PageError> {
        if ancestors.contains(&path) {
            return Err(PageError::Cycle {
                path: ancestors.last().cloned().unwrap_or_default(),
                via: path,
            });
        }
        let file = self.root.join(&path);
        let kind = self.resolver.resolve(&file)?;

        // 1. Load
        let text = fs::read_to_string(&file).map_err(|source| PageError::Io {
            path: path.clone(),
            source,
        })?;

        // 2. Extract metadata
        let mut metadata = metadata::extract(self.scanner, &text, &kind.schema(), &path)?;

        // 3. Finalize self
        let details = match kind {
            PageKind::Generic => Details::Generic,
            PageKind::PostIndex => Details::PostIndex(post::PostIndex::default()),
            PageKind::Event => Details::Event(event::finalize(&path, &metadata)?),
            PageKind::TutorialIndex => {
                Details::TutorialIndex(tutorial::finalize_index(&path, &text)?)
            }
            PageKind::TutorialTopic => Details::TutorialTopic(tutorial::finalize_topic(&path)),
            PageKind::Post => Details::Post(post::finalize(
                &path,
                &text,
                &mut metadata,
                self.translations,
                self.feed,
            )?),
        };

        let mut page = Page {
            sort_key: details.sort_key(),
            path,
            kind,
            text,
            metadata,
            details,
            children: Vec::new(),
            parent: ancestors.last().cloned(),
            prev: None,
            next: None,
        };

        // 4. Load children
        ancestors.push(page.path.clone());
        self.load_children(&mut page, ancestors, registries)?;
        ancestors.pop();

        // 5. Finalize children
        page.finalize_children(self.feed)?;

        debug!(path = %page.path.display(), kind = %kind, children = page.children.len(), "built page");
        registries.register(&page);
        Ok(page)
    }

    fn load_children(
        &mut self,
        page: &mut Page,
        ancestors: &mut Vec<PathBuf>,
        registries: &mut Registries,
    ) -> Result<(), PageError> {
        let dir = page.path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut children = Vec::new();
        let mut seen = HashSet::new();
        for name in page.metadata.multi("subfile") {
            let joined = dir.join(name);
            let path = naming::normalize(&joined).ok_or_else(|| PageError::OutsideRoot {
                child: joined,
                path: page.path.clone(),
            })?;
            if seen.insert(path.clone()) {
                children.push(self.construct(path, ancestors, registries)?);
            }
        }

        let mut discovered = false;
        for pattern in page.metadata.multi("subglob") {
            for path in self.discover(&dir, pattern, &page.path)? {
                discovered = true;
                if seen.insert(path.clone()) {
                    children.push(self.construct(path, ancestors, registries)?);
                }
            }
        }

        if discovered {
            // Stable: ties keep declared order, then lexical discovery order.
            children.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        }

        page.children = children;
        Ok(())
    }

    /// Stored paths of files matching `pattern` in `dir`, in lexical order.
    ///
    /// The page doing the discovering never matches itself.
    fn discover(&self, dir: &Path, pattern: &str, page: &Path) -> Result<Vec<PathBuf>, PageError> {
        // Only the pattern itself may carry wildcards.
        let base = self.root.join(dir);
        let base = glob::Pattern::escape(&base.to_string_lossy());
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
        let entries = glob::glob(&full).map_err(|source| PageError::Pattern {
            pattern: pattern.to_string(),
            path: page.to_path_buf(),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let file = entry.map_err(|source| PageError::Glob {
                pattern: pattern.to_string(),
                path: page.to_path_buf(),
                source,
            })?;
            if !file.is_file() {
                continue;
            }
            let relative = file
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or(file);
            let stored = naming::normalize(&relative).ok_or_else(|| PageError::OutsideRoot {
                child: relative.clone(),
                path: page.to_path_buf(),
            })?;
            if stored.as_path() != page {
                found.push(stored);
            }
        }
        found.sort();
        debug!(page = %page.display(), pattern, matches = found.len(), "subglob discovery");
        Ok(found)
    }
}
