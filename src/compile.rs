//! Run orchestration.
//!
//! One run compiles one or more root content files:
//!
//! ```text
//! 1. Configure   site config, search path, translation table
//! 2. Construct   build every page tree, filling the run's registries
//! 3. Render      write each tree depth-first into the output directory
//! 4. Feeds       item feed and calendar feed, if requested
//! ```
//!
//! Every tree is constructed before anything is written, so a content error
//! anywhere aborts the run with an untouched output directory. Failures while
//! rendering leave earlier output in place.

use crate::config::{self, ConfigError, SiteConfig};
use crate::feeds::{self, FeedError, calendar, rss};
use crate::metadata::MetaTagScanner;
use crate::page::{Page, PageError, TreeBuilder};
use crate::registry::Registries;
use crate::render::{self, JinjaEngine, RenderError, StandardFields};
use crate::translate::{TranslateError, Translations};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Everything one run needs. Paths of root files are relative to `root`.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub search_path: Vec<PathBuf>,
    pub site: String,
    pub today: Option<String>,
    pub translations: Option<PathBuf>,
    pub item_feed: Option<PathBuf>,
    pub calendar: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Constructed trees and the registries they filled.
#[derive(Debug)]
pub struct Inventory {
    pub trees: Vec<Page>,
    pub registries: Registries,
    pub config: SiteConfig,
}

impl Inventory {
    pub fn page_count(&self) -> usize {
        self.trees.iter().map(|t| t.walk().len()).sum()
    }
}

/// What a build produced.
#[derive(Debug)]
pub struct Report {
    pub inventory: Inventory,
    pub written: usize,
    pub feeds: Vec<PathBuf>,
}

/// Construct every tree without writing anything.
pub fn check(options: &Options) -> Result<Inventory, CompileError> {
    let config = config::load_config(options.config.as_deref())?;
    for dir in &options.search_path {
        if !dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "template search path {} is not a directory",
                dir.display()
            ))
            .into());
        }
    }
    let translations = match &options.translations {
        Some(path) => Translations::load(path)?,
        None => Translations::default(),
    };

    let scanner = MetaTagScanner::new();
    let mut builder = TreeBuilder::new(
        &options.root,
        options.search_path.clone(),
        &scanner,
        &translations,
        &config.feed,
    );
    let mut registries = Registries::new();
    let mut trees = Vec::with_capacity(options.files.len());
    for file in &options.files {
        let path = stored_path(&options.root, file);
        trees.push(builder.build(&path, &mut registries)?);
    }
    info!(
        trees = trees.len(),
        events = registries.events.len(),
        posts = registries.posts.len(),
        "constructed page trees"
    );

    Ok(Inventory {
        trees,
        registries,
        config,
    })
}

/// Full build: construct, render, then write the requested feeds.
pub fn compile(options: &Options) -> Result<Report, CompileError> {
    let inventory = check(options)?;
    let now = Utc::now();
    let standard = StandardFields::new(
        &options.site,
        options.today.as_deref(),
        &inventory.config.site,
        now,
    );
    let engine = JinjaEngine::new(&options.search_path, &options.root);

    let mut written = 0;
    for tree in &inventory.trees {
        written += render::render_tree(&engine, tree, &standard, &options.output_dir)?;
    }

    let mut feeds = Vec::new();
    if let Some(path) = &options.item_feed {
        let document = rss::item_feed(
            &inventory.registries.posts,
            &engine,
            &standard,
            &inventory.config.site,
            &inventory.config.feed,
            now,
        )?;
        feeds::write_feed(path, &document)?;
        feeds.push(path.clone());
    }
    if let Some(path) = &options.calendar {
        let document = calendar::calendar(
            &inventory.registries.events,
            &standard.site,
            now,
            &inventory.config.calendar,
        );
        feeds::write_feed(path, &document)?;
        feeds.push(path.clone());
    }

    Ok(Report {
        inventory,
        written,
        feeds,
    })
}

/// Root files may be given relative to the source root or prefixed by it.
fn stored_path(root: &Path, file: &Path) -> PathBuf {
    file.strip_prefix(root).unwrap_or(file).to_path_buf()
}
