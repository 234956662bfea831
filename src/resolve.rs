//! Page-kind resolution through template inheritance.
//!
//! A content file names its kind in one of two ways:
//!
//! ```text
//! <!-- pagekind: post -->          explicit kind marker
//! {% extends "_post.html" %}       inherit the kind of a base template
//! ```
//!
//! An explicit marker wins. Otherwise the base template is located by
//! searching the template search path in order (first match wins) and
//! resolved recursively, so a whole family of content files can share the
//! kind declared once in their common base.
//!
//! Every file visited along a chain is cached against its resolved kind for
//! the rest of the run. Shared base templates are read once, no matter how
//! many pages extend them.

use crate::page::PageKind;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No page kind found for {origin} (chain ends at {last})")]
    NoKind { origin: PathBuf, last: PathBuf },
    #[error("Base template '{name}' (extended from {origin}) not found in search path {search_path:?}")]
    BaseNotFound {
        name: String,
        origin: PathBuf,
        search_path: Vec<PathBuf>,
    },
    #[error("Unknown page kind '{kind}' declared in {path}")]
    UnknownKind { kind: String, path: PathBuf },
    #[error("Template inheritance cycle through {path} (resolving {origin})")]
    Cycle { path: PathBuf, origin: PathBuf },
}

/// Resolves and caches the page kind of each file for one run.
#[derive(Debug)]
pub struct KindResolver {
    search_path: Vec<PathBuf>,
    cache: HashMap<PathBuf, PageKind>,
    kind_marker: Regex,
    extends: Regex,
}

impl KindResolver {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            cache: HashMap::new(),
            kind_marker: Regex::new(r"<!--\s*pagekind:\s*([A-Za-z0-9_-]+)\s*-->")
                .expect("kind marker pattern is valid"),
            extends: Regex::new(r#"\{%-?\s*extends\s+"([^"]+)"\s*-?%\}"#)
                .expect("extends pattern is valid"),
        }
    }

    /// Resolve the kind governing `path`.
    pub fn resolve(&mut self, path: &Path) -> Result<PageKind, ResolveError> {
        let mut visiting = HashSet::new();
        self.resolve_file(path, path, &mut visiting)
    }

    /// Number of files with a cached resolution.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn resolve_file(
        &mut self,
        path: &Path,
        origin: &Path,
        visiting: &mut HashSet<PathBuf>,
    ) -> Result<PageKind, ResolveError> {
        if let Some(kind) = self.cache.get(path) {
            debug!(path = %path.display(), kind = %kind, "page kind cache hit");
            return Ok(*kind);
        }
        if !visiting.insert(path.to_path_buf()) {
            return Err(ResolveError::Cycle {
                path: path.to_path_buf(),
                origin: origin.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let kind = if let Some(caps) = self.kind_marker.captures(&text) {
            let name = &caps[1];
            name.parse::<PageKind>()
                .map_err(|_| ResolveError::UnknownKind {
                    kind: name.to_string(),
                    path: path.to_path_buf(),
                })?
        } else if let Some(caps) = self.extends.captures(&text) {
            let base = self.find_base(&caps[1], origin)?;
            self.resolve_file(&base, origin, visiting)?
        } else {
            return Err(ResolveError::NoKind {
                origin: origin.to_path_buf(),
                last: path.to_path_buf(),
            });
        };

        debug!(path = %path.display(), kind = %kind, "resolved page kind");
        self.cache.insert(path.to_path_buf(), kind);
        Ok(kind)
    }

    fn find_base(&self, name: &str, origin: &Path) -> Result<PathBuf, ResolveError> {
        self.search_path
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ResolveError::BaseNotFound {
                name: name.to_string(),
                origin: origin.to_path_buf(),
                search_path: self.search_path.clone(),
            })
    }
}
