//! Feed generators.
//!
//! Both feeds run once per build, after every tree is constructed and
//! rendered, over the run's [`Registries`](crate::registry::Registries):
//!
//! | Feed | Input | Format |
//! |------|-------|--------|
//! | [`rss`] | post registry, most recent window | RSS 2.0 with `content:encoded` |
//! | [`calendar`] | event registry, all entries | iCalendar (RFC 5545) |

pub mod calendar;
pub mod rss;

use crate::render::RenderError;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed entry {path} has no '{field}'")]
    MissingField { field: &'static str, path: PathBuf },
    #[error("Invalid date '{value}' in {path}")]
    BadDate { value: String, path: PathBuf },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Cannot write feed {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write a finished feed document, creating parent directories.
pub fn write_feed(path: &Path, document: &str) -> Result<(), FeedError> {
    let io = |source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io)?;
    }
    fs::write(path, document).map_err(io)?;
    info!(path = %path.display(), bytes = document.len(), "wrote feed");
    Ok(())
}
