//! Alias → display-value translation for post metadata.
//!
//! Posts refer to authors and categories by short aliases
//! (`<meta name="author_id" content="pipitone.j" />`). A JSON table supplied
//! on the command line maps each field name to its alias table:
//!
//! ```json
//! {
//!   "author_id": { "pipitone.j": "Jon Pipitone" },
//!   "category":  { "tooling": "Tooling", "web": "Web Programming" }
//! }
//! ```
//!
//! Every post field named in the table is rewritten in place: a single value
//! is replaced, each element of a multi-valued field is replaced. An alias
//! missing from its table, or a single-valued field with no value to
//! translate, is a fatal consistency error.

use crate::metadata::{FieldValue, Metadata};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Cannot read translation table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid translation table {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Field '{field}' in {path} has no value to translate")]
    ShapeMismatch { field: String, path: PathBuf },
    #[error("No translation for '{alias}' in field '{field}' of {path}")]
    UnknownAlias {
        field: String,
        alias: String,
        path: PathBuf,
    },
}

/// Field name → (alias → display value).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl Translations {
    pub fn load(path: &Path) -> Result<Self, TranslateError> {
        let content = fs::read_to_string(path).map_err(|source| TranslateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| TranslateError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Translate every field of `metadata` that has a table.
    ///
    /// Fields absent from the page's schema are left alone.
    pub fn apply(&self, metadata: &mut Metadata, source: &Path) -> Result<(), TranslateError> {
        for (field, table) in &self.tables {
            let lookup = |alias: &str| {
                table
                    .get(alias)
                    .cloned()
                    .ok_or_else(|| TranslateError::UnknownAlias {
                        field: field.clone(),
                        alias: alias.to_string(),
                        path: source.to_path_buf(),
                    })
            };

            match metadata.get_mut(field) {
                None => {}
                Some(FieldValue::Single(Some(value))) => *value = lookup(value.as_str())?,
                Some(FieldValue::Multi(values)) => {
                    for value in values.iter_mut() {
                        *value = lookup(value.as_str())?;
                    }
                }
                Some(FieldValue::Single(None)) => {
                    return Err(TranslateError::ShapeMismatch {
                        field: field.clone(),
                        path: source.to_path_buf(),
                    });
                }
            }
        }
        Ok(())
    }
}
