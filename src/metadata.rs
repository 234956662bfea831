//! Marker metadata extraction.
//!
//! Content files carry their metadata inline as marker tags rather than as a
//! front-matter block:
//!
//! ```text
//! <meta name="title" content="Pelican Guts" />
//! <meta name="category" content="tooling" />
//! <meta name="category" content="web" />
//! ```
//!
//! Each page kind declares a schema: an ordered list of field names, each
//! either single-valued or multi-valued. Extraction walks the file line by
//! line and applies every marker whose name appears in the schema:
//!
//! - **Single-valued** fields may match at most once. A second match is fatal.
//!   Unmatched single fields are `None`.
//! - **Multi-valued** fields accumulate every match in document order.
//!   Unmatched multi fields are an empty list.
//!
//! Markers whose name is not in the schema are ignored.
//!
//! ## Scanner Capability
//!
//! Finding markers is delegated to a [`MarkerScanner`], so the extractor does
//! not depend on any particular document parser. [`MetaTagScanner`] is the
//! regex-based implementation used for `<meta name=… content=… />` tags.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Single-valued field '{field}' set twice in {path}")]
    DuplicateField { field: String, path: PathBuf },
}

/// Whether a field holds one value or an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Multi,
}

/// One entry in a page kind's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub multiplicity: Multiplicity,
}

impl Field {
    pub const fn single(name: &'static str) -> Self {
        Self {
            name,
            multiplicity: Multiplicity::Single,
        }
    }

    pub const fn multi(name: &'static str) -> Self {
        Self {
            name,
            multiplicity: Multiplicity::Multi,
        }
    }

    fn default_value(&self) -> FieldValue {
        match self.multiplicity {
            Multiplicity::Single => FieldValue::Single(None),
            Multiplicity::Multi => FieldValue::Multi(Vec::new()),
        }
    }
}

/// An extracted field value. Serializes as `null`, a string, or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(Option<String>),
    Multi(Vec<String>),
}

/// A name/value pair found by a [`MarkerScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'t> {
    pub name: &'t str,
    pub value: &'t str,
}

/// Finds metadata markers in a line of text, in document order.
pub trait MarkerScanner {
    fn scan<'t>(&self, line: &'t str) -> Vec<Marker<'t>>;
}

/// Scanner for `<meta name="N" content="V" />` tags.
#[derive(Debug, Clone)]
pub struct MetaTagScanner {
    pattern: Regex,
}

impl MetaTagScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r#"<meta\s+name="([^"]*)"\s+content="([^"]*)"\s*/?>"#)
                .expect("meta tag pattern is valid"),
        }
    }
}

impl Default for MetaTagScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerScanner for MetaTagScanner {
    fn scan<'t>(&self, line: &'t str) -> Vec<Marker<'t>> {
        self.pattern
            .captures_iter(line)
            .filter_map(|caps| {
                Some(Marker {
                    name: caps.get(1)?.as_str(),
                    value: caps.get(2)?.as_str(),
                })
            })
            .collect()
    }
}

/// Extracted field values for one page, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    values: BTreeMap<String, FieldValue>,
}

impl Metadata {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.values.get_mut(field)
    }

    /// Value of a single-valued field, if set.
    pub fn single(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(FieldValue::Single(value)) => value.as_deref(),
            _ => None,
        }
    }

    /// Values of a multi-valued field, empty if unset or not in the schema.
    pub fn multi(&self, field: &str) -> &[String] {
        match self.values.get(field) {
            Some(FieldValue::Multi(values)) => values,
            _ => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn apply(&mut self, marker: &Marker<'_>, source: &Path) -> Result<(), MetadataError> {
        match self.values.get_mut(marker.name) {
            None => Ok(()),
            Some(FieldValue::Multi(values)) => {
                values.push(marker.value.to_string());
                Ok(())
            }
            Some(FieldValue::Single(slot @ None)) => {
                *slot = Some(marker.value.to_string());
                Ok(())
            }
            Some(FieldValue::Single(Some(_))) => Err(MetadataError::DuplicateField {
                field: marker.name.to_string(),
                path: source.to_path_buf(),
            }),
        }
    }
}

/// Extract the schema's fields from raw page text.
///
/// `source` only identifies the file in error messages.
pub fn extract(
    scanner: &dyn MarkerScanner,
    text: &str,
    schema: &[Field],
    source: &Path,
) -> Result<Metadata, MetadataError> {
    let mut metadata = Metadata {
        values: schema
            .iter()
            .map(|field| (field.name.to_string(), field.default_value()))
            .collect(),
    };

    for line in text.lines() {
        for marker in scanner.scan(line) {
            metadata.apply(&marker, source)?;
        }
    }

    Ok(metadata)
}
