//! Centralized path conventions for content files.
//!
//! Every derived name in the page tree comes from the file's stored path
//! (the path relative to the source root), never from the page's content.
//! This module keeps those conventions in one place:
//!
//! - `bootcamps/2013-06-paris.html` → slug `2013-06-paris` (file stem)
//! - `lessons/python/index.html` → slug `python` (directory name)
//! - `blog/2013/06/release.html` → period `2013`/`06`, name `release.html`
//!
//! ## Relative Root
//!
//! Rendered pages link back to the site root with a relative path whose
//! length matches the page's directory depth:
//! - `index.html` → `.`
//! - `blog/2013/06/release.html` → `../../..`

use std::path::{Component, Path, PathBuf};

/// Abbreviated English month names, indexed by month number minus one.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The year/month/name triple encoded in a post's stored path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPeriod {
    pub year: String,
    pub month: String,
    pub name: String,
}

/// Slug from the file stem: `bootcamps/2013-06-paris.html` → `2013-06-paris`.
pub fn file_slug(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Slug from the innermost directory: `lessons/python/index.html` → `python`.
///
/// Empty for files at the source root.
pub fn dir_slug(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// File base name, used as the default sibling link.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Split the last three segments of a stored path into a post period.
///
/// Returns `None` when the path is too shallow to carry `year/month/name`.
pub fn post_period(path: &Path) -> Option<PostPeriod> {
    let segments: Vec<String> = normal_segments(path);
    let [.., year, month, name] = segments.as_slice() else {
        return None;
    };
    Some(PostPeriod {
        year: year.clone(),
        month: month.clone(),
        name: name.clone(),
    })
}

/// Relative path from a page's directory back to the source root.
pub fn root_path(path: &Path) -> String {
    let depth = path
        .parent()
        .map(|dir| normal_segments(dir).len())
        .unwrap_or(0);
    if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    }
}

/// Stored path rendered with forward slashes, as used in URLs and template names.
pub fn url_path(path: &Path) -> String {
    normal_segments(path).join("/")
}

/// Lexically resolve `.` and `..` in a stored path.
///
/// `blog/../about.html` → `about.html`. Returns `None` when the path climbs
/// above the source root or is absolute.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => normal.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normal.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normal)
}

/// Month abbreviation for a two-digit month number (`"06"` → `"Jun"`).
pub fn month_name(month: &str) -> Option<&'static str> {
    let number: usize = month.parse().ok()?;
    MONTHS.get(number.checked_sub(1)?).copied()
}

/// Two-digit month numbers in calendar order, for index tables.
pub fn month_numbers() -> Vec<String> {
    (1..=12).map(|m| format!("{m:02}")).collect()
}

/// Host part of the site base URL: `https://example.org/path` → `example.org`.
pub fn site_domain(site: &str) -> &str {
    let without_scheme = site.split_once("://").map_or(site, |(_, rest)| rest);
    without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or(without_scheme)
}

/// Join the site base URL and a stored path into a canonical link.
pub fn canonical_link(site: &str, path: &Path) -> String {
    format!("{}/{}", site.trim_end_matches('/'), url_path(path))
}

fn normal_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}
