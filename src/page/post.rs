//! Post pages and the post index.
//!
//! Posts are stored as `<index dir>/<year>/<month>/<name>` and declare a
//! serial id, a date, an author alias, and any number of categories:
//!
//! ```text
//! {% extends "_post.html" %}
//! {% block file_metadata %}
//! <meta name="post_id" content="5239" />
//! <meta name="author_id" content="pipitone.j" />
//! <meta name="title" content="Pelican Guts" />
//! <meta name="post_date" content="2012-11-01" />
//! <meta name="category" content="tooling" />
//! {% endblock file_metadata %}
//! {% block content %}
//! <p>...</p>
//! {% endblock content %}
//! ```
//!
//! Posts sort by their numeric id, not by date: several posts often share a
//! date and still need a fixed order.
//!
//! The post index groups its children by the year and month in their paths
//! so templates can render an archive table.

use super::{Page, PageError};
use crate::config::FeedConfig;
use crate::metadata::Metadata;
use crate::naming::{self, PostPeriod};
use crate::translate::Translations;
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static CONTENT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%-?\s*block\s+content\s*-?%\}(.+)\{%-?\s*endblock\s+content\s*-?%\}")
        .expect("content block pattern is valid")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetails {
    pub post_id: u64,
    pub year: String,
    pub month: String,
    pub name: String,
    /// Link from the post index: `<year>/<month>/<name>`.
    pub index_link: String,
    /// Raw content block, template references unresolved.
    pub content: Option<String>,
    pub excerpt: String,
}

impl PostDetails {
    /// Sibling link, reached from another post's month directory.
    pub fn link(&self) -> String {
        format!("../../{}", self.index_link)
    }
}

/// Finalize a post: translate aliases, then derive id, period, content and excerpt.
pub fn finalize(
    path: &Path,
    text: &str,
    metadata: &mut Metadata,
    translations: &Translations,
    feed: &FeedConfig,
) -> Result<PostDetails, PageError> {
    translations.apply(metadata, path)?;

    let raw_id = metadata.single("post_id").ok_or_else(|| PageError::MissingField {
        field: "post_id",
        path: path.to_path_buf(),
    })?;
    let post_id = raw_id.trim().parse::<u64>().map_err(|_| PageError::BadValue {
        field: "post_id",
        value: raw_id.to_string(),
        path: path.to_path_buf(),
    })?;

    let PostPeriod { year, month, name } = period(path)?;
    let content = extract_content(text);
    let excerpt = excerpt(content.as_deref(), feed);

    Ok(PostDetails {
        post_id,
        index_link: format!("{year}/{month}/{name}"),
        year,
        month,
        name,
        content,
        excerpt,
    })
}

/// The `{% block content %}` body of a post, if present.
pub fn extract_content(text: &str) -> Option<String> {
    CONTENT_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Plain-text excerpt of a post's content for feed readers.
///
/// Tags are stripped, the text is cut to the configured character budget,
/// and a cut excerpt is backed off to the last whole word before the
/// ellipsis is appended. Posts without content get the placeholder.
pub fn excerpt(content: Option<&str>, feed: &FeedConfig) -> String {
    let stripped = content.map(|c| TAG.replace_all(c, "")).unwrap_or_default();
    let text = stripped.trim();
    if text.is_empty() {
        return feed.placeholder.clone();
    }

    if text.chars().count() <= feed.excerpt_length {
        return text.to_string();
    }

    let truncated: String = text.chars().take(feed.excerpt_length).collect();
    let ends_on_word = text
        .chars()
        .nth(feed.excerpt_length)
        .is_some_and(char::is_whitespace);
    let cut = match truncated.rfind(char::is_whitespace) {
        Some(pos) if !ends_on_word => truncated[..pos].trim_end(),
        _ => truncated.trim_end(),
    };
    format!("{cut}{}", feed.ellipsis)
}

fn period(path: &Path) -> Result<PostPeriod, PageError> {
    naming::post_period(path).ok_or_else(|| PageError::BadPostPath {
        path: path.to_path_buf(),
    })
}

// ============================================================================
// Post index
// ============================================================================

/// Children of a post index grouped by `(year, month)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostIndex {
    /// Distinct years, ascending.
    pub years: Vec<String>,
    /// All twelve two-digit month numbers.
    pub months: Vec<String>,
    /// Child positions per period, in child order.
    periods: BTreeMap<(String, String), Vec<usize>>,
    /// Number of posts the item feed carries.
    pub history_length: usize,
}

impl PostIndex {
    /// Group already-ordered children by the period in their paths.
    pub fn group(children: &[Page], history_length: usize) -> Result<Self, PageError> {
        let mut periods: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
        for (position, child) in children.iter().enumerate() {
            let PostPeriod { year, month, .. } = period(&child.path)?;
            periods.entry((year, month)).or_default().push(position);
        }

        let mut years: Vec<String> = periods.keys().map(|(year, _)| year.clone()).collect();
        years.dedup();

        Ok(Self {
            years,
            months: naming::month_numbers(),
            periods,
            history_length,
        })
    }

    /// Posts for one period, in child order.
    pub fn posts<'p>(&self, children: &'p [Page], year: &str, month: &str) -> Vec<&'p Page> {
        self.periods
            .get(&(year.to_string(), month.to_string()))
            .map(|positions| positions.iter().map(|&i| &children[i]).collect())
            .unwrap_or_default()
    }

    /// Template view: years, months, per-period post lists and a `YYYY-MM` lookup.
    pub fn context(&self, children: &[Page]) -> Value {
        let mut lookup = serde_json::Map::new();
        let periods: Vec<Value> = self
            .periods
            .iter()
            .map(|((year, month), positions)| {
                let posts: Vec<Value> = positions.iter().map(|&i| children[i].context()).collect();
                lookup.insert(format!("{year}-{month}"), Value::Array(posts.clone()));
                json!({
                    "year": year,
                    "month": month,
                    "month_name": naming::month_name(month),
                    "posts": posts,
                })
            })
            .collect();

        json!({
            "years": self.years,
            "months": self.months,
            "periods": periods,
            "posts": lookup,
            "history_length": self.history_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(length: usize) -> FeedConfig {
        FeedConfig {
            excerpt_length: length,
            ..FeedConfig::default()
        }
    }

    #[test]
    fn content_block_extracted() {
        let text = "{% extends \"_post.html\" %}\n{% block content %}\n<p>Hello</p>\n{% endblock content %}\n";
        assert_eq!(extract_content(text).as_deref(), Some("\n<p>Hello</p>\n"));
    }

    #[test]
    fn content_block_absent() {
        assert_eq!(extract_content("<p>no block</p>"), None);
    }

    #[test]
    fn excerpt_strips_tags() {
        let text = excerpt(Some("<p>Short <em>post</em>.</p>"), &feed(200));
        assert_eq!(text, "Short post.");
    }

    #[test]
    fn excerpt_truncates_at_word_boundary() {
        let text = excerpt(Some("<p>one two three four</p>"), &feed(10));
        // "one two th" backs off to "one two"
        assert_eq!(text, "one two [...]");
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let text = excerpt(Some("héllo wörld again"), &feed(11));
        assert_eq!(text, "héllo wörld [...]");
    }

    #[test]
    fn excerpt_single_long_word_is_cut_hard() {
        let text = excerpt(Some("abcdefghijklmnop"), &feed(5));
        assert_eq!(text, "abcde [...]");
    }

    #[test]
    fn excerpt_placeholder_without_content() {
        assert_eq!(excerpt(None, &feed(200)), "No description available");
        assert_eq!(excerpt(Some("<p> </p>"), &feed(200)), "No description available");
    }

    #[test]
    fn link_forms() {
        let details = PostDetails {
            post_id: 7,
            year: "2013".into(),
            month: "06".into(),
            name: "a.html".into(),
            index_link: "2013/06/a.html".into(),
            content: None,
            excerpt: String::new(),
        };
        assert_eq!(details.link(), "../../2013/06/a.html");
    }
}
