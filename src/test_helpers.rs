//! Shared test utilities for the treepress test suite.
//!
//! Provides a throwaway site fixture (source root, template directory and
//! output directory under one temp dir), page text builders for each kind,
//! and tree lookup helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! site.page("blog/index.html", &post_index_page("*/*/*.html"));
//! site.page("blog/2013/06/a.html", &post_page(7, "2013-06-01", "A"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::naming;
use crate::page::Page;

// =========================================================================
// Base templates
// =========================================================================

const LAYOUT: &str = r#"<!doctype html>
<html>
<head>
{% block file_metadata %}{% endblock file_metadata %}
<title>{% if title %}{{ title }}{% endif %}</title>
<link rel="stylesheet" href="{{ root_path }}/site.css" />
</head>
<body>
{% block nav %}{% endblock nav %}
{% block content %}{% endblock content %}
<nav>{% if uplink %}<a href="{{ uplink }}">up</a>{% endif %}{% if prev %} <a href="{{ prev }}">prev</a>{% endif %}{% if next %} <a href="{{ next }}">next</a>{% endif %}</nav>
<footer>{{ contact_email }} {{ today }}</footer>
</body>
</html>
"#;

const BASES: &[(&str, &str)] = &[
    ("_layout.html", LAYOUT),
    (
        "_generic.html",
        "<!-- pagekind: generic -->\n{% extends \"_layout.html\" %}\n",
    ),
    (
        "_event.html",
        "<!-- pagekind: event -->\n{% extends \"_layout.html\" %}\n\
         {% block nav %}<p class=\"event\">{{ venue }}: {{ date }}</p>{% endblock nav %}\n",
    ),
    (
        "_lesson.html",
        "<!-- pagekind: tutorial-index -->\n{% extends \"_layout.html\" %}\n",
    ),
    (
        "_topic.html",
        "<!-- pagekind: tutorial-topic -->\n{% extends \"_layout.html\" %}\n",
    ),
    (
        "_post_index.html",
        "<!-- pagekind: post-index -->\n{% extends \"_layout.html\" %}\n\
         {% block nav %}{% for period in periods %}<h2>{{ month_name(period.month) }} {{ period.year }}</h2>\
         {% for post in period.posts %}<a href=\"{{ post.index_link }}\">{{ post.title }}</a>{% endfor %}\
         {% endfor %}{% endblock nav %}\n",
    ),
    (
        "_post.html",
        "<!-- pagekind: post -->\n{% extends \"_layout.html\" %}\n\
         {% block nav %}<p class=\"byline\">{{ author_id }} {{ post_date }}</p>{% endblock nav %}\n",
    ),
];

// =========================================================================
// Fixture setup
// =========================================================================

/// A site laid out under one temp directory:
///
/// ```text
/// <tmp>/site/        source root
/// <tmp>/templates/   template search path
/// <tmp>/out/         destination
/// ```
pub struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    /// Create the fixture with the stock base templates installed.
    pub fn new() -> Self {
        let site = Self {
            tmp: TempDir::new().unwrap(),
        };
        for (name, text) in BASES {
            write(&site.templates().join(name), text);
        }
        fs::create_dir_all(site.root()).unwrap();
        site
    }

    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("site")
    }

    pub fn templates(&self) -> PathBuf {
        self.tmp.path().join("templates")
    }

    pub fn output(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    /// Write a content file relative to the source root.
    pub fn page(&self, path: &str, text: &str) {
        write(&self.root().join(path), text);
    }

    /// Write a file relative to the temp dir (translation tables, config).
    pub fn file(&self, path: &str, text: &str) -> PathBuf {
        let full = self.tmp.path().join(path);
        write(&full, text);
        full
    }

    /// Read a rendered output file.
    pub fn rendered(&self, path: &str) -> String {
        let full = self.output().join(path);
        fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("cannot read rendered {}: {e}", full.display()))
    }
}

fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

// =========================================================================
// Page text builders
// =========================================================================

fn page_text(base: &str, markers: &[String], content: &str) -> String {
    format!(
        "{{% extends \"{base}\" %}}\n{{% block file_metadata %}}\n{}\n{{% endblock file_metadata %}}\n{{% block content %}}\n{content}\n{{% endblock content %}}\n",
        markers.join("\n")
    )
}

fn meta(name: &str, content: &str) -> String {
    format!(r#"<meta name="{name}" content="{content}" />"#)
}

/// A generic page carrying the given raw marker lines.
pub fn generic_page(markers: &[&str]) -> String {
    let markers: Vec<String> = markers.iter().map(|m| m.to_string()).collect();
    page_text("_generic.html", &markers, "<p>generic</p>")
}

pub fn event_page(venue: &str, start: &str, end: Option<&str>) -> String {
    let mut markers = vec![
        meta("title", &format!("{venue} Workshop")),
        meta("venue", venue),
        meta("startdate", start),
    ];
    if let Some(end) = end {
        markers.push(meta("enddate", end));
    }
    page_text("_event.html", &markers, "<p>event</p>")
}

/// A tutorial index with key points and one `subfile` per topic.
pub fn tutorial_index_page(keypoints: &str, topics: &[&str]) -> String {
    let mut markers = vec![meta("title", "Lesson")];
    markers.extend(topics.iter().map(|t| meta("subfile", t)));
    let content = format!("<ul class=\"keypoints\">{keypoints}</ul>");
    page_text("_lesson.html", &markers, &content)
}

pub fn topic_page(title: &str) -> String {
    page_text("_topic.html", &[meta("title", title)], "<p>topic</p>")
}

pub fn post_index_page(subglob: &str) -> String {
    page_text(
        "_post_index.html",
        &[meta("title", "Blog"), meta("subglob", subglob)],
        "<p>archive</p>",
    )
}

pub fn post_page(id: u64, date: &str, title: &str) -> String {
    let markers = vec![
        meta("post_id", &id.to_string()),
        meta("author_id", "wilson.g"),
        meta("title", title),
        meta("post_date", date),
        meta("category", "news"),
    ];
    page_text("_post.html", &markers, &format!("<p>{title} body text.</p>"))
}

// =========================================================================
// Tree helpers
// =========================================================================

/// Stored paths of a page's children, in final order.
pub fn child_paths(page: &Page) -> Vec<String> {
    page.children.iter().map(|c| naming::url_path(&c.path)).collect()
}

/// Find a page anywhere in a tree by stored path. Panics if not found.
pub fn find_page<'a>(root: &'a Page, path: &str) -> &'a Page {
    root.walk()
        .into_iter()
        .find(|p| naming::url_path(&p.path) == path)
        .unwrap_or_else(|| {
            let paths: Vec<String> = root.walk().iter().map(|p| naming::url_path(&p.path)).collect();
            panic!("page '{path}' not found. Available: {paths:?}")
        })
}
