//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every page is its semantic identity (positional index, title and kind)
//! with the source path shown as secondary context on an indented `Source:`
//! line. Untitled pages fall back to their file name in parentheses.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Pages
//! 001 Blog [post-index]
//!     Source: blog/index.html
//!     001 Pelican Guts [post]
//!         Source: blog/2012/11/pelican-guts.html
//!         Post: #5239, 2012-11-01
//!
//! 001 (index.html) [generic]
//!     Source: bootcamps/index.html
//!     001 Paris Workshop [event]
//!         Source: bootcamps/2013-06-paris.html
//!         Date: Jun 1-2, 2013 at Paris
//!
//! 5 pages, 1 event, 1 post
//! ```
//!
//! ## Build
//!
//! The check listing, followed by:
//!
//! ```text
//! Rendered 5 pages → site/
//! Feed: site/feed.xml
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compile::{Inventory, Report};
use crate::naming;
use crate::page::{Details, Page};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Header line for a page: titled pages show the title, untitled show the
/// file name in parens.
///
/// ```text
/// 001 Pelican Guts [post]
/// 002 (index.html) [generic]
/// ```
fn page_header(index: usize, page: &Page) -> String {
    let name = match page.title() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("({})", naming::base_name(&page.path)),
    };
    format!("{} {} [{}]", format_index(index), name, page.kind)
}

/// Kind-specific context line, if the kind has one worth showing.
fn detail_line(page: &Page) -> Option<String> {
    match &page.details {
        Details::Event(event) => Some(format!("Date: {} at {}", event.date, event.venue)),
        Details::Post(post) => Some(match page.metadata.single("post_date") {
            Some(date) => format!("Post: #{}, {date}", post.post_id),
            None => format!("Post: #{}", post.post_id),
        }),
        Details::TutorialIndex(index) => Some(format!("Lesson: {}", index.slug)),
        _ => None,
    }
}

fn format_page(lines: &mut Vec<String>, index: usize, page: &Page, depth: usize) {
    lines.push(format!("{}{}", indent(depth), page_header(index, page)));
    lines.push(format!(
        "{}Source: {}",
        indent(depth + 1),
        naming::url_path(&page.path)
    ));
    if let Some(detail) = detail_line(page) {
        lines.push(format!("{}{}", indent(depth + 1), detail));
    }
    for (i, child) in page.children.iter().enumerate() {
        format_page(lines, i + 1, child, depth + 1);
    }
}

/// Page inventory: every tree, then totals.
pub fn format_inventory(inventory: &Inventory) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, tree) in inventory.trees.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        format_page(&mut lines, 1, tree, 0);
    }
    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {}",
        count(inventory.page_count(), "page"),
        count(inventory.registries.events.len(), "event"),
        count(inventory.registries.posts.len(), "post"),
    ));
    lines
}

/// Inventory followed by what the build wrote.
pub fn format_build_summary(report: &Report, output_dir: &Path) -> Vec<String> {
    let mut lines = format_inventory(&report.inventory);
    lines.push(format!(
        "Rendered {} → {}/",
        count(report.written, "page"),
        output_dir.display()
    ));
    for feed in &report.feeds {
        lines.push(format!("Feed: {}", feed.display()));
    }
    lines
}

pub fn print_inventory(inventory: &Inventory) {
    for line in format_inventory(inventory) {
        println!("{}", line);
    }
}

pub fn print_build_summary(report: &Report, output_dir: &Path) {
    for line in format_build_summary(report, output_dir) {
        println!("{}", line);
    }
}
