//! # Treepress
//!
//! Compiles a tree of templated content files into a static site. The page
//! hierarchy, sibling navigation, and two syndication feeds are all derived
//! from metadata embedded in the content files themselves: there is no site
//! manifest and no front matter.
//!
//! # Architecture: Construct, Render, Syndicate
//!
//! ```text
//! 1. Construct  root files  →  page trees + registries   (no output written)
//! 2. Render     page trees  →  output/                   (depth-first, parent first)
//! 3. Syndicate  registries  →  feed.xml, events.ics      (optional)
//! ```
//!
//! Construction is a fixed five-step protocol applied to every file (see
//! [`page`]). A file's kind decides which derived fields it gets, and the
//! kind is itself inferred by following the file's template inheritance
//! chain until a base template declares one (see [`resolve`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Marker scanning and schema-driven metadata extraction |
//! | [`resolve`] | Page kind resolution through `extends` chains, cached per run |
//! | [`page`] | Page tree: node type, construction protocol, per-kind finalization |
//! | [`registry`] | Run-scoped event and post registries filled during construction |
//! | [`translate`] | Alias to display-value translation table applied to posts |
//! | [`render`] | Template engine seam, MiniJinja engine, standard fields, tree rendering |
//! | [`feeds`] | Item feed (RSS) and calendar feed (iCalendar) generators |
//! | [`naming`] | Path conventions: slugs, post periods, relative roots, month names |
//! | [`config`] | Layered site configuration: stock defaults plus optional TOML file |
//! | [`compile`] | Run orchestration for the `build` and `check` commands |
//! | [`output`] | CLI output formatting: page inventory and build summary |
//!
//! # Design Decisions
//!
//! ## Kinds Come From Templates
//!
//! A content file rarely says what it is. It extends `_post.html` or
//! `_event.html`, and the base template carries the `<!-- pagekind: … -->`
//! marker. Adding a new post is then just writing a file that extends the
//! right base; nothing else has to know about it.
//!
//! ## Explicit Registries
//!
//! Feeds need every post and event in the run, wherever they sit in the
//! trees. The builder appends a snapshot to a [`registry::Registries`] value
//! as each such page completes; that value is created per run and passed
//! explicitly, never held in global state.
//!
//! ## Owned Trees
//!
//! Pages own their children. Parents and siblings are referenced by path and
//! link string, so the tree is plain data that can be walked, rendered and
//! serialized into template contexts without shared ownership.

pub mod compile;
pub mod config;
pub mod feeds;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod page;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod translate;

#[cfg(test)]
pub(crate) mod test_helpers;
