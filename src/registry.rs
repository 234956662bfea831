//! Run-scoped registries of event and post pages.
//!
//! The feed generators need every event and every post in the run, wherever
//! they sit in the page trees. Rather than walking the trees afterwards, the
//! tree builder appends a record to a [`Registries`] value as each event or
//! post page finishes construction. One `Registries` is created per run and
//! passed explicitly to the builder and then to the feed generators.
//!
//! Records are snapshots of what the feeds need, taken when the page is
//! complete, so the registries never borrow from the page trees.

use crate::page::{Details, Page, event::Coordinates};
use chrono::NaiveDate;
use std::path::PathBuf;

/// What the calendar feed needs from an event page.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub path: PathBuf,
    pub title: Option<String>,
    pub venue: String,
    pub date: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub coordinates: Option<Coordinates>,
}

/// What the item feed needs from a post page.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub path: PathBuf,
    pub post_id: u64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub post_date: Option<String>,
    pub categories: Vec<String>,
    pub content: Option<String>,
    pub excerpt: String,
}

/// Append-only event and post registries, in construction order.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub events: Vec<EventRecord>,
    pub posts: Vec<PostRecord>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished page if its kind feeds a registry.
    pub fn register(&mut self, page: &Page) {
        match &page.details {
            Details::Event(event) => self.events.push(EventRecord {
                path: page.path.clone(),
                title: page.title().map(String::from),
                venue: event.venue.clone(),
                date: event.date.clone(),
                start: event.start,
                end: event.end,
                coordinates: event.coordinates,
            }),
            Details::Post(post) => self.posts.push(PostRecord {
                path: page.path.clone(),
                post_id: post.post_id,
                title: page.title().map(String::from),
                author: page.metadata.single("author_id").map(String::from),
                post_date: page.metadata.single("post_date").map(String::from),
                categories: page.metadata.multi("category").to_vec(),
                content: post.content.clone(),
                excerpt: post.excerpt.clone(),
            }),
            _ => {}
        }
    }
}
