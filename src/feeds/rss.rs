//! Item feed (RSS 2.0).
//!
//! Carries the most recent `history_length` posts, newest first. Each item
//! has the plain-text excerpt as its description and the full content block
//! as `content:encoded`. The content block is raw template text, so it goes
//! through the template engine again with `root_path` pointing at the site,
//! which turns relative links absolute for feed readers.

use super::FeedError;
use crate::config::{FeedConfig, SiteInfo};
use crate::naming;
use crate::registry::PostRecord;
use crate::render::{StandardFields, TemplateEngine};
use ::rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// The posts the feed carries: the last `history_length` registered, newest first.
pub fn window(posts: &[PostRecord], history_length: usize) -> Vec<&PostRecord> {
    let start = posts.len().saturating_sub(history_length);
    posts[start..].iter().rev().collect()
}

/// Build the feed document. `now` is the run's generation time.
pub fn item_feed(
    posts: &[PostRecord],
    engine: &dyn TemplateEngine,
    standard: &StandardFields,
    info: &SiteInfo,
    feed: &FeedConfig,
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let items = window(posts, feed.history_length)
        .into_iter()
        .map(|post| feed_item(post, engine, standard))
        .collect::<Result<Vec<_>, _>>()?;

    let namespaces = BTreeMap::from([("content".to_string(), CONTENT_NAMESPACE.to_string())]);
    let channel = ChannelBuilder::default()
        .namespaces(namespaces)
        .title(info.title.clone())
        .link(standard.site.clone())
        .description(info.description.clone())
        .last_build_date(Some(now.to_rfc2822()))
        .generator(Some(concat!("treepress ", env!("CARGO_PKG_VERSION")).to_string()))
        .items(items)
        .build();
    Ok(channel.to_string())
}

fn feed_item(
    post: &PostRecord,
    engine: &dyn TemplateEngine,
    standard: &StandardFields,
) -> Result<Item, FeedError> {
    let missing = |field| FeedError::MissingField {
        field,
        path: post.path.clone(),
    };
    let title = post.title.clone().ok_or_else(|| missing("title"))?;
    let date = post.post_date.as_deref().ok_or_else(|| missing("post_date"))?;
    let pub_date = rfc2822(date).ok_or_else(|| FeedError::BadDate {
        value: date.to_string(),
        path: post.path.clone(),
    })?;

    let link = naming::canonical_link(&standard.site, &post.path);
    let content = match &post.content {
        Some(source) => {
            let context = standard.with(naming::url_path(&post.path), standard.site.clone());
            let label = format!("content of {}", post.path.display());
            Some(engine.render_str(&label, source, &context)?)
        }
        None => None,
    };

    Ok(ItemBuilder::default()
        .title(Some(title))
        .author(post.author.clone())
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(Some(post.excerpt.clone()))
        .content(content)
        .categories(
            post.categories
                .iter()
                .map(|name| ::rss::CategoryBuilder::default().name(name.clone()).build())
                .collect::<Vec<_>>(),
        )
        .pub_date(Some(pub_date))
        .build())
}

/// `2013-06-01` → `Sat, 1 Jun 2013 00:00:00 +0000`.
fn rfc2822(date: &str) -> Option<String> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc().to_rfc2822())
}
