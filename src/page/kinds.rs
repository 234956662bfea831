//! Page kinds and their per-kind protocol.
//!
//! The generic page protocol (load, extract, finalize self, load children,
//! finalize children) is the same for every page. A kind only customizes:
//!
//! | Hook | Where |
//! |------|-------|
//! | schema | [`PageKind::schema`] |
//! | uplink | [`PageKind::uplink`] |
//! | finalize self | `event`, `tutorial` and `post` modules, dispatched by [`super::TreeBuilder`] |
//! | finalize children | [`super::Page::finalize_children`] (post index grouping) |
//! | sibling link | [`super::Page::link`] |

use crate::metadata::Field;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Fields every page kind extracts.
const GENERIC_FIELDS: &[Field] = &[
    Field::multi("subfile"),
    Field::multi("subglob"),
    Field::single("title"),
];

const EVENT_FIELDS: &[Field] = &[
    Field::single("venue"),
    Field::single("latlng"),
    Field::single("startdate"),
    Field::single("enddate"),
    Field::single("eventbrite_key"),
];

const POST_FIELDS: &[Field] = &[
    Field::single("post_id"),
    Field::single("post_date"),
    Field::single("author_id"),
    Field::multi("category"),
];

/// The behavior variant governing a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    Generic,
    Event,
    TutorialIndex,
    TutorialTopic,
    PostIndex,
    Post,
}

impl PageKind {
    pub const ALL: [PageKind; 6] = [
        PageKind::Generic,
        PageKind::Event,
        PageKind::TutorialIndex,
        PageKind::TutorialTopic,
        PageKind::PostIndex,
        PageKind::Post,
    ];

    /// Name used in `<!-- pagekind: … -->` markers.
    pub fn name(self) -> &'static str {
        match self {
            PageKind::Generic => "generic",
            PageKind::Event => "event",
            PageKind::TutorialIndex => "tutorial-index",
            PageKind::TutorialTopic => "tutorial-topic",
            PageKind::PostIndex => "post-index",
            PageKind::Post => "post",
        }
    }

    /// Ordered field schema: the generic fields followed by kind extras.
    pub fn schema(self) -> Vec<Field> {
        let extra: &[Field] = match self {
            PageKind::Event => EVENT_FIELDS,
            PageKind::Post => POST_FIELDS,
            _ => &[],
        };
        GENERIC_FIELDS.iter().chain(extra).copied().collect()
    }

    /// Link from a page of this kind up to its logical parent index.
    pub fn uplink(self) -> &'static str {
        match self {
            PageKind::Event | PageKind::TutorialTopic => "index.html",
            PageKind::TutorialIndex => "../index.html",
            PageKind::Post => "../../index.html",
            PageKind::Generic | PageKind::PostIndex => "",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for PageKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
