//! Tutorial index and topic pages.
//!
//! Tutorials live one directory per lesson, with the lesson's `index.html`
//! as a tutorial-index page and each topic file as a tutorial-topic page:
//!
//! ```text
//! lessons/index.html          generic page listing lessons via subfile markers
//! lessons/python/index.html   tutorial-index, slug "python"
//! lessons/python/func.html    tutorial-topic, slug "func"
//! ```
//!
//! Each lesson index carries a key-points summary that the parent page
//! reuses under the lesson title:
//!
//! ```html
//! <ul class="keypoints">
//!   <li>Functions let us name and reuse a computation.</li>
//! </ul>
//! ```

use super::PageError;
use crate::naming;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

static KEYPOINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<ul\s+class="keypoints"\s*>(.+?)</ul>"#).expect("keypoints pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorialIndex {
    /// Lesson directory name.
    pub slug: String,
    /// Inner HTML of the key-points list.
    pub keypoints: String,
}

impl TutorialIndex {
    /// Sibling link, reached from another lesson's directory.
    pub fn link(&self) -> String {
        format!("../{}/index.html", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorialTopic {
    pub slug: String,
}

pub fn finalize_index(path: &Path, text: &str) -> Result<TutorialIndex, PageError> {
    let keypoints = KEYPOINTS
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| PageError::MissingBlock {
            block: "keypoints",
            path: path.to_path_buf(),
        })?;
    Ok(TutorialIndex {
        slug: naming::dir_slug(path),
        keypoints: keypoints.as_str().to_string(),
    })
}

pub fn finalize_topic(path: &Path) -> TutorialTopic {
    TutorialTopic {
        slug: naming::file_slug(path),
    }
}
