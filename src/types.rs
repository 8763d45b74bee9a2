//! Shared types produced by structuring and read by every later stage.

use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};

/// One Markdown heading.
///
/// Ids are assigned from 1 in document order. `parent` is the nearest
/// earlier heading with a strictly smaller level; `None` means top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub id: u32,
    /// 1-6 for `h1`..`h6`.
    pub level: u8,
    /// Trimmed text content of the heading, inline markup removed.
    pub title: String,
    /// Unique anchor id, also the `href` fragment in the agenda.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
}

/// Content of one top-level heading: a detached `<article class="tab">`
/// holding the `h1` and everything up to the next `h1`.
#[derive(Clone)]
pub struct Section {
    pub root: Handle,
}
