//! Content installation and DOM enhancement passes.
//!
//! Runs on the normalized framework after the Markdown is structured:
//!
//! | Pass | Module | Scope |
//! |---|---|---|
//! | sections → `#MDMA-CONTENT`, progress checkpoints | here | content placeholders |
//! | agenda groups → `#MDMA-AGENDA` | [`crate::agenda`] | agenda placeholders |
//! | `align` → `text-align` | [`tables`] | whole document |
//! | YouTube players | [`links`] | whole document |
//! | external link targets | [`links`] | whole document |
//! | lazy images, previews, inlining | [`media`] | whole document |
//! | stylesheet/icon inlining | [`media`] | whole document, monolith mode |
//!
//! Every pass skips what it already produced, so running the whole sequence
//! on its own output changes nothing.

pub mod links;
pub mod media;
pub mod tables;

use crate::agenda;
use crate::assemble::{AssembleError, AssembleEvent, CONTENT_ID, emit};
use crate::assets::{self, AssetLoader};
use crate::dom::{self, Handle};
use crate::imaging::ImageBackend;
use crate::markdown::{Structure, heading_level};
use crate::registry::Headings;
use crate::template;
use crate::types::Section;
use std::collections::HashMap;
use std::sync::mpsc::Sender;

/// Custom property set on every heading anchor, read by the framework's
/// reading-progress bar.
pub const PROGRESS_PROPERTY: &str = "--MDMA-PAGE-LOADED";

/// Collaborators and settings for the media passes.
pub struct MediaContext<'a, L, B> {
    pub loader: &'a L,
    pub backend: &'a B,
    pub monolith: bool,
    pub preview: u8,
    pub events: Option<&'a Sender<AssembleEvent>>,
}

impl<L: AssetLoader, B: ImageBackend> MediaContext<'_, L, B> {
    /// Load an asset, reporting failures instead of returning them.
    fn load(&self, source: &str) -> Option<Vec<u8>> {
        match self.loader.load(source) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                self.failed(source, e.to_string());
                None
            }
        }
    }

    fn failed(&self, source: &str, reason: String) {
        emit(
            self.events,
            AssembleEvent::AssetFailed {
                source: assets::truncate(source),
                reason,
            },
        );
    }

    /// MIME type from the decoded format, else from the file extension.
    fn mime_type(&self, source: &str, bytes: &[u8]) -> &'static str {
        self.backend
            .identify(bytes)
            .map(|info| info.mime_type())
            .unwrap_or_else(|_| assets::mime_from_extension(source))
    }
}

/// Install sections and agenda into `root`, then run every enhancement pass.
pub fn enhance<L: AssetLoader, B: ImageBackend>(
    root: &Handle,
    structure: &Structure,
    ctx: &MediaContext<'_, L, B>,
) -> Result<(), AssembleError> {
    let placeholders = Placeholders::find(root);
    install_content(&placeholders.content, &structure.sections, &structure.headings)?;
    install_agenda(&placeholders.agenda, &structure.headings);

    tables::migrate_alignment(root);
    links::embed_videos(root, ctx.events);
    links::target_external(root);
    media::enhance_images(root, ctx);
    if ctx.monolith {
        media::inline_links(root, ctx);
    }
    Ok(())
}

/// The reserved containers of the framework.
///
/// Resolved once, before anything is installed: installed content is never
/// searched for placeholders, whatever ids it carries.
pub struct Placeholders {
    pub content: Vec<Handle>,
    pub agenda: Vec<Handle>,
}

impl Placeholders {
    pub fn find(root: &Handle) -> Self {
        let (content, agenda): (Vec<Handle>, Vec<Handle>) = template::placeholders(root)
            .into_iter()
            .partition(|n| dom::attr(n, "id").is_some_and(|id| id.eq_ignore_ascii_case(CONTENT_ID)));
        Self { content, agenda }
    }
}

/// Replace the children of every content container with copies of the
/// sections, and mark each heading anchor with its reading progress.
pub fn install_content(
    containers: &[Handle],
    sections: &[Section],
    headings: &Headings,
) -> Result<(), AssembleError> {
    for container in containers {
        dom::clear_children(container);
        for section in sections {
            dom::append(container, dom::deep_clone(&section.root));
        }
        mark_progress(container, headings)?;
    }
    Ok(())
}

/// `style="--MDMA-PAGE-LOADED: P%;"` on the anchor of the i-th registered
/// heading (from 1), with `P = 100 * i / total`.
///
/// Anchors are matched by slug; other anchors inside headings, such as ones
/// written as raw HTML, are left alone.
fn mark_progress(container: &Handle, headings: &Headings) -> Result<(), AssembleError> {
    let mut anchors: HashMap<String, Handle> = HashMap::new();
    let candidates = dom::collect_elements(container, |n| {
        dom::is_element(n, "a") && dom::parent(n).is_some_and(|p| heading_level(&p).is_some())
    });
    for anchor in candidates {
        if let Some(id) = dom::attr(&anchor, "id") {
            anchors.entry(id).or_insert(anchor);
        }
    }

    let total = headings.len();
    for (i, heading) in headings.iter().enumerate() {
        // Every registered heading was given its anchor while structuring.
        let anchor = anchors.get(&heading.slug).ok_or_else(|| forbidden!())?;
        let percent = 100 * (i + 1) / total;
        dom::set_attr(anchor, "style", &format!("{PROGRESS_PROPERTY}: {percent}%;"));
    }
    Ok(())
}

/// Replace the children of every agenda container with the agenda groups.
pub fn install_agenda(containers: &[Handle], headings: &Headings) {
    for container in containers {
        dom::clear_children(container);
        agenda::build_groups(container, headings);
    }
}
