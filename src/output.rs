//! CLI output formatting for assembly events.
//!
//! Events go to stderr so stdout can carry the HTML. What is shown depends
//! on the [`Verbosity`]:
//!
//! | Level | Shows |
//! |---|---|
//! | `brief` | asset failures |
//! | `verbose` | + inlined assets, previews, embedded videos |
//! | `debug` | + per-stage summaries |
//!
//! ```text
//! Framework: 4 ids reserved
//! Markdown: 3 sections, 12 headings
//!     inlined image photos/dawn.jpg (48213 bytes)
//!     preview photos/dusk.jpg (100x75)
//!     video dQw4w9WgXcQ
//!     FAILED https://example.com/gone.png
//!         request failed: 404 Not Found
//! Output: 91234 bytes
//! ```
//!
//! [`format_event`] is pure (returns `Vec<String>`), so every line format is
//! unit tested without capturing output.

use crate::assemble::{AssembleEvent, AssetKind};
use crate::types::Heading;

/// How much progress to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Brief,
    Verbose,
    Debug,
}

/// Lowest verbosity at which `event` is shown.
pub fn event_level(event: &AssembleEvent) -> Verbosity {
    match event {
        AssembleEvent::AssetFailed { .. } => Verbosity::Brief,
        AssembleEvent::AssetInlined { .. }
        | AssembleEvent::PreviewCreated { .. }
        | AssembleEvent::VideoEmbedded { .. } => Verbosity::Verbose,
        AssembleEvent::FrameworkNormalized { .. }
        | AssembleEvent::MarkdownStructured { .. }
        | AssembleEvent::Filled { .. } => Verbosity::Debug,
    }
}

fn kind_label(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Image => "image",
        AssetKind::Stylesheet => "stylesheet",
        AssetKind::Icon => "icon",
    }
}

/// Lines for one event, or none when it is below `verbosity`.
pub fn format_event(event: &AssembleEvent, verbosity: Verbosity) -> Vec<String> {
    if event_level(event) > verbosity {
        return Vec::new();
    }
    match event {
        AssembleEvent::FrameworkNormalized { identifiers } => {
            vec![format!("Framework: {} ids reserved", identifiers)]
        }
        AssembleEvent::MarkdownStructured { sections, headings } => {
            vec![format!("Markdown: {} sections, {} headings", sections, headings)]
        }
        AssembleEvent::AssetInlined {
            kind,
            source,
            bytes,
        } => vec![format!(
            "    inlined {} {} ({} bytes)",
            kind_label(*kind),
            source,
            bytes
        )],
        AssembleEvent::PreviewCreated {
            source,
            width,
            height,
        } => vec![format!("    preview {} ({}x{})", source, width, height)],
        AssembleEvent::VideoEmbedded { video_id } => vec![format!("    video {}", video_id)],
        AssembleEvent::AssetFailed { source, reason } => vec![
            format!("    FAILED {}", source),
            format!("        {}", reason),
        ],
        AssembleEvent::Filled { bytes } => vec![format!("Output: {} bytes", bytes)],
    }
}

/// Indented outline of the heading registry, for `--debug`.
pub fn format_headings(headings: &[Heading]) -> Vec<String> {
    headings
        .iter()
        .map(|h| {
            format!(
                "{}{:03} {} #{}",
                "    ".repeat(usize::from(h.level.saturating_sub(1))),
                h.id,
                h.title,
                h.slug
            )
        })
        .collect()
}
