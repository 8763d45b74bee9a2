//! # MDMA
//!
//! The MarkDown Monolith Assembler merges a Markdown document into an HTML
//! page template (the *framework*) and produces one self-contained,
//! navigable page: every top-level heading becomes a tab, a generated agenda
//! links to every heading, and the active tab and agenda entry are driven by
//! pure CSS (`:target` + `:has()`), no script.
//!
//! # Pipeline
//!
//! ```text
//! framework ─► template::normalize ─┐
//!                                   ├─► enhance ─► agenda::synthesize ─► fill ─► HTML
//! markdown ──► markdown::structure ─┘
//! ```
//!
//! The framework only needs two reserved containers:
//!
//! ```html
//! <div id="MDMA-CONTENT"></div>
//! <nav class="menu"><div class="options" id="MDMA-AGENDA"></div></nav>
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`assemble`] | Entry points, errors, progress events |
//! | [`template`] | Framework parsing and removal of earlier output |
//! | [`markdown`] | Markdown → sections + heading registry |
//! | [`registry`] | Unique identifiers and heading parent links |
//! | [`slug`] | Heading text → URL-safe anchor id |
//! | [`agenda`] | Agenda markup and its `:target`/`:has()` stylesheet |
//! | [`enhance`] | Content installation, tables, videos, links, media |
//! | [`fill`] | Generator tag, stylesheet injection, serialization |
//! | [`dom`] | Tree helpers, traversal and the HTML writer |
//! | [`assets`] | Loading `data:`, remote and local assets |
//! | [`imaging`] | Image identification and previews |
//! | [`framework`] | The built-in framework |
//! | [`config`] | `mdma.toml` loading, validation, merging |
//! | [`output`] | CLI formatting of progress events |
//!
//! # Idempotence
//!
//! The output is itself a valid framework. Normalization strips everything
//! an earlier run generated (placeholder children, the autogenerated
//! `<style>`, this tool's generator `<meta>`), and every enhancement pass
//! skips what it already produced, so re-assembling a page never stacks
//! generated artifacts.

/// An [`AssembleError::Forbidden`](crate::assemble::AssembleError::Forbidden)
/// for the current source location.
macro_rules! forbidden {
    () => {
        $crate::assemble::AssembleError::Forbidden {
            file: file!(),
            line: line!(),
        }
    };
}

pub mod agenda;
pub mod assemble;
pub mod assets;
pub mod config;
pub mod dom;
pub mod enhance;
pub mod fill;
pub mod framework;
pub mod imaging;
pub mod markdown;
pub mod output;
pub mod registry;
pub mod slug;
pub mod template;
pub mod types;

pub use assemble::{Assembly, AssembleError, AssembleEvent, assemble, assemble_with};

#[cfg(test)]
pub(crate) mod test_helpers;
