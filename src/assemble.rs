//! The assembly pipeline.
//!
//! ```text
//! framework bytes ──► template::normalize ──┐
//!                                           ├─► enhance ──► agenda::synthesize ──► fill ──► HTML
//! markdown bytes ───► markdown::structure ──┘
//! ```
//!
//! Every call builds its own [`Identifiers`] and heading registry, so two
//! assemblies never share state. Progress is reported as [`AssembleEvent`]s
//! on an optional channel; the CLI prints them from a separate thread.
//!
//! # Errors
//!
//! | Tier | Variant | Meaning |
//! |---|---|---|
//! | caller | [`AssembleError::UnacceptableContent`] | framework unusable |
//! | caller | [`AssembleError::Markdown`] | Markdown not convertible |
//! | caller | [`AssembleError::Config`] | config out of range |
//! | invariant | [`AssembleError::Forbidden`] | internal bug, with source location |
//!
//! Asset problems are not errors: they become [`AssembleEvent::AssetFailed`]
//! and the element is left as it was.

use crate::agenda;
use crate::assets::{AssetLoader, DefaultLoader};
use crate::config::{AssemblerConfig, ConfigError};
use crate::enhance::{self, MediaContext};
use crate::fill;
use crate::imaging::{ImageBackend, RustBackend};
use crate::markdown;
use crate::registry::Identifiers;
use crate::template;
use crate::types::Heading;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Prefix of the generator `<meta>` content.
pub const CAPTION: &str = "MarkDown Monolith Assembler";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Id of the element receiving the sections.
pub const CONTENT_ID: &str = "MDMA-CONTENT";
/// Id of the element receiving the agenda.
pub const AGENDA_ID: &str = "MDMA-AGENDA";
/// Class of generated `<style>` elements.
pub const AUTOGENERATED_CLASS: &str = "MDMA-AUTOGENERATED";

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("unacceptable content: {0}")]
    UnacceptableContent(String),
    #[error("markdown error: {0}")]
    Markdown(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("forbidden state reached at {file}:{line}")]
    Forbidden { file: &'static str, line: u32 },
}

/// Kind of asset turned into a `data:` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Icon,
}

/// Progress reported while assembling.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleEvent {
    /// Framework parsed and cleaned; `identifiers` ids were already taken.
    FrameworkNormalized { identifiers: usize },
    /// Markdown split into sections.
    MarkdownStructured { sections: usize, headings: usize },
    /// An asset reference was replaced by a `data:` URI.
    AssetInlined {
        kind: AssetKind,
        source: String,
        bytes: usize,
    },
    /// An image got an inline preview background.
    PreviewCreated {
        source: String,
        width: u32,
        height: u32,
    },
    /// A YouTube link was turned into an embedded player.
    VideoEmbedded { video_id: String },
    /// An asset could not be loaded or decoded; the element is unchanged.
    AssetFailed { source: String, reason: String },
    /// Serialization finished.
    Filled { bytes: usize },
}

/// Result of one assembly.
#[derive(Debug)]
pub struct Assembly {
    pub html: String,
    /// Registered headings in document order.
    pub headings: Vec<Heading>,
}

/// Send an event if anyone is listening. A closed channel is ignored.
pub(crate) fn emit(events: Option<&Sender<AssembleEvent>>, event: AssembleEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Assemble with the default asset loader and image backend.
///
/// Relative asset paths resolve against `config.media.base_dir`, or the
/// working directory when it is empty.
pub fn assemble(
    framework: &[u8],
    markdown: &[u8],
    config: &AssemblerConfig,
    events: Option<Sender<AssembleEvent>>,
) -> Result<Assembly, AssembleError> {
    let base_dir = if config.media.base_dir.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(&config.media.base_dir)
    };
    let loader = DefaultLoader::new(base_dir, config.media.remote);
    assemble_with(framework, markdown, config, &loader, &RustBackend::new(), events)
}

/// Assemble with explicit collaborators.
pub fn assemble_with(
    framework: &[u8],
    markdown: &[u8],
    config: &AssemblerConfig,
    loader: &impl AssetLoader,
    backend: &impl ImageBackend,
    events: Option<Sender<AssembleEvent>>,
) -> Result<Assembly, AssembleError> {
    config.validate()?;
    let events = events.as_ref();

    let mut identifiers = Identifiers::new();
    let dom = template::normalize(framework, &mut identifiers)?;
    emit(
        events,
        AssembleEvent::FrameworkNormalized {
            identifiers: identifiers.len(),
        },
    );

    let structure = markdown::structure(markdown, config.markdown.dialect, &mut identifiers)?;
    emit(
        events,
        AssembleEvent::MarkdownStructured {
            sections: structure.sections.len(),
            headings: structure.headings.len(),
        },
    );

    let media = MediaContext {
        loader,
        backend,
        monolith: config.media.monolith,
        preview: config.media.preview,
        events,
    };
    enhance::enhance(&dom.document, &structure, &media)?;

    let css = agenda::synthesize(&structure.headings);
    let html = fill::fill(&dom, &structure.headings, &css, &config.write_options())?;
    emit(events, AssembleEvent::Filled { bytes: html.len() });

    Ok(Assembly {
        html,
        headings: structure.headings.iter().cloned().collect(),
    })
}
