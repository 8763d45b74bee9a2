//! Markdown structuring: Markdown → HTML → sections + heading registry.
//!
//! The Markdown is rendered with `pulldown-cmark` and parsed into the same DOM
//! type as the framework. Starting at the first `h1`, its siblings are walked
//! in order:
//!
//! ```text
//! <h1>A</h1>        ─┐  <article class="tab">
//! <h2>B</h2>         │    <h1><a id="a" href="#a">A</a></h1>
//! <p>text</p>        │    <h2><a id="b" href="#b">B</a></h2>
//!                   ─┘    <p>text</p>
//! <h1>C</h1>        ─┐  <article class="tab">
//!                   ─┘    <h1><a id="c" href="#c">C</a></h1>
//! ```
//!
//! Every `h1` opens a new section. Every heading is copied without its
//! children and without its own `id`, and given an `<a>` child carrying the
//! heading's slug, with the original inline content moved inside that
//! anchor. Everything else is deep-copied as is. Content before the first
//! `h1` is not part of any section.
//!
//! Ids written in the Markdown's raw HTML are claimed before any slug is
//! handed out, so a slug never repeats one of them.

use crate::assemble::AssembleError;
use crate::dom::{self, Handle};
use crate::registry::{Headings, Identifiers};
use crate::slug::slugify;
use crate::types::Section;
use pulldown_cmark::{Options, Parser, html as md_html};
use serde::{Deserialize, Serialize};

/// Markdown flavour accepted by [`structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain CommonMark, no extensions.
    CommonMark,
    /// CommonMark plus tables, strikethrough, task lists, footnotes and
    /// GitHub blockquote tags.
    #[default]
    Github,
}

impl Dialect {
    fn options(self) -> Options {
        match self {
            Dialect::CommonMark => Options::empty(),
            Dialect::Github => {
                Options::ENABLE_TABLES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_FOOTNOTES
                    | Options::ENABLE_GFM
            }
        }
    }
}

/// Result of structuring one Markdown document.
pub struct Structure {
    pub sections: Vec<Section>,
    pub headings: Headings,
}

/// Render Markdown to an HTML fragment.
pub fn to_html(markdown: &str, dialect: Dialect) -> String {
    let parser = Parser::new_ext(markdown, dialect.options());
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}

/// Split Markdown into sections and register its headings.
///
/// New slugs are claimed in `identifiers`, so ids already taken by the
/// framework are never reused.
pub fn structure(
    markdown: &[u8],
    dialect: Dialect,
    identifiers: &mut Identifiers,
) -> Result<Structure, AssembleError> {
    let text = std::str::from_utf8(markdown)
        .map_err(|_| AssembleError::Markdown("unable to convert into HTML".into()))?;
    let document = dom::parse_html(&to_html(text, dialect));

    let mut structure = Structure {
        sections: Vec::new(),
        headings: Headings::new(),
    };

    let body = dom::find_element(&document.document, |n| dom::is_element(n, "body"))
        .ok_or_else(|| forbidden!())?;
    let Some(first) = dom::find_element(&body, |n| dom::is_element(n, "h1")) else {
        return Ok(structure);
    };

    let nodes = siblings_from(&first)?;
    for node in &nodes {
        claim_content_ids(node, identifiers);
    }

    let mut current: Option<Handle> = None;
    for node in nodes {
        let level = heading_level(&node);
        if level == Some(1) {
            let article = dom::element_with("article", &[("class", "tab")]);
            structure.sections.push(Section {
                root: article.clone(),
            });
            current = Some(article);
        }
        let Some(article) = &current else {
            continue;
        };

        match level {
            Some(level) => {
                let copy = anchored_heading(&node, level, &mut structure.headings, identifiers)?;
                dom::append(article, copy);
            }
            None => dom::append(article, dom::deep_clone(&node)),
        }
    }

    Ok(structure)
}

/// `node` and every sibling after it.
fn siblings_from(node: &Handle) -> Result<Vec<Handle>, AssembleError> {
    let Some(parent) = dom::parent(node) else {
        return Ok(vec![node.clone()]);
    };
    let start = dom::index_in_parent(&parent, node).ok_or_else(|| forbidden!())?;
    Ok(parent.children.borrow()[start..].to_vec())
}

/// Claim every `id` under `node`. A top-level heading's own id is skipped:
/// its copy does not keep it.
fn claim_content_ids(node: &Handle, identifiers: &mut Identifiers) {
    dom::walk::for_each_node(node, |n, depth| {
        if depth == 0 && heading_level(n).is_some() {
            return;
        }
        if let Some(id) = dom::attr(n, "id") {
            identifiers.claim_content(&id);
        }
    });
}

/// Heading level of `h1`..`h6`, `None` for anything else.
pub fn heading_level(node: &Handle) -> Option<u8> {
    let name = dom::tag_name(node)?;
    let bytes = name.as_bytes();
    match bytes {
        [h, digit @ b'1'..=b'6'] if h.eq_ignore_ascii_case(&b'h') => Some(digit - b'0'),
        _ => None,
    }
}

/// Register a heading and build its section copy:
/// `<hN ...><a id="slug" href="#slug">original children</a></hN>`.
fn anchored_heading(
    heading: &Handle,
    level: u8,
    headings: &mut Headings,
    identifiers: &mut Identifiers,
) -> Result<Handle, AssembleError> {
    let title = dom::text_content(heading)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let base = slugify(&title);
    let slug = headings.add(level, title, &base, identifiers)?.slug.clone();

    let copy = dom::shallow_clone(heading);
    dom::remove_attr(&copy, "id");
    let anchor = dom::element_with("a", &[("id", &slug), ("href", &format!("#{slug}"))]);
    for child in heading.children.borrow().iter() {
        dom::append(&anchor, dom::deep_clone(child));
    }
    dom::append(&copy, anchor);
    Ok(copy)
}
