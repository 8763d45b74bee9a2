//! Framework normalization.
//!
//! A framework is any HTML page with two reserved containers:
//!
//! ```html
//! <div id="MDMA-CONTENT"></div>   <!-- receives the sections -->
//! <nav class="menu">
//!   <div class="options" id="MDMA-AGENDA"></div>   <!-- receives the agenda -->
//! </nav>
//! ```
//!
//! Because the assembler's own output is a valid framework, normalization
//! strips everything a previous run generated before anything new is added:
//!
//! - children of the reserved containers,
//! - `<style class="MDMA-AUTOGENERATED">` blocks,
//! - `<meta name="generator">` tags written by this tool.
//!
//! Every remaining `id` is recorded so heading slugs never collide with it.

use crate::assemble::{AGENDA_ID, AUTOGENERATED_CLASS, AssembleError, CAPTION, CONTENT_ID};
use crate::dom::{self, Handle, RcDom};
use crate::registry::Identifiers;

/// Parse and clean a framework, recording its ids into `identifiers`.
pub fn normalize(bytes: &[u8], identifiers: &mut Identifiers) -> Result<RcDom, AssembleError> {
    let source = String::from_utf8_lossy(bytes);
    if source.trim().is_empty() {
        return Err(AssembleError::UnacceptableContent(
            "framework is empty".into(),
        ));
    }

    let dom = dom::parse_html(&source);
    let root = &dom.document;
    if dom::find_element(root, |n| dom::is_element(n, "html")).is_none() {
        return Err(AssembleError::UnacceptableContent(
            "framework has no <html> root".into(),
        ));
    }

    for container in placeholders(root) {
        dom::clear_children(&container);
    }

    for stale in dom::collect_elements(root, is_stale_artifact) {
        dom::detach(&stale);
    }

    dom::walk::for_each_node(root, |node, _| {
        if let Some(id) = dom::attr(node, "id") {
            identifiers.claim_template(&id);
        }
    });

    Ok(dom)
}

/// The reserved content and agenda containers, in document order.
pub fn placeholders(root: &Handle) -> Vec<Handle> {
    dom::collect_elements(root, |n| {
        dom::attr(n, "id").is_some_and(|id| {
            id.eq_ignore_ascii_case(CONTENT_ID) || id.eq_ignore_ascii_case(AGENDA_ID)
        })
    })
}

/// Autogenerated `<style>` blocks and this tool's generator `<meta>` tags.
pub fn is_stale_artifact(node: &Handle) -> bool {
    if dom::is_element(node, "style") {
        return dom::has_class(node, AUTOGENERATED_CLASS);
    }
    if dom::is_element(node, "meta") {
        let is_generator =
            dom::attr(node, "name").is_some_and(|name| name.eq_ignore_ascii_case("generator"));
        return is_generator
            && dom::attr(node, "content").is_some_and(|content| starts_with_caption(&content));
    }
    false
}

fn starts_with_caption(content: &str) -> bool {
    content
        .get(..CAPTION.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CAPTION))
}
