//! Final injection and serialization.
//!
//! `<head>` receives the generator tag first and, when there is anything to
//! style, the agenda stylesheet last:
//!
//! ```html
//! <head>
//!   <meta name="generator" content="MarkDown Monolith Assembler version 1.0.0">
//!   …framework head…
//!   <style class="MDMA-AUTOGENERATED">…</style>
//! </head>
//! ```
//!
//! Both are recognized and removed by [`crate::template::normalize`], so a
//! filled page can be used as a framework again.

use crate::assemble::{AUTOGENERATED_CLASS, AssembleError, CAPTION, VERSION};
use crate::dom::{self, RcDom, WriteOptions};
use crate::registry::Headings;

/// Content of the generator `<meta>` tag.
pub fn generator() -> String {
    format!("{CAPTION} version {VERSION}")
}

/// Inject generator and stylesheet into `dom` and serialize it.
pub fn fill(
    dom: &RcDom,
    headings: &Headings,
    css: &str,
    options: &WriteOptions,
) -> Result<String, AssembleError> {
    let head = dom::find_element(&dom.document, |n| dom::is_element(n, "head"))
        .ok_or_else(|| forbidden!())?;

    let meta = dom::element_with("meta", &[("name", "generator"), ("content", &generator())]);
    dom::prepend(&head, meta);

    if !headings.is_empty() {
        let style = dom::element_with("style", &[("class", AUTOGENERATED_CLASS)]);
        dom::append(&style, dom::text(css));
        dom::append(&head, style);
    }

    Ok(dom::write_document(&dom.document, options))
}
