//! HTML serializer with a built-in formatter.
//!
//! Two output modes:
//!
//! | Mode | Block elements | Text |
//! |---|---|---|
//! | pretty | start on their own line, indented `indent` spaces per level | whitespace collapsed, wrapped at `wrap` columns |
//! | minify | written back to back | whitespace collapsed, never wrapped |
//!
//! In both modes whitespace touching a block boundary is dropped, whitespace
//! runs collapse to a single space, and `pre`/`textarea` content plus the raw
//! text of `script`/`style` are written untouched. The doctype is always
//! `<!DOCTYPE html>`.

use super::{Handle, NodeData, local_name, tag_name};
use html5ever::Attribute;

/// Formatting knobs for [`write_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub minify: bool,
    /// Spaces per nesting level (pretty mode only).
    pub indent: usize,
    /// Wrap column for text, 0 disables (pretty mode only).
    pub wrap: usize,
}

impl WriteOptions {
    pub fn pretty(indent: usize, wrap: usize) -> Self {
        Self {
            minify: false,
            indent,
            wrap,
        }
    }

    pub fn minified() -> Self {
        Self {
            minify: true,
            indent: 0,
            wrap: 0,
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::pretty(2, 68)
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

const BLOCK_ELEMENTS: &[&str] = &[
    "html", "head", "body", "title", "meta", "link", "style", "script", "base", "address",
    "article", "aside", "blockquote", "caption", "col", "colgroup", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "noscript", "ol",
    "p", "pre", "section", "summary", "table", "tbody", "td", "template", "tfoot", "th",
    "thead", "tr", "ul",
];

fn is_one_of(name: &str, set: &[&str]) -> bool {
    set.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
}

fn is_block(node: &Handle) -> bool {
    tag_name(node).is_some_and(|name| is_one_of(name, BLOCK_ELEMENTS))
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// Serialize a whole document, doctype included.
pub fn write_document(document: &Handle, options: &WriteOptions) -> String {
    let mut writer = HtmlWriter::new(options);
    writer.push("<!DOCTYPE html>");
    writer.start_line(0);
    writer.children(document, true, 0);
    writer.finish()
}

/// Serialize a single node and its subtree (no doctype).
pub fn write_node(node: &Handle, options: &WriteOptions) -> String {
    let mut writer = HtmlWriter::new(options);
    writer.node(node, true, true, 0);
    writer.finish()
}

struct HtmlWriter<'a> {
    out: String,
    options: &'a WriteOptions,
    column: usize,
    /// Line break (with indentation depth) owed before the next output.
    pending_break: Option<usize>,
    /// Nesting count of `pre`-like elements; formatting is off while > 0.
    preformatted: usize,
}

impl<'a> HtmlWriter<'a> {
    fn new(options: &'a WriteOptions) -> Self {
        Self {
            out: String::new(),
            options,
            column: 0,
            pending_break: None,
            preformatted: 0,
        }
    }

    fn formatting(&self) -> bool {
        !self.options.minify && self.preformatted == 0
    }

    fn finish(mut self) -> String {
        self.pending_break = None;
        if !self.options.minify && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out
    }

    fn start_line(&mut self, depth: usize) {
        if self.formatting() {
            self.pending_break = Some(depth);
        }
    }

    fn push(&mut self, s: &str) {
        if let Some(depth) = self.pending_break.take() {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            let width = depth * self.options.indent;
            self.out.extend(std::iter::repeat_n(' ', width));
            self.column = width;
        }
        self.out.push_str(s);
        match s.rfind('\n') {
            Some(pos) => self.column = s[pos + 1..].chars().count(),
            None => self.column += s.chars().count(),
        }
    }

    /// A collapsible space, turned into a line break when the next `len`
    /// characters would overflow the wrap column.
    fn space(&mut self, len: usize, depth: usize) {
        if self.pending_break.is_some() {
            return;
        }
        let wrap = self.options.wrap;
        let margin = depth * self.options.indent;
        if self.formatting() && wrap > 0 && self.column > margin && self.column + 1 + len > wrap {
            self.start_line(depth);
        } else {
            self.push(" ");
        }
    }

    fn children(&mut self, parent: &Handle, parent_is_block: bool, depth: usize) {
        let children = parent.children.borrow();
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            let trim_start = if i == 0 {
                parent_is_block
            } else {
                is_block(&children[i - 1])
            };
            let trim_end = if i == last {
                parent_is_block
            } else {
                is_block(&children[i + 1])
            };
            self.node(child, trim_start, trim_end, depth);
        }
    }

    fn node(&mut self, node: &Handle, trim_start: bool, trim_end: bool, depth: usize) {
        match &node.data {
            NodeData::Document => self.children(node, true, depth),
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {}
            NodeData::Comment { contents } => {
                if trim_start {
                    self.start_line(depth);
                }
                self.push("<!--");
                self.push(contents);
                self.push("-->");
                if trim_end {
                    self.start_line(depth);
                }
            }
            NodeData::Text { contents } => {
                let contents = contents.borrow();
                if self.preformatted > 0 {
                    let text: &str = &contents;
                    self.push(&html_escape::encode_text(text));
                } else {
                    self.text(&contents, trim_start, trim_end, depth);
                }
            }
            NodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let tag = local_name(name);
                let block = is_one_of(tag, BLOCK_ELEMENTS);
                if block {
                    self.start_line(depth);
                }
                self.open_tag(tag, &attrs.borrow());
                if is_one_of(tag, VOID_ELEMENTS) {
                    if block {
                        self.start_line(depth);
                    }
                    return;
                }

                let template = template_contents.borrow().clone();
                let content = template.as_ref().unwrap_or(node);

                if is_one_of(tag, RAW_TEXT_ELEMENTS) {
                    for child in content.children.borrow().iter() {
                        if let NodeData::Text { contents } = &child.data {
                            self.push(&contents.borrow());
                        }
                    }
                } else if is_one_of(tag, PREFORMATTED_ELEMENTS) {
                    // The parser drops one newline right after the start tag.
                    let leading_newline = content.children.borrow().first().is_some_and(|c| {
                        matches!(&c.data, NodeData::Text { contents } if contents.borrow().starts_with('\n'))
                    });
                    if leading_newline {
                        self.push("\n");
                    }
                    self.preformatted += 1;
                    self.children(content, block, depth + 1);
                    self.preformatted -= 1;
                } else {
                    let has_block_children = content.children.borrow().iter().any(is_block);
                    self.children(content, block, depth + 1);
                    if block && has_block_children {
                        self.start_line(depth);
                    }
                }

                self.push("</");
                self.push(tag);
                self.push(">");
                if block {
                    self.start_line(depth);
                }
            }
        }
    }

    fn open_tag(&mut self, tag: &str, attrs: &[Attribute]) {
        let mut open = String::with_capacity(tag.len() + 2);
        open.push('<');
        open.push_str(tag);
        for attr in attrs {
            open.push(' ');
            if let Some(prefix) = &attr.name.prefix {
                let prefix: &str = prefix;
                open.push_str(prefix);
                open.push(':');
            }
            open.push_str(local_name(&attr.name));
            if !attr.value.is_empty() {
                open.push_str("=\"");
                let value: &str = &attr.value;
                open.push_str(&html_escape::encode_double_quoted_attribute(value));
                open.push('"');
            }
        }
        open.push('>');
        self.push(&open);
    }

    fn text(&mut self, raw: &str, trim_start: bool, trim_end: bool, depth: usize) {
        let leading = raw.starts_with(is_html_whitespace) && !trim_start;
        let trailing = raw.ends_with(is_html_whitespace) && !trim_end;
        let words: Vec<&str> = raw
            .split(is_html_whitespace)
            .filter(|word| !word.is_empty())
            .collect();

        if words.is_empty() {
            if leading && trailing {
                self.space(0, depth);
            }
            return;
        }

        for (i, word) in words.iter().enumerate() {
            let escaped = html_escape::encode_text(*word);
            if i > 0 || leading {
                self.space(escaped.chars().count(), depth);
            }
            self.push(&escaped);
        }
        if trailing {
            self.space(0, depth);
        }
    }
}
