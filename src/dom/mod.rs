//! One DOM for everything.
//!
//! The framework template, the HTML converted from Markdown and the isolated
//! sections all live in the same tree type: html5ever's reference-counted
//! [`RcDom`]. html5ever does the lenient HTML5 parsing (missing `<html>`,
//! `<head>` and `<body>` elements are synthesized, stray end tags dropped), and
//! this module adds the structured mutations the pipeline needs on top of it:
//! attribute get/set/delete, node creation, insertion, detaching and cloning.
//!
//! | Operation | Function |
//! |---|---|
//! | Parse | [`parse_html`] |
//! | Query | [`tag_name`], [`is_element`], [`attr`], [`has_class`], [`text_content`] |
//! | Mutate | [`set_attr`], [`remove_attr`], [`append`], [`insert_before`], [`detach`], [`replace`], [`clear_children`] |
//! | Create | [`element`], [`text`] |
//! | Clone | [`deep_clone`], [`shallow_clone`] |
//! | Traverse | [`walk::find_node`], [`find_element`], [`collect_elements`] |
//! | Serialize | [`writer::write_document`] |

pub mod walk;
pub mod writer;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, ParseOpts, QualName, parse_document};
use std::cell::RefCell;
use std::rc::Rc;

pub use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};
pub use writer::{WriteOptions, write_document};

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse a complete HTML document, repairing it the way a browser would.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
}

/// Local tag name of an element, `None` for every other node kind.
pub fn tag_name(node: &Node) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(local_name(name)),
        _ => None,
    }
}

/// True when `node` is an element named `tag` (ASCII case-insensitive).
pub fn is_element(node: &Node, tag: &str) -> bool {
    tag_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

pub fn is_text(node: &Node) -> bool {
    matches!(node.data, NodeData::Text { .. })
}

/// Value of attribute `name` (ASCII case-insensitive) on an element.
pub fn attr(node: &Node, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|a| local_name(&a.name).eq_ignore_ascii_case(name))
        .map(|a| a.value.to_string())
}

/// Set (or overwrite) attribute `name` on an element. No-op for non-elements.
pub fn set_attr(node: &Node, name: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs
        .iter_mut()
        .find(|a| local_name(&a.name).eq_ignore_ascii_case(name))
    {
        Some(existing) => existing.value = StrTendril::from_slice(value),
        None => attrs.push(Attribute {
            name: attr_name(name),
            value: StrTendril::from_slice(value),
        }),
    }
}

/// Remove attribute `name`. Returns whether it was present.
pub fn remove_attr(node: &Node, name: &str) -> bool {
    let NodeData::Element { attrs, .. } = &node.data else {
        return false;
    };
    let mut attrs = attrs.borrow_mut();
    let before = attrs.len();
    attrs.retain(|a| !local_name(&a.name).eq_ignore_ascii_case(name));
    attrs.len() != before
}

/// True when the element's `class` attribute contains `class` as a token.
pub fn has_class(node: &Node, class: &str) -> bool {
    attr(node, "class").is_some_and(|value| {
        value
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case(class))
    })
}

/// Local part of a qualified name as plain text.
pub(crate) fn local_name(name: &QualName) -> &str {
    &name.local
}

fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

/// Create a detached HTML element.
pub fn element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Create a detached HTML element with attributes, in the given order.
pub fn element_with(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let node = element(tag);
    for (name, value) in attrs {
        set_attr(&node, name, value);
    }
    node
}

/// Create a detached text node.
pub fn text(contents: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(contents)),
    })
}

/// Parent of `node`, if attached.
pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Append `child` as the last child of `parent`, detaching it first.
pub fn append(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Insert `child` directly before `sibling` under the sibling's parent.
/// Returns `false` when `sibling` is detached.
pub fn insert_before(sibling: &Handle, child: Handle) -> bool {
    let Some(parent) = parent(sibling) else {
        return false;
    };
    detach(&child);
    let Some(index) = index_in_parent(&parent, sibling) else {
        return false;
    };
    child.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut().insert(index, child);
    true
}

/// Insert `child` as the first child of `parent`.
pub fn prepend(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

/// Remove `node` from its parent. Detached nodes are left alone.
pub fn detach(node: &Handle) {
    let Some(parent) = parent(node) else {
        return;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, node));
    node.parent.set(None);
}

/// Put `replacement` where `old` is and detach `old`.
pub fn replace(old: &Handle, replacement: Handle) -> bool {
    if !insert_before(old, replacement) {
        return false;
    }
    detach(old);
    true
}

/// Drop every child of `node`.
pub fn clear_children(node: &Handle) {
    let children = std::mem::take(&mut *node.children.borrow_mut());
    for child in &children {
        child.parent.set(None);
    }
}

pub(crate) fn index_in_parent(parent: &Handle, child: &Handle) -> Option<usize> {
    parent
        .children
        .borrow()
        .iter()
        .position(|c| Rc::ptr_eq(c, child))
}

/// Copy a node without its children (tag and attributes only).
pub fn shallow_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
    };
    Node::new(data)
}

/// Copy a node and its whole subtree into a new detached tree.
pub fn deep_clone(node: &Handle) -> Handle {
    let copy = shallow_clone(node);
    if let (
        NodeData::Element {
            template_contents: source,
            ..
        },
        NodeData::Element {
            template_contents: target,
            ..
        },
    ) = (&node.data, &copy.data)
    {
        *target.borrow_mut() = source.borrow().as_ref().map(deep_clone);
    }
    for child in node.children.borrow().iter() {
        append(&copy, deep_clone(child));
    }
    copy
}

/// Concatenated text of every descendant text node.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    walk::for_each_node(node, |n, _| {
        if let NodeData::Text { contents } = &n.data {
            out.push_str(&contents.borrow());
        }
    });
    out
}

/// First element in pre-order under (and including) `root` matching `pred`.
pub fn find_element(root: &Handle, mut pred: impl FnMut(&Handle) -> bool) -> Option<Handle> {
    walk::find_node(root, |n, _| tag_name(n).is_some() && pred(n))
}

/// Every element in pre-order under (and including) `root` matching `pred`.
///
/// Collected up front so callers can mutate the tree while iterating.
pub fn collect_elements(root: &Handle, mut pred: impl FnMut(&Handle) -> bool) -> Vec<Handle> {
    let mut found = Vec::new();
    walk::for_each_node(root, |n, _| {
        if tag_name(n).is_some() && pred(n) {
            found.push(n.clone());
        }
    });
    found
}

/// The element with `id` (ASCII case-insensitive), if any.
pub fn element_by_id(root: &Handle, id: &str) -> Option<Handle> {
    find_element(root, |n| {
        attr(n, "id").is_some_and(|value| value.eq_ignore_ascii_case(id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(dom: &RcDom) -> Handle {
        find_element(&dom.document, |n| is_element(n, "body")).unwrap()
    }

    #[test]
    fn parse_synthesizes_missing_structure() {
        let dom = parse_html("<p>hello</p>");
        assert!(find_element(&dom.document, |n| is_element(n, "html")).is_some());
        assert!(find_element(&dom.document, |n| is_element(n, "head")).is_some());
        assert_eq!(text_content(&body(&dom)), "hello");
    }

    #[test]
    fn attributes_are_case_insensitive() {
        let dom = parse_html(r#"<div ID="Main" class="a B"></div>"#);
        let div = find_element(&dom.document, |n| is_element(n, "DIV")).unwrap();
        assert_eq!(attr(&div, "id").as_deref(), Some("Main"));
        assert!(has_class(&div, "b"));
        assert!(!has_class(&div, "c"));
    }

    #[test]
    fn set_attr_overwrites_in_place() {
        let node = element_with("a", &[("href", "#x"), ("id", "x")]);
        set_attr(&node, "href", "#y");
        assert_eq!(attr(&node, "href").as_deref(), Some("#y"));
        assert!(remove_attr(&node, "id"));
        assert!(!remove_attr(&node, "id"));
        assert_eq!(attr(&node, "id"), None);
    }

    #[test]
    fn append_moves_between_parents() {
        let a = element("div");
        let b = element("div");
        let child = text("x");
        append(&a, child.clone());
        append(&b, child.clone());
        assert!(a.children.borrow().is_empty());
        assert_eq!(b.children.borrow().len(), 1);
        assert!(Rc::ptr_eq(&parent(&child).unwrap(), &b));
    }

    #[test]
    fn insert_before_and_replace() {
        let list = element("ul");
        let first = element("li");
        let last = element("li");
        append(&list, first.clone());
        append(&list, last.clone());

        let middle = element("li");
        assert!(insert_before(&last, middle.clone()));
        assert_eq!(index_in_parent(&list, &middle), Some(1));

        let swapped = element("li");
        assert!(replace(&middle, swapped.clone()));
        assert_eq!(index_in_parent(&list, &swapped), Some(1));
        assert!(parent(&middle).is_none());
        assert_eq!(list.children.borrow().len(), 3);
    }

    #[test]
    fn insert_before_detached_sibling_fails() {
        assert!(!insert_before(&element("p"), element("p")));
    }

    #[test]
    fn deep_clone_is_independent() {
        let dom = parse_html(r#"<div id="a"><em>one</em> two</div>"#);
        let div = element_by_id(&dom.document, "a").unwrap();
        let copy = deep_clone(&div);
        assert!(parent(&copy).is_none());
        assert_eq!(text_content(&copy), "one two");

        set_attr(&copy, "id", "b");
        clear_children(&copy);
        assert_eq!(attr(&div, "id").as_deref(), Some("a"));
        assert_eq!(text_content(&div), "one two");
    }

    #[test]
    fn shallow_clone_drops_children() {
        let dom = parse_html(r#"<h2 class="x">Title <b>bold</b></h2>"#);
        let h2 = find_element(&dom.document, |n| is_element(n, "h2")).unwrap();
        let copy = shallow_clone(&h2);
        assert!(copy.children.borrow().is_empty());
        assert!(has_class(&copy, "x"));
    }

    #[test]
    fn collect_elements_in_document_order() {
        let dom = parse_html("<p id=1></p><div><p id=2></p></div><p id=3></p>");
        let ids: Vec<String> = collect_elements(&dom.document, |n| is_element(n, "p"))
            .iter()
            .filter_map(|p| attr(p, "id"))
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
