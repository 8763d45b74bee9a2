//! Link passes: YouTube embeds and external targets.
//!
//! A thumbnail linking to a YouTube video,
//!
//! ```html
//! <a href="https://www.youtube.com/watch?v=ID"><img src="thumb.jpg"></a>
//! ```
//!
//! becomes a player that keeps the original link next to it:
//!
//! ```html
//! <div class="MDMA-VIDEO">
//!   <a href="https://www.youtube.com/watch?v=ID"><img src="thumb.jpg"></a>
//!   <iframe loading="lazy" src="https://www.youtube-nocookie.com/embed/ID"></iframe>
//! </div>
//! ```
//!
//! When the link is alone in a paragraph the paragraph is replaced, since a
//! `<div>` inside `<p>` would not survive reparsing.

use crate::assemble::{AssembleEvent, emit};
use crate::assets;
use crate::dom::{self, Handle, NodeData};
use std::sync::mpsc::Sender;
use url::Url;

/// Class of generated video containers.
pub const VIDEO_CLASS: &str = "MDMA-VIDEO";
const EMBED_BASE: &str = "https://www.youtube-nocookie.com/embed/";
const YOUTUBE_HOSTS: [&str; 3] = ["youtube.com", "www.youtube.com", "m.youtube.com"];

/// Video id of a YouTube watch URL.
pub fn youtube_id(href: &str) -> Option<String> {
    let href = href.trim();
    let url = match href.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")),
        None => Url::parse(href),
    }
    .ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if !YOUTUBE_HOSTS.contains(&host) || url.path() != "/watch" {
        return None;
    }

    let (_, id) = url.query_pairs().find(|(key, _)| key == "v")?;
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then(|| id.into_owned())
}

/// Replace YouTube thumbnail links with embedded players. Returns the
/// number of players created.
pub fn embed_videos(root: &Handle, events: Option<&Sender<AssembleEvent>>) -> usize {
    let anchors = dom::collect_elements(root, |n| dom::is_element(n, "a"));

    let mut embedded = 0;
    for anchor in anchors {
        if inside_video(&anchor) || !wraps_only_an_image(&anchor) {
            continue;
        }
        let Some(video_id) = dom::attr(&anchor, "href").and_then(|href| youtube_id(&href)) else {
            continue;
        };

        let container = dom::element_with("div", &[("class", VIDEO_CLASS)]);
        dom::append(&container, dom::deep_clone(&anchor));
        let player = dom::element_with(
            "iframe",
            &[("loading", "lazy"), ("src", &format!("{EMBED_BASE}{video_id}"))],
        );
        dom::append(&container, player);

        let target = match dom::parent(&anchor) {
            Some(p) if dom::is_element(&p, "p") && only_meaningful_child(&p, &anchor) => p,
            _ => anchor.clone(),
        };
        if dom::replace(&target, container) {
            embedded += 1;
            emit(events, AssembleEvent::VideoEmbedded { video_id });
        }
    }
    embedded
}

/// Open external links in a new browsing context. Links that already say
/// where to open are left alone. Returns the number of links changed.
pub fn target_external(root: &Handle) -> usize {
    let anchors = dom::collect_elements(root, |n| dom::is_element(n, "a"));

    let mut changed = 0;
    for anchor in anchors {
        if dom::attr(&anchor, "target").is_some() || inside_video(&anchor) {
            continue;
        }
        let is_external = dom::attr(&anchor, "href").is_some_and(|href| assets::is_remote(&href));
        if !is_external {
            continue;
        }
        dom::set_attr(&anchor, "target", "_blank");
        if dom::attr(&anchor, "rel").is_none() {
            dom::set_attr(&anchor, "rel", "noopener");
        }
        changed += 1;
    }
    changed
}

fn inside_video(node: &Handle) -> bool {
    let mut current = dom::parent(node);
    while let Some(ancestor) = current {
        if dom::has_class(&ancestor, VIDEO_CLASS) {
            return true;
        }
        current = dom::parent(&ancestor);
    }
    false
}

/// Children other than whitespace-only text and comments.
fn meaningful_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| match &child.data {
            NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
            NodeData::Comment { .. } => false,
            _ => true,
        })
        .cloned()
        .collect()
}

fn wraps_only_an_image(anchor: &Handle) -> bool {
    match meaningful_children(anchor).as_slice() {
        [only] => dom::is_element(only, "img"),
        _ => false,
    }
}

fn only_meaningful_child(parent: &Handle, child: &Handle) -> bool {
    match meaningful_children(parent).as_slice() {
        [only] => std::rc::Rc::ptr_eq(only, child),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{WriteOptions, parse_html, write_document};
    use std::sync::mpsc;

    fn render(dom: &dom::RcDom) -> String {
        write_document(&dom.document, &WriteOptions::minified())
    }

    // =========================================================================
    // youtube_id
    // =========================================================================

    #[test]
    fn watch_urls_yield_ids() {
        for href in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "//www.youtube.com/watch?v=dQw4w9WgXcQ",
            "  https://WWW.YOUTUBE.COM/watch?v=dQw4w9WgXcQ  ",
        ] {
            assert_eq!(youtube_id(href).as_deref(), Some("dQw4w9WgXcQ"), "{href}");
        }
    }

    #[test]
    fn other_urls_yield_nothing() {
        for href in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/watch?v=bad%20id",
            "https://notyoutube.com/watch?v=abc",
            "ftp://www.youtube.com/watch?v=abc",
            "watch?v=abc",
        ] {
            assert_eq!(youtube_id(href), None, "{href}");
        }
    }

    // =========================================================================
    // embed_videos
    // =========================================================================

    const THUMB_LINK: &str =
        r#"<a href="https://www.youtube.com/watch?v=abc_123"><img src="t.jpg"></a>"#;

    #[test]
    fn lone_thumbnail_link_replaces_its_paragraph() {
        let dom = parse_html(&format!("<p>\n  {THUMB_LINK}\n</p>"));
        let (tx, rx) = mpsc::channel();
        assert_eq!(embed_videos(&dom.document, Some(&tx)), 1);

        let html = render(&dom);
        assert!(
            html.contains(concat!(
                r#"<body><div class="MDMA-VIDEO"><a href="https://www.youtube.com/watch?v=abc_123"><img src="t.jpg"></a>"#,
                r#"<iframe loading="lazy" src="https://www.youtube-nocookie.com/embed/abc_123"></iframe></div></body>"#
            )),
            "{html}"
        );
        drop(tx);
        assert_eq!(
            rx.iter().collect::<Vec<_>>(),
            vec![AssembleEvent::VideoEmbedded {
                video_id: "abc_123".into()
            }]
        );
    }

    #[test]
    fn link_with_surrounding_text_is_replaced_in_place() {
        let dom = parse_html(&format!("<div>see {THUMB_LINK} here</div>"));
        embed_videos(&dom.document, None);
        let html = render(&dom);
        assert!(html.contains("<body><div>see"), "{html}");
        assert!(html.contains(r#"<div class="MDMA-VIDEO">"#), "{html}");
        assert!(html.contains("here</div></body>"), "{html}");
    }

    #[test]
    fn text_link_is_not_embedded() {
        let dom = parse_html(r#"<a href="https://www.youtube.com/watch?v=abc">watch</a>"#);
        assert_eq!(embed_videos(&dom.document, None), 0);
        assert!(!render(&dom).contains("iframe"));
    }

    #[test]
    fn image_with_caption_text_is_not_embedded() {
        let dom = parse_html(
            r#"<a href="https://www.youtube.com/watch?v=abc"><img src="t.jpg"> caption</a>"#,
        );
        assert_eq!(embed_videos(&dom.document, None), 0);
    }

    #[test]
    fn embedding_twice_adds_nothing() {
        let dom = parse_html(THUMB_LINK);
        assert_eq!(embed_videos(&dom.document, None), 1);
        let once = render(&dom);

        let reparsed = parse_html(&once);
        assert_eq!(embed_videos(&reparsed.document, None), 0);
        assert_eq!(render(&reparsed), once);
        assert_eq!(once.matches("MDMA-VIDEO").count(), 1);
    }

    // =========================================================================
    // target_external
    // =========================================================================

    #[test]
    fn external_links_open_in_new_tab() {
        let dom = parse_html(
            r##"<a href="https://example.com">a</a><a href="//cdn.example.com">b</a><a href="#local">c</a><a href="page.html">d</a>"##,
        );
        assert_eq!(target_external(&dom.document), 2);
        let html = render(&dom);
        assert!(html.contains(r#"<a href="https://example.com" target="_blank" rel="noopener">a</a>"#));
        assert!(html.contains(r#"<a href="//cdn.example.com" target="_blank" rel="noopener">b</a>"#));
        assert!(html.contains(r##"<a href="#local">c</a>"##));
        assert!(html.contains(r#"<a href="page.html">d</a>"#));
    }

    #[test]
    fn existing_target_and_rel_are_respected() {
        let dom = parse_html(
            r#"<a href="http://x.org" target="_self">a</a><a href="http://y.org" rel="me">b</a>"#,
        );
        assert_eq!(target_external(&dom.document), 1);
        let html = render(&dom);
        assert!(html.contains(r#"<a href="http://x.org" target="_self">a</a>"#));
        assert!(html.contains(r#"<a href="http://y.org" rel="me" target="_blank">b</a>"#));
    }
}
