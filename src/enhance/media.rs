//! Image, stylesheet and icon passes.
//!
//! | Element | Always | Monolith mode | Otherwise, preview factor > 1 |
//! |---|---|---|---|
//! | `<img>` | `loading="lazy"` unless set | `src` → `data:` URI | opaque, unstyled images get a shrunk `background-image` |
//! | `<link rel="stylesheet">` | | `href` → `data:text/css` | |
//! | `<link rel="…icon">` | | `href` → `data:` URI | |
//!
//! References that already are `data:` URIs are never touched, which keeps
//! every pass idempotent.

use super::MediaContext;
use crate::assemble::{AssembleEvent, AssetKind, emit};
use crate::assets::{self, AssetLoader};
use crate::dom::{self, Handle};
use crate::imaging::{ImageBackend, PreviewParams, wants_preview};

/// Add `loading="lazy"` to every image without a loading policy.
pub fn lazy_images(root: &Handle) -> usize {
    let mut changed = 0;
    for img in dom::collect_elements(root, |n| dom::is_element(n, "img")) {
        if dom::attr(&img, "loading").is_none() {
            dom::set_attr(&img, "loading", "lazy");
            changed += 1;
        }
    }
    changed
}

/// Inline or preview every image under `root`, depending on the mode.
pub fn enhance_images<L: AssetLoader, B: ImageBackend>(root: &Handle, ctx: &MediaContext<'_, L, B>) {
    lazy_images(root);

    let make_previews = !ctx.monolith && wants_preview(ctx.preview);
    if !ctx.monolith && !make_previews {
        return;
    }

    for img in dom::collect_elements(root, |n| dom::is_element(n, "img")) {
        let Some(src) = local_reference(&img, "src") else {
            continue;
        };
        if ctx.monolith {
            inline_image(&img, &src, ctx);
        } else if dom::attr(&img, "style").is_none() {
            preview_image(&img, &src, ctx);
        }
    }
}

/// Replace stylesheet and icon references with `data:` URIs.
pub fn inline_links<L: AssetLoader, B: ImageBackend>(root: &Handle, ctx: &MediaContext<'_, L, B>) {
    for link in dom::collect_elements(root, |n| dom::is_element(n, "link")) {
        let Some(kind) = link_kind(&link) else {
            continue;
        };
        let Some(href) = local_reference(&link, "href") else {
            continue;
        };
        let Some(bytes) = ctx.load(&href) else {
            continue;
        };

        let mime = match kind {
            AssetKind::Stylesheet => "text/css",
            _ => ctx.mime_type(&href, &bytes),
        };
        dom::set_attr(&link, "href", &assets::data_uri(mime, &bytes));
        emit(
            ctx.events,
            AssembleEvent::AssetInlined {
                kind,
                source: assets::truncate(&href),
                bytes: bytes.len(),
            },
        );
    }
}

/// Stylesheet or icon, judged by the `rel` tokens.
fn link_kind(link: &Handle) -> Option<AssetKind> {
    let rel = dom::attr(link, "rel")?.to_ascii_lowercase();
    let tokens: Vec<&str> = rel.split_ascii_whitespace().collect();
    if tokens.contains(&"stylesheet") {
        Some(AssetKind::Stylesheet)
    } else if tokens.iter().any(|t| *t == "icon" || *t == "apple-touch-icon") {
        Some(AssetKind::Icon)
    } else {
        None
    }
}

/// Non-empty attribute value that is not already a `data:` URI.
fn local_reference(node: &Handle, name: &str) -> Option<String> {
    dom::attr(node, name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && !assets::is_data_uri(value))
}

fn inline_image<L: AssetLoader, B: ImageBackend>(img: &Handle, src: &str, ctx: &MediaContext<'_, L, B>) {
    let Some(bytes) = ctx.load(src) else {
        return;
    };
    let mime = ctx.mime_type(src, &bytes);
    dom::set_attr(img, "src", &assets::data_uri(mime, &bytes));
    emit(
        ctx.events,
        AssembleEvent::AssetInlined {
            kind: AssetKind::Image,
            source: assets::truncate(src),
            bytes: bytes.len(),
        },
    );
}

fn preview_image<L: AssetLoader, B: ImageBackend>(img: &Handle, src: &str, ctx: &MediaContext<'_, L, B>) {
    let Some(bytes) = ctx.load(src) else {
        return;
    };
    let info = match ctx.backend.identify(&bytes) {
        Ok(info) => info,
        Err(e) => return ctx.failed(src, e.to_string()),
    };
    if info.has_alpha {
        return;
    }

    let params = PreviewParams::shrink(&info, ctx.preview);
    let preview = match ctx.backend.preview(&bytes, &params) {
        Ok(preview) => preview,
        Err(e) => return ctx.failed(src, e.to_string()),
    };
    let style = format!(
        "background-image: url({});",
        assets::data_uri(info.mime_type(), &preview)
    );
    dom::set_attr(img, "style", &style);
    emit(
        ctx.events,
        AssembleEvent::PreviewCreated {
            source: assets::truncate(src),
            width: params.width,
            height: params.height,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{WriteOptions, parse_html, write_document};
    use crate::imaging::ImageInfo;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, jpeg_info};
    use crate::test_helpers::FixedLoader;
    use image::ImageFormat;
    use std::sync::mpsc;

    fn ctx<'a>(
        loader: &'a FixedLoader,
        backend: &'a MockBackend,
        monolith: bool,
        preview: u8,
        events: Option<&'a mpsc::Sender<AssembleEvent>>,
    ) -> MediaContext<'a, FixedLoader, MockBackend> {
        MediaContext {
            loader,
            backend,
            monolith,
            preview,
            events,
        }
    }

    fn render(dom: &dom::RcDom) -> String {
        write_document(&dom.document, &WriteOptions::minified())
    }

    // =========================================================================
    // Lazy loading
    // =========================================================================

    #[test]
    fn images_become_lazy_unless_already_set() {
        let dom = parse_html(r#"<img src="a.png"><img src="b.png" loading="eager">"#);
        assert_eq!(lazy_images(&dom.document), 1);
        let html = render(&dom);
        assert!(html.contains(r#"<img src="a.png" loading="lazy">"#));
        assert!(html.contains(r#"<img src="b.png" loading="eager">"#));
    }

    // =========================================================================
    // Monolith
    // =========================================================================

    #[test]
    fn monolith_inlines_image_with_detected_mime() {
        let loader = FixedLoader::with(&[("a.jpg", "JPEGDATA")]);
        let backend = MockBackend::with_info(vec![jpeg_info(10, 10)]);
        let dom = parse_html(r#"<img src="a.jpg">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, true, 8, None));

        let html = render(&dom);
        assert!(
            html.contains(r#"<img src="data:image/jpeg;base64,SlBFR0RBVEE=" loading="lazy">"#),
            "{html}"
        );
        // No preview is made in monolith mode.
        assert!(!backend
            .get_operations()
            .iter()
            .any(|op| matches!(op, RecordedOp::Preview { .. })));
    }

    #[test]
    fn monolith_falls_back_to_extension_mime() {
        let loader = FixedLoader::with(&[("logo.svg", "<svg/>")]);
        let backend = MockBackend::new();
        let dom = parse_html(r#"<img src="logo.svg">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, true, 8, None));
        assert!(render(&dom).contains("data:image/svg+xml;base64,"));
    }

    #[test]
    fn data_sources_are_left_alone() {
        let loader = FixedLoader::default();
        let backend = MockBackend::new();
        let dom = parse_html(r#"<img src="data:image/png;base64,AAAA">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, true, 8, None));
        assert!(render(&dom).contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(loader.requests().is_empty());
    }

    #[test]
    fn missing_asset_is_reported_and_element_kept() {
        let loader = FixedLoader::default();
        let backend = MockBackend::new();
        let (tx, rx) = mpsc::channel();
        let dom = parse_html(r#"<img src="gone.png">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, true, 8, Some(&tx)));
        drop(tx);

        assert!(render(&dom).contains(r#"<img src="gone.png" loading="lazy">"#));
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(
            events.as_slice(),
            [AssembleEvent::AssetFailed { source, .. }] if source == "gone.png"
        ));
    }

    // =========================================================================
    // Previews
    // =========================================================================

    #[test]
    fn opaque_image_gets_preview_background() {
        let loader = FixedLoader::with(&[("a.jpg", "JPEG")]);
        let backend = MockBackend::with_info(vec![jpeg_info(800, 600)]);
        let (tx, rx) = mpsc::channel();
        let dom = parse_html(r#"<img src="a.jpg">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, false, 8, Some(&tx)));
        drop(tx);

        let html = render(&dom);
        assert!(
            html.contains(r#"style="background-image: url(data:image/jpeg;base64,UFJFVklFVw==);""#),
            "{html}"
        );
        assert!(html.contains(r#"src="a.jpg""#));
        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Identify { len: 4 },
                RecordedOp::Preview {
                    len: 4,
                    width: 100,
                    height: 75
                },
            ]
        );
        assert_eq!(
            rx.iter().collect::<Vec<_>>(),
            vec![AssembleEvent::PreviewCreated {
                source: "a.jpg".into(),
                width: 100,
                height: 75
            }]
        );
    }

    #[test]
    fn transparent_image_gets_no_preview() {
        let loader = FixedLoader::with(&[("a.png", "PNG")]);
        let backend = MockBackend::with_info(vec![ImageInfo {
            width: 64,
            height: 64,
            has_alpha: true,
            format: ImageFormat::Png,
        }]);
        let dom = parse_html(r#"<img src="a.png">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, false, 8, None));
        assert!(!render(&dom).contains("background-image"));
    }

    #[test]
    fn styled_image_is_not_loaded_at_all() {
        let loader = FixedLoader::with(&[("a.jpg", "JPEG")]);
        let backend = MockBackend::with_info(vec![jpeg_info(8, 8)]);
        let dom = parse_html(r#"<img src="a.jpg" style="width: 50%">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, false, 8, None));
        assert!(loader.requests().is_empty());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn preview_factor_one_disables_previews() {
        let loader = FixedLoader::with(&[("a.jpg", "JPEG")]);
        let backend = MockBackend::with_info(vec![jpeg_info(8, 8)]);
        let dom = parse_html(r#"<img src="a.jpg">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, false, 1, None));
        assert!(loader.requests().is_empty());
        assert_eq!(render(&dom).matches("loading=\"lazy\"").count(), 1);
    }

    #[test]
    fn undecodable_image_is_reported() {
        let loader = FixedLoader::with(&[("a.bin", "??")]);
        let backend = MockBackend::new();
        let (tx, rx) = mpsc::channel();
        let dom = parse_html(r#"<img src="a.bin">"#);

        enhance_images(&dom.document, &ctx(&loader, &backend, false, 8, Some(&tx)));
        drop(tx);
        assert!(matches!(
            rx.iter().next(),
            Some(AssembleEvent::AssetFailed { .. })
        ));
        assert!(!render(&dom).contains("style="));
    }

    // =========================================================================
    // Stylesheets and icons
    // =========================================================================

    #[test]
    fn stylesheet_and_icons_are_inlined() {
        let loader = FixedLoader::with(&[
            ("site.css", "a{}"),
            ("favicon.ico", "ICO"),
            ("touch.png", "PNGDATA"),
        ]);
        let backend = MockBackend::new();
        let dom = parse_html(
            r#"<head>
                 <link rel="stylesheet" href="site.css">
                 <link rel="shortcut icon" href="favicon.ico">
                 <link rel="apple-touch-icon" href="touch.png">
                 <link rel="preconnect" href="https://fonts.example.com">
               </head>"#,
        );

        inline_links(&dom.document, &ctx(&loader, &backend, true, 8, None));

        let html = render(&dom);
        assert!(html.contains(r#"href="data:text/css;base64,YXt9""#), "{html}");
        assert!(html.contains("data:image/x-icon;base64,SUNP"), "{html}");
        assert!(html.contains("data:image/png;base64,"), "{html}");
        assert!(html.contains(r#"href="https://fonts.example.com""#));
        assert_eq!(loader.requests(), vec!["site.css", "favicon.ico", "touch.png"]);
    }

    #[test]
    fn link_kinds() {
        let link = |rel: &str| dom::element_with("link", &[("rel", rel)]);
        assert_eq!(link_kind(&link("STYLESHEET")), Some(AssetKind::Stylesheet));
        assert_eq!(link_kind(&link("alternate stylesheet")), Some(AssetKind::Stylesheet));
        assert_eq!(link_kind(&link("icon")), Some(AssetKind::Icon));
        assert_eq!(link_kind(&link("Shortcut Icon")), Some(AssetKind::Icon));
        assert_eq!(link_kind(&link("apple-touch-icon")), Some(AssetKind::Icon));
        assert_eq!(link_kind(&link("manifest")), None);
        assert_eq!(link_kind(&dom::element("link")), None);
    }
}
