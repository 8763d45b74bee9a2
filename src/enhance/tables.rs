//! Legacy table cell alignment.
//!
//! `align` on `td`/`th` is obsolete HTML; it is rewritten as a
//! `text-align` declaration, appended to any style the cell already has.

use crate::dom::{self, Handle};

const ALIGNMENTS: [&str; 3] = ["left", "right", "center"];

/// Rewrite `align` on every table cell under `root`. Returns the number of
/// cells changed.
pub fn migrate_alignment(root: &Handle) -> usize {
    let cells = dom::collect_elements(root, |n| {
        dom::is_element(n, "td") || dom::is_element(n, "th")
    });

    let mut changed = 0;
    for cell in cells {
        let Some(align) = dom::attr(&cell, "align") else {
            continue;
        };
        let value = align.trim().to_ascii_lowercase();
        if !ALIGNMENTS.contains(&value.as_str()) {
            continue;
        }

        let declaration = format!("text-align: {value};");
        let style = match dom::attr(&cell, "style") {
            Some(existing) if !existing.trim().is_empty() => {
                let existing = existing.trim_end();
                if existing.ends_with(';') {
                    format!("{existing} {declaration}")
                } else {
                    format!("{existing}; {declaration}")
                }
            }
            _ => declaration,
        };
        dom::set_attr(&cell, "style", &style);
        dom::remove_attr(&cell, "align");
        changed += 1;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{WriteOptions, parse_html, write_document};

    fn migrated(html: &str) -> (String, usize) {
        let dom = parse_html(html);
        let changed = migrate_alignment(&dom.document);
        (write_document(&dom.document, &WriteOptions::minified()), changed)
    }

    #[test]
    fn align_becomes_text_align() {
        let (html, changed) =
            migrated(r#"<table><tr><th align="center">a</th><td align="RIGHT">b</td></tr></table>"#);
        assert_eq!(changed, 2);
        assert!(html.contains(r#"<th style="text-align: center;">a</th>"#), "{html}");
        assert!(html.contains(r#"<td style="text-align: right;">b</td>"#), "{html}");
        assert!(!html.contains("align=\""));
    }

    #[test]
    fn existing_style_is_kept() {
        let (html, _) = migrated(
            r#"<table><tr><td align="left" style="color: red">x</td><td align="left" style="color: red;">y</td></tr></table>"#,
        );
        assert!(html.contains(r#"style="color: red; text-align: left;""#), "{html}");
        assert_eq!(html.matches("color: red; text-align: left;").count(), 2);
    }

    #[test]
    fn unknown_alignment_is_left_alone() {
        let (html, changed) = migrated(r#"<table><tr><td align="justify">x</td></tr></table>"#);
        assert_eq!(changed, 0);
        assert!(html.contains(r#"<td align="justify">x</td>"#));
    }

    #[test]
    fn other_elements_are_ignored() {
        let (html, changed) = migrated(r#"<p align="center">x</p>"#);
        assert_eq!(changed, 0);
        assert!(html.contains(r#"<p align="center">"#));
    }

    #[test]
    fn second_pass_changes_nothing() {
        let dom = parse_html(r#"<table><tr><td align="center">x</td></tr></table>"#);
        assert_eq!(migrate_alignment(&dom.document), 1);
        assert_eq!(migrate_alignment(&dom.document), 0);
    }
}
