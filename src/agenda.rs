//! Agenda (table of contents) markup and the CSS that drives it.
//!
//! The agenda is a tree of `<div>` groups mirroring the heading tree. Every
//! heading contributes one link; the children of a heading live in the `<div>`
//! right after its link:
//!
//! ```html
//! <div id="MDMA-AGENDA">
//!   <a href="#a" target="_self">A</a>
//!   <div>
//!     <a href="#b" target="_self">B</a>
//!   </div>
//!   <a href="#c" target="_self">C</a>
//! </div>
//! ```
//!
//! No script runs in the page. Two rule families in a generated stylesheet
//! make it interactive through `:target` and `:has()`:
//!
//! - **highlight**: the agenda link whose heading is the current `:target`
//!   gets `--MDMA-AGENDA-TARGET-COLOR`;
//! - **collapse**: the group after a heading's link is folded unless that
//!   heading or one of its descendants is the current `:target`.

use crate::dom::{self, Handle};
use crate::registry::Headings;
use std::collections::BTreeMap;

/// Map every heading that has descendants to all of them, direct children
/// first, then grandchildren, and so on.
pub fn descendants(headings: &Headings) -> BTreeMap<u32, Vec<u32>> {
    let mut children: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for heading in headings.iter() {
        if let Some(parent) = heading.parent {
            children.entry(parent).or_default().push(heading.id);
        }
    }

    let mut closure = BTreeMap::new();
    for (&id, direct) in &children {
        let mut all = direct.clone();
        let mut i = 0;
        while i < all.len() {
            if let Some(grandchildren) = children.get(&all[i]) {
                all.extend_from_slice(grandchildren);
            }
            i += 1;
        }
        closure.insert(id, all);
    }
    closure
}

/// Generate the agenda stylesheet. Empty when there are no headings.
pub fn synthesize(headings: &Headings) -> String {
    let mut css = String::new();

    let total = headings.len();
    for (i, heading) in headings.iter().enumerate() {
        let slug = &heading.slug;
        css.push_str(&format!(
            "#MDMA-CONTENT:has(#{slug}:target) ~ .menu a[href=\"#{slug}\"]"
        ));
        if i + 1 == total {
            css.push_str(" {\n    color: var(--MDMA-AGENDA-TARGET-COLOR);\n}\n");
        } else {
            css.push_str(",\n");
        }
    }

    let closure = descendants(headings);
    let total = closure.len();
    for (i, (id, below)) in closure.iter().enumerate() {
        let Some(heading) = headings.get(*id) else {
            continue;
        };
        let slug = &heading.slug;
        css.push_str("#MDMA-CONTENT:not(\n");
        css.push_str(&format!("    :has(#{slug}:target)"));
        for descendant in below.iter().filter_map(|d| headings.get(*d)) {
            css.push_str(&format!(",\n    :has(#{}:target)", descendant.slug));
        }
        css.push_str(&format!(
            "\n) ~ .menu > .options a[href=\"#{slug}\"] + div"
        ));
        if i + 1 == total {
            css.push_str(
                " {\n    max-height: 0;\n    transition: max-height 0.2s ease-out;\n}\n",
            );
        } else {
            css.push_str(",\n");
        }
    }

    css
}

/// Fill `agenda` with nested groups and one link per heading.
///
/// Open groups are kept in an ordered map keyed by parent id (0 = top
/// level). A heading whose parent already has a group goes there and closes
/// every group opened after it; otherwise a new group is opened inside the
/// most recent one.
pub fn build_groups(agenda: &Handle, headings: &Headings) {
    let mut groups: BTreeMap<u32, Handle> = BTreeMap::new();
    groups.insert(0, agenda.clone());

    for heading in headings.iter() {
        let parent = heading.parent.unwrap_or(0);
        let container = match groups.get(&parent).cloned() {
            Some(group) => {
                groups.retain(|&id, _| id <= parent);
                group
            }
            None => {
                let latest = groups
                    .last_key_value()
                    .map_or_else(|| agenda.clone(), |(_, group)| group.clone());
                let group = dom::element("div");
                dom::append(&latest, group.clone());
                groups.insert(parent, group.clone());
                group
            }
        };

        let link = dom::element_with(
            "a",
            &[("href", &format!("#{}", heading.slug)), ("target", "_self")],
        );
        dom::append(&link, dom::text(&heading.title));
        dom::append(&container, link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::WriteOptions;
    use crate::dom::writer::write_node;
    use crate::registry::Identifiers;

    fn headings(outline: &[(u8, &str)]) -> Headings {
        let mut headings = Headings::new();
        let mut ids = Identifiers::new();
        for (level, title) in outline {
            let slug = crate::slug::slugify(title);
            headings
                .add(*level, title.to_string(), &slug, &mut ids)
                .unwrap();
        }
        headings
    }

    fn agenda_html(outline: &[(u8, &str)]) -> String {
        let agenda = dom::element_with("div", &[("id", "MDMA-AGENDA")]);
        build_groups(&agenda, &headings(outline));
        write_node(&agenda, &WriteOptions::minified())
    }

    // =========================================================================
    // Descendants
    // =========================================================================

    #[test]
    fn descendant_closure_is_transitive() {
        let h = headings(&[(1, "A"), (2, "B"), (3, "C"), (2, "D"), (1, "E")]);
        let closure = descendants(&h);
        assert_eq!(closure.get(&1), Some(&vec![2, 4, 3]));
        assert_eq!(closure.get(&2), Some(&vec![3]));
        assert_eq!(closure.get(&3), None);
        assert_eq!(closure.get(&5), None);
        assert_eq!(closure.len(), 2);
    }

    // =========================================================================
    // CSS
    // =========================================================================

    #[test]
    fn no_headings_no_css() {
        assert_eq!(synthesize(&Headings::new()), "");
    }

    #[test]
    fn css_for_simple_outline() {
        let css = synthesize(&headings(&[(1, "A"), (2, "B"), (1, "C")]));
        let expected = r##"#MDMA-CONTENT:has(#a:target) ~ .menu a[href="#a"],
#MDMA-CONTENT:has(#b:target) ~ .menu a[href="#b"],
#MDMA-CONTENT:has(#c:target) ~ .menu a[href="#c"] {
    color: var(--MDMA-AGENDA-TARGET-COLOR);
}
#MDMA-CONTENT:not(
    :has(#a:target),
    :has(#b:target)
) ~ .menu > .options a[href="#a"] + div {
    max-height: 0;
    transition: max-height 0.2s ease-out;
}
"##;
        assert_eq!(css, expected);
    }

    #[test]
    fn flat_outline_has_no_collapse_rules() {
        let css = synthesize(&headings(&[(1, "A"), (1, "B")]));
        assert!(!css.contains(":not("));
        assert_eq!(css.matches("color: var(--MDMA-AGENDA-TARGET-COLOR)").count(), 1);
    }

    #[test]
    fn rule_counts_match_the_heading_tree() {
        let h = headings(&[
            (1, "One"),
            (2, "Two"),
            (3, "Three"),
            (2, "Four"),
            (1, "Five"),
            (2, "Six"),
        ]);
        let css = synthesize(&h);
        assert_eq!(css.matches(":target) ~ .menu a[href=").count(), h.len());
        // One, Two and Five have descendants.
        assert_eq!(css.matches("+ div").count(), 3);
        assert_eq!(css.matches("max-height: 0;").count(), 1);
    }

    #[test]
    fn css_is_deterministic() {
        let outline = [(1, "A"), (3, "B"), (2, "C"), (1, "D")];
        assert_eq!(synthesize(&headings(&outline)), synthesize(&headings(&outline)));
    }

    // =========================================================================
    // Groups
    // =========================================================================

    #[test]
    fn flat_outline_is_a_flat_list() {
        assert_eq!(
            agenda_html(&[(1, "A"), (1, "B")]),
            r##"<div id="MDMA-AGENDA"><a href="#a" target="_self">A</a><a href="#b" target="_self">B</a></div>"##
        );
    }

    #[test]
    fn children_follow_their_parent_link() {
        assert_eq!(
            agenda_html(&[(1, "A"), (2, "B"), (1, "C")]),
            concat!(
                r##"<div id="MDMA-AGENDA"><a href="#a" target="_self">A</a>"##,
                r##"<div><a href="#b" target="_self">B</a></div>"##,
                r##"<a href="#c" target="_self">C</a></div>"##,
            )
        );
    }

    #[test]
    fn deep_nesting_collapses_back_to_the_right_group() {
        assert_eq!(
            agenda_html(&[(1, "A"), (2, "B"), (3, "C"), (2, "D")]),
            concat!(
                r##"<div id="MDMA-AGENDA"><a href="#a" target="_self">A</a>"##,
                r##"<div><a href="#b" target="_self">B</a>"##,
                r##"<div><a href="#c" target="_self">C</a></div>"##,
                r##"<a href="#d" target="_self">D</a></div></div>"##,
            )
        );
    }

    #[test]
    fn link_text_is_the_title() {
        let html = agenda_html(&[(1, "Fish & Chips")]);
        assert!(html.contains(r##"<a href="#fish-and-chips" target="_self">Fish &amp; Chips</a>"##));
    }
}
