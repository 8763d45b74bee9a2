//! The built-in framework used when no `--framework` is given.
//!
//! Rendered with Maud. The content container comes before the menu because
//! the agenda stylesheet reaches the menu with the sibling combinator
//! (`#MDMA-CONTENT:has(…) ~ .menu`); the stylesheet puts the menu back on
//! the left visually.

use crate::assemble::{AGENDA_ID, CONTENT_ID};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/framework.css");

/// Default framework markup.
pub fn default_framework() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                style { (PreEscaped(CSS)) }
            }
            body {
                main id=(CONTENT_ID) {}
                nav.menu {
                    div.options id=(AGENDA_ID) {}
                }
            }
        }
    }
}

/// Default framework as bytes, ready for normalization.
pub fn default_framework_bytes() -> Vec<u8> {
    default_framework().into_string().into_bytes()
}
