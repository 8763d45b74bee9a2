//! Shared test utilities for the mdma test suite.
//!
//! Provides an in-memory asset loader, config shortcuts, and heading
//! lookups that panic with a clear message on miss.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let loader = FixedLoader::with(&[("a.png", "PNG")]);
//! let assembly = assemble_with(FRAMEWORK, b"# A\n## B", &minified_config(), &loader, &backend, None)?;
//!
//! assert_eq!(heading_slugs(&assembly.headings), vec!["a", "b"]);
//! assert_eq!(find_heading(&assembly.headings, "b").parent, Some(1));
//! ```

use crate::assets::{AssetError, AssetLoader};
use crate::config::AssemblerConfig;
use crate::types::Heading;
use std::collections::HashMap;
use std::sync::Mutex;

// =========================================================================
// Fixtures
// =========================================================================

/// Asset loader serving fixed contents and recording every request.
///
/// Unknown sources fail with a not-found I/O error.
#[derive(Default)]
pub struct FixedLoader {
    assets: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FixedLoader {
    pub fn with(assets: &[(&str, &str)]) -> Self {
        Self {
            assets: assets
                .iter()
                .map(|(source, contents)| (source.to_string(), contents.as_bytes().to_vec()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sources requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl AssetLoader for FixedLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, AssetError> {
        self.requests.lock().unwrap().push(source.to_string());
        self.assets
            .get(source)
            .cloned()
            .ok_or_else(|| AssetError::Io {
                path: source.into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

/// Default config with minified output, for exact-string assertions.
pub fn minified_config() -> AssemblerConfig {
    let mut config = AssemblerConfig::default();
    config.output.minify = true;
    config
}

// =========================================================================
// Heading lookups: panic with a clear message on miss
// =========================================================================

/// Find a heading by slug. Panics if not found.
pub fn find_heading<'a>(headings: &'a [Heading], slug: &str) -> &'a Heading {
    headings
        .iter()
        .find(|h| h.slug == slug)
        .unwrap_or_else(|| {
            let slugs = heading_slugs(headings);
            panic!("heading '{slug}' not found. Available: {slugs:?}")
        })
}

/// All slugs in document order.
pub fn heading_slugs(headings: &[Heading]) -> Vec<&str> {
    headings.iter().map(|h| h.slug.as_str()).collect()
}

/// Assert that every heading's parent is the nearest earlier heading with a
/// smaller level.
pub fn assert_parent_invariant(headings: &[Heading]) {
    for (i, heading) in headings.iter().enumerate() {
        let expected = headings[..i]
            .iter()
            .rev()
            .find(|earlier| earlier.level < heading.level)
            .map(|earlier| earlier.id);
        assert_eq!(
            heading.parent, expected,
            "parent of '{}' (level {}) mismatch",
            heading.slug, heading.level
        );
    }
}
