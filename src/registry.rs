//! Per-call identifier and heading registries.
//!
//! [`Identifiers`] knows every `id` in play: the ones already present in the
//! framework and the slugs handed out to headings. [`Headings`] owns the
//! heading records, keyed by id, and assigns parents with a level stack:
//!
//! ```text
//! # A        stack {1:A}          parent(A) = none
//! ## B       stack {1:A, 2:B}     parent(B) = A
//! ### C      stack {1:A,2:B,3:C}  parent(C) = B
//! ## D       pop ≥2 → {1:A}       parent(D) = A, stack {1:A, 2:D}
//! # E        pop ≥1 → {}          parent(E) = none
//! ```
//!
//! Identifiers are compared ASCII case-insensitively, the same way the
//! reserved placeholder ids are matched, so a heading slug can never stand in
//! for `MDMA-CONTENT` or `MDMA-AGENDA`.
//!
//! Both registries are created fresh for every assembly; nothing is shared
//! between calls.

use crate::assemble::AssembleError;
use crate::types::Heading;
use std::collections::{BTreeMap, HashMap};

/// Highest numeric suffix tried when resolving a slug collision.
pub const MAX_SLUG_PROBES: u32 = 10_000;

/// Who holds an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// An element of the framework template.
    Template,
    /// An element of the Markdown's own HTML.
    Content,
    /// A generated heading anchor.
    Heading(u32),
}

#[derive(Debug, Default)]
pub struct Identifiers {
    owners: HashMap<String, Owner>,
}

fn key(id: &str) -> String {
    id.to_ascii_lowercase()
}

impl Identifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.owners.contains_key(&key(id))
    }

    pub fn owner(&self, id: &str) -> Option<Owner> {
        self.owners.get(&key(id)).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Record an id found in the framework. Repeated ids keep their first owner.
    pub fn claim_template(&mut self, id: &str) {
        self.owners.entry(key(id)).or_insert(Owner::Template);
    }

    /// Record an id carried by the Markdown's raw HTML. Ids already taken
    /// keep their owner.
    pub fn claim_content(&mut self, id: &str) {
        self.owners.entry(key(id)).or_insert(Owner::Content);
    }

    /// Reserve `base`, or the first free `base-N`, for a heading.
    ///
    /// The hyphen is only added when `base` does not already end in one, so
    /// `question-` collides into `question-1`, not `question--1`.
    pub fn claim_unique(&mut self, base: &str, heading: u32) -> Result<String, AssembleError> {
        if !self.contains(base) {
            self.owners.insert(key(base), Owner::Heading(heading));
            return Ok(base.to_string());
        }

        let stem = if base.ends_with('-') {
            base.to_string()
        } else {
            format!("{base}-")
        };
        for suffix in 1..=MAX_SLUG_PROBES {
            let candidate = format!("{stem}{suffix}");
            if !self.contains(&candidate) {
                self.owners.insert(key(&candidate), Owner::Heading(heading));
                return Ok(candidate);
            }
        }
        Err(forbidden!())
    }
}

/// Heading records keyed by id, in document order.
#[derive(Debug, Default)]
pub struct Headings {
    by_id: BTreeMap<u32, Heading>,
    /// Most recent heading id per level.
    open: BTreeMap<u8, u32>,
}

impl Headings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a heading: assign the next id, a unique slug derived from
    /// `base_slug`, and the parent from the level stack.
    pub fn add(
        &mut self,
        level: u8,
        title: String,
        base_slug: &str,
        identifiers: &mut Identifiers,
    ) -> Result<&Heading, AssembleError> {
        let id = self.by_id.last_key_value().map_or(1, |(last, _)| last + 1);
        let slug = identifiers.claim_unique(base_slug, id)?;

        // Everything at this level or deeper is closed by the new heading.
        self.open.retain(|&open_level, _| open_level < level);
        let parent = self.open.last_key_value().map(|(_, &open)| open);
        self.open.insert(level, id);

        let heading = Heading {
            id,
            level,
            title,
            slug,
            parent,
        };
        Ok(self.by_id.entry(id).or_insert(heading))
    }

    pub fn get(&self, id: u32) -> Option<&Heading> {
        self.by_id.get(&id)
    }

    /// Like [`get`](Self::get), for ids that must exist.
    pub fn require(&self, id: u32) -> Result<&Heading, AssembleError> {
        self.by_id.get(&id).ok_or_else(|| forbidden!())
    }

    /// Headings in ascending id (= document) order.
    pub fn iter(&self) -> impl Iterator<Item = &Heading> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
