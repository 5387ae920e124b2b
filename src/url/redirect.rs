//! Redirect table built during redirect discovery and frozen before rendering
//!
//! The two types split the table's lifecycle: only [`RedirectTableBuilder`] can
//! insert, and [`RedirectTableBuilder::freeze`] consumes it. Once rendering starts
//! the orchestrator holds nothing but the read-only [`RedirectTable`].

use crate::url::normalize::normalize_title;
use std::collections::HashMap;

/// Mutable redirect map, owned by the redirect-discovery phase
#[derive(Debug, Default)]
pub struct RedirectTableBuilder {
    entries: HashMap<String, String>,
}

impl RedirectTableBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `source → target`, normalizing both titles
    ///
    /// A later insert for the same source replaces the earlier one.
    pub fn insert(&mut self, source: &str, target: &str) {
        let source = normalize_title(source);
        let target = normalize_title(target);
        if source != target {
            self.entries.insert(source, target);
        }
    }

    /// Number of recorded redirects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no redirect has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ends the build phase and returns the read-only table
    pub fn freeze(self) -> RedirectTable {
        RedirectTable {
            entries: self.entries,
        }
    }
}

/// Read-only redirect map shared by every page-render task
#[derive(Debug, Default, Clone)]
pub struct RedirectTable {
    entries: HashMap<String, String>,
}

impl RedirectTable {
    /// An empty table: every title is its own canonical form
    pub fn empty() -> Self {
        Self::default()
    }

    /// One-level lookup; an absent title resolves to itself
    pub fn resolve<'a>(&'a self, title: &'a str) -> &'a str {
        self.entries.get(title).map(String::as_str).unwrap_or(title)
    }

    /// Number of redirects in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no redirects
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves `title` through `table` (one level, no chains)
pub fn resolve_redirect<'a>(title: &'a str, table: &'a RedirectTable) -> &'a str {
    table.resolve(title)
}
