//! The set of currently active filter values.

use std::collections::BTreeMap;

use crate::catalog::{CatalogEntry, Dimension, IGNORE_FILTERS};

/// Active filter identifiers mapped to their catalog entries.
///
/// Owned by the review session; the filter chain only ever reads a snapshot
/// taken when it is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active: BTreeMap<&'static str, &'static CatalogEntry>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `entry`. Returns true if it is now active.
    pub fn toggle(&mut self, entry: &'static CatalogEntry) -> bool {
        if self.active.remove(entry.id).is_some() {
            false
        } else {
            self.active.insert(entry.id, entry);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the reserved ignore-all-filters identifier is active.
    #[must_use]
    pub fn ignores_filters(&self) -> bool {
        self.contains(IGNORE_FILTERS.id)
    }

    /// Active identifiers belonging to `dimension`.
    pub fn codes_for(&self, dimension: Dimension) -> impl Iterator<Item = &'static str> + '_ {
        self.active
            .values()
            .filter(move |entry| entry.dimension == Some(dimension))
            .map(|entry| entry.id)
    }

    /// All active entries, ordered by identifier.
    pub fn entries(&self) -> impl Iterator<Item = &'static CatalogEntry> + '_ {
        self.active.values().copied()
    }
}

impl FromIterator<&'static CatalogEntry> for Selection {
    fn from_iter<I: IntoIterator<Item = &'static CatalogEntry>>(iter: I) -> Self {
        let mut selection = Self::new();
        for entry in iter {
            selection.active.insert(entry.id, entry);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;

    fn entry(id: &str) -> &'static CatalogEntry {
        lookup(id).expect("catalog id")
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::new();
        assert!(selection.toggle(entry("01")));
        assert!(selection.contains("01"));
        assert!(!selection.toggle(entry("01")));
        assert!(selection.is_empty());
    }

    #[test]
    fn codes_are_grouped_by_dimension() {
        let selection: Selection = ["PUE", "01", "28", "G03"].into_iter().map(entry).collect();
        let forms: Vec<_> = selection.codes_for(Dimension::PaymentForm).collect();
        assert_eq!(forms, ["01", "28"]);
        assert_eq!(selection.codes_for(Dimension::DocumentType).count(), 0);
        assert_eq!(selection.len(), 4);
    }

    #[test]
    fn ignore_entry_is_tracked_separately() {
        let mut selection = Selection::new();
        selection.toggle(&IGNORE_FILTERS);
        assert!(selection.ignores_filters());
        for dimension in Dimension::ALL {
            assert_eq!(selection.codes_for(dimension).count(), 0);
        }
    }
}
