// src/services/filter.rs

//! Filter visibility reconciliation.
//!
//! Decides visibility of already-rendered entries without re-fetching.
//! Only the visibility flag on each entry is touched; the underlying
//! sequence is never removed from or reordered.

use crate::models::{CollectionItem, FilterState};

/// A rendered record: the presentation handle the reconciler toggles.
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub item: CollectionItem,
    pub visible: bool,
}

impl ListEntry {
    pub fn new(item: CollectionItem) -> Self {
        Self {
            item,
            visible: true,
        }
    }
}

/// Counts after a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    pub visible: usize,
    pub hidden: usize,
}

/// Stateless reconciler; a pure function of `(items, filter)`.
pub struct FilterReconciler;

impl FilterReconciler {
    /// Apply a filter to rendered entries, toggling visibility flags.
    pub fn apply(entries: &mut [ListEntry], filter: &FilterState) -> FilterOutcome {
        let mut outcome = FilterOutcome {
            visible: 0,
            hidden: 0,
        };

        for entry in entries.iter_mut() {
            entry.visible = Self::is_visible(&entry.item, filter);
            if entry.visible {
                outcome.visible += 1;
            } else {
                outcome.hidden += 1;
            }
        }

        outcome
    }

    /// Visibility predicate. First matching branch wins, no fallthrough:
    /// archived, then tag, then category, then the default non-archived
    /// view.
    pub fn is_visible(item: &CollectionItem, filter: &FilterState) -> bool {
        if filter.archived {
            return item.archived;
        }
        if let Some(tag) = filter.tag.as_deref() {
            return item.has_tag(tag);
        }
        if let Some(category) = filter.category.as_deref() {
            return item.has_category(category);
        }
        !item.archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;
    use crate::models::fixtures::sample_item;

    fn entries() -> Vec<ListEntry> {
        let mut archived_tagged = sample_item(1);
        archived_tagged.archived = true;
        archived_tagged.tags = vec![Term {
            name: "Branding".to_string(),
            slug: "branding".to_string(),
        }];

        let mut tagged = sample_item(2);
        tagged.tags = vec![Term {
            name: "Branding".to_string(),
            slug: "branding".to_string(),
        }];

        let plain = sample_item(3);

        vec![
            ListEntry::new(archived_tagged),
            ListEntry::new(tagged),
            ListEntry::new(plain),
        ]
    }

    #[test]
    fn test_default_filter_hides_archived() {
        let mut entries = entries();
        let outcome = FilterReconciler::apply(&mut entries, &FilterState::show_all());
        assert_eq!(outcome, FilterOutcome { visible: 2, hidden: 1 });
        assert!(!entries[0].visible);
    }

    #[test]
    fn test_archived_overrides_tag() {
        // Both dimensions requested at once: archived wins, so only the
        // archived item shows even though two items carry the tag.
        let filter = FilterState {
            archived: true,
            tag: Some("branding".to_string()),
            category: None,
        };

        let mut entries = entries();
        let outcome = FilterReconciler::apply(&mut entries, &filter);
        assert_eq!(outcome, FilterOutcome { visible: 1, hidden: 2 });
        assert!(entries[0].visible);
    }

    #[test]
    fn test_tag_filter_ignores_archived_flag() {
        let mut entries = entries();
        let outcome = FilterReconciler::apply(&mut entries, &FilterState::by_tag("BRANDING"));
        assert_eq!(outcome.visible, 2);
        assert!(entries[0].visible, "archived item with the tag stays visible");
        assert!(!entries[2].visible);
    }

    #[test]
    fn test_category_filter() {
        let mut entries = entries();
        let outcome = FilterReconciler::apply(&mut entries, &FilterState::by_category("branding"));
        // Every sample item carries the branding category.
        assert_eq!(outcome.visible, 3);
    }

    #[test]
    fn test_apply_is_idempotent_and_preserves_order() {
        let mut entries = entries();
        let filter = FilterState::by_tag("branding");

        let first = FilterReconciler::apply(&mut entries, &filter);
        let ids: Vec<u64> = entries.iter().map(|e| e.item.id).collect();
        let second = FilterReconciler::apply(&mut entries, &filter);

        assert_eq!(first, second);
        assert_eq!(ids, entries.iter().map(|e| e.item.id).collect::<Vec<_>>());
        assert_eq!(entries.len(), 3, "entries are never removed");
    }
}
