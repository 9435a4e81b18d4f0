//! Diff calculation between the saved state and the current fetch.
//!
//! Postings are matched by title only. New titles drive notifications;
//! removed titles and field drift are reported for logging and for the
//! `on_change` save policy.

use std::collections::{HashMap, HashSet};

use crate::models::Posting;

/// Postings in `current` whose title is absent from `saved`, in `current` order.
pub fn find_new_postings(current: &[Posting], saved: &[Posting]) -> Vec<Posting> {
    let saved_titles: HashSet<&str> = saved.iter().map(|p| p.title.as_str()).collect();

    current
        .iter()
        .filter(|p| !saved_titles.contains(p.title.as_str()))
        .cloned()
        .collect()
}

/// Full comparison of the current fetch against the saved state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingDiff {
    /// Titles not in the saved state, in current order
    pub added: Vec<Posting>,
    /// Titles in both whose other fields changed, current version
    pub updated: Vec<Posting>,
    /// Saved titles no longer listed, in saved order
    pub removed: Vec<Posting>,
}

impl PostingDiff {
    /// Calculate the diff between the saved state and the current fetch.
    pub fn calculate(current: &[Posting], saved: &[Posting]) -> Self {
        let saved_map: HashMap<&str, &Posting> =
            saved.iter().map(|p| (p.title.as_str(), p)).collect();
        let current_titles: HashSet<&str> = current.iter().map(|p| p.title.as_str()).collect();

        let added = find_new_postings(current, saved);

        let updated = current
            .iter()
            .filter(|p| {
                saved_map
                    .get(p.title.as_str())
                    .is_some_and(|prev| p.has_drifted_from(prev))
            })
            .cloned()
            .collect();

        let removed = saved
            .iter()
            .filter(|p| !current_titles.contains(p.title.as_str()))
            .cloned()
            .collect();

        Self {
            added,
            updated,
            removed,
        }
    }

    pub fn has_new(&self) -> bool {
        !self.added.is_empty()
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str) -> Posting {
        Posting::new(title, format!("https://www.mun.ca/careers/{title}"))
    }

    fn titles(postings: &[Posting]) -> Vec<&str> {
        postings.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_diff_against_self_is_empty() {
        let set = vec![posting("A"), posting("B"), posting("C")];
        assert!(find_new_postings(&set, &set).is_empty());
        assert!(!PostingDiff::calculate(&set, &set).has_changes());
    }

    #[test]
    fn test_diff_against_empty_returns_all_in_order() {
        let set = vec![posting("C"), posting("A"), posting("B")];
        assert_eq!(find_new_postings(&set, &[]), set);
    }

    #[test]
    fn test_title_is_the_only_key() {
        let saved = vec![posting("A")];
        let mut moved = posting("A");
        moved.link = "https://elsewhere.example/A".into();
        moved.closing_date = Some("2026-12-01".into());

        assert!(find_new_postings(&[moved.clone()], &saved).is_empty());

        let diff = PostingDiff::calculate(&[moved.clone()], &saved);
        assert!(!diff.has_new());
        assert_eq!(diff.updated, vec![moved]);
    }

    #[test]
    fn test_new_title_detected() {
        let saved = vec![posting("A")];
        let current = vec![posting("A"), posting("B")];
        assert_eq!(find_new_postings(&current, &saved), vec![posting("B")]);
    }

    #[test]
    fn test_order_follows_current() {
        let saved = vec![posting("B")];
        let current = vec![posting("D"), posting("B"), posting("A"), posting("C")];
        assert_eq!(titles(&find_new_postings(&current, &saved)), vec!["D", "A", "C"]);
    }

    #[test]
    fn test_removals() {
        let saved = vec![posting("A"), posting("B"), posting("C")];
        let current = vec![posting("B")];

        let diff = PostingDiff::calculate(&current, &saved);
        assert!(diff.has_changes());
        assert!(!diff.has_new());
        assert_eq!(titles(&diff.removed), vec!["A", "C"]);
    }

    #[test]
    fn test_mixed_changes() {
        let mut drifted = posting("Keep");
        drifted.closing_date = Some("extended".into());
        let saved = vec![posting("Keep"), posting("Gone")];
        let current = vec![drifted, posting("New")];

        let diff = PostingDiff::calculate(&current, &saved);
        assert_eq!(titles(&diff.added), vec!["New"]);
        assert_eq!(titles(&diff.updated), vec!["Keep"]);
        assert_eq!(titles(&diff.removed), vec!["Gone"]);
    }
}
