//! Multi-select algebra.
//!
//! A selection is two small sets instead of one boolean per node: the
//! user's clicked roots, minus explicitly excluded descendants. State
//! stays proportional to the number of clicks, not the tree size, and
//! consumers expand it into concrete objects only at execution time.

use std::collections::BTreeSet;

use crate::path;

/// A (possibly huge) multi-selection over the tree.
///
/// A path `p` is selected iff some root covers it (`p == r` or
/// `p` starts with `r + "/"`) and `p` is not excluded. `excluded`
/// entries are exact paths and only meaningful under a root; they are
/// pruned lazily, not eagerly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    roots: BTreeSet<String>,
    excluded: BTreeSet<String>,
    active: bool,
}

impl SelectionModel {
    /// Create an empty, inactive selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new selection rooted at `path`, discarding previous state.
    pub fn start_selection(&mut self, path: &str) {
        self.roots = BTreeSet::from([path.to_string()]);
        self.excluded = BTreeSet::new();
        self.active = true;
    }

    /// Toggle one path.
    ///
    /// A path covered by an existing root flips its membership in the
    /// excluded set; the root itself stays. An uncovered path flips its
    /// membership in the roots.
    pub fn toggle(&mut self, path: &str) {
        if self.is_covered(path) {
            if !self.excluded.remove(path) {
                self.excluded.insert(path.to_string());
            }
        } else if !self.roots.remove(path) {
            self.roots.insert(path.to_string());
        }
    }

    /// Whether a path is currently selected.
    pub fn is_selected(&self, path: &str) -> bool {
        self.is_covered(path) && !self.excluded.contains(path)
    }

    /// Reset both sets and leave multi-select mode.
    pub fn clear(&mut self) {
        self.roots.clear();
        self.excluded.clear();
        self.active = false;
    }

    /// Whether multi-select mode is on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether nothing is selected at all.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The selection roots, in path order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    /// Whether the exact path has been excluded.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.contains(path)
    }

    /// The excluded paths, in path order.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    /// Roots not shadowed by another root above them. Overlapping roots can
    /// arise when a folder is selected after one of its descendants; the
    /// expansion must not touch the shadowed root twice.
    pub fn effective_roots(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter(|r| {
                !self
                    .roots
                    .iter()
                    .any(|other| other.as_str() != r.as_str() && path::is_under(r, other))
            })
            .map(String::as_str)
            .collect()
    }

    fn is_covered(&self, path: &str) -> bool {
        self.roots.iter().any(|r| path::is_under(path, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_selection_resets() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a");
        sel.toggle("app/pending/a/img.jpg");

        sel.start_selection("app/published/b");

        assert!(sel.is_selected("app/published/b"));
        assert!(!sel.is_selected("app/pending/a"));
        assert!(!sel.is_excluded("app/pending/a/img.jpg"));
    }

    #[test]
    fn test_descendants_covered_by_root() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a");

        assert!(sel.is_selected("app/pending/a"));
        assert!(sel.is_selected("app/pending/a/img.jpg"));
        assert!(sel.is_selected("app/pending/a/deep/nest.png"));
        assert!(!sel.is_selected("app/pending/ab"));
        assert!(!sel.is_selected("app/published/a"));
    }

    #[test]
    fn test_toggle_excludes_covered_path() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a");
        sel.toggle("app/pending/a/img.jpg");

        assert!(!sel.is_selected("app/pending/a/img.jpg"));
        assert!(sel.is_selected("app/pending/a/other.jpg"));
        // The root is untouched.
        assert!(sel.is_selected("app/pending/a"));
    }

    #[test]
    fn test_toggle_uncovered_adds_root() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a");
        sel.toggle("app/published/b");

        assert!(sel.is_selected("app/published/b"));
        assert!(sel.is_selected("app/published/b/file.jpg"));
    }

    #[test]
    fn test_toggle_is_involutive() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a");

        let before = sel.clone();
        sel.toggle("app/pending/a/img.jpg");
        sel.toggle("app/pending/a/img.jpg");
        assert_eq!(sel, before);

        let before = sel.clone();
        sel.toggle("app/published/b");
        sel.toggle("app/published/b");
        assert_eq!(sel, before);
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a");
        sel.toggle("app/pending/a/img.jpg");

        sel.clear();

        assert!(!sel.is_active());
        assert!(sel.is_empty());
        assert!(!sel.is_selected("app/pending/a"));
    }

    #[test]
    fn test_effective_roots_drop_shadowed() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/a/inner");
        // Selecting the parent afterwards shadows the earlier root.
        sel.toggle("app/pending/a");

        assert_eq!(sel.effective_roots(), vec!["app/pending/a"]);
    }

    #[test]
    fn test_state_stays_small() {
        let mut sel = SelectionModel::new();
        sel.start_selection("app/pending/huge");
        sel.toggle("app/pending/huge/one.jpg");

        // Two entries, regardless of how many descendants exist.
        assert_eq!(sel.roots().count(), 1);
        assert!(sel.is_excluded("app/pending/huge/one.jpg"));
    }
}
