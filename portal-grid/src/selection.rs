//! Row selection for the grid.

use std::collections::HashSet;
use std::hash::Hash;

/// Selection mode for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No selection allowed.
    #[default]
    None,
    /// Multiple rows can be selected (checkbox style).
    Multi,
}

/// How long a selection lives.
///
/// With [`VisiblePage`](Self::VisiblePage) "select all" and bulk actions only
/// ever cover the rows currently rendered, and changing page drops the
/// selection. [`AcrossPages`](Self::AcrossPages) keeps ids checked on earlier
/// pages so a bulk action can cover several pages the user visited.
/// Neither scope selects rows the user has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionScope {
    #[default]
    VisiblePage,
    AcrossPages,
}

/// Tri-state of a "select all on this page" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Partial,
    Checked,
}

impl CheckState {
    /// Checkbox glyph for terminal rendering.
    pub fn glyph(self) -> &'static str {
        match self {
            CheckState::Unchecked => "□",
            CheckState::Partial => "▣",
            CheckState::Checked => "■",
        }
    }
}

/// Tracks selected rows by their ids.
#[derive(Debug, Clone)]
pub struct Selection<K: Clone + Eq + Hash> {
    pub mode: SelectionMode,
    pub scope: SelectionScope,
    selected: HashSet<K>,
}

impl<K: Clone + Eq + Hash> Default for Selection<K> {
    fn default() -> Self {
        Self::none()
    }
}

impl<K: Clone + Eq + Hash> Selection<K> {
    /// Create selection with no selection allowed.
    pub fn none() -> Self {
        Self::with_mode(SelectionMode::None)
    }

    /// Create multi-selection mode.
    pub fn multi() -> Self {
        Self::with_mode(SelectionMode::Multi)
    }

    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            scope: SelectionScope::default(),
            selected: HashSet::new(),
        }
    }

    pub fn with_scope(mut self, scope: SelectionScope) -> Self {
        self.scope = scope;
        self
    }

    /// Toggle selection for a key. Returns true if selection changed.
    pub fn toggle(&mut self, key: K) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Multi => {
                if !self.selected.remove(&key) {
                    self.selected.insert(key);
                }
                true
            }
        }
    }

    /// Toggle every visible key at once.
    ///
    /// If all of `visible` is already selected they are all deselected,
    /// otherwise they are all selected. Keys outside `visible` are untouched.
    /// Only meaningful in multi mode; returns true if selection changed.
    pub fn select_all_visible(&mut self, visible: &[K]) -> bool {
        if self.mode != SelectionMode::Multi || visible.is_empty() {
            return false;
        }

        if self.all_selected(visible) {
            for key in visible {
                self.selected.remove(key);
            }
        } else {
            self.selected.extend(visible.iter().cloned());
        }
        true
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    /// Number of selected keys.
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop every selected key that is not in `visible`.
    pub fn retain_visible(&mut self, visible: &[K]) {
        let visible: HashSet<&K> = visible.iter().collect();
        self.selected.retain(|key| visible.contains(key));
    }

    /// State of the "select all on this page" checkbox.
    ///
    /// Reflects the visible rows only, never the global selection.
    pub fn visible_state(&self, visible: &[K]) -> CheckState {
        if visible.is_empty() {
            return CheckState::Unchecked;
        }
        let hits = visible.iter().filter(|k| self.selected.contains(k)).count();
        if hits == 0 {
            CheckState::Unchecked
        } else if hits == visible.len() {
            CheckState::Checked
        } else {
            CheckState::Partial
        }
    }

    /// Materialize the selected keys for a bulk action.
    ///
    /// Keys that appear in `order` come first, in that order; any others
    /// (kept from earlier pages) follow in unspecified order.
    pub fn materialize(&self, order: &[K]) -> Vec<K> {
        let mut ids: Vec<K> = order
            .iter()
            .filter(|k| self.selected.contains(k))
            .cloned()
            .collect();
        let seen: HashSet<&K> = order.iter().collect();
        ids.extend(self.selected.iter().filter(|k| !seen.contains(k)).cloned());
        ids
    }

    fn all_selected(&self, visible: &[K]) -> bool {
        visible.iter().all(|k| self.selected.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_multi() {
        let mut sel = Selection::multi();
        assert!(sel.toggle(1));
        assert!(sel.toggle(2));
        assert!(sel.toggle(1));
        assert!(!sel.is_selected(&1));
        assert!(sel.is_selected(&2));
        assert_eq!(sel.count(), 1);
    }

    #[test]
    fn test_none_mode_ignores_input() {
        let mut sel = Selection::none();
        assert!(!sel.toggle(7));
        assert!(!sel.select_all_visible(&[1, 2]));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_select_all_visible_twice_restores() {
        let mut sel = Selection::multi();
        sel.toggle(2);
        let page = [1, 2, 3];

        sel.select_all_visible(&page);
        assert_eq!(sel.visible_state(&page), CheckState::Checked);

        sel.select_all_visible(&page);
        assert_eq!(sel.visible_state(&page), CheckState::Unchecked);
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn test_select_all_leaves_other_pages_alone() {
        let mut sel = Selection::multi().with_scope(SelectionScope::AcrossPages);
        sel.toggle(99);
        sel.select_all_visible(&[1, 2]);
        sel.select_all_visible(&[1, 2]);
        assert!(sel.is_selected(&99));
        assert_eq!(sel.count(), 1);
    }

    #[test]
    fn test_visible_state_partial() {
        let mut sel = Selection::multi();
        sel.toggle(1);
        assert_eq!(sel.visible_state(&[1, 2]), CheckState::Partial);
        assert_eq!(sel.visible_state(&[]), CheckState::Unchecked);
    }

    #[test]
    fn test_materialize_follows_visible_order() {
        let mut sel = Selection::multi();
        sel.toggle(3);
        sel.toggle(1);
        sel.toggle(42);
        let ids = sel.materialize(&[1, 2, 3]);
        assert_eq!(ids, vec![1, 3, 42]);
    }

    #[test]
    fn test_retain_visible() {
        let mut sel = Selection::multi();
        sel.select_all_visible(&[1, 2, 3]);
        sel.retain_visible(&[2, 3, 4]);
        assert!(!sel.is_selected(&1));
        assert_eq!(sel.count(), 2);
    }
}
