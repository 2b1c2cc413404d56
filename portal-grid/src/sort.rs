//! Single-column sort state.
//!
//! The grid never sorts rows itself. It only tracks which column the user
//! asked to sort by and reports the change; the caller fetches re-sorted data.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Header indicator for this direction.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved sort: a column key and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// The user-selected sort, as reported to the caller.
///
/// Both fields are `None` when no column is sorted. They are always set or
/// cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column_key: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn new(column_key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_key: Some(column_key.into()),
            direction: Some(direction),
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.column_key.is_some()
    }

    /// Direction of `column_key` if it is the active sort column.
    pub fn direction_for(&self, column_key: &str) -> Option<SortDirection> {
        match (&self.column_key, self.direction) {
            (Some(key), Some(direction)) if key == column_key => Some(direction),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<SortKey> {
        match (&self.column_key, self.direction) {
            (Some(column), Some(direction)) => Some(SortKey {
                column: column.clone(),
                direction,
            }),
            _ => None,
        }
    }
}

/// Cycles sort state on header activation.
///
/// Activating column C moves it `unsorted → asc → desc → unsorted`.
/// Activating a different sortable column starts that column at ascending and
/// puts every other column back to unsorted. Non-sortable columns are ignored.
#[derive(Debug, Clone)]
pub struct SortMachine {
    sortable: HashSet<String>,
    state: SortState,
    default: Option<SortKey>,
}

impl SortMachine {
    /// Create a machine that accepts the given sortable column keys.
    pub fn new(sortable: impl IntoIterator<Item = String>) -> Self {
        Self {
            sortable: sortable.into_iter().collect(),
            state: SortState::unsorted(),
            default: None,
        }
    }

    /// Set the sort the caller falls back to while no column is active.
    pub fn with_default(mut self, default: Option<SortKey>) -> Self {
        self.default = default;
        self
    }

    pub fn is_sortable(&self, column_key: &str) -> bool {
        self.sortable.contains(column_key)
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    pub fn default_sort(&self) -> Option<&SortKey> {
        self.default.as_ref()
    }

    /// Activate a column header. Returns the new state, or `None` if the
    /// column is not sortable and nothing changed.
    pub fn activate(&mut self, column_key: &str) -> Option<SortState> {
        if !self.is_sortable(column_key) {
            return None;
        }

        let next = match self.state.direction_for(column_key) {
            None => SortState::new(column_key, SortDirection::Asc),
            Some(SortDirection::Asc) => SortState::new(column_key, SortDirection::Desc),
            Some(SortDirection::Desc) => SortState::unsorted(),
        };

        log::debug!("[sort] {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        Some(next)
    }

    /// Clear the user-selected sort.
    pub fn clear(&mut self) {
        self.state = SortState::unsorted();
    }

    /// The sort the caller should request: the active column, or the
    /// default when nothing is active.
    pub fn effective(&self) -> Option<SortKey> {
        self.state.as_key().or_else(|| self.default.clone())
    }
}
