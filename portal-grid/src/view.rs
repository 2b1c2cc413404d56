//! Render model produced by [`Grid::view`](crate::Grid::view).
//!
//! A view is a plain snapshot: it holds no references into the grid and can
//! be handed to any renderer. [`crate::render`] turns it into terminal lines.

use std::ops::RangeInclusive;

use crate::column::{Alignment, Cell, ColumnWidth};
use crate::pagination::PageItem;
use crate::search::SearchState;
use crate::selection::CheckState;
use crate::sort::SortDirection;

/// One column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    /// Direction if this is the active sort column.
    pub sort: Option<SortDirection>,
    pub width: ColumnWidth,
    pub align: Alignment,
    /// Keyboard focus for header activation.
    pub focused: bool,
}

impl HeaderCell {
    /// Label with the sort indicator appended, e.g. `Name ▲`.
    pub fn title(&self) -> String {
        match self.sort {
            Some(direction) => format!("{} {}", self.label, direction.indicator()),
            None => self.label.clone(),
        }
    }
}

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<K> {
    pub id: K,
    pub cells: Vec<Cell>,
    pub selected: bool,
    pub focused: bool,
}

/// What the table body shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridBody<K> {
    /// Loading: this many placeholder rows and no data.
    Skeleton(usize),
    /// Loaded, nothing matched.
    Empty(String),
    /// The caller reported a failed fetch.
    Error(String),
    Rows(Vec<RowView<K>>),
}

/// Snapshot of everything needed to draw a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView<K> {
    pub header: Vec<HeaderCell>,
    /// Header checkbox; `None` when multi-select is off.
    pub select_all: Option<CheckState>,
    pub body: GridBody<K>,
    pub strip: Vec<PageItem>,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
    pub range: Option<RangeInclusive<usize>>,
    pub selected_count: usize,
    pub bulk_delete: bool,
    pub search: SearchState,
}

impl<K> GridView<K> {
    pub fn is_loading(&self) -> bool {
        matches!(self.body, GridBody::Skeleton(_))
    }

    /// Rows on display. Empty while loading, empty, or failed.
    pub fn rows(&self) -> &[RowView<K>] {
        match &self.body {
            GridBody::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Ids of the rows on display.
    pub fn row_ids(&self) -> Vec<&K> {
        self.rows().iter().map(|row| &row.id).collect()
    }

    /// Footer summary such as `Showing 21–40 of 41`.
    pub fn summary(&self) -> String {
        match &self.range {
            Some(range) => format!(
                "Showing {}–{} of {}",
                range.start(),
                range.end(),
                self.total
            ),
            None => "No records".to_string(),
        }
    }
}
