//! Server-driven record grid for the partner portal.
//!
//! The grid renders any list of typed records whose pages are fetched by the
//! caller. It owns only UI-local state:
//!
//! - [`search::SearchDebouncer`] turns keystrokes into settled queries
//! - [`sort::SortMachine`] cycles a single sort column through asc/desc/unsorted
//! - [`selection::Selection`] tracks checked record ids and select-all-on-page
//! - [`pagination::Pagination`] clamps navigation and builds the page strip
//!
//! [`grid::Grid`] composes them against caller-supplied rows and reports every
//! state change as a [`grid::GridEvent`]. The caller reacts by fetching the
//! matching page (see [`source`]) and handing it back with
//! [`grid::Grid::set_data`].
//!
//! # Example
//!
//! ```ignore
//! let columns = vec![
//!     ColumnDescriptor::new("name", "Name", |lab: &Lab| lab.name.as_str().into()).sortable(),
//!     ColumnDescriptor::new("city", "City", |lab: &Lab| lab.city.as_str().into()),
//! ];
//! let (mut grid, mut events) = Grid::new(columns, GridConfig::default())?;
//!
//! grid.search_input("north");
//! while let Some(event) = events.recv().await {
//!     let page = source.fetch(&grid.query()).await?;
//!     grid.set_data(GridData::loaded(page.into_records(), total, page_no, page_size))?;
//! }
//! ```

pub mod column;
pub mod error;
pub mod grid;
pub mod pagination;
pub mod render;
pub mod search;
pub mod selection;
pub mod sort;
pub mod source;
pub mod view;

pub use column::{Alignment, Cell, ColumnDescriptor, ColumnSet, ColumnWidth, GridRecord};
pub use error::{GridError, SourceError};
pub use grid::{BulkAction, Grid, GridConfig, GridData, GridEvent};
pub use pagination::{PageItem, PageSizeOptions, Pagination};
pub use search::{SearchDebouncer, SearchState};
pub use selection::{CheckState, Selection, SelectionMode, SelectionScope};
pub use sort::{SortDirection, SortKey, SortMachine, SortState};
pub use source::{
    FetchSequencer, GridQuery, RecordPage, RecordSource, RetryConfig, Ticket, fetch_with_retry,
};
pub use view::{GridBody, GridView, HeaderCell, RowView};
