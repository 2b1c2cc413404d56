//! The grid: composition of column set, search, sort, selection, and
//! pagination over caller-supplied rows.
//!
//! The grid is a pure function of the caller's latest [`GridData`] plus its
//! own UI state. It never fetches, never caches rows across updates, and never
//! sorts locally. Every user interaction that needs different data is reported
//! as a [`GridEvent`] on the channel returned by [`Grid::new`].

use std::time::Duration;

use tokio::sync::mpsc;

use crate::column::{ColumnDescriptor, ColumnSet, GridRecord};
use crate::error::{GridError, Result};
use crate::pagination::{DEFAULT_PAGE_SIZE, PageSizeOptions, Pagination};
use crate::search::{DEFAULT_DEBOUNCE, SearchDebouncer, SearchState};
use crate::selection::{Selection, SelectionMode, SelectionScope};
use crate::sort::{SortKey, SortMachine, SortState};
use crate::source::GridQuery;
use crate::view::{GridBody, GridView, HeaderCell, RowView};

// =============================================================================
// Events
// =============================================================================

/// An operation applied once to every selected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Custom(String),
}

impl BulkAction {
    pub fn name(&self) -> &str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Custom(name) => name,
        }
    }
}

/// Notifications from the grid to its caller.
///
/// Each one means "the user wants different data". The caller reacts by
/// fetching [`Grid::query`] and passing the result to [`Grid::set_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent<K> {
    /// The debounced search text settled.
    SearchChanged(String),
    /// A sortable header was activated.
    SortChanged(SortState),
    /// The current page moved.
    PageChanged(usize),
    /// The page size changed; the page is back to 1.
    PageSizeChanged(usize),
    /// A bulk action was invoked on the selected ids.
    BulkAction { action: BulkAction, ids: Vec<K> },
}

// =============================================================================
// Config
// =============================================================================

/// Static configuration of one grid instance.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Idle interval before typed search text settles.
    pub debounce: Duration,
    /// Placeholder rows shown while loading.
    pub skeleton_rows: usize,
    pub multi_select: bool,
    pub bulk_delete: bool,
    pub selection_scope: SelectionScope,
    /// Initial page size.
    pub page_size: usize,
    pub page_size_options: PageSizeOptions,
    /// Sort to request while no column is active.
    pub default_sort: Option<SortKey>,
    pub empty_message: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            skeleton_rows: 5,
            multi_select: false,
            bulk_delete: false,
            selection_scope: SelectionScope::VisiblePage,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PageSizeOptions::default(),
            default_sort: None,
            empty_message: "No records found".to_string(),
        }
    }
}

impl GridConfig {
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn skeleton_rows(mut self, rows: usize) -> Self {
        self.skeleton_rows = rows;
        self
    }

    pub fn multi_select(mut self, enabled: bool) -> Self {
        self.multi_select = enabled;
        self
    }

    pub fn bulk_delete(mut self, enabled: bool) -> Self {
        self.bulk_delete = enabled;
        self
    }

    pub fn selection_scope(mut self, scope: SelectionScope) -> Self {
        self.selection_scope = scope;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn page_size_options(mut self, options: PageSizeOptions) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn default_sort(mut self, sort: SortKey) -> Self {
        self.default_sort = Some(sort);
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }
}

// =============================================================================
// Caller input
// =============================================================================

/// The caller's authoritative data for one render.
///
/// `rows` must be exactly the page to display.
#[derive(Debug, Clone)]
pub struct GridData<T> {
    pub rows: Vec<T>,
    pub total: usize,
    /// 1-based page the rows belong to.
    pub page: usize,
    pub page_size: usize,
    pub is_loading: bool,
}

impl<T> GridData<T> {
    /// A loaded page.
    pub fn new(rows: Vec<T>, total: usize, page: usize, page_size: usize) -> Self {
        Self {
            rows,
            total,
            page,
            page_size,
            is_loading: false,
        }
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }
}

// =============================================================================
// Grid
// =============================================================================

/// Paginated, sortable, searchable record grid.
pub struct Grid<T: GridRecord> {
    columns: ColumnSet<T>,
    config: GridConfig,

    rows: Vec<T>,
    pagination: Pagination,
    loading: bool,
    error: Option<String>,

    search: SearchDebouncer,
    sort: SortMachine,
    selection: Selection<T::Id>,

    /// Focused row index within `rows`.
    cursor: Option<usize>,
    /// Focused column index for keyboard header activation.
    focused_column: usize,

    events: mpsc::UnboundedSender<GridEvent<T::Id>>,
}

impl<T: GridRecord> Grid<T> {
    /// Create a grid and the channel its events are delivered on.
    ///
    /// The grid starts on page 1 with no rows and not loading.
    pub fn new(
        columns: Vec<ColumnDescriptor<T>>,
        config: GridConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<GridEvent<T::Id>>)> {
        let columns = ColumnSet::new(columns)?;
        if let Some(default) = &config.default_sort
            && columns.find(&default.column).is_none()
        {
            return Err(GridError::UnknownColumn(default.column.clone()));
        }

        let pagination = Pagination::new(config.page_size, 0)?;
        let sort = SortMachine::new(columns.sortable_keys()).with_default(config.default_sort.clone());
        let mode = if config.multi_select {
            SelectionMode::Multi
        } else {
            SelectionMode::None
        };
        let selection = Selection::with_mode(mode).with_scope(config.selection_scope);

        let (events, receiver) = mpsc::unbounded_channel();
        let search_events = events.clone();
        let search = SearchDebouncer::new(config.debounce, move |text| {
            let _ = search_events.send(GridEvent::SearchChanged(text));
        });

        let grid = Self {
            columns,
            config,
            rows: Vec::new(),
            pagination,
            loading: false,
            error: None,
            search,
            sort,
            selection,
            cursor: None,
            focused_column: 0,
            events,
        };
        Ok((grid, receiver))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &ColumnSet<T> {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Rows currently displayed. Empty while loading.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sort_state(&self) -> &SortState {
        self.sort.state()
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    /// The query matching the grid's current search, sort, and page.
    pub fn query(&self) -> GridQuery {
        GridQuery {
            search: self.search.settled(),
            sort: self.sort.effective(),
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
        }
    }

    // -------------------------------------------------------------------------
    // Caller input
    // -------------------------------------------------------------------------

    /// Replace the displayed data.
    ///
    /// Fails on a zero page size, a zero page, or more rows than fit on a
    /// page. A page past the end (the result set shrank) is clamped to the
    /// last page; the grid then reports the new page and shows the loading
    /// state until the caller supplies it.
    pub fn set_data(&mut self, data: GridData<T>) -> Result<()> {
        if data.page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        if data.page == 0 {
            return Err(GridError::InvalidPage);
        }
        if data.rows.len() > data.page_size {
            return Err(GridError::TooManyRows {
                rows: data.rows.len(),
                page_size: data.page_size,
            });
        }

        let previous_page = self.pagination.page();
        let pagination = Pagination::at(data.page, data.page_size, data.total)?;
        let clamped = pagination.page() != data.page;
        self.pagination = pagination;
        self.error = None;

        if previous_page != self.pagination.page() {
            self.drop_page_selection();
        }

        if clamped {
            log::warn!(
                "[grid] page {} is past the end ({} pages), moving to {}",
                data.page,
                self.pagination.page_count(),
                self.pagination.page()
            );
            self.enter_loading();
            self.emit(GridEvent::PageChanged(self.pagination.page()));
            return Ok(());
        }

        if data.is_loading {
            self.enter_loading();
            return Ok(());
        }

        self.loading = false;
        self.rows = data.rows;
        if self.selection.scope == SelectionScope::VisiblePage {
            let visible = self.visible_ids();
            self.selection.retain_visible(&visible);
        }
        self.cursor = match self.rows.len() {
            0 => None,
            len => Some(self.cursor.unwrap_or(0).min(len - 1)),
        };
        log::debug!(
            "[grid] showing {} rows, page {}/{}",
            self.rows.len(),
            self.pagination.page(),
            self.pagination.page_count()
        );
        Ok(())
    }

    /// Mark the grid as loading or done loading.
    ///
    /// Loading drops the current rows at once so stale records are never
    /// shown next to a pending request.
    pub fn set_loading(&mut self, loading: bool) {
        if loading {
            self.enter_loading();
        } else {
            self.loading = false;
        }
    }

    /// Report a failed fetch. Stops the loading state and shows `message`
    /// in place of the rows.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.rows.clear();
        self.cursor = None;
        self.error = Some(message.into());
    }

    fn enter_loading(&mut self) {
        self.loading = true;
        self.error = None;
        self.rows.clear();
        self.cursor = None;
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Feed raw search text. A [`GridEvent::SearchChanged`] follows once
    /// typing pauses for the configured interval.
    pub fn search_input(&mut self, text: impl Into<String>) {
        self.search.on_raw_change(text);
    }

    /// Settle the typed search text now.
    pub fn flush_search(&mut self) {
        self.search.flush();
    }

    /// Clear the search field and report the empty query immediately.
    pub fn clear_search(&mut self) {
        self.search.on_raw_change("");
        self.search.flush();
    }

    /// Drop the search text and any pending emission without notifying.
    pub fn reset_search(&mut self) {
        self.search.reset();
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    /// Activate a column header.
    ///
    /// Returns the new sort state, or `None` for a non-sortable column.
    pub fn click_header(&mut self, column_key: &str) -> Result<Option<SortState>> {
        if self.columns.find(column_key).is_none() {
            return Err(GridError::UnknownColumn(column_key.to_string()));
        }
        let Some(state) = self.sort.activate(column_key) else {
            return Ok(None);
        };
        self.emit(GridEvent::SortChanged(state.clone()));
        Ok(Some(state))
    }

    /// Move header focus by `delta` columns, wrapping around.
    pub fn focus_column(&mut self, delta: isize) {
        let len = self.columns.len();
        if len == 0 {
            return;
        }
        let current = self.focused_column as isize;
        self.focused_column = (current + delta).rem_euclid(len as isize) as usize;
    }

    pub fn focused_column(&self) -> Option<&ColumnDescriptor<T>> {
        self.columns.get(self.focused_column)
    }

    /// Activate the focused header.
    pub fn sort_focused(&mut self) -> Option<SortState> {
        let key = self.focused_column()?.key().to_string();
        self.click_header(&key).ok().flatten()
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn next_page(&mut self) -> usize {
        self.navigate(|p| p.next())
    }

    pub fn previous_page(&mut self) -> usize {
        self.navigate(|p| p.previous())
    }

    /// Jump to a page, clamped to the valid range.
    ///
    /// Any page change drops the current rows and shows the loading state
    /// until the caller supplies the new page.
    pub fn jump_to(&mut self, page: usize) -> usize {
        self.navigate(|p| p.jump_to(page))
    }

    /// Return to page 1 without emitting an event.
    ///
    /// For caller-owned reset rules (tab switch, new search) where the caller
    /// fetches anyway.
    pub fn reset_page(&mut self) {
        if self.pagination.page() != 1 {
            self.pagination.jump_to(1);
            self.drop_page_selection();
            self.enter_loading();
        }
    }

    fn navigate(&mut self, step: impl FnOnce(&mut Pagination) -> usize) -> usize {
        let before = self.pagination.page();
        let after = step(&mut self.pagination);
        if after != before {
            self.drop_page_selection();
            self.enter_loading();
            self.emit(GridEvent::PageChanged(after));
        }
        after
    }

    /// Change the page size. Returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == self.pagination.page_size() {
            return Ok(());
        }
        let before = self.pagination.page();
        self.pagination.set_page_size(page_size)?;
        if before != 1 {
            self.drop_page_selection();
        }
        self.enter_loading();
        self.emit(GridEvent::PageSizeChanged(page_size));
        Ok(())
    }

    /// Switch to the next larger configured page size.
    pub fn grow_page_size(&mut self) -> Result<()> {
        let size = self.config.page_size_options.larger(self.pagination.page_size());
        self.set_page_size(size)
    }

    /// Switch to the next smaller configured page size.
    pub fn shrink_page_size(&mut self) -> Result<()> {
        let size = self
            .config
            .page_size_options
            .smaller(self.pagination.page_size());
        self.set_page_size(size)
    }

    // -------------------------------------------------------------------------
    // Cursor
    // -------------------------------------------------------------------------

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn cursor_row(&self) -> Option<&T> {
        self.cursor.and_then(|i| self.rows.get(i))
    }

    pub fn cursor_down(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = Some(self.cursor.map_or(0, |c| (c + 1).min(last)));
    }

    pub fn cursor_up(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.cursor = Some(self.cursor.map_or(0, |c| c.saturating_sub(1)));
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Toggle a visible row. Ids not on the current page are ignored.
    pub fn toggle_row(&mut self, id: &T::Id) -> bool {
        if !self.rows.iter().any(|row| &row.id() == id) {
            return false;
        }
        self.selection.toggle(id.clone())
    }

    pub fn toggle_cursor_row(&mut self) -> bool {
        match self.cursor_row().map(|row| row.id()) {
            Some(id) => self.toggle_row(&id),
            None => false,
        }
    }

    /// The "select all on this page" checkbox.
    pub fn toggle_all_visible(&mut self) -> bool {
        let visible = self.visible_ids();
        self.selection.select_all_visible(&visible)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &T::Id) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.count()
    }

    /// Selected ids, visible rows first in display order.
    pub fn selected_ids(&self) -> Vec<T::Id> {
        self.selection.materialize(&self.visible_ids())
    }

    fn visible_ids(&self) -> Vec<T::Id> {
        self.rows.iter().map(|row| row.id()).collect()
    }

    fn drop_page_selection(&mut self) {
        if self.selection.scope == SelectionScope::VisiblePage {
            self.selection.clear();
        }
    }

    // -------------------------------------------------------------------------
    // Bulk actions
    // -------------------------------------------------------------------------

    /// Dispatch a bulk delete over the selected ids.
    ///
    /// Returns the ids dispatched; nothing is emitted when none are selected.
    pub fn bulk_delete(&mut self) -> Result<Vec<T::Id>> {
        if !self.config.bulk_delete {
            return Err(GridError::BulkActionDisabled(
                BulkAction::Delete.name().to_string(),
            ));
        }
        Ok(self.dispatch(BulkAction::Delete))
    }

    /// Dispatch a caller-defined bulk action over the selected ids.
    pub fn bulk_action(&mut self, name: impl Into<String>) -> Result<Vec<T::Id>> {
        let action = BulkAction::Custom(name.into());
        if !self.config.multi_select {
            return Err(GridError::BulkActionDisabled(action.name().to_string()));
        }
        Ok(self.dispatch(action))
    }

    fn dispatch(&mut self, action: BulkAction) -> Vec<T::Id> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return ids;
        }
        log::debug!("[grid] bulk {} on {} records", action.name(), ids.len());
        self.emit(GridEvent::BulkAction {
            action,
            ids: ids.clone(),
        });
        ids
    }

    // -------------------------------------------------------------------------
    // View
    // -------------------------------------------------------------------------

    /// Snapshot the grid for rendering.
    pub fn view(&self) -> GridView<T::Id> {
        let sort = self.sort.state();
        let header = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| HeaderCell {
                key: column.key().to_string(),
                label: column.header().to_string(),
                sortable: column.is_sortable(),
                sort: sort.direction_for(column.key()),
                width: column.width(),
                align: column.alignment(),
                focused: i == self.focused_column,
            })
            .collect();

        let body = if self.loading {
            GridBody::Skeleton(self.config.skeleton_rows)
        } else if let Some(message) = &self.error {
            GridBody::Error(message.clone())
        } else if self.rows.is_empty() {
            GridBody::Empty(self.config.empty_message.clone())
        } else {
            GridBody::Rows(
                self.rows
                    .iter()
                    .enumerate()
                    .map(|(i, record)| {
                        let id = record.id();
                        RowView {
                            selected: self.selection.is_selected(&id),
                            focused: self.cursor == Some(i),
                            cells: self.columns.render_row(record),
                            id,
                        }
                    })
                    .collect(),
            )
        };

        let select_all = self
            .config
            .multi_select
            .then(|| self.selection.visible_state(&self.visible_ids()));

        GridView {
            header,
            select_all,
            body,
            strip: self.pagination.strip(),
            page: self.pagination.page(),
            page_count: self.pagination.page_count(),
            page_size: self.pagination.page_size(),
            total: self.pagination.total(),
            range: if self.loading {
                None
            } else {
                self.pagination.record_range()
            },
            selected_count: self.selection.count(),
            bulk_delete: self.config.bulk_delete,
            search: self.search.state(),
        }
    }

    fn emit(&self, event: GridEvent<T::Id>) {
        log::debug!("[grid] emit {:?}", event);
        if self.events.send(event).is_err() {
            log::debug!("[grid] event receiver dropped");
        }
    }
}

impl<T: GridRecord + std::fmt::Debug> std::fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("pagination", &self.pagination)
            .field("loading", &self.loading)
            .field("sort", self.sort.state())
            .field("selected", &self.selection.count())
            .finish_non_exhaustive()
    }
}
