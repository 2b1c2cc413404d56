//! Console tabs: one grid per partner collection.
//!
//! Each tab owns its grid and acts as the grid's caller: it listens for grid
//! events, fetches the matching page from the backend, discards responses
//! that were overtaken by a newer request, and feeds the result back.

use std::sync::Arc;

use portal_grid::render::render_lines;
use portal_grid::{
    Alignment, BulkAction, Cell, ColumnDescriptor, FetchSequencer, Grid, GridConfig, GridData, GridEvent,
    GridQuery, GridRecord, RecordPage, RecordSource, RetryConfig, SortKey, SourceError, Ticket,
    fetch_with_retry,
};
use tokio::sync::mpsc;

use crate::context::PortalContext;
use crate::error::AppError;
use crate::models::{Booking, Invoice, Laboratory, Offering};

/// User intent forwarded from the key map to the active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    SubmitSearch,
    ClearSearch,
    CursorUp,
    CursorDown,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    FocusColumn(isize),
    Sort,
    ToggleRow,
    ToggleAll,
    ClearSelection,
    Delete,
    GrowPageSize,
    ShrinkPageSize,
    Refresh,
}

pub trait Tab {
    fn title(&self) -> &str;

    /// Called when the tab becomes active. Resets page and search and
    /// loads the first page.
    fn enter(&mut self);

    fn apply(&mut self, command: Command) -> Result<(), AppError>;

    /// Process grid events and finished requests.
    fn pump(&mut self);

    fn lines(&self, width: usize) -> Vec<String>;

    fn status(&self) -> Option<&str>;
}

enum Message<T: GridRecord> {
    Fetched {
        ticket: Ticket,
        query: GridQuery,
        result: Result<RecordPage<T>, SourceError>,
    },
    Deleted(Result<usize, SourceError>),
}

/// A tab showing one record type.
pub struct GridTab<T: GridRecord> {
    title: &'static str,
    grid: Grid<T>,
    events: mpsc::UnboundedReceiver<GridEvent<T::Id>>,
    source: Arc<dyn RecordSource<T>>,
    sequencer: FetchSequencer,
    retry: RetryConfig,
    messages_tx: mpsc::UnboundedSender<Message<T>>,
    messages: mpsc::UnboundedReceiver<Message<T>>,
    /// Nudges the event loop to redraw when a request finishes.
    wake: mpsc::UnboundedSender<()>,
    status: Option<String>,
}

impl<T: GridRecord> GridTab<T> {
    pub fn new(
        title: &'static str,
        columns: Vec<ColumnDescriptor<T>>,
        config: GridConfig,
        source: Arc<dyn RecordSource<T>>,
        retry: RetryConfig,
        wake: mpsc::UnboundedSender<()>,
    ) -> Result<Self, AppError> {
        let (grid, events) = Grid::new(columns, config)?;
        let (messages_tx, messages) = mpsc::unbounded_channel();
        Ok(Self {
            title,
            grid,
            events,
            source,
            sequencer: FetchSequencer::new(),
            retry,
            messages_tx,
            messages,
            wake,
            status: None,
        })
    }

    fn request(&mut self) {
        let ticket = self.sequencer.issue();
        let query = self.grid.query();
        self.grid.set_loading(true);
        log::debug!(
            "[{}] fetch #{} {}",
            self.title,
            ticket.value(),
            query.to_query_string()
        );

        let source = Arc::clone(&self.source);
        let retry = self.retry.clone();
        let tx = self.messages_tx.clone();
        let wake = self.wake.clone();
        tokio::spawn(async move {
            let result = fetch_with_retry(&*source, &query, &retry).await;
            let _ = tx.send(Message::Fetched {
                ticket,
                query,
                result,
            });
            let _ = wake.send(());
        });
    }

    fn delete(&mut self, ids: Vec<T::Id>) {
        log::info!("[{}] deleting {} records", self.title, ids.len());
        self.status = Some(format!("Deleting {} records…", ids.len()));

        let source = Arc::clone(&self.source);
        let tx = self.messages_tx.clone();
        let wake = self.wake.clone();
        tokio::spawn(async move {
            let result = source.delete(&ids).await;
            let _ = tx.send(Message::Deleted(result));
            let _ = wake.send(());
        });
    }

    /// Handle pending grid events. Returns true if the grid needs new data.
    fn drain_events(&mut self) -> bool {
        let mut refetch = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                GridEvent::SearchChanged(text) => {
                    log::info!("[{}] search {:?}", self.title, text);
                    self.grid.reset_page();
                    refetch = true;
                }
                GridEvent::SortChanged(_)
                | GridEvent::PageChanged(_)
                | GridEvent::PageSizeChanged(_) => refetch = true,
                GridEvent::BulkAction {
                    action: BulkAction::Delete,
                    ids,
                } => self.delete(ids),
                GridEvent::BulkAction { action, ids } => {
                    self.status = Some(format!(
                        "{} is not available for {} ({} selected)",
                        action.name(),
                        self.title,
                        ids.len()
                    ));
                }
            }
        }
        refetch
    }

    fn apply_page(&mut self, query: GridQuery, result: Result<RecordPage<T>, SourceError>) {
        match result {
            Ok(page) => {
                let total = page.total();
                let data = GridData::new(page.into_records(), total, query.page, query.page_size);
                if let Err(err) = self.grid.set_data(data) {
                    log::error!("[{}] rejected page: {}", self.title, err);
                    self.grid.set_error(err.to_string());
                }
            }
            Err(err) => {
                log::error!("[{}] fetch failed: {}", self.title, err);
                self.grid.set_error(format!("Could not load {}: {}", self.title, err));
            }
        }
    }
}

impl<T: GridRecord> Tab for GridTab<T> {
    fn title(&self) -> &str {
        self.title
    }

    fn enter(&mut self) {
        self.status = None;
        self.grid.reset_search();
        self.grid.reset_page();
        self.grid.clear_selection();
        self.request();
    }

    fn apply(&mut self, command: Command) -> Result<(), AppError> {
        self.status = None;
        match command {
            Command::Search(text) => self.grid.search_input(text),
            Command::SubmitSearch => self.grid.flush_search(),
            Command::ClearSearch => self.grid.clear_search(),
            Command::CursorUp => self.grid.cursor_up(),
            Command::CursorDown => self.grid.cursor_down(),
            Command::NextPage => {
                self.grid.next_page();
            }
            Command::PreviousPage => {
                self.grid.previous_page();
            }
            Command::FirstPage => {
                self.grid.jump_to(1);
            }
            Command::LastPage => {
                self.grid.jump_to(usize::MAX);
            }
            Command::FocusColumn(delta) => self.grid.focus_column(delta),
            Command::Sort => {
                if self.grid.sort_focused().is_none()
                    && let Some(column) = self.grid.focused_column()
                {
                    self.status = Some(format!("{} is not sortable", column.header()));
                }
            }
            Command::ToggleRow => {
                self.grid.toggle_cursor_row();
            }
            Command::ToggleAll => {
                self.grid.toggle_all_visible();
            }
            Command::ClearSelection => self.grid.clear_selection(),
            Command::Delete => {
                if self.grid.bulk_delete()?.is_empty() {
                    self.status = Some("Nothing selected".to_string());
                }
            }
            Command::GrowPageSize => self.grid.grow_page_size()?,
            Command::ShrinkPageSize => self.grid.shrink_page_size()?,
            Command::Refresh => self.request(),
        }
        Ok(())
    }

    fn pump(&mut self) {
        // The new request must be issued before queued responses are read,
        // otherwise a response for the previous query still counts as current.
        if self.drain_events() {
            self.request();
        }

        let mut refetch = false;
        while let Ok(message) = self.messages.try_recv() {
            match message {
                Message::Fetched {
                    ticket,
                    query,
                    result,
                } => {
                    if let Some(result) = self.sequencer.accept(ticket, result) {
                        self.apply_page(query, result);
                    }
                }
                Message::Deleted(Ok(removed)) => {
                    self.status = Some(format!("Deleted {} records", removed));
                    self.grid.clear_selection();
                    refetch = true;
                }
                Message::Deleted(Err(err)) => {
                    log::error!("[{}] delete failed: {}", self.title, err);
                    self.status = Some(format!("Delete failed: {}", err));
                }
            }
        }

        if refetch {
            self.request();
        }
    }

    fn lines(&self, width: usize) -> Vec<String> {
        render_lines(&self.grid.view(), width)
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

// =============================================================================
// Tab definitions
// =============================================================================

fn money(amount: rust_decimal::Decimal) -> String {
    format!("₹{:.2}", amount)
}

/// Build the console's tabs.
pub fn build_tabs(
    ctx: &PortalContext,
    wake: mpsc::UnboundedSender<()>,
) -> Result<Vec<Box<dyn Tab>>, AppError> {
    let base = ctx.settings.grid_config()?;
    let backend = &ctx.backend;

    let laboratories = GridTab::<Laboratory>::new(
        "Laboratories",
        vec![
            ColumnDescriptor::new("name", "Laboratory", |l: &Laboratory| l.name.as_str().into())
                .sortable()
                .flex(3),
            ColumnDescriptor::new("city", "City", |l: &Laboratory| l.city.as_str().into())
                .sortable()
                .flex(2),
            ColumnDescriptor::new("accreditation", "Accred.", |l: &Laboratory| {
                l.accreditation.as_str().into()
            })
            .fixed(10),
            ColumnDescriptor::new("tests", "Tests", |l: &Laboratory| {
                l.tests_offered.to_string().into()
            })
            .sortable()
            .fixed(6)
            .align(Alignment::Right),
            ColumnDescriptor::new("active", "Status", |l: &Laboratory| {
                Cell::new(if l.active { "Active" } else { "Inactive" })
            })
            .fixed(8),
        ],
        base.clone()
            .default_sort(SortKey::asc("name"))
            .empty_message("No laboratories match"),
        backend.laboratories.clone(),
        ctx.retry.clone(),
        wake.clone(),
    )?;

    let offerings = GridTab::<Offering>::new(
        "Offerings",
        vec![
            ColumnDescriptor::new("name", "Test / package", |o: &Offering| o.name.as_str().into())
                .sortable()
                .flex(3),
            ColumnDescriptor::new("kind", "Type", |o: &Offering| o.kind.to_string().into()).fixed(8),
            ColumnDescriptor::new("laboratory", "Laboratory", |o: &Offering| {
                o.laboratory.as_str().into()
            })
            .flex(2),
            ColumnDescriptor::new("price", "Price", |o: &Offering| money(o.price).into())
                .sortable()
                .fixed(11)
                .align(Alignment::Right),
            ColumnDescriptor::new("turnaround", "TAT", |o: &Offering| {
                format!("{}h", o.turnaround_hours).into()
            })
            .sortable()
            .fixed(5)
            .align(Alignment::Right),
        ],
        base.clone()
            .default_sort(SortKey::asc("name"))
            .empty_message("No offerings match"),
        backend.offerings.clone(),
        ctx.retry.clone(),
        wake.clone(),
    )?;

    let bookings = GridTab::<Booking>::new(
        "Bookings",
        vec![
            ColumnDescriptor::new("reference", "Ref", |b: &Booking| b.reference.as_str().into())
                .sortable()
                .fixed(9),
            ColumnDescriptor::new("patient", "Patient", |b: &Booking| b.patient.as_str().into())
                .sortable()
                .flex(2),
            ColumnDescriptor::new("offering", "Test", |b: &Booking| b.offering.as_str().into())
                .flex(3),
            ColumnDescriptor::new("scheduled", "Date", |b: &Booking| {
                b.scheduled.format("%d %b %Y").to_string().into()
            })
            .sortable()
            .fixed(11),
            ColumnDescriptor::new("status", "Status", |b: &Booking| b.status.to_string().into())
                .sortable()
                .fixed(16),
            ColumnDescriptor::new("amount", "Amount", |b: &Booking| money(b.amount).into())
                .sortable()
                .fixed(10)
                .align(Alignment::Right),
        ],
        base.clone()
            .multi_select(true)
            .bulk_delete(true)
            .default_sort(SortKey::desc("scheduled"))
            .empty_message("No bookings match"),
        backend.bookings.clone(),
        ctx.retry.clone(),
        wake.clone(),
    )?;

    let invoices = GridTab::<Invoice>::new(
        "Invoices",
        vec![
            ColumnDescriptor::new("number", "Invoice", |i: &Invoice| i.number.as_str().into())
                .sortable()
                .flex(2),
            ColumnDescriptor::new("issued", "Issued", |i: &Invoice| {
                i.issued.format("%d %b %Y").to_string().into()
            })
            .sortable()
            .fixed(11),
            ColumnDescriptor::new("amount", "Amount", |i: &Invoice| money(i.amount).into())
                .sortable()
                .fixed(12)
                .align(Alignment::Right),
            ColumnDescriptor::new("status", "Status", |i: &Invoice| i.status.to_string().into())
                .sortable()
                .fixed(8),
        ],
        base.default_sort(SortKey::desc("issued"))
            .empty_message("No invoices match"),
        backend.invoices.clone(),
        ctx.retry.clone(),
        wake,
    )?;

    Ok(vec![
        Box::new(laboratories),
        Box::new(offerings),
        Box::new(bookings),
        Box::new(invoices),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::time::Duration;

    fn context() -> PortalContext {
        PortalContext::new(Settings {
            latency_ms: 0,
            search_debounce_ms: 100,
            ..Default::default()
        })
    }

    async fn settle(tab: &mut dyn Tab) {
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tab.pump();
        }
    }

    #[tokio::test]
    async fn test_enter_loads_first_page() {
        let (wake, _wake_rx) = mpsc::unbounded_channel();
        let mut tabs = build_tabs(&context(), wake).unwrap();
        let tab = tabs[2].as_mut();

        tab.enter();
        assert!(tab.lines(100).iter().any(|l| l.contains('░')));

        settle(tab).await;
        let lines = tab.lines(100);
        assert!(lines.iter().any(|l| l.contains("Showing 1–20 of 143")));
    }

    #[tokio::test]
    async fn test_search_resets_page_and_filters() {
        let (wake, _wake_rx) = mpsc::unbounded_channel();
        let mut tabs = build_tabs(&context(), wake).unwrap();
        let tab = tabs[0].as_mut();

        tab.enter();
        settle(tab).await;
        tab.apply(Command::NextPage).unwrap();
        settle(tab).await;
        assert!(tab.lines(100).iter().any(|l| l.contains("Showing 21–37 of 37")));

        tab.apply(Command::Search("pune".into())).unwrap();
        tab.apply(Command::SubmitSearch).unwrap();
        settle(tab).await;
        let lines = tab.lines(100);
        assert!(lines.iter().any(|l| l.contains("Showing 1–")));
        assert!(lines.iter().any(|l| l.contains("Pune")));
        assert!(!lines.iter().any(|l| l.contains("Delhi")));
    }

    #[tokio::test]
    async fn test_navigation_wins_over_response_already_queued() {
        let (wake, _wake_rx) = mpsc::unbounded_channel();
        let mut tabs = build_tabs(&context(), wake).unwrap();
        let tab = tabs[0].as_mut();

        tab.enter();
        settle(tab).await;

        // The refresh answers before the next pump, then the user pages.
        tab.apply(Command::Refresh).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tab.apply(Command::NextPage).unwrap();
        settle(tab).await;
        assert!(tab.lines(100).iter().any(|l| l.contains("Showing 21–37 of 37")));

        tab.apply(Command::Refresh).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tab.apply(Command::GrowPageSize).unwrap();
        settle(tab).await;
        assert!(tab.lines(100).iter().any(|l| l.contains("Showing 1–37 of 37 · 50 per page")));
    }

    #[tokio::test]
    async fn test_bulk_delete_refetches() {
        let ctx = context();
        let (wake, _wake_rx) = mpsc::unbounded_channel();
        let mut tabs = build_tabs(&ctx, wake).unwrap();
        let tab = tabs[2].as_mut();

        tab.enter();
        settle(tab).await;
        tab.apply(Command::ToggleAll).unwrap();
        tab.apply(Command::Delete).unwrap();
        settle(tab).await;

        assert_eq!(tab.status(), Some("Deleted 20 records"));
        assert_eq!(ctx.backend.bookings.len().await, 123);
        assert!(tab.lines(100).iter().any(|l| l.contains("of 123")));
    }

    #[tokio::test]
    async fn test_delete_disabled_on_read_only_tab() {
        let (wake, _wake_rx) = mpsc::unbounded_channel();
        let mut tabs = build_tabs(&context(), wake).unwrap();
        let err = tabs[3].apply(Command::Delete).unwrap_err();
        assert!(matches!(err, AppError::Grid(_)));
    }
}
