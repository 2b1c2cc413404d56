use std::time::Duration;

use portal_grid::render::render_lines;
use portal_grid::{
    BulkAction, CheckState, ColumnDescriptor, Grid, GridBody, GridConfig, GridData, GridError,
    GridEvent, GridRecord, PageItem, Pagination, SelectionScope, SortDirection, SortKey, SortState,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq)]
struct Lab {
    id: u32,
    name: String,
    city: String,
}

impl GridRecord for Lab {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

fn lab(id: u32) -> Lab {
    Lab {
        id,
        name: format!("Lab {}", id),
        city: if id % 2 == 0 { "Pune" } else { "Delhi" }.to_string(),
    }
}

fn labs(ids: std::ops::RangeInclusive<u32>) -> Vec<Lab> {
    ids.map(lab).collect()
}

fn columns() -> Vec<ColumnDescriptor<Lab>> {
    vec![
        ColumnDescriptor::new("name", "Name", |l: &Lab| l.name.as_str().into())
            .sortable()
            .flex(2),
        ColumnDescriptor::new("city", "City", |l: &Lab| l.city.as_str().into()).sortable(),
        ColumnDescriptor::new("id", "ID", |l: &Lab| l.id.to_string().into()).fixed(4),
    ]
}

fn grid(config: GridConfig) -> (Grid<Lab>, UnboundedReceiver<GridEvent<u32>>) {
    Grid::new(columns(), config).unwrap()
}

fn drain(rx: &mut UnboundedReceiver<GridEvent<u32>>) -> Vec<GridEvent<u32>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_rejects_duplicate_columns_and_unknown_default_sort() {
    let mut cols = columns();
    cols.push(ColumnDescriptor::new("city", "Again", |l: &Lab| l.city.as_str().into()));
    assert_eq!(
        Grid::new(cols, GridConfig::default()).unwrap_err(),
        GridError::DuplicateColumn("city".into())
    );

    let err = Grid::new(columns(), GridConfig::default().default_sort(SortKey::asc("rating")))
        .unwrap_err();
    assert_eq!(err, GridError::UnknownColumn("rating".into()));

    let err = Grid::new(columns(), GridConfig::default().page_size(0)).unwrap_err();
    assert_eq!(err, GridError::InvalidPageSize);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_typing_burst_emits_one_search_event() {
    let (mut grid, mut rx) = grid(GridConfig::default());

    for text in ["n", "no", "nor"] {
        grid.search_input(text);
        sleep(Duration::from_millis(50)).await;
    }
    assert!(drain(&mut rx).is_empty());
    assert_eq!(grid.search_state().raw, "nor");
    assert_eq!(grid.query().search, "");

    sleep(Duration::from_millis(500)).await;
    assert_eq!(drain(&mut rx), vec![GridEvent::SearchChanged("nor".into())]);
    assert_eq!(grid.query().search, "nor");
}

#[tokio::test(start_paused = true)]
async fn test_clear_search_emits_empty_query() {
    let (mut grid, mut rx) = grid(GridConfig::default());
    grid.search_input("pune");
    grid.flush_search();
    grid.clear_search();
    assert_eq!(
        drain(&mut rx),
        vec![
            GridEvent::SearchChanged("pune".into()),
            GridEvent::SearchChanged(String::new()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropping_grid_cancels_pending_search() {
    let (mut grid, mut rx) = grid(GridConfig::default());
    grid.search_input("late");
    drop(grid);
    sleep(Duration::from_secs(1)).await;
    assert!(rx.recv().await.is_none());
}

// ============================================================================
// Sort
// ============================================================================

#[test]
fn test_header_clicks_cycle_and_emit() {
    let (mut grid, mut rx) = grid(GridConfig::default().default_sort(SortKey::asc("name")));

    let states: Vec<_> = (0..4)
        .map(|_| grid.click_header("city").unwrap().unwrap())
        .collect();
    assert_eq!(states[0], SortState::new("city", SortDirection::Asc));
    assert_eq!(states[1], SortState::new("city", SortDirection::Desc));
    assert_eq!(states[2], SortState::unsorted());
    assert_eq!(states[3], SortState::new("city", SortDirection::Asc));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 4);
    assert_eq!(events[2], GridEvent::SortChanged(SortState::unsorted()));
}

#[test]
fn test_unsorted_query_uses_default_sort() {
    let (mut grid, _rx) = grid(GridConfig::default().default_sort(SortKey::asc("name")));
    assert_eq!(grid.query().sort, Some(SortKey::asc("name")));
    grid.click_header("city").unwrap();
    grid.click_header("city").unwrap();
    assert_eq!(grid.query().sort, Some(SortKey::desc("city")));
}

#[test]
fn test_switching_sort_column_resets_previous() {
    let (mut grid, _rx) = grid(GridConfig::default());
    grid.click_header("name").unwrap();
    grid.click_header("city").unwrap();

    let view = grid.view();
    assert_eq!(view.header[0].sort, None);
    assert_eq!(view.header[1].sort, Some(SortDirection::Asc));
    assert_eq!(view.header[1].title(), "City ▲");
}

#[test]
fn test_non_sortable_and_unknown_headers() {
    let (mut grid, mut rx) = grid(GridConfig::default());
    assert_eq!(grid.click_header("id"), Ok(None));
    assert_eq!(
        grid.click_header("rating"),
        Err(GridError::UnknownColumn("rating".into()))
    );
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_keyboard_header_focus() {
    let (mut grid, _rx) = grid(GridConfig::default());
    grid.focus_column(-1);
    assert_eq!(grid.focused_column().unwrap().key(), "id");
    assert_eq!(grid.sort_focused(), None);
    grid.focus_column(2);
    assert_eq!(grid.focused_column().unwrap().key(), "city");
    assert_eq!(
        grid.sort_focused(),
        Some(SortState::new("city", SortDirection::Asc))
    );
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_navigation_clamps_and_emits_only_on_change() {
    let (mut grid, mut rx) = grid(GridConfig::default());
    grid.set_data(GridData::new(labs(1..=20), 41, 1, 20)).unwrap();

    assert_eq!(grid.previous_page(), 1);
    assert_eq!(grid.jump_to(99), 3);
    assert_eq!(grid.next_page(), 3);
    assert_eq!(grid.jump_to(0), 1);

    assert_eq!(
        drain(&mut rx),
        vec![GridEvent::PageChanged(3), GridEvent::PageChanged(1)]
    );
}

#[test]
fn test_page_size_change_resets_to_first_page() {
    let (mut grid, mut rx) = grid(GridConfig::default().page_size(10));
    grid.set_data(GridData::new(labs(21..=30), 100, 3, 10)).unwrap();

    grid.set_page_size(20).unwrap();
    assert_eq!(grid.pagination().page(), 1);
    assert_eq!(grid.query().page_size, 20);
    assert_eq!(drain(&mut rx), vec![GridEvent::PageSizeChanged(20)]);

    assert_eq!(grid.set_page_size(0), Err(GridError::InvalidPageSize));

    grid.grow_page_size().unwrap();
    assert_eq!(grid.pagination().page_size(), 50);
    grid.shrink_page_size().unwrap();
    grid.shrink_page_size().unwrap();
    assert_eq!(grid.pagination().page_size(), 10);
}

#[test]
fn test_strip_stays_bounded() {
    for total in [4usize, 10, 100, 10_000] {
        for page in [1, 2, total / 2, total.saturating_sub(1), total] {
            let Ok(p) = Pagination::at(page.max(1), 1, total) else {
                continue;
            };
            let strip = p.strip();
            assert!(strip.len() <= 7, "total {total}, page {page}: {strip:?}");
            assert_eq!(strip.first().and_then(|i| i.number()), Some(1));
            assert_eq!(strip.last().and_then(|i| i.number()), Some(total));
            assert!(strip.contains(&PageItem::Page {
                number: p.page(),
                current: true
            }));
        }
    }
}

#[test]
fn test_page_past_end_is_clamped_and_refetched() {
    let (mut grid, mut rx) = grid(GridConfig::default());
    // Last page emptied by a delete elsewhere: 40 records left, caller asks for page 3.
    grid.set_data(GridData::new(vec![], 40, 3, 20)).unwrap();

    assert_eq!(grid.pagination().page(), 2);
    assert!(grid.is_loading());
    assert_eq!(drain(&mut rx), vec![GridEvent::PageChanged(2)]);
}

#[test]
fn test_malformed_data_fails_fast() {
    let (mut grid, _rx) = grid(GridConfig::default());
    assert_eq!(
        grid.set_data(GridData::new(vec![], 10, 1, 0)).unwrap_err(),
        GridError::InvalidPageSize
    );
    assert_eq!(
        grid.set_data(GridData::new(vec![], 10, 0, 10)).unwrap_err(),
        GridError::InvalidPage
    );
    assert_eq!(
        grid.set_data(GridData::new(labs(1..=3), 3, 1, 2)).unwrap_err(),
        GridError::TooManyRows {
            rows: 3,
            page_size: 2
        }
    );
}

// ============================================================================
// Selection and bulk actions
// ============================================================================

fn selectable() -> (Grid<Lab>, UnboundedReceiver<GridEvent<u32>>) {
    let (mut grid, rx) = grid(
        GridConfig::default()
            .page_size(5)
            .multi_select(true)
            .bulk_delete(true),
    );
    grid.set_data(GridData::new(labs(1..=5), 12, 1, 5)).unwrap();
    (grid, rx)
}

#[test]
fn test_select_all_visible_twice_restores_selection() {
    let (mut grid, _rx) = selectable();
    grid.toggle_row(&2);
    assert_eq!(grid.view().select_all, Some(CheckState::Partial));

    grid.toggle_all_visible();
    assert_eq!(grid.selected_count(), 5);
    assert_eq!(grid.view().select_all, Some(CheckState::Checked));

    grid.toggle_all_visible();
    assert_eq!(grid.selected_count(), 0);
    assert_eq!(grid.view().select_all, Some(CheckState::Unchecked));
}

#[test]
fn test_rows_off_page_cannot_be_toggled() {
    let (mut grid, _rx) = selectable();
    assert!(!grid.toggle_row(&42));
    assert_eq!(grid.selected_count(), 0);
}

#[test]
fn test_page_change_drops_selection() {
    let (mut grid, _rx) = selectable();
    grid.toggle_all_visible();
    grid.next_page();
    assert_eq!(grid.selected_count(), 0);
}

#[test]
fn test_across_pages_scope_keeps_selection() {
    let (mut grid, mut rx) = grid(
        GridConfig::default()
            .page_size(5)
            .multi_select(true)
            .bulk_delete(true)
            .selection_scope(SelectionScope::AcrossPages),
    );
    grid.set_data(GridData::new(labs(1..=5), 12, 1, 5)).unwrap();
    grid.toggle_row(&1);
    grid.next_page();
    grid.set_data(GridData::new(labs(6..=10), 12, 2, 5)).unwrap();
    grid.toggle_row(&7);

    assert_eq!(grid.selected_ids(), vec![7, 1]);
    drain(&mut rx);
    assert_eq!(grid.bulk_delete().unwrap(), vec![7, 1]);
    assert_eq!(
        drain(&mut rx),
        vec![GridEvent::BulkAction {
            action: BulkAction::Delete,
            ids: vec![7, 1]
        }]
    );
}

#[test]
fn test_refresh_drops_ids_that_disappeared() {
    let (mut grid, _rx) = selectable();
    grid.toggle_row(&1);
    grid.toggle_row(&3);
    // Record 3 was deleted; the same page now shows 1, 2, 4, 5, 6.
    let rows = vec![lab(1), lab(2), lab(4), lab(5), lab(6)];
    grid.set_data(GridData::new(rows, 11, 1, 5)).unwrap();
    assert_eq!(grid.selected_ids(), vec![1]);
}

#[test]
fn test_bulk_delete_receives_selected_ids() {
    let (mut grid, mut rx) = selectable();
    assert_eq!(grid.bulk_delete().unwrap(), Vec::<u32>::new());
    assert!(drain(&mut rx).is_empty());

    grid.toggle_row(&4);
    grid.toggle_row(&2);
    let ids = grid.bulk_delete().unwrap();
    assert_eq!(ids, vec![2, 4]);
    assert_eq!(
        drain(&mut rx),
        vec![GridEvent::BulkAction {
            action: BulkAction::Delete,
            ids: vec![2, 4]
        }]
    );
}

#[test]
fn test_bulk_actions_require_configuration() {
    let (mut grid, _rx) = grid(GridConfig::default());
    assert_eq!(
        grid.bulk_delete(),
        Err(GridError::BulkActionDisabled("delete".into()))
    );
    assert_eq!(
        grid.bulk_action("export"),
        Err(GridError::BulkActionDisabled("export".into()))
    );
    assert_eq!(grid.view().select_all, None);
}

#[test]
fn test_custom_bulk_action() {
    let (mut grid, mut rx) = selectable();
    grid.toggle_row(&5);
    grid.bulk_action("export").unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![GridEvent::BulkAction {
            action: BulkAction::Custom("export".into()),
            ids: vec![5]
        }]
    );
}

// ============================================================================
// Rendering contract
// ============================================================================

#[test]
fn test_loading_never_shows_stale_rows() {
    let (mut grid, _rx) = selectable();
    assert_eq!(grid.view().rows().len(), 5);

    grid.next_page();
    grid.set_loading(true);

    let view = grid.view();
    assert_eq!(view.body, GridBody::Skeleton(5));
    assert!(view.row_ids().is_empty());
    assert!(grid.rows().is_empty());
    assert_eq!(view.range, None);

    // A loading update carrying rows still renders skeletons.
    grid.set_data(GridData::new(labs(6..=10), 12, 2, 5).loading(true))
        .unwrap();
    assert!(grid.view().is_loading());
    assert!(grid.view().rows().is_empty());
}

#[test]
fn test_page_moves_show_loading_before_caller_reacts() {
    let (mut grid, _rx) = selectable();
    grid.next_page();
    let view = grid.view();
    assert_eq!(view.page, 2);
    assert_eq!(view.body, GridBody::Skeleton(5));
    assert!(grid.rows().is_empty());

    grid.set_data(GridData::new(labs(6..=10), 12, 2, 5)).unwrap();
    grid.set_page_size(10).unwrap();
    assert!(grid.is_loading());
    assert_eq!(grid.view().range, None);

    // Staying put keeps the rows.
    grid.set_data(GridData::new(labs(1..=10), 12, 1, 10)).unwrap();
    grid.previous_page();
    assert!(!grid.is_loading());
    assert_eq!(grid.rows().len(), 10);
}

#[test]
fn test_empty_and_error_states() {
    let (mut grid, _rx) = grid(GridConfig::default().empty_message("No labs yet"));
    grid.set_data(GridData::new(vec![], 0, 1, 20)).unwrap();
    assert_eq!(grid.view().body, GridBody::Empty("No labs yet".into()));
    assert_eq!(grid.view().summary(), "No records");

    grid.set_loading(true);
    grid.set_error("backend unavailable");
    assert!(!grid.is_loading());
    assert_eq!(
        grid.view().body,
        GridBody::Error("backend unavailable".into())
    );
}

#[test]
fn test_view_rows_and_cursor() {
    let (mut grid, _rx) = selectable();
    grid.cursor_down();
    grid.cursor_down();
    grid.toggle_cursor_row();

    let view = grid.view();
    let rows = view.rows();
    assert_eq!(rows.len(), 5);
    assert!(rows[2].focused);
    assert!(rows[2].selected);
    assert_eq!(rows[2].cells[0].text, "Lab 3");
    assert_eq!(view.summary(), "Showing 1–5 of 12");

    for _ in 0..10 {
        grid.cursor_up();
    }
    assert_eq!(grid.cursor(), Some(0));
}

#[test]
fn test_render_lines_fixed_width() {
    let (mut grid, _rx) = selectable();
    grid.toggle_row(&1);

    let lines = render_lines(&grid.view(), 60);
    assert!(lines.iter().all(|l| portal_grid::render::display_width(l) == 60));
    assert!(lines[1].contains("Name"));
    assert!(lines.iter().any(|l| l.contains("Lab 1")));
    assert!(lines.iter().any(|l| l.contains("[1] 2 3")));
    assert!(lines.last().unwrap().starts_with("1 selected"));

    grid.set_loading(true);
    let lines = render_lines(&grid.view(), 60);
    assert!(!lines.iter().any(|l| l.contains("Lab 1")));
    assert!(lines.iter().any(|l| l.contains('░')));
}
