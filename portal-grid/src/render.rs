//! Plain-text rendering of a [`GridView`].
//!
//! Produces one `String` per terminal line, each exactly `width` display
//! columns wide. Styling is left to the terminal layer.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::column::{Alignment, ColumnWidth};
use crate::pagination::PageItem;
use crate::view::{GridBody, GridView, HeaderCell};

const GAP: usize = 1;
const CURSOR_MARK: &str = "›";
const SKELETON: char = '░';

pub fn display_width(s: &str) -> usize {
    s.width()
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Cut `s` to at most `max_width` columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width - 1;
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = char_width(ch);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

/// Truncate and pad `s` to exactly `width` columns.
pub fn fit(s: &str, width: usize, align: Alignment) -> String {
    let text = truncate_to_width(s, width);
    let slack = width.saturating_sub(display_width(&text));
    let left = match align {
        Alignment::Left => 0,
        Alignment::Center => slack / 2,
        Alignment::Right => slack,
    };
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(slack - left))
}

/// Distribute `available` columns: fixed columns first, the rest shared by
/// flex weight. The last flex column absorbs rounding.
pub fn column_widths(header: &[HeaderCell], available: usize) -> Vec<usize> {
    let gaps = GAP * header.len().saturating_sub(1);
    let mut remaining = available.saturating_sub(gaps);

    let mut widths: Vec<usize> = header
        .iter()
        .map(|cell| match cell.width {
            ColumnWidth::Fixed(w) => {
                let w = (w as usize).min(remaining);
                remaining -= w;
                w
            }
            ColumnWidth::Flex(_) => 0,
        })
        .collect();

    let total_weight: usize = header
        .iter()
        .filter_map(|cell| match cell.width {
            ColumnWidth::Flex(weight) => Some(weight.max(1) as usize),
            ColumnWidth::Fixed(_) => None,
        })
        .sum();
    if total_weight == 0 {
        return widths;
    }

    let pool = remaining;
    let mut last_flex = None;
    for (i, cell) in header.iter().enumerate() {
        if let ColumnWidth::Flex(weight) = cell.width {
            let share = pool * weight.max(1) as usize / total_weight;
            widths[i] = share;
            remaining -= share;
            last_flex = Some(i);
        }
    }
    if let Some(i) = last_flex {
        widths[i] += remaining;
    }
    widths
}

/// Compact page strip, e.g. `‹ 1 … 4 [5] 6 … 10 ›`.
pub fn strip_label(items: &[PageItem], has_previous: bool, has_next: bool) -> String {
    let mut parts = Vec::with_capacity(items.len() + 2);
    parts.push(if has_previous { "‹" } else { " " }.to_string());
    for item in items {
        parts.push(match item {
            PageItem::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageItem::Page { number, .. } => number.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        });
    }
    parts.push(if has_next { "›" } else { " " }.to_string());
    parts.join(" ")
}

/// Render a grid view as terminal lines.
pub fn render_lines<K>(view: &GridView<K>, width: usize) -> Vec<String> {
    let with_checkbox = view.select_all.is_some();
    let prefix = 2 + if with_checkbox { 2 } else { 0 };
    let widths = column_widths(&view.header, width.saturating_sub(prefix));

    let mut lines = Vec::new();

    // Search
    let mut search = format!("Search: {}", view.search.raw);
    if view.search.is_pending() {
        search.push_str(" …");
    }
    lines.push(fit(&search, width, Alignment::Left));

    // Header
    let mut header = String::from("  ");
    if let Some(state) = view.select_all {
        header.push_str(state.glyph());
        header.push(' ');
    }
    let titles: Vec<String> = view
        .header
        .iter()
        .zip(&widths)
        .map(|(cell, &w)| {
            let title = if cell.focused && cell.sortable {
                format!("{}*", cell.title())
            } else {
                cell.title()
            };
            fit(&title, w, cell.align)
        })
        .collect();
    header.push_str(&titles.join(&" ".repeat(GAP)));
    lines.push(fit(&header, width, Alignment::Left));
    lines.push("─".repeat(width));

    // Body
    match &view.body {
        GridBody::Skeleton(count) => {
            let bars: Vec<String> = widths
                .iter()
                .map(|&w| SKELETON.to_string().repeat(w))
                .collect();
            let row = format!("{}{}", " ".repeat(prefix), bars.join(&" ".repeat(GAP)));
            for _ in 0..*count {
                lines.push(fit(&row, width, Alignment::Left));
            }
        }
        GridBody::Empty(message) => lines.push(fit(message, width, Alignment::Center)),
        GridBody::Error(message) => {
            lines.push(fit(&format!("⚠ {}", message), width, Alignment::Center))
        }
        GridBody::Rows(rows) => {
            for row in rows {
                let mut line = String::from(if row.focused { CURSOR_MARK } else { " " });
                line.push(' ');
                if with_checkbox {
                    line.push_str(if row.selected { "■ " } else { "□ " });
                }
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .zip(view.header.iter().zip(&widths))
                    .map(|(cell, (head, &w))| fit(&cell.text, w, head.align))
                    .collect();
                line.push_str(&cells.join(&" ".repeat(GAP)));
                lines.push(fit(&line, width, Alignment::Left));
            }
        }
    }
    lines.push("─".repeat(width));

    // Footer
    let summary = format!("{} · {} per page", view.summary(), view.page_size);
    let strip = strip_label(&view.strip, view.page > 1, view.page < view.page_count);
    let spacing = width
        .saturating_sub(display_width(&summary) + display_width(&strip))
        .max(1);
    lines.push(fit(
        &format!("{}{}{}", summary, " ".repeat(spacing), strip),
        width,
        Alignment::Left,
    ));

    if view.selected_count > 0 {
        let mut bar = format!("{} selected", view.selected_count);
        if view.bulk_delete {
            bar.push_str(" · d to delete");
        }
        lines.push(fit(&bar, width, Alignment::Left));
    }

    lines
}
