//! Page arithmetic and the page-number strip.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{GridError, Result};

/// Page counts up to this value render every page number in the strip.
pub const FULL_STRIP_THRESHOLD: usize = 4;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of pages needed for `total` records, never less than one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// One element of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageItem {
    Page { number: usize, current: bool },
    Ellipsis,
}

impl PageItem {
    pub fn number(self) -> Option<usize> {
        match self {
            PageItem::Page { number, .. } => Some(number),
            PageItem::Ellipsis => None,
        }
    }
}

/// Pagination state: a 1-based page, a page size, and the total record count.
///
/// The page always stays within `1..=page_count()`. Navigation clamps;
/// invalid configuration (page size zero, page zero) is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Pagination {
    /// Start on page 1.
    pub fn new(page_size: usize, total: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        Ok(Self {
            page: 1,
            page_size,
            total,
        })
    }

    /// Start on a caller-chosen page. A page past the end is clamped to the
    /// last page.
    pub fn at(page: usize, page_size: usize, total: usize) -> Result<Self> {
        if page == 0 {
            return Err(GridError::InvalidPage);
        }
        let mut pagination = Self::new(page_size, total)?;
        pagination.page = page.min(pagination.page_count());
        Ok(pagination)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    /// Zero-based index of the first record on the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Move forward one page, stopping at the last page.
    pub fn next(&mut self) -> usize {
        self.page = (self.page + 1).min(self.page_count());
        self.page
    }

    /// Move back one page, stopping at page 1.
    pub fn previous(&mut self) -> usize {
        self.page = self.page.saturating_sub(1).max(1);
        self.page
    }

    /// Jump to `page`, clamped to `1..=page_count()`.
    pub fn jump_to(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.page_count());
        self.page
    }

    /// Change the page size. Always returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    /// Update the total record count, clamping the page if the result set shrank.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.page = self.page.min(self.page_count());
    }

    /// 1-based inclusive range of records shown on the current page,
    /// or `None` when there are no records.
    pub fn record_range(&self) -> Option<RangeInclusive<usize>> {
        if self.total == 0 {
            return None;
        }
        let first = self.offset() + 1;
        let last = (self.offset() + self.page_size).min(self.total);
        (first <= last).then_some(first..=last)
    }

    /// Build the page-number strip.
    ///
    /// Up to [`FULL_STRIP_THRESHOLD`] pages every number is shown. Beyond
    /// that the strip is: first page, an ellipsis if pages are hidden after
    /// it, the current page with its neighbours, an ellipsis if pages are
    /// hidden before the end, and the last page. That is at most seven items
    /// whatever the total.
    pub fn strip(&self) -> Vec<PageItem> {
        let count = self.page_count();
        let current = self.page;
        let page = |number| PageItem::Page {
            number,
            current: number == current,
        };

        if count <= FULL_STRIP_THRESHOLD {
            return (1..=count).map(page).collect();
        }

        let window_start = current.saturating_sub(1).max(2);
        let window_end = (current + 1).min(count - 1);

        let mut items = Vec::with_capacity(7);
        items.push(page(1));
        if window_start > 2 {
            items.push(PageItem::Ellipsis);
        }
        items.extend((window_start..=window_end).map(page));
        if window_end < count - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(page(count));
        items
    }
}

/// The page sizes a user can cycle through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizeOptions {
    sizes: Vec<usize>,
}

impl Default for PageSizeOptions {
    fn default() -> Self {
        Self {
            sizes: vec![10, 20, 50, 100],
        }
    }
}

impl PageSizeOptions {
    /// Validate a list of sizes. Sizes are sorted and deduplicated.
    pub fn new(sizes: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut sizes: Vec<usize> = sizes.into_iter().collect();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() || sizes[0] == 0 {
            return Err(GridError::InvalidPageSizeOptions);
        }
        Ok(Self { sizes })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The next larger option, or the largest one.
    pub fn larger(&self, current: usize) -> usize {
        self.sizes
            .iter()
            .copied()
            .find(|&size| size > current)
            .unwrap_or_else(|| self.sizes[self.sizes.len() - 1])
    }

    /// The next smaller option, or the smallest one.
    pub fn smaller(&self, current: usize) -> usize {
        self.sizes
            .iter()
            .rev()
            .copied()
            .find(|&size| size < current)
            .unwrap_or(self.sizes[0])
    }
}
