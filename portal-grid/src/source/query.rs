//! Query parameters a caller sends to its backend.

use serde::{Deserialize, Serialize};

use crate::sort::{SortDirection, SortKey};

/// Everything a backend needs to produce one page of grid rows.
///
/// Built from grid state with [`Grid::query`](crate::Grid::query). The sort
/// is already resolved: it is the user's active column or the grid's default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridQuery {
    /// Settled search text. Empty means no filter.
    pub search: String,
    pub sort: Option<SortKey>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl GridQuery {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort: None,
            page,
            page_size,
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sort(mut self, sort: Option<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Zero-based offset of the first record (`$skip` in REST terms).
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Trimmed search text, or `None` if there is nothing to filter on.
    pub fn filter_text(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Render as URL query parameters, e.g.
    /// `page=2&page_size=20&search=north&sort=name&order=asc`.
    pub fn to_query_string(&self) -> String {
        let mut parts = vec![
            format!("page={}", self.page),
            format!("page_size={}", self.page_size),
        ];
        if let Some(text) = self.filter_text() {
            parts.push(format!("search={}", urlencoding::encode(text)));
        }
        if let Some(sort) = &self.sort {
            parts.push(format!("sort={}", urlencoding::encode(&sort.column)));
            parts.push(format!(
                "order={}",
                match sort.direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                }
            ));
        }
        parts.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(GridQuery::new(1, 20).offset(), 0);
        assert_eq!(GridQuery::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_query_string() {
        let query = GridQuery::new(2, 20)
            .search(" north lab ")
            .sort(Some(SortKey::desc("created_at")));
        assert_eq!(
            query.to_query_string(),
            "page=2&page_size=20&search=north%20lab&sort=created_at&order=desc"
        );
    }

    #[test]
    fn test_query_string_escapes_reserved_characters() {
        let query = GridQuery::new(1, 10).search("a&b=c/d");
        assert_eq!(
            query.to_query_string(),
            "page=1&page_size=10&search=a%26b%3Dc%2Fd"
        );
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        let query = GridQuery::new(1, 10).search("   ");
        assert_eq!(query.filter_text(), None);
        assert_eq!(query.to_query_string(), "page=1&page_size=10");
    }
}
