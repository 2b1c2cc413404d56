//! Grid contract errors

use thiserror::Error;

/// Errors raised when the caller hands the grid malformed input.
///
/// These are configuration mistakes and are reported instead of clamped.
/// Navigation (next/previous/jump) never fails; it clamps to the valid range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Page size was zero.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Page index was zero (pages are 1-based).
    #[error("page index is 1-based, got 0")]
    InvalidPage,

    /// The caller supplied more rows than fit on one page.
    #[error("received {rows} rows for a page size of {page_size}")]
    TooManyRows { rows: usize, page_size: usize },

    /// Two column descriptors share a key.
    #[error("duplicate column key: {0}")]
    DuplicateColumn(String),

    /// A column key that is not part of this grid.
    #[error("unknown column key: {0}")]
    UnknownColumn(String),

    /// A bulk action was dispatched while it is disabled for this grid.
    #[error("bulk action '{0}' is not enabled")]
    BulkActionDisabled(String),

    /// Page size options list was empty or contained zero.
    #[error("page size options must be non-empty and greater than zero")]
    InvalidPageSizeOptions,
}

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
