//! Column descriptors and the record trait.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{GridError, Result};

// =============================================================================
// GridRecord Trait
// =============================================================================

/// Trait for records that can be displayed as rows in a [`Grid`](crate::Grid).
///
/// The grid never looks inside a record; everything it shows comes from the
/// column descriptors. It only needs a stable identifier for selection.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct Lab {
///     id: u32,
///     name: String,
/// }
///
/// impl GridRecord for Lab {
///     type Id = u32;
///
///     fn id(&self) -> u32 {
///         self.id
///     }
/// }
/// ```
pub trait GridRecord: Send + Sync + 'static {
    /// The identifier type used to select and act on records.
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Return the stable identifier for this record.
    fn id(&self) -> Self::Id;
}

// =============================================================================
// Cell
// =============================================================================

/// Displayable content of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub text: String,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// =============================================================================
// Column
// =============================================================================

/// How a column claims horizontal space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Fixed width in characters.
    Fixed(u16),
    /// Share of the remaining width, by weight.
    Flex(u16),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Flex(1)
    }
}

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

type RenderFn<T> = Arc<dyn Fn(&T) -> Cell + Send + Sync>;

/// Describes one column: its key, header label, cell renderer, and whether
/// clicking the header sorts by it.
///
/// # Examples
///
/// ```ignore
/// let columns = vec![
///     ColumnDescriptor::new("name", "Name", |b: &Booking| b.patient.as_str().into())
///         .sortable()
///         .flex(2),
///     ColumnDescriptor::new("amount", "Amount", |b: &Booking| b.amount.to_string().into())
///         .fixed(10)
///         .align(Alignment::Right),
/// ];
/// ```
pub struct ColumnDescriptor<T> {
    key: String,
    header: String,
    sortable: bool,
    width: ColumnWidth,
    align: Alignment,
    render: RenderFn<T>,
}

impl<T> ColumnDescriptor<T> {
    /// Create a column. Columns are not sortable unless [`sortable`](Self::sortable) is called.
    pub fn new(
        key: impl Into<String>,
        header: impl Into<String>,
        render: impl Fn(&T) -> Cell + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            width: ColumnWidth::default(),
            align: Alignment::Left,
            render: Arc::new(render),
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Set a fixed width for this column.
    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    /// Set a flex width for this column.
    pub fn flex(mut self, weight: u16) -> Self {
        self.width = ColumnWidth::Flex(weight);
        self
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    pub fn alignment(&self) -> Alignment {
        self.align
    }

    /// Render this column's cell for a record.
    ///
    /// Panics inside the renderer propagate to the caller.
    pub fn render(&self, record: &T) -> Cell {
        (self.render)(record)
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            width: self.width,
            align: self.align,
            render: Arc::clone(&self.render),
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("align", &self.align)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ColumnSet
// =============================================================================

/// The immutable, validated column set of one grid.
#[derive(Debug, Clone)]
pub struct ColumnSet<T> {
    columns: Vec<ColumnDescriptor<T>>,
}

impl<T> ColumnSet<T> {
    /// Validate and wrap column descriptors.
    ///
    /// Fails on duplicate keys.
    pub fn new(columns: Vec<ColumnDescriptor<T>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.key.as_str()) {
                return Err(GridError::DuplicateColumn(column.key.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor<T>> {
        self.columns.get(index)
    }

    /// Find a column by key.
    pub fn find(&self, key: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor<T>> {
        self.columns.iter()
    }

    /// Keys of all sortable columns, in display order.
    pub fn sortable_keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.sortable)
            .map(|c| c.key.clone())
            .collect()
    }

    /// Render every cell of a record, in column order.
    pub fn render_row(&self, record: &T) -> Vec<Cell> {
        self.columns.iter().map(|c| c.render(record)).collect()
    }
}

impl<'a, T> IntoIterator for &'a ColumnSet<T> {
    type Item = &'a ColumnDescriptor<T>;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
