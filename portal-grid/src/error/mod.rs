//! Error types

mod grid;
mod source;

pub use grid::*;
pub use source::*;
