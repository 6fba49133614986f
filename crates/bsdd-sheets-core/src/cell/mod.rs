//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`ColumnSpan`] - A range of whole columns (e.g., "C:AA")
//! - [`CellStorage`] - Sparse per-sheet cell storage

mod address;
mod storage;
mod value;

pub use address::{CellAddress, ColumnSpan};
pub use storage::CellStorage;
pub use value::{CellError, CellValue, SharedString};
