//! # bsdd-sheets-core
//!
//! Core data structures for reading bSDD template workbooks.
//!
//! This crate provides the types the readers fill and the converter walks:
//! - [`CellValue`] - Represents cell values (numbers, strings, booleans, errors, dates)
//! - [`CellAddress`] and [`ColumnSpan`] - Cell addressing and whole-column ranges
//! - [`NumberFormat`] - Just enough number-format knowledge to spot dates
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use bsdd_sheets_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_sheet("Domain").unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("C6", "DomainCode").unwrap();
//!
//! // Or using row/column indices (0-based)
//! sheet.set_cell_value_at(6, 2, CellValue::string("ifc")).unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod number_format;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellStorage, CellValue, ColumnSpan, SharedString};
pub use error::{Error, Result};
pub use number_format::NumberFormat;
pub use workbook::{DateSystem, Workbook};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
