//! # bsdd-sheets-xlsx
//!
//! XLSX (Office Open XML) reader for bsdd-sheets.
//!
//! Only what the converter needs is read: sheet names, the date system, shared
//! strings, number formats (to tell dates from numbers) and cell values.
//! Formulas are kept with their cached results and never evaluated.

pub mod date;
pub mod error;
pub mod reader;

mod styles;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use date::excel_serial_to_datetime;
pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
