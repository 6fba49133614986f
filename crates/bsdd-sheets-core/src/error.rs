//! Error types for bsdd-sheets-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or addressing the cell model
#[derive(Debug, Error)]
pub enum Error {
    /// Text that is not an A1 reference or a column span
    #[error("'{0}' is not a valid cell reference")]
    InvalidAddress(String),

    /// 0-based row index past the last sheet row
    #[error("row {0} is past the last sheet row ({1})")]
    RowOutOfBounds(u32, u32),

    /// Column letters past XFD
    #[error("column {0} is past the last sheet column (XFD)")]
    ColumnOutOfBounds(String),

    #[error("no sheet named '{0}'")]
    SheetNotFound(String),

    #[error("invalid sheet name {0}")]
    InvalidSheetName(String),

    /// Sheet names are unique regardless of case
    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),
}
