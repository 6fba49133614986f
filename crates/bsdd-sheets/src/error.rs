//! Conversion error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for conversion operations
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Errors that abort a conversion. None of them leaves an output file behind.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Workbook could not be read
    #[error("XLSX error: {0}")]
    Xlsx(#[from] bsdd_sheets_xlsx::XlsxError),

    /// Cell model error
    #[error("{0}")]
    Core(#[from] bsdd_sheets_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not an `.xlsx`/`.xlsm` workbook
    #[error("Unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A template sheet is absent from the workbook
    #[error("Missing sheet '{0}'")]
    MissingSheet(String),

    /// A `[...]` cell is not a valid list literal
    #[error("Invalid list literal in sheet '{sheet}', row {row}, field '{field}': {message}")]
    ListLiteral {
        sheet: String,
        row: u32,
        field: String,
        message: String,
    },

    /// The Domain sheet must hold exactly one data row
    #[error("Domain sheet must contain exactly one row, found {found}")]
    DomainRowCount { found: usize },

    /// A child row has no origin code
    #[error("Sheet '{sheet}', row {row}: field '{field}' is empty")]
    MissingOrigin {
        sheet: String,
        row: u32,
        field: String,
    },

    /// No parent has the child's origin code
    #[error("Sheet '{sheet}', row {row}: no {parents} with Code '{code}'")]
    UnresolvedParent {
        sheet: String,
        row: u32,
        code: String,
        parents: String,
    },

    /// More than one parent has the child's origin code
    #[error("Sheet '{sheet}', row {row}: Code '{code}' matches {matches} {parents}")]
    AmbiguousParent {
        sheet: String,
        row: u32,
        code: String,
        parents: String,
        matches: usize,
    },

    /// Finished output could not be moved into place
    #[error("Failed to write '{}': {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
