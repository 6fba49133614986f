//! Prelude module - common imports for bsdd-sheets users
//!
//! ```rust
//! use bsdd_sheets::prelude::*;
//! ```

pub use crate::{
    // Entry points
    convert_file,
    Conversion,
    ConvertError,
    ConvertOptions,
    ConvertResult,
    Converter,

    // Diagnostics
    Diagnostic,
    Diagnostics,

    // Sources
    EntityKind,
    SheetLayout,
    SheetLayouts,
    TabularSource,
    WorkbookSource,
};
