//! # bsdd-sheets
//!
//! Convert workbooks that follow the bSDD Excel import template into the
//! nested bSDD JSON import format.
//!
//! A template workbook holds one sheet per kind of object (Domain,
//! Classification, Material, Property, ClassificationProperty,
//! ClassificationRelation, PropertyValue, PropertyRelation). Each row becomes
//! a JSON object; child rows are attached to their parents by code.
//!
//! ## Features
//!
//! - Template field order is kept in the output
//! - `[...]` cells are parsed into JSON lists
//! - Date cells become RFC 3339 strings at a configurable UTC offset
//! - Nulls are pruned unless asked to keep them
//! - Unknown columns are reported as [`Diagnostic`]s, never printed
//!
//! ## Example
//!
//! ```rust,no_run
//! use bsdd_sheets::prelude::*;
//!
//! let conversion = convert_file("template.xlsx", "domain.json", ConvertOptions::default())?;
//! for diagnostic in &conversion.diagnostics {
//!     eprintln!("warning: {}", diagnostic);
//! }
//! # Ok::<(), bsdd_sheets::ConvertError>(())
//! ```

pub mod diagnostics;
pub mod error;
pub mod link;
pub mod literal;
pub mod mapper;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod prune;
pub mod sink;
pub mod source;
pub mod template;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{ConvertError, ConvertResult};
pub use link::{link_children, LinkSpec, ParentScope, LINK_ORDER};
pub use literal::{parse_list_literal, LiteralError};
pub use mapper::{cell_to_json, MappedRow, RowMapper};
pub use options::{ConvertOptions, SheetLayout, SheetLayouts};
pub use pipeline::{convert_file, Conversion, Converter};
pub use prune::{prune_nulls, prune_nulls_in_place};
pub use sink::{render_json, write_json};
pub use source::{Row, RowSet, TabularSource, WorkbookSource};
pub use template::{EntityKind, FieldDefault, Template};

// Re-export the cell model and reader for custom sources
pub use bsdd_sheets_core::{CellValue, ColumnSpan, Workbook, Worksheet};
pub use bsdd_sheets_xlsx::{XlsxError, XlsxReader};
