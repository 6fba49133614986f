//! Tabular source loading
//!
//! A [`TabularSource`] turns one [`SheetLayout`] into a [`RowSet`]: the
//! headers found in the layout's header row and the data rows below it, in
//! sheet order. Conversion only ever sees row-sets, never cells or sheets.

use std::path::Path;

use bsdd_sheets_core::{CellAddress, CellValue, Workbook, Worksheet};
use bsdd_sheets_xlsx::XlsxReader;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConvertError, ConvertResult};
use crate::options::SheetLayout;
use crate::template::EntityKind;

/// Anything that can produce the row-sets of a template workbook
pub trait TabularSource {
    /// Read the row-set described by `layout`. Header problems that do not
    /// stop loading are added to `diagnostics`.
    fn row_set(
        &self,
        layout: &SheetLayout,
        diagnostics: &mut Diagnostics,
    ) -> ConvertResult<RowSet>;
}

/// One data row: values aligned with [`RowSet::headers`]
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    number: u32,
    values: Vec<CellValue>,
}

impl Row {
    pub fn new(number: u32, values: Vec<CellValue>) -> Self {
        Self { number, values }
    }

    /// 1-based row number in the sheet
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }
}

/// The decoded contents of one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    kind: EntityKind,
    sheet_name: String,
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(
        kind: EntityKind,
        sheet_name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            kind,
            sheet_name: sheet_name.into(),
            headers,
            rows,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Column names, in column order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, in sheet order. Linking relies on this order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// [`TabularSource`] over an in-memory workbook
#[derive(Debug)]
pub struct WorkbookSource {
    workbook: Workbook,
}

impl WorkbookSource {
    pub fn new(workbook: Workbook) -> Self {
        Self { workbook }
    }

    /// Read a workbook from disk. Only `.xlsx` and `.xlsm` files are accepted.
    pub fn open<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => {}
            _ => return Err(ConvertError::UnsupportedFormat(path.to_path_buf())),
        }

        let workbook = XlsxReader::read_file(path)?;
        tracing::debug!(
            path = %path.display(),
            sheets = workbook.len(),
            "workbook loaded"
        );
        Ok(Self::new(workbook))
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }
}

impl TabularSource for WorkbookSource {
    fn row_set(
        &self,
        layout: &SheetLayout,
        diagnostics: &mut Diagnostics,
    ) -> ConvertResult<RowSet> {
        let sheet = self
            .workbook
            .sheet_by_name(&layout.sheet_name)
            .ok_or_else(|| ConvertError::MissingSheet(layout.sheet_name.clone()))?;

        let columns = read_headers(sheet, layout, diagnostics);

        let rows: Vec<Row> = sheet
            .row_indices()
            .filter(|&r| r > layout.header_row)
            .filter_map(|r| {
                let values: Vec<CellValue> = columns
                    .iter()
                    .map(|(col, _)| sheet.get_value_at(r, *col))
                    .collect();
                if values.iter().all(CellValue::is_blank) {
                    None
                } else {
                    Some(Row::new(r + 1, values))
                }
            })
            .collect();

        tracing::debug!(
            sheet = %layout.sheet_name,
            columns = columns.len(),
            rows = rows.len(),
            "row-set loaded"
        );

        let headers = columns.into_iter().map(|(_, name)| name).collect();
        Ok(RowSet::new(layout.kind, layout.sheet_name.clone(), headers, rows))
    }
}

/// Named columns of the header row, left to right. Blank headers drop their
/// column; a repeated header drops the later column.
fn read_headers(
    sheet: &Worksheet,
    layout: &SheetLayout,
    diagnostics: &mut Diagnostics,
) -> Vec<(u16, String)> {
    let mut columns: Vec<(u16, String)> = Vec::new();

    for col in layout.columns.columns() {
        let name = match sheet.value_ref_at(layout.header_row, col) {
            Some(cell) => header_text(cell),
            None => continue,
        };
        if name.is_empty() {
            continue;
        }
        if columns.iter().any(|(_, existing)| *existing == name) {
            diagnostics.push(Diagnostic::DuplicateHeader {
                sheet: layout.sheet_name.clone(),
                column: name,
                letters: CellAddress::column_to_letters(col),
            });
            continue;
        }
        columns.push((col, name));
    }

    columns
}

fn header_text(cell: &CellValue) -> String {
    match cell.effective_value() {
        CellValue::Empty | CellValue::Formula { .. } => String::new(),
        CellValue::String(s) => s.as_str().trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
