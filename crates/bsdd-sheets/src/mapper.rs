//! Row mapping
//!
//! Each row becomes a fresh copy of its kind's template with every
//! recognized column overwritten by the coerced cell value. Columns the
//! template does not know are reported once per row-set and dropped.

use chrono::{FixedOffset, NaiveDateTime, SecondsFormat, TimeZone};
use serde_json::{Map, Number, Value};

use bsdd_sheets_core::CellValue;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConvertError, ConvertResult};
use crate::literal::{looks_like_list, parse_list_literal, LiteralError};
use crate::source::{Row, RowSet};
use crate::template::Template;

/// Largest integer an f64 holds exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A mapped object and the sheet row it came from
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    /// 1-based sheet row number
    pub number: u32,
    pub object: Map<String, Value>,
}

/// Maps the rows of one row-set onto its template
#[derive(Debug)]
pub struct RowMapper<'a> {
    row_set: &'a RowSet,
    template: &'static Template,
    /// Per header: whether the template has a field of that name
    recognized: Vec<bool>,
    utc_offset: FixedOffset,
}

impl<'a> RowMapper<'a> {
    /// Prepare a mapper, reporting every unrecognized header once. A row-set
    /// without rows reports nothing.
    pub fn new(row_set: &'a RowSet, utc_offset: FixedOffset, diagnostics: &mut Diagnostics) -> Self {
        let template = row_set.kind().template();
        let recognized = row_set
            .headers()
            .iter()
            .map(|header| {
                let known = template.contains(header);
                // No rows, nothing was dropped
                if !known && !row_set.is_empty() {
                    diagnostics.push(Diagnostic::UnknownColumn {
                        sheet: row_set.sheet_name().to_string(),
                        column: header.clone(),
                    });
                }
                known
            })
            .collect();

        Self {
            row_set,
            template,
            recognized,
            utc_offset,
        }
    }

    /// Map one row of the row-set
    pub fn map_row(&self, row: &Row) -> ConvertResult<Map<String, Value>> {
        let mut object = self.template.instantiate();

        let columns = self.row_set.headers().iter().zip(&self.recognized);
        for ((header, known), cell) in columns.zip(row.values()) {
            if !*known {
                continue;
            }
            let value = cell_to_json(cell, self.utc_offset).map_err(|e| {
                ConvertError::ListLiteral {
                    sheet: self.row_set.sheet_name().to_string(),
                    row: row.number(),
                    field: header.clone(),
                    message: e.to_string(),
                }
            })?;
            // Existing key: the template's position is kept
            object.insert(header.clone(), value);
        }

        Ok(object)
    }

    /// Map every row, in sheet order
    pub fn map_all(&self) -> ConvertResult<Vec<MappedRow>> {
        self.row_set
            .rows()
            .iter()
            .map(|row| {
                Ok(MappedRow {
                    number: row.number(),
                    object: self.map_row(row)?,
                })
            })
            .collect()
    }
}

/// Coerce one cell to JSON.
///
/// Empty, error and empty-string cells become `null`, integral numbers
/// become integers, `TRUE`/`FALSE` text becomes a boolean, dates become
/// RFC 3339 strings at `utc_offset`, and `[...]` text is parsed as a list
/// literal. Formulas contribute their cached value.
pub fn cell_to_json(cell: &CellValue, utc_offset: FixedOffset) -> Result<Value, LiteralError> {
    let value = match cell.effective_value() {
        CellValue::Empty | CellValue::Error(_) | CellValue::Formula { .. } => Value::Null,
        CellValue::Boolean(b) => Value::Bool(*b),
        CellValue::Number(n) => number_to_json(*n),
        CellValue::DateTime(dt) => datetime_to_json(dt, utc_offset),
        CellValue::String(s) => return text_to_json(s.as_str()),
    };
    Ok(value)
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        Value::Number((n as i64).into())
    } else {
        // NaN and infinities have no JSON form
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn datetime_to_json(dt: &NaiveDateTime, utc_offset: FixedOffset) -> Value {
    utc_offset
        .from_local_datetime(dt)
        .single()
        .map_or(Value::Null, |dt| {
            Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
        })
}

fn text_to_json(text: &str) -> Result<Value, LiteralError> {
    if text.is_empty() {
        return Ok(Value::Null);
    }
    if looks_like_list(text) {
        return parse_list_literal(text);
    }
    Ok(match text {
        "TRUE" => Value::Bool(true),
        "FALSE" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    })
}
