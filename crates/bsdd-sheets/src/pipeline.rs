//! Conversion pipeline
//!
//! Load every row-set, map the single Domain row, attach classifications,
//! materials and properties to it, link the child row-sets in order, then
//! prune nulls unless asked to keep them. Any error stops the run.

use std::path::Path;

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use crate::link::{link_children, LINK_ORDER};
use crate::mapper::{MappedRow, RowMapper};
use crate::options::ConvertOptions;
use crate::prune::prune_nulls_in_place;
use crate::sink::write_json;
use crate::source::{RowSet, TabularSource, WorkbookSource};
use crate::template::EntityKind;

/// Top-level lists of the domain and the kinds that fill them
const TOP_LEVEL: [(EntityKind, &str); 3] = [
    (EntityKind::Classification, "Classifications"),
    (EntityKind::Material, "Materials"),
    (EntityKind::Property, "Properties"),
];

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// The bSDD JSON document
    pub document: Value,
    /// Non-fatal problems found on the way
    pub diagnostics: Diagnostics,
}

/// Converts template workbooks to bSDD JSON
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the row-sets of `source` into one document
    pub fn convert<S: TabularSource + ?Sized>(&self, source: &S) -> ConvertResult<Conversion> {
        let _span = tracing::info_span!("convert").entered();
        let mut diagnostics = Diagnostics::new();

        // Every sheet is loaded before anything is mapped, so a missing
        // sheet is reported ahead of row-level errors.
        let row_sets = EntityKind::ALL
            .iter()
            .map(|kind| source.row_set(self.options.layouts.get(*kind), &mut diagnostics))
            .collect::<ConvertResult<Vec<RowSet>>>()?;
        let row_set = |kind: EntityKind| &row_sets[kind as usize];

        let mut domain = self.map_domain(row_set(EntityKind::Domain), &mut diagnostics)?;

        for (kind, field) in TOP_LEVEL {
            let objects = self
                .map_rows(row_set(kind), &mut diagnostics)?
                .into_iter()
                .map(|row| Value::Object(row.object))
                .collect();
            domain.insert(field.to_string(), Value::Array(objects));
        }

        for spec in &LINK_ORDER {
            let children = row_set(spec.child);
            let mapped = self.map_rows(children, &mut diagnostics)?;
            link_children(&mut domain, spec, children.sheet_name(), mapped)?;
        }

        let mut document = Value::Object(domain);
        if !self.options.keep_nulls {
            prune_nulls_in_place(&mut document);
        }

        tracing::info!(
            classifications = row_set(EntityKind::Classification).len(),
            materials = row_set(EntityKind::Material).len(),
            properties = row_set(EntityKind::Property).len(),
            diagnostics = diagnostics.len(),
            "conversion finished"
        );

        Ok(Conversion {
            document,
            diagnostics,
        })
    }

    fn map_rows(
        &self,
        row_set: &RowSet,
        diagnostics: &mut Diagnostics,
    ) -> ConvertResult<Vec<MappedRow>> {
        RowMapper::new(row_set, self.options.utc_offset, diagnostics).map_all()
    }

    fn map_domain(
        &self,
        row_set: &RowSet,
        diagnostics: &mut Diagnostics,
    ) -> ConvertResult<Map<String, Value>> {
        let mut rows = self.map_rows(row_set, diagnostics)?;
        match rows.pop() {
            Some(row) if rows.is_empty() => Ok(row.object),
            _ => Err(ConvertError::DomainRowCount {
                found: row_set.len(),
            }),
        }
    }
}

/// Convert the workbook at `input` and write the document to `output`.
/// Nothing is written when conversion fails.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> ConvertResult<Conversion> {
    let source = WorkbookSource::open(input)?;
    let conversion = Converter::new(options).convert(&source)?;
    write_json(&conversion.document, output)?;
    Ok(conversion)
}
