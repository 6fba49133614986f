//! Common utilities for conversion tests.
//!
//! Template workbooks are built in memory: five banner rows, the header row
//! on row 6 starting at column C, data rows below.

#![allow(dead_code)]

pub use bsdd_sheets_xlsx::test_utils::{FixtureBook, FixtureCell, DATE_STYLE};

/// Sheets of the bSDD template, in workbook order
pub const SHEETS: [&str; 8] = [
    "Domain",
    "Classification",
    "Material",
    "Property",
    "ClassificationProperty",
    "ClassificationRelation",
    "PropertyValue",
    "PropertyRelation",
];

pub fn text(s: &str) -> Option<FixtureCell> {
    Some(FixtureCell::Shared(s.to_string()))
}

pub fn num(n: f64) -> Option<FixtureCell> {
    Some(FixtureCell::Number(n))
}

pub fn date(serial: f64) -> Option<FixtureCell> {
    Some(FixtureCell::Styled(serial, DATE_STYLE))
}

pub fn empty() -> Option<FixtureCell> {
    None
}

/// Builder for template workbooks
#[derive(Default)]
pub struct TemplateBook {
    sheets: Vec<(String, Vec<String>, Vec<Vec<Option<FixtureCell>>>)>,
}

impl TemplateBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(
        mut self,
        name: &str,
        headers: &[&str],
        rows: Vec<Vec<Option<FixtureCell>>>,
    ) -> Self {
        self.sheets.push((
            name.to_string(),
            headers.iter().map(|h| h.to_string()).collect(),
            rows,
        ));
        self
    }

    /// Package bytes with every template sheet; sheets not given hold only
    /// the banner
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_without(&[])
    }

    /// Like [`TemplateBook::to_bytes`], leaving out the named sheets
    pub fn to_bytes_without(&self, skip: &[&str]) -> Vec<u8> {
        let mut book = FixtureBook::new();
        for name in SHEETS.iter().filter(|n| !skip.contains(*n)) {
            let (headers, rows) = self
                .sheets
                .iter()
                .find(|(n, _, _)| n == name)
                .map(|(_, h, r)| (h.clone(), r.clone()))
                .unwrap_or_default();

            let mut table: Vec<Vec<Option<FixtureCell>>> = vec![
                vec![text("bSDD import template")],
                vec![text(name)],
                vec![],
                vec![],
                vec![],
                headers.iter().map(|h| text(h)).collect(),
            ];
            table.extend(rows);
            book = book.table(name, "C1", table);
        }
        book.to_bytes()
    }

    /// Write the package into `dir` as `template.xlsx`
    pub fn write_to(&self, dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("template.xlsx");
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}
