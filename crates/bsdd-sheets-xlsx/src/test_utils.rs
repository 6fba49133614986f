//! In-memory `.xlsx` packages for tests
//!
//! Each test lists the cells it needs and gets back the bytes of a minimal
//! but well-formed package. Enabled by the `test-utils` feature.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use bsdd_sheets_core::CellAddress;
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Style index of the built-in `mm-dd-yy` date format in fixture packages
pub const DATE_STYLE: u32 = 1;
/// Style index of a custom `yyyy-mm-dd hh:mm` format in fixture packages
pub const DATETIME_STYLE: u32 = 2;
/// Style index of a custom non-date `0.000` format in fixture packages
pub const DECIMAL_STYLE: u32 = 3;

/// One cell of a fixture sheet
#[derive(Debug, Clone)]
pub enum FixtureCell {
    /// Text stored in the shared-string table
    Shared(String),
    /// Text stored inline (`t="inlineStr"`)
    Inline(String),
    /// Plain number
    Number(f64),
    /// Number with an explicit style index
    Styled(f64, u32),
    /// Boolean
    Bool(bool),
    /// Error literal such as `#N/A`
    Error(String),
    /// Formula with a cached numeric result
    Formula(String, f64),
}

impl From<&str> for FixtureCell {
    fn from(s: &str) -> Self {
        FixtureCell::Shared(s.to_string())
    }
}

impl From<f64> for FixtureCell {
    fn from(n: f64) -> Self {
        FixtureCell::Number(n)
    }
}

impl From<bool> for FixtureCell {
    fn from(b: bool) -> Self {
        FixtureCell::Bool(b)
    }
}

/// In-memory `.xlsx` builder
#[derive(Debug, Default)]
pub struct FixtureBook {
    sheets: Vec<(String, BTreeMap<(u32, u16), FixtureCell>)>,
    date_1904: bool,
}

impl FixtureBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the 1904 date system
    pub fn date_1904(mut self) -> Self {
        self.date_1904 = true;
        self
    }

    /// Add a sheet with cells given by A1 reference
    ///
    /// # Panics
    ///
    /// Panics on a malformed reference.
    pub fn sheet<C: Into<FixtureCell>>(
        mut self,
        name: &str,
        cells: impl IntoIterator<Item = (&'static str, C)>,
    ) -> Self {
        let cells = cells
            .into_iter()
            .map(|(r, c)| {
                let addr = CellAddress::parse(r).expect("fixture cell reference");
                ((addr.row, addr.col), c.into())
            })
            .collect();
        self.sheets.push((name.to_string(), cells));
        self
    }

    /// Add a sheet whose cells are given row by row starting at `first`
    /// (an A1 reference). `None` leaves a cell empty.
    ///
    /// # Panics
    ///
    /// Panics on a malformed reference.
    pub fn table(
        mut self,
        name: &str,
        first: &str,
        rows: Vec<Vec<Option<FixtureCell>>>,
    ) -> Self {
        let origin = CellAddress::parse(first).expect("fixture origin reference");
        let mut cells = BTreeMap::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                if let Some(cell) = cell {
                    cells.insert((origin.row + r as u32, origin.col + c as u16), cell);
                }
            }
        }
        self.sheets.push((name.to_string(), cells));
        self
    }

    /// Serialize to the bytes of an `.xlsx` package
    ///
    /// # Panics
    ///
    /// Panics if the zip writer fails, which an in-memory buffer does not.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.try_to_bytes().expect("in-memory xlsx package")
    }

    /// Serialize to the bytes of an `.xlsx` package
    pub fn try_to_bytes(&self) -> ZipResult<Vec<u8>> {
        let mut shared: Vec<String> = Vec::new();
        let sheet_xml: Vec<String> = self
            .sheets
            .iter()
            .map(|(_, cells)| render_sheet(cells, &mut shared))
            .collect();

        let mut buf = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#)?;

        let (workbook, rels) = self.workbook_parts();
        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook.as_bytes())?;
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(rels.as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(STYLES.as_bytes())?;

        let mut sst = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            shared.len()
        );
        for s in &shared {
            sst.push_str(&format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(s)));
        }
        sst.push_str("</sst>");
        zip.start_file("xl/sharedStrings.xml", options)?;
        zip.write_all(sst.as_bytes())?;

        for (i, xml) in sheet_xml.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            zip.write_all(xml.as_bytes())?;
        }

        zip.finish()?;
        Ok(buf)
    }

    /// `xl/workbook.xml` and its relationships part
    fn workbook_parts(&self) -> (String, String) {
        let mut workbook = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        if self.date_1904 {
            workbook.push_str(r#"<workbookPr date1904="1"/>"#);
        }
        workbook.push_str("<sheets>");
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, (name, _)) in self.sheets.iter().enumerate() {
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");
        (workbook, rels)
    }
}

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="2"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd\ hh:mm"/><numFmt numFmtId="165" formatCode="0.000"/></numFmts><cellXfs count="4"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/><xf numFmtId="164" applyNumberFormat="1"/><xf numFmtId="165" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

fn render_sheet(cells: &BTreeMap<(u32, u16), FixtureCell>, shared: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    let mut current_row: Option<u32> = None;

    for (&(row, col), cell) in cells {
        if current_row != Some(row) {
            if current_row.is_some() {
                xml.push_str("</row>");
            }
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            current_row = Some(row);
        }
        let r = CellAddress::new(row, col).to_a1_string();
        let body = match cell {
            FixtureCell::Shared(s) => {
                let idx = shared.iter().position(|x| x == s).unwrap_or_else(|| {
                    shared.push(s.clone());
                    shared.len() - 1
                });
                format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, r, idx)
            }
            FixtureCell::Inline(s) => format!(
                r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                r,
                escape(s)
            ),
            FixtureCell::Number(n) => format!(r#"<c r="{}"><v>{}</v></c>"#, r, n),
            FixtureCell::Styled(n, s) => format!(r#"<c r="{}" s="{}"><v>{}</v></c>"#, r, s, n),
            FixtureCell::Bool(b) => {
                format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, r, if *b { 1 } else { 0 })
            }
            FixtureCell::Error(e) => format!(r#"<c r="{}" t="e"><v>{}</v></c>"#, r, escape(e)),
            FixtureCell::Formula(f, v) => {
                format!(r#"<c r="{}"><f>{}</f><v>{}</v></c>"#, r, escape(f), v)
            }
        };
        xml.push_str(&body);
    }
    if current_row.is_some() {
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XlsxReader;

    #[test]
    fn test_package_reads_back() {
        let bytes = FixtureBook::new()
            .date_1904()
            .sheet("Domain", vec![("C6", "DomainCode"), ("C7", "a&b")])
            .table("Property", "B2", vec![vec![Some(FixtureCell::Bool(true)), None]])
            .try_to_bytes()
            .unwrap();

        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        assert!(workbook.date_system().is_1904());
        assert_eq!(
            workbook.sheet_names().collect::<Vec<_>>(),
            vec!["Domain", "Property"]
        );
        let domain = workbook.sheet(0).unwrap();
        assert_eq!(domain.get_value("C7").unwrap().as_string(), Some("a&b"));
        let property = workbook.sheet(1).unwrap();
        assert_eq!(property.cell_count(), 1);
    }
}
