//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::date::excel_serial_to_datetime;
use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_styles_xml, CellFormats};
use bsdd_sheets_core::{
    CellAddress, CellError, CellValue, DateSystem, SharedString, Workbook, Worksheet,
};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        // _xHHHH_ is exactly 7 bytes
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Where a worksheet part lives in the package
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    path: String,
}

/// Raw state of one `<c>` element while its children are being read
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: u32,
    value: Option<String>,
    formula: Option<String>,
    inline_text: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        log::debug!("Opening workbook {}", path.display());
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_formats = Self::read_styles(&mut archive)?;
        let (sheets, date_1904) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();
        workbook.set_date_system(DateSystem::from_date1904(date_1904));

        for (name, r_id) in sheets {
            let Some(path) = sheet_paths.get(&r_id) else {
                log::warn!("Sheet '{}' has no worksheet relationship ({}), skipped", name, r_id);
                continue;
            };
            let entry = SheetEntry {
                name,
                path: path.clone(),
            };

            let mut worksheet = Worksheet::new(entry.name.as_str());
            Self::read_worksheet(
                &mut archive,
                &entry,
                &mut worksheet,
                &shared_strings,
                &cell_formats,
                date_1904,
            )?;
            log::debug!(
                "Read sheet '{}' from {} ({} cells)",
                entry.name,
                entry.path,
                worksheet.cell_count()
            );
            workbook.push_sheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SharedString>> {
        const PART: &str = "xl/sharedStrings.xml";
        let mut strings = Vec::new();

        let file = match archive.by_name(PART) {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) carry reading hints, not cell text
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => {
                    // <si><t/></si> is an empty string but still takes an index
                    if e.local_name().as_ref() == b"si" {
                        strings.push(SharedString::new(""));
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(SharedString::new(decode_excel_escapes(&current_string)));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    let text = e.unescape().map_err(|err| XlsxError::xml(PART, err))?;
                    current_string.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(PART, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<CellFormats> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(CellFormats::default()),
        }
    }

    /// Read workbook.xml to get sheet names, rIds and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(Vec<(String, String)>, bool)> {
        const PART: &str = "xl/workbook.xml";
        let file = archive
            .by_name(PART)
            .map_err(|_| XlsxError::MissingPart(PART.into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut date_1904 = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"workbookPr" => {
                        date_1904 = attr_value(&e, b"date1904")
                            .map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"));
                    }
                    b"sheet" => {
                        // r:id is namespaced; match on the qualified key so a
                        // plain "id" attribute is not mistaken for it
                        let r_id = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref().ends_with(b":id"))
                            .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()));

                        if let (Some(name), Some(r_id)) = (attr_value(&e, b"name"), r_id) {
                            sheets.push((name, r_id));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(PART, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date_1904))
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        const PART: &str = "xl/_rels/workbook.xml.rels";
        let file = archive
            .by_name(PART)
            .map_err(|_| XlsxError::MissingPart(PART.into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(PART, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the `sheetData` of one worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        entry: &SheetEntry,
        worksheet: &mut Worksheet,
        shared_strings: &[SharedString],
        cell_formats: &CellFormats,
        date_1904: bool,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(&entry.path)
            .map_err(|_| XlsxError::MissingPart(entry.path.clone()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        // Row and column counters for cells that omit the `r` attribute
        let mut next_row: u32 = 0;
        let mut next_col: u16 = 0;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok()) {
                            next_row = r.saturating_sub(1);
                        }
                        next_col = 0;
                    }
                    b"c" => cell = Some(Self::start_cell(&e)),
                    b"v" if cell.is_some() => in_value = true,
                    b"f" if cell.is_some() => in_formula = true,
                    b"is" if cell.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    // A value-less cell (usually style only) still advances the column
                    b"c" => {
                        let pending = Self::start_cell(&e);
                        let addr = Self::locate(&pending, next_row, next_col)?;
                        next_col = addr.col.saturating_add(1);
                    }
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok()) {
                            next_row = r;
                        } else {
                            next_row += 1;
                        }
                        next_col = 0;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(pending) = cell.as_mut() {
                        if in_value || in_formula || in_inline_text {
                            let text = e
                                .unescape()
                                .map_err(|err| XlsxError::xml(&entry.path, err))?;
                            let slot = if in_value {
                                &mut pending.value
                            } else if in_formula {
                                &mut pending.formula
                            } else {
                                &mut pending.inline_text
                            };
                            slot.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            let addr = Self::locate(&pending, next_row, next_col)?;
                            next_col = addr.col.saturating_add(1);
                            let value = Self::resolve_value(
                                &pending,
                                shared_strings,
                                cell_formats,
                                date_1904,
                            )?;
                            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
                        }
                        in_value = false;
                        in_formula = false;
                        in_inline_str = false;
                        in_inline_text = false;
                    }
                    b"row" => {
                        next_row += 1;
                        next_col = 0;
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(&entry.path, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn start_cell(e: &BytesStart<'_>) -> PendingCell {
        PendingCell {
            reference: attr_value(e, b"r"),
            cell_type: attr_value(e, b"t"),
            style: attr_value(e, b"s")
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(0),
            ..PendingCell::default()
        }
    }

    /// Position of a cell: its `r` attribute, or the running row/column when
    /// the writer left `r` out (allowed by the format, used by some exporters)
    fn locate(pending: &PendingCell, row: u32, col: u16) -> XlsxResult<CellAddress> {
        match pending.reference.as_deref() {
            Some(r) => CellAddress::parse(r).map_err(|e| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, e))
            }),
            None => Ok(CellAddress::new(row, col)),
        }
    }

    /// Turn the raw pieces of a cell into a [`CellValue`]
    fn resolve_value(
        pending: &PendingCell,
        shared_strings: &[SharedString],
        cell_formats: &CellFormats,
        date_1904: bool,
    ) -> XlsxResult<CellValue> {
        let raw = match pending.cell_type.as_deref() {
            Some("inlineStr") => pending.inline_text.as_deref(),
            _ => pending.value.as_deref(),
        };

        let value = match raw {
            None => CellValue::Empty,
            Some(raw) => match pending.cell_type.as_deref() {
                // Shared string
                Some("s") => {
                    let idx: usize = raw.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::String(s.clone())
                }

                // Boolean
                Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),

                // Error
                Some("e") => CellError::parse(raw)
                    .map(CellValue::Error)
                    .unwrap_or_else(|| CellValue::string(raw)),

                // Inline or formula string - decode Excel escape sequences
                Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(raw)),

                // ISO 8601 date (strict OOXML)
                Some("d") => parse_iso_datetime(raw)
                    .map(CellValue::DateTime)
                    .unwrap_or_else(|| CellValue::string(raw)),

                // Number (default type or explicit "n"), possibly a styled date
                None | Some("n") => match raw.trim().parse::<f64>() {
                    Ok(n) if cell_formats.is_date(pending.style) => {
                        excel_serial_to_datetime(n, date_1904)
                            .map(CellValue::DateTime)
                            .unwrap_or(CellValue::Number(n))
                    }
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::string(raw),
                },

                // Unknown type - treat as string
                Some(_) => CellValue::string(raw),
            },
        };

        Ok(match pending.formula.as_deref() {
            Some(f) => CellValue::Formula {
                text: if f.starts_with('=') {
                    f.to_string()
                } else {
                    format!("={}", f)
                },
                cached_value: (!value.is_empty()).then(|| Box::new(value)),
            },
            None => value,
        })
    }
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}

/// Unescaped value of the attribute whose local name is `key`
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes_carriage_return() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
    }

    #[test]
    fn test_decode_excel_escapes_multiple() {
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_excel_escapes_underscore() {
        // _x005f_ is an escaped underscore
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        // Incomplete sequences should be left as-is
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d"); // missing trailing _
        assert_eq!(decode_excel_escapes("a_xyz_b"), "a_xyz_b");
    }

    #[test]
    fn test_decode_excel_escapes_uppercase() {
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    fn minimal_package(sheet_xml: &str, extra: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr date1904="false"/><sheets><sheet name="Domain" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options)
                .unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();

            for (name, body) in extra {
                zip.start_file(*name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_sheet() {
        let package = minimal_package(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#,
            &[],
        );
        let workbook = XlsxReader::read(Cursor::new(package)).unwrap();

        assert_eq!(workbook.len(), 1);
        assert_eq!(workbook.sheet(0).unwrap().name(), "Domain");
        assert_eq!(workbook.sheet(0).unwrap().cell_count(), 0);
        assert_eq!(workbook.date_system(), DateSystem::Epoch1900);
    }

    #[test]
    fn test_cells_without_reference_follow_position() {
        let package = minimal_package(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row><c t="inlineStr"><is><t>a</t></is></c><c/><c><v>3</v></c></row><row r="4"><c><v>4</v></c></row></sheetData></worksheet>"#,
            &[],
        );
        let workbook = XlsxReader::read(Cursor::new(package)).unwrap();
        let sheet = workbook.sheet(0).unwrap();

        assert_eq!(sheet.get_value("A1").unwrap().as_string(), Some("a"));
        assert_eq!(sheet.get_value("C1").unwrap().as_number(), Some(3.0));
        assert_eq!(sheet.get_value("A4").unwrap().as_number(), Some(4.0));
    }

    #[test]
    fn test_parse_iso_datetime() {
        let dt = parse_iso_datetime("2022-05-12T08:15:00").unwrap();
        assert_eq!(dt.to_string(), "2022-05-12 08:15:00");
        let d = parse_iso_datetime("2022-05-12").unwrap();
        assert_eq!(d.to_string(), "2022-05-12 00:00:00");
        assert!(parse_iso_datetime("12/05/2022").is_none());
    }

    #[test]
    fn test_missing_content_types() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"not a workbook").unwrap();
            zip.finish().unwrap();
        }

        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
