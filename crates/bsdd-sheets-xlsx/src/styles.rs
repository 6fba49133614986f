//! XLSX styles (styles.xml) reading
//!
//! Fonts, fills and borders do not matter for conversion. What matters is the
//! number format of every cell format record (`cellXfs/xf`), since that is the
//! only place a workbook records that a number is a date.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use bsdd_sheets_core::NumberFormat;

const PART: &str = "xl/styles.xml";

/// Number formats of a workbook's cell formats, indexed by the `s` attribute
/// of a cell.
#[derive(Debug, Clone, Default)]
pub(crate) struct CellFormats {
    formats: Vec<NumberFormat>,
}

impl CellFormats {
    /// Whether the cell format at `style_idx` displays dates. Unknown indices
    /// are treated as General.
    pub(crate) fn is_date(&self, style_idx: u32) -> bool {
        self.formats
            .get(style_idx as usize)
            .map_or(false, NumberFormat::is_date_format)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.formats.len()
    }
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<CellFormats> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom_codes: HashMap<u32, String> = HashMap::new();
    let mut xf_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => xf_ids.push(num_fmt_id(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_codes.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => xf_ids.push(num_fmt_id(&e)),
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::xml(PART, e)),
            _ => {}
        }
        buf.clear();
    }

    let formats = xf_ids
        .into_iter()
        .map(|id| NumberFormat::from_id(id, custom_codes.get(&id).map(String::as_str)))
        .collect();

    Ok(CellFormats { formats })
}

fn num_fmt_id(e: &BytesStart<'_>) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"numFmtId")
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
}
