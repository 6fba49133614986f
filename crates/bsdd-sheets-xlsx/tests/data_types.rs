//! Reading every cell kind a bSDD template can hold.

use std::io::Cursor;

use bsdd_sheets_core::{CellError, CellValue};
use bsdd_sheets_xlsx::test_utils::{
    FixtureBook, FixtureCell, DATETIME_STYLE, DATE_STYLE, DECIMAL_STYLE,
};
use bsdd_sheets_xlsx::XlsxReader;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

#[test]
fn test_read_mixed_cells() {
    let bytes = FixtureBook::new()
        .sheet(
            "Property",
            vec![
                ("C6", FixtureCell::from("Code")),
                ("D6", FixtureCell::from("Name")),
                ("C7", FixtureCell::from("height")),
                ("D7", FixtureCell::Inline("Height & width".into())),
                ("E7", FixtureCell::Number(12.5)),
                ("F7", FixtureCell::Bool(true)),
                ("G7", FixtureCell::Error("#N/A".into())),
                ("H7", FixtureCell::Formula("1+1".into(), 2.0)),
            ],
        )
        .to_bytes();

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.sheet_by_name("Property").unwrap();

    assert_eq!(sheet.get_value("C6").unwrap().as_string(), Some("Code"));
    assert_eq!(sheet.get_value("C7").unwrap().as_string(), Some("height"));
    assert_eq!(
        sheet.get_value("D7").unwrap().as_string(),
        Some("Height & width")
    );
    assert_eq!(sheet.get_value("E7").unwrap(), CellValue::Number(12.5));
    assert_eq!(sheet.get_value("F7").unwrap(), CellValue::Boolean(true));
    assert_eq!(
        sheet.get_value("G7").unwrap(),
        CellValue::Error(CellError::Na)
    );

    let formula = sheet.get_value("H7").unwrap();
    assert_eq!(formula.effective_value(), &CellValue::Number(2.0));
    assert!(sheet.get_value("A1").unwrap().is_empty());
}

#[test]
fn test_styled_numbers_become_dates() {
    let bytes = FixtureBook::new()
        .sheet(
            "Domain",
            vec![
                ("A1", FixtureCell::Styled(44693.0, DATE_STYLE)),
                ("A2", FixtureCell::Styled(44693.75, DATETIME_STYLE)),
                ("A3", FixtureCell::Styled(44693.0, DECIMAL_STYLE)),
            ],
        )
        .to_bytes();

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.sheet(0).unwrap();
    let may_12 = NaiveDate::from_ymd_opt(2022, 5, 12).unwrap();

    assert_eq!(
        sheet.get_value("A1").unwrap(),
        CellValue::DateTime(may_12.and_hms_opt(0, 0, 0).unwrap())
    );
    assert_eq!(
        sheet.get_value("A2").unwrap(),
        CellValue::DateTime(may_12.and_hms_opt(18, 0, 0).unwrap())
    );
    assert_eq!(sheet.get_value("A3").unwrap(), CellValue::Number(44693.0));
}

#[test]
fn test_1904_date_system() {
    let bytes = FixtureBook::new()
        .date_1904()
        .sheet("Domain", vec![("A1", FixtureCell::Styled(43231.0, DATE_STYLE))])
        .to_bytes();

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    assert!(workbook.date_system().is_1904());
    assert_eq!(
        workbook.sheet(0).unwrap().get_value("A1").unwrap(),
        CellValue::DateTime(
            NaiveDate::from_ymd_opt(2022, 5, 12)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
}

#[test]
fn test_sheet_order_and_names() {
    let bytes = FixtureBook::new()
        .sheet("Domain", vec![("A1", "x")])
        .sheet("Classification", vec![("A1", "y")])
        .sheet("Property", vec![("A1", "z")])
        .to_bytes();

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    assert_eq!(
        workbook.sheet_names().collect::<Vec<_>>(),
        vec!["Domain", "Classification", "Property"]
    );
    assert!(workbook.find_sheet("Material").is_err());
}

#[test]
fn test_read_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.xlsx");
    let bytes = FixtureBook::new()
        .sheet("Domain", vec![("B2", 1.0)])
        .to_bytes();
    std::fs::write(&path, bytes).unwrap();

    let workbook = XlsxReader::read_file(&path).unwrap();
    assert_eq!(
        workbook.sheet(0).unwrap().get_value("B2").unwrap(),
        CellValue::Number(1.0)
    );
}

#[test]
fn test_not_a_zip() {
    let result = XlsxReader::read(Cursor::new(b"not a workbook".to_vec()));
    assert!(result.is_err());
}
