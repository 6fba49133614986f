//! End-to-end conversion of template workbooks.

mod common;

use bsdd_sheets::prelude::*;
use bsdd_sheets::Diagnostic;
use chrono::FixedOffset;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{date, empty, num, text, FixtureCell, TemplateBook};

fn domain_sheet(book: TemplateBook) -> TemplateBook {
    book.sheet(
        "Domain",
        &[
            "ModelVersion",
            "OrganizationCode",
            "DomainCode",
            "DomainVersion",
            "DomainName",
            "ReleaseDate",
            "LanguageIsoCode",
            "LanguageOnly",
        ],
        vec![vec![
            text("1.0"),
            text("bs"),
            text("walls"),
            text("0.1"),
            text("Walls"),
            date(44693.0),
            text("EN"),
            text("FALSE"),
        ]],
    )
}

fn full_template() -> TemplateBook {
    domain_sheet(TemplateBook::new())
        .sheet(
            "Classification",
            &["Code", "Name", "ClassificationType", "RelatedIfcEntityNamesList"],
            vec![
                vec![text("wall"), text("Wall"), text("Class"), text("['IfcWall', 'IfcWallStandardCase']")],
                vec![text("slab"), text("Slab"), text("Class"), empty()],
            ],
        )
        .sheet(
            "Material",
            &["Code", "Name"],
            vec![vec![text("brick"), text("Brick")]],
        )
        .sheet(
            "Property",
            &["Code", "Name", "DataType", "MaxInclusive", "IsDynamic"],
            vec![
                vec![text("colour"), text("Colour"), text("String"), empty(), Some(FixtureCell::Bool(false))],
                vec![text("height"), text("Height"), text("Real"), num(2.5), empty()],
            ],
        )
        .sheet(
            "ClassificationProperty",
            &["(Origin Classification Code)", "Code", "PropertyCode", "IsRequired", "SortNumber"],
            vec![
                vec![text("wall"), text("wall-colour"), text("colour"), text("TRUE"), num(1.0)],
                vec![text("wall"), text("wall-height"), text("height"), text("FALSE"), num(2.0)],
            ],
        )
        .sheet(
            "ClassificationRelation",
            &["(Origin Classification Code)", "RelationType", "RelatedClassificationUri"],
            vec![vec![
                text("slab"),
                text("HasMaterial"),
                text("https://identifier.buildingsmart.org/uri/bs/walls/0.1/class/brick"),
            ]],
        )
        .sheet(
            "PropertyValue",
            &["(Origin Property Code OR ClassificationProperty Code)", "Code", "Value", "SortNumber"],
            vec![
                vec![text("colour"), text("red"), text("Red"), num(1.0)],
                vec![text("colour"), text("blue"), text("Blue"), num(2.0)],
                vec![text("wall-colour"), text("white"), text("White"), empty()],
            ],
        )
        .sheet(
            "PropertyRelation",
            &["(Origin Property)", "RelatedPropertyName", "RelationType"],
            vec![vec![text("height"), text("Length"), text("IsEqualTo")]],
        )
}

fn expected_document() -> Value {
    json!({
        "ModelVersion": "1.0",
        "OrganizationCode": "bs",
        "DomainCode": "walls",
        "DomainVersion": "0.1",
        "DomainName": "Walls",
        "ReleaseDate": "2022-05-12T00:00:00+00:00",
        "LanguageIsoCode": "EN",
        "LanguageOnly": false,
        "Classifications": [
            {
                "Code": "wall",
                "Name": "Wall",
                "ClassificationType": "Class",
                "RelatedIfcEntityNamesList": ["IfcWall", "IfcWallStandardCase"],
                "ClassificationProperties": [
                    {
                        "Code": "wall-colour",
                        "PropertyCode": "colour",
                        "IsRequired": true,
                        "SortNumber": 1,
                        "AllowedValues": [{"Code": "white", "Value": "White"}],
                    },
                    {
                        "Code": "wall-height",
                        "PropertyCode": "height",
                        "IsRequired": false,
                        "SortNumber": 2,
                        "AllowedValues": [],
                    },
                ],
                "ClassificationRelations": [],
                "AllowedValues": [],
            },
            {
                "Code": "slab",
                "Name": "Slab",
                "ClassificationType": "Class",
                "ClassificationProperties": [],
                "ClassificationRelations": [{
                    "RelationType": "HasMaterial",
                    "RelatedClassificationUri": "https://identifier.buildingsmart.org/uri/bs/walls/0.1/class/brick",
                }],
                "AllowedValues": [],
            },
        ],
        "Materials": [{"Code": "brick", "Name": "Brick"}],
        "Properties": [
            {
                "Code": "colour",
                "Name": "Colour",
                "DataType": "String",
                "IsDynamic": false,
                "AllowedValues": [
                    {"Code": "red", "Value": "Red", "SortNumber": 1},
                    {"Code": "blue", "Value": "Blue", "SortNumber": 2},
                ],
                "PropertyRelations": [],
            },
            {
                "Code": "height",
                "Name": "Height",
                "DataType": "Real",
                "MaxInclusive": 2.5,
                "AllowedValues": [],
                "PropertyRelations": [{"RelatedPropertyName": "Length", "RelationType": "IsEqualTo"}],
            },
        ],
    })
}

#[test]
fn test_convert_file_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = full_template().write_to(dir.path());
    let output = dir.path().join("walls.json");

    let conversion = convert_file(&input, &output, ConvertOptions::default()).unwrap();

    assert_eq!(conversion.document, expected_document());
    assert!(conversion.diagnostics.is_empty());

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("{\n  \"ModelVersion\": \"1.0\",\n"));
    assert!(written.ends_with("}\n"));
    let reparsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(reparsed, expected_document());
}

#[test]
fn test_output_follows_template_order() {
    let dir = tempfile::tempdir().unwrap();
    // Columns deliberately out of template order
    let book = TemplateBook::new()
        .sheet(
            "Domain",
            &["DomainName", "DomainCode", "OrganizationCode"],
            vec![vec![text("Walls"), text("walls"), text("bs")]],
        )
        .sheet(
            "Property",
            &["Name", "Code"],
            vec![vec![text("Colour"), text("colour")]],
        );
    let input = book.write_to(dir.path());
    let output = dir.path().join("out.json");

    let conversion = convert_file(&input, &output, ConvertOptions::default()).unwrap();

    let root = conversion.document.as_object().unwrap();
    let keys: Vec<&str> = root.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "OrganizationCode",
            "DomainCode",
            "DomainName",
            "Classifications",
            "Materials",
            "Properties",
        ]
    );
    let property: Vec<&str> = root["Properties"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(property, vec!["Code", "Name", "AllowedValues", "PropertyRelations"]);
}

#[test]
fn test_keep_nulls_and_offset() {
    let dir = tempfile::tempdir().unwrap();
    let input = domain_sheet(TemplateBook::new()).write_to(dir.path());
    let output = dir.path().join("out.json");
    let options = ConvertOptions {
        keep_nulls: true,
        utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        ..ConvertOptions::default()
    };

    let conversion = convert_file(&input, &output, options).unwrap();

    let root = conversion.document.as_object().unwrap();
    assert_eq!(root["ReleaseDate"], json!("2022-05-12T00:00:00+02:00"));
    assert_eq!(root["Status"], Value::Null);
    assert_eq!(root["License"], Value::Null);
    assert_eq!(root.len(), 20);
}

#[test]
fn test_unknown_and_duplicate_columns_are_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let book = domain_sheet(TemplateBook::new()).sheet(
        "Material",
        &["Code", "Colour", "Code", "Name"],
        vec![vec![text("brick"), text("red"), text("ignored"), text("Brick")]],
    );
    let input = book.write_to(dir.path());
    let output = dir.path().join("out.json");

    let conversion = convert_file(&input, &output, ConvertOptions::default()).unwrap();

    assert_eq!(
        conversion.document["Materials"],
        json!([{"Code": "brick", "Name": "Brick"}])
    );
    assert_eq!(
        conversion.diagnostics.into_vec(),
        vec![
            Diagnostic::DuplicateHeader {
                sheet: "Material".into(),
                column: "Code".into(),
                letters: "E".into(),
            },
            Diagnostic::UnknownColumn {
                sheet: "Material".into(),
                column: "Colour".into(),
            },
        ]
    );
}

#[test]
fn test_unresolved_origin_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let book = domain_sheet(TemplateBook::new())
        .sheet("Classification", &["Code"], vec![vec![text("wall")]])
        .sheet(
            "ClassificationProperty",
            &["(Origin Classification Code)", "Code"],
            vec![vec![text("roof"), text("roof-colour")]],
        );
    let input = book.write_to(dir.path());
    let output = dir.path().join("out.json");

    let err = convert_file(&input, &output, ConvertOptions::default()).unwrap_err();

    match err {
        ConvertError::UnresolvedParent {
            sheet, row, code, ..
        } => {
            assert_eq!(sheet, "ClassificationProperty");
            assert_eq!(row, 7);
            assert_eq!(code, "roof");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_malformed_list_literal() {
    let dir = tempfile::tempdir().unwrap();
    let book = domain_sheet(TemplateBook::new()).sheet(
        "Classification",
        &["Code", "Synonyms"],
        vec![
            vec![text("wall"), text("['partition']")],
            vec![text("slab"), text("['floor', ]]")],
        ],
    );
    let input = book.write_to(dir.path());
    let output = dir.path().join("out.json");

    let err = convert_file(&input, &output, ConvertOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        ConvertError::ListLiteral { ref sheet, row: 8, ref field, .. }
            if sheet == "Classification" && field == "Synonyms"
    ));
    assert!(!output.exists());
}

#[test]
fn test_domain_must_have_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let book = TemplateBook::new().sheet(
        "Domain",
        &["DomainCode"],
        vec![vec![text("a")], vec![empty()], vec![text("b")]],
    );
    let input = book.write_to(dir.path());

    let err = convert_file(&input, dir.path().join("out.json"), ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::DomainRowCount { found: 2 }));
}

#[test]
fn test_missing_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.xlsx");
    let bytes = domain_sheet(TemplateBook::new()).to_bytes_without(&["PropertyRelation"]);
    std::fs::write(&path, bytes).unwrap();

    let err = convert_file(&path, dir.path().join("out.json"), ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::MissingSheet(ref name) if name == "PropertyRelation"));
}

#[test]
fn test_custom_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = full_template().write_to(dir.path());

    // Reading only C:D of Property drops DataType and later columns
    let mut options = ConvertOptions::default();
    options
        .layouts
        .set(SheetLayout::new(EntityKind::Property, 5, "C:D".parse().unwrap()));
    let source = WorkbookSource::open(&input).unwrap();
    let conversion = Converter::new(options).convert(&source).unwrap();

    assert_eq!(
        conversion.document["Properties"][1],
        json!({
            "Code": "height",
            "Name": "Height",
            "AllowedValues": [],
            "PropertyRelations": [{"RelatedPropertyName": "Length", "RelationType": "IsEqualTo"}],
        })
    );
}
