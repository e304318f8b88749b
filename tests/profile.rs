mod common;

use rust_decimal::Decimal;
use stream_importer::{CsvCursor, ImportProfile, NumberLocale, SemanticType, Value};

use common::{TestWorkspace, fixture_path};

#[test]
fn fixture_profile_drives_typed_reads() {
    let profile = ImportProfile::load(&fixture_path("orders_de-profile.yml")).unwrap();
    assert_eq!(profile.locale, NumberLocale::de_de());
    let encoding = profile.resolve_encoding().unwrap();

    let mut cursor = CsvCursor::open(
        &fixture_path("orders_de.csv"),
        encoding,
        profile.locale.clone(),
    )
    .unwrap();
    profile.apply(&mut cursor).unwrap();

    let types: Vec<SemanticType> = cursor
        .column_definitions()
        .iter()
        .map(|d| d.target())
        .collect();
    assert_eq!(
        types,
        vec![
            SemanticType::Int32,
            SemanticType::String,
            SemanticType::Decimal,
            SemanticType::Ignored,
            SemanticType::Ignored,
        ]
    );

    let mut totals = Vec::new();
    while cursor.advance().unwrap().is_row() {
        totals.push(cursor.get_value_by_name("amount").unwrap());
    }
    assert_eq!(
        totals,
        vec![
            Value::Decimal(Decimal::new(123450, 2)),
            Value::Decimal(Decimal::new(9990, 2)),
            Value::Decimal(Decimal::new(5, 1)),
        ]
    );
}

#[test]
fn saved_profile_loads_back_unchanged() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("profile.yml");
    let mut profile = ImportProfile::from_headers(
        &["id".to_string(), "price".to_string()],
        '\t',
        NumberLocale::fr_fr(),
    );
    profile.columns[0].target = SemanticType::Int64;
    profile.columns[1].input = Some("Prix".to_string());
    profile.encoding = Some("windows-1252".to_string());
    profile.save(&path).unwrap();

    let loaded = ImportProfile::load(&path).unwrap();
    assert_eq!(loaded, profile);
    assert_eq!(loaded.resolve_encoding().unwrap(), encoding_rs::WINDOWS_1252);
}

#[test]
fn malformed_profile_reports_path() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.yml", "columns: 5\n");
    let err = ImportProfile::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.yml"));
}
