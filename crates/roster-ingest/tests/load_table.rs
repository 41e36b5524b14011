//! Tests for CSV table loading.

use std::fs;
use std::path::PathBuf;

use roster_ingest::{IngestError, IngestOptions, IngestWarning, load_table};
use roster_model::CellValue;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn loads_headers_and_rows_in_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(
        &dir,
        "results.csv",
        "\u{feff} رقم الجلوس ,الاسم\n1001,أحمد محمد\n1002,فاطمة علي\n",
    );

    let loaded = load_table(&path, &IngestOptions::default()).expect("load csv");
    let table = loaded.table;
    assert_eq!(table.columns, vec!["رقم الجلوس", "الاسم"]);
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.cell(0, 1),
        Some(&CellValue::Text("أحمد محمد".to_string()))
    );
    assert_eq!(
        table.cell(1, 0),
        Some(&CellValue::Text("1002".to_string()))
    );
    assert!(loaded.warnings.is_empty());
}

#[test]
fn drops_blank_rows_and_pads_short_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(&dir, "ragged.csv", "id,name,school\n1,a\n,,\n2,b,c,extra\n");

    let loaded = load_table(&path, &IngestOptions::default()).expect("load csv");
    assert_eq!(loaded.table.len(), 2);
    assert_eq!(loaded.table.cell(0, 2), Some(&CellValue::Missing));
    assert_eq!(loaded.table.rows[1].cells.len(), 3);
    assert_eq!(
        loaded.warnings,
        vec![IngestWarning::ExtraCells { rows: 1 }]
    );
}

#[test]
fn truncation_is_reported_as_warning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut contents = String::from("id,name\n");
    for i in 0..20 {
        contents.push_str(&format!("{i},name {i}\n"));
    }
    let path = write_file(&dir, "big.csv", &contents);

    let options = IngestOptions::default().with_max_rows(Some(5));
    let loaded = load_table(&path, &options).expect("load csv");
    assert_eq!(loaded.table.len(), 5);
    assert!(loaded.was_truncated());
    assert_eq!(loaded.warnings, vec![IngestWarning::Truncated { limit: 5 }]);
    assert_eq!(
        loaded.warnings[0].to_string(),
        "source truncated to the first 5 rows"
    );
}

#[test]
fn limit_equal_to_row_count_is_not_truncation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(&dir, "exact.csv", "id\n1\n2\n3\n");

    let options = IngestOptions::default().with_max_rows(Some(3));
    let loaded = load_table(&path, &options).expect("load csv");
    assert_eq!(loaded.table.len(), 3);
    assert!(!loaded.was_truncated());
}

#[test]
fn header_only_file_is_a_load_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(&dir, "empty.csv", "id,name\n");

    let err = load_table(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::EmptyTable { .. }));
}

#[test]
fn spreadsheets_and_missing_files_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(&dir, "results.xlsx", "not really a workbook");

    let err = load_table(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::UnsupportedFormat { ref extension, .. } if extension == "xlsx"
    ));

    let missing = dir.path().join("missing.csv");
    let err = load_table(&missing, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
