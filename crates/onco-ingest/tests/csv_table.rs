use std::fs;
use std::path::PathBuf;

use onco_ingest::{IngestError, read_assessment_table, read_csv_table, read_intervention_table};
use tempfile::TempDir;

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_table_and_skips_blank_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "rs.csv", "ID,C1,C2\n\nP01,SD,PR\n,,\nP02,PD\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["ID", "C1", "C2"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1], vec!["P02", "PD", ""]);
}

#[test]
fn reads_assessment_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(
        &dir,
        "rs.csv",
        "SUBJID,C1,C2,C3,C4\nP01,SD,SD,PR,PD\nP02,SD,SD,SD,\n",
    );
    let table = read_assessment_table(&path, None).expect("read assessments");
    assert_eq!(table.id_column, "SUBJID");
    assert_eq!(table.visit_labels, vec!["C1", "C2", "C3", "C4"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].cells[3], "");
}

#[test]
fn reads_intervention_table_with_named_id() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "anp.csv", "C1,C2,C3,Patient Id\n,,ANP,P01\n");
    let table = read_intervention_table(&path, Some("patient id")).expect("read interventions");
    assert_eq!(table.id_column, "Patient Id");
    assert_eq!(table.rows[0].cells, vec!["", "", "ANP"]);
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_csv_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn empty_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "empty.csv", "\n\n");
    let err = read_csv_table(&path).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
}
