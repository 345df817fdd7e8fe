//! Conversion of CSV tables into wide per-visit tables.
//!
//! Both the assessment table and the intervention table have one row per
//! patient: a subject identifier column followed by one column per visit.
//! Visit labels are passed through untouched; interpreting them as cycles is
//! the visit schedule's job.

use std::path::Path;

use tracing::{debug, info};

use onco_model::WideTable;

use crate::csv_table::{CsvTable, read_csv_table};
use crate::error::{IngestError, Result};

/// Column names recognised as the subject identifier when none is given.
const DEFAULT_ID_COLUMNS: &[&str] = &["SUBJID", "USUBJID", "ID", "PATIENT", "SUBJECT"];

fn find_id_column(headers: &[String], requested: Option<&str>) -> Option<usize> {
    match requested {
        Some(name) => headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name.trim())),
        None => headers
            .iter()
            .position(|header| {
                DEFAULT_ID_COLUMNS
                    .iter()
                    .any(|candidate| header.eq_ignore_ascii_case(candidate))
            })
            .or(if headers.is_empty() { None } else { Some(0) }),
    }
}

/// Splits a CSV table into subject identifiers and visit columns.
///
/// With `id_column = None` a conventional identifier column is looked up,
/// falling back to the first column.
pub fn wide_table_from_csv(
    table: &CsvTable,
    id_column: Option<&str>,
    path: &Path,
) -> Result<WideTable> {
    let Some(id_idx) = find_id_column(&table.headers, id_column) else {
        return Err(IngestError::MissingIdColumn {
            column: id_column.unwrap_or_default().to_string(),
            path: path.to_path_buf(),
        });
    };
    let visit_indices: Vec<usize> = (0..table.headers.len())
        .filter(|idx| *idx != id_idx)
        .collect();
    if visit_indices.is_empty() {
        return Err(IngestError::NoVisitColumns {
            path: path.to_path_buf(),
        });
    }
    let visit_labels = visit_indices
        .iter()
        .map(|idx| table.headers[*idx].clone())
        .collect();
    let mut wide = WideTable::new(table.headers[id_idx].clone(), visit_labels);
    for (row_idx, row) in table.rows.iter().enumerate() {
        let subject_id = row.get(id_idx).map(String::as_str).unwrap_or("").trim();
        if subject_id.is_empty() {
            // Header is line 1.
            return Err(IngestError::MissingSubjectId {
                row: row_idx + 2,
                path: path.to_path_buf(),
            });
        }
        let cells = visit_indices
            .iter()
            .map(|idx| row.get(*idx).cloned().unwrap_or_default())
            .collect();
        wide.push_row(subject_id, cells);
    }
    debug!(
        id_column = %wide.id_column,
        visits = wide.visit_labels.len(),
        "split wide table"
    );
    Ok(wide)
}

/// Loads the assessment table: one response category per visit cell.
pub fn read_assessment_table(path: &Path, id_column: Option<&str>) -> Result<WideTable> {
    let table = read_csv_table(path)?;
    let wide = wide_table_from_csv(&table, id_column, path)?;
    info!(
        path = %path.display(),
        patient_count = wide.len(),
        visit_count = wide.visit_labels.len(),
        "loaded assessment table"
    );
    Ok(wide)
}

/// Loads the intervention table: a new-therapy marker per visit cell.
pub fn read_intervention_table(path: &Path, id_column: Option<&str>) -> Result<WideTable> {
    let table = read_csv_table(path)?;
    let wide = wide_table_from_csv(&table, id_column, path)?;
    info!(
        path = %path.display(),
        patient_count = wide.len(),
        visit_count = wide.visit_labels.len(),
        "loaded intervention table"
    );
    Ok(wide)
}
