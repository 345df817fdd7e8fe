use serde::{Deserialize, Serialize};

/// One patient row of a wide per-visit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideRow {
    pub subject_id: String,
    /// Cell text per visit column, aligned with [`WideTable::visit_labels`].
    pub cells: Vec<String>,
}

/// A table with one row per patient and one column per visit.
///
/// Used for both assessment and intervention tables; cell values are kept
/// as text until the derivation engine interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideTable {
    pub id_column: String,
    pub visit_labels: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn new(id_column: impl Into<String>, visit_labels: Vec<String>) -> Self {
        Self {
            id_column: id_column.into(),
            visit_labels,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating cells to the visit column count.
    pub fn push_row(&mut self, subject_id: impl Into<String>, mut cells: Vec<String>) {
        cells.resize(self.visit_labels.len(), String::new());
        self.rows.push(WideRow {
            subject_id: subject_id.into(),
            cells,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
