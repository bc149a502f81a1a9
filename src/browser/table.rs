//! Flattened table model for the student dataset view.

use serde_json::{Map, Value};
use std::fmt;

use crate::catalog::dataset_label;
use crate::contract::StudentRecord;

/// Label for a student that has no datasets at all.
pub const NO_DATASET_LABEL: &str = "데이터 없음";

/// Fields shown per dataset in condensed mode.
const SUMMARY_FIELDS: usize = 4;

/// One table row group: one dataset of one student.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry<'a> {
    pub student: &'a StudentRecord,
    /// 1-based position of the student in the list.
    pub student_index: usize,
    pub dataset_label: String,
    pub rows: &'a [Map<String, Value>],
    /// Union of the rows' keys, in first-seen order.
    pub column_keys: Vec<&'a str>,
    /// True for the first entry of each student (where student cells are drawn).
    pub first_of_student: bool,
    /// Number of entries belonging to this student.
    pub student_span: usize,
}

/// Flattens students into dataset entries. Students without datasets get a
/// single empty entry so they still show up.
pub fn flatten(students: &[StudentRecord]) -> Vec<DatasetEntry<'_>> {
    let mut entries = Vec::new();

    for (index, student) in students.iter().enumerate() {
        if student.datasets.is_empty() {
            entries.push(DatasetEntry {
                student,
                student_index: index + 1,
                dataset_label: NO_DATASET_LABEL.to_string(),
                rows: &[],
                column_keys: Vec::new(),
                first_of_student: true,
                student_span: 1,
            });
            continue;
        }

        let span = student.datasets.len();
        for (position, dataset) in student.datasets.iter().enumerate() {
            entries.push(DatasetEntry {
                student,
                student_index: index + 1,
                dataset_label: dataset_label(&dataset.dataset).to_string(),
                rows: &dataset.rows,
                column_keys: column_keys(&dataset.rows),
                first_of_student: position == 0,
                student_span: span,
            });
        }
    }

    entries
}

fn column_keys(rows: &[Map<String, Value>]) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !keys.contains(&key.as_str()) {
            keys.push(key);
        }
    }
    keys
}

/// Condensed view of a dataset: a few fields of its first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub preview: Vec<(String, String)>,
    /// Rows beyond the first.
    pub more_rows: usize,
}

impl DatasetSummary {
    pub fn is_empty(&self) -> bool {
        self.preview.is_empty() && self.more_rows == 0
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("데이터 행이 없습니다.");
        }
        let fields: Vec<String> = self
            .preview
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        f.write_str(&fields.join(", "))?;
        if self.more_rows > 0 {
            write!(f, " + {}행", self.more_rows)?;
        }
        Ok(())
    }
}

pub fn summarize(rows: &[Map<String, Value>]) -> DatasetSummary {
    let Some(first) = rows.first() else {
        return DatasetSummary {
            preview: Vec::new(),
            more_rows: 0,
        };
    };
    DatasetSummary {
        preview: first
            .iter()
            .take(SUMMARY_FIELDS)
            .map(|(k, v)| (k.clone(), format_cell_value(v)))
            .collect(),
        more_rows: rows.len() - 1,
    }
}

/// Renders one cell: `-` for null, compact JSON for arrays/objects.
pub fn format_cell_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => other.to_string(),
    }
}
