//! Defines the data structures exchanged with the cleaning/prediction service.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Outcome of cleaning one uploaded dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CleanResult {
    pub dataset: String,
    /// `"ok"` or `"error"`.
    pub status: String,
    #[serde(default)]
    pub processed_sheets: Option<Vec<String>>,
    #[serde(default)]
    pub sqlite_rows: Option<u64>,
    #[serde(default)]
    pub sqlite_tables: Option<Vec<String>>,
    #[serde(default)]
    pub generation: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl CleanResult {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Response of `POST /clean`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CleanResponse {
    pub request_id: String,
    pub results: Vec<CleanResult>,
    pub success: bool,
    pub generation: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictedStudent {
    pub id: i64,
    pub student_hash: String,
}

/// Response of `POST /predict`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionResponse {
    pub student: PredictedStudent,
    pub prediction: String,
    /// Class label to probability.
    pub probabilities: BTreeMap<String, f64>,
    /// The service sends this as a string or a number.
    pub generation: Value,
    #[serde(default)]
    pub features_used: Vec<String>,
    #[serde(default)]
    pub actual_label: Option<String>,
    #[serde(default)]
    pub model_artifact: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CorrelationRow {
    pub feature: String,
    pub pearson: f64,
    pub absolute: f64,
    pub overlap_rows: u64,
}

/// Response of `GET /analytics/correlation`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CorrelationResponse {
    pub label: String,
    pub rows_received: u64,
    pub rows_used: u64,
    pub features_analyzed: u64,
    #[serde(default)]
    pub skipped_features: Vec<String>,
    pub correlations: Vec<CorrelationRow>,
}

/// One cleaned dataset of one student; rows keep the service's column order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StudentDataset {
    pub dataset: String,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub student_hash: String,
    pub generation: u32,
    #[serde(default)]
    pub datasets: Vec<StudentDataset>,
}

/// Response of `GET /students`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StudentsResponse {
    pub count: u64,
    pub generation: Value,
    #[serde(default)]
    pub sort_by: Vec<String>,
    #[serde(default)]
    pub sort_dir: Vec<String>,
    pub students: Vec<StudentRecord>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PredictionRequest<'a> {
    pub student_hash: &'a str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EncryptedStudentsRequest<'a> {
    pub student_hashes: &'a [String],
}

/// Ciphertext for one student as returned by `POST /students/encrypted`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncryptedStudentPayload {
    pub student_hash: String,
    /// Base64 RSA-OAEP(SHA-256) ciphertext.
    pub encrypted_payload: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StudentsEncryptedResponse {
    pub count: u64,
    pub items: Vec<EncryptedStudentPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prediction_optional_fields_default_to_none() {
        let body = json!({
            "student": { "id": 7, "student_hash": "abc" },
            "prediction": "A",
            "probabilities": { "A": 0.7, "B": 0.3 },
            "generation": "3",
            "features_used": ["attendance_rate"]
        });
        let parsed: PredictionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.actual_label, None);
        assert_eq!(parsed.model_artifact, None);
        assert_eq!(parsed.probabilities["A"], 0.7);
    }

    #[test]
    fn student_rows_keep_column_order() {
        let body = r#"{
            "student_hash": "h1",
            "generation": 2,
            "datasets": [{ "dataset": "grade", "rows": [{ "term": "1-1", "avg": 88.5, "rank": null }] }]
        }"#;
        let parsed: StudentRecord = serde_json::from_str(body).unwrap();
        let keys: Vec<&String> = parsed.datasets[0].rows[0].keys().collect();
        assert_eq!(keys, ["term", "avg", "rank"]);
    }
}
