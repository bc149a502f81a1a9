//! View models for the prediction and correlation panels.

use serde_json::Value;

use crate::contract::{CorrelationResponse, CorrelationRow, PredictionResponse};
use crate::error::{Error, Result};

/// Shown when the service did not report the true label.
pub const NO_ACTUAL_LABEL: &str = "미제공";

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityEntry {
    pub label: String,
    pub value: f64,
    /// Whether this is the predicted class.
    pub is_prediction: bool,
}

impl ProbabilityEntry {
    pub fn percent(&self) -> String {
        format_percent(self.value)
    }
}

/// A prediction arranged for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionView {
    pub student_hash: String,
    pub prediction: String,
    pub generation: String,
    /// Highest probability first.
    pub probabilities: Vec<ProbabilityEntry>,
    pub actual_label: String,
    pub model_artifact: Option<String>,
    pub features_used: Vec<String>,
}

impl PredictionView {
    pub fn from_response(response: &PredictionResponse) -> Self {
        let mut probabilities: Vec<ProbabilityEntry> = response
            .probabilities
            .iter()
            .map(|(label, value)| ProbabilityEntry {
                label: label.clone(),
                value: *value,
                is_prediction: *label == response.prediction,
            })
            .collect();
        probabilities.sort_by(|a, b| b.value.total_cmp(&a.value));

        Self {
            student_hash: response.student.student_hash.clone(),
            prediction: response.prediction.clone(),
            generation: value_text(&response.generation),
            probabilities,
            actual_label: response
                .actual_label
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| NO_ACTUAL_LABEL.to_string()),
            model_artifact: response.model_artifact.clone(),
            features_used: response.features_used.clone(),
        }
    }

    /// Probability of the most likely class, 0 when there are none.
    pub fn confidence(&self) -> f64 {
        self.probabilities.first().map(|p| p.value).unwrap_or(0.0)
    }

    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence())
    }
}

/// Correlations arranged for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationView {
    pub label: String,
    pub rows_received: u64,
    pub rows_used: u64,
    pub features_analyzed: u64,
    pub skipped_features: Vec<String>,
    /// Strongest absolute correlation first.
    pub correlations: Vec<CorrelationRow>,
}

impl CorrelationView {
    pub fn from_response(response: &CorrelationResponse) -> Self {
        let mut correlations = response.correlations.clone();
        correlations.sort_by(|a, b| b.absolute.total_cmp(&a.absolute));
        Self {
            label: response.label.clone(),
            rows_received: response.rows_received,
            rows_used: response.rows_used,
            features_analyzed: response.features_analyzed,
            skipped_features: response.skipped_features.clone(),
            correlations,
        }
    }

    pub fn top_feature(&self) -> Option<&CorrelationRow> {
        self.correlations.first()
    }
}

/// Parses the custom generation filter typed into the correlation panel.
pub fn parse_generation_filter(input: &str) -> Result<u32> {
    match input.trim().parse::<u32>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(Error::InvalidInput(format!(
            "generation must be a positive integer, got {:?}",
            input.trim()
        ))),
    }
}

/// One decimal place, e.g. `0.7312` → `73.1%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
