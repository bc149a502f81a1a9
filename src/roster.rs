//! Current placement status of a student, derived from field-training and
//! employment records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A field-training or employment record as stored by the managed backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub student_id: String,
    pub company_id: i64,
    pub job_id: i64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Soft-delete marker.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Placement {
    /// Not deleted and not finished before `today`. Open-ended placements are ongoing.
    pub fn is_ongoing(&self, today: NaiveDate) -> bool {
        self.deleted_at.is_none() && self.end_date.is_none_or(|end| today <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Unemployed,
    FieldTraining,
    Employed,
}

impl EmploymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentStatus::Unemployed => "미취업",
            EmploymentStatus::FieldTraining => "현장 실습",
            EmploymentStatus::Employed => "취업",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Employment takes precedence over field training.
pub fn employment_status(
    field_training: &[Placement],
    employment: &[Placement],
    today: NaiveDate,
) -> EmploymentStatus {
    if employment.iter().any(|p| p.is_ongoing(today)) {
        EmploymentStatus::Employed
    } else if field_training.iter().any(|p| p.is_ongoing(today)) {
        EmploymentStatus::FieldTraining
    } else {
        EmploymentStatus::Unemployed
    }
}

/// `YYYY-MM-DD`, or `-` when there is no date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
