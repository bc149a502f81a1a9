//! Dataset fields and generations (cohorts) known to the cleaner service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One uploadable dataset. The form field name is what the service expects
/// in the multipart body of `POST /clean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetField {
    Attendance,
    Award,
    Certificate,
    Grade,
    Volunteerism,
    Label,
}

impl DatasetField {
    /// All fields in display order.
    pub const ALL: [DatasetField; 6] = [
        DatasetField::Attendance,
        DatasetField::Award,
        DatasetField::Certificate,
        DatasetField::Grade,
        DatasetField::Volunteerism,
        DatasetField::Label,
    ];

    pub fn form_name(&self) -> &'static str {
        match self {
            DatasetField::Attendance => "attendance_file",
            DatasetField::Award => "award_file",
            DatasetField::Certificate => "certificate_file",
            DatasetField::Grade => "grade_file",
            DatasetField::Volunteerism => "volunteerism_file",
            DatasetField::Label => "label_file",
        }
    }

    /// Dataset name as it appears in `/students` rows (form name minus `_file`).
    pub fn dataset_name(&self) -> &'static str {
        let name = self.form_name();
        name.strip_suffix("_file").unwrap_or(name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatasetField::Attendance => "출결 데이터",
            DatasetField::Award => "수상 데이터",
            DatasetField::Certificate => "자격증 데이터",
            DatasetField::Grade => "성적 데이터",
            DatasetField::Volunteerism => "봉사 데이터",
            DatasetField::Label => "레이블 데이터",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DatasetField::Attendance => "학생별 출석 시트를 업로드하세요.",
            DatasetField::Award => "교내·외 수상 실적을 포함한 시트를 첨부합니다.",
            DatasetField::Certificate => "취득 자격증 목록 시트를 업로드하세요.",
            DatasetField::Grade => "학기별 성적표 또는 누적 성적 시트를 첨부합니다.",
            DatasetField::Volunteerism => "봉사 시간/활동 내역이 담긴 시트를 업로드하세요.",
            DatasetField::Label => "모델 학습에 사용할 정답 레이블 시트를 업로드하세요.",
        }
    }

    /// Resolves either the form name (`grade_file`) or the dataset name (`grade`).
    pub fn lookup(name: &str) -> Option<DatasetField> {
        DatasetField::ALL
            .into_iter()
            .find(|f| f.form_name() == name || f.dataset_name() == name)
    }
}

impl fmt::Display for DatasetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_name())
    }
}

impl FromStr for DatasetField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetField::lookup(s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("unknown dataset field: {}", s)))
    }
}

/// Human label for a dataset name returned by the service, falling back to the raw name.
pub fn dataset_label(name: &str) -> &str {
    DatasetField::lookup(name).map(|f| f.label()).unwrap_or(name)
}

/// A student cohort ("기수").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation {
    pub value: u32,
    pub year: i32,
}

impl Generation {
    pub fn label(&self) -> String {
        format!("{}기", self.value)
    }
}

/// Generations the upload panel and browser tabs offer.
pub const GENERATIONS: [Generation; 4] = [
    Generation { value: 1, year: 2021 },
    Generation { value: 2, year: 2022 },
    Generation { value: 3, year: 2023 },
    Generation { value: 4, year: 2024 },
];

/// The latest catalog generation.
pub const DEFAULT_GENERATION: u32 = GENERATIONS[GENERATIONS.len() - 1].value;

pub fn generation(value: u32) -> Option<Generation> {
    GENERATIONS.iter().copied().find(|g| g.value == value)
}

/// Generation filter for the student browser: everything, or one cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationTab {
    #[default]
    All,
    Generation(u32),
}

impl GenerationTab {
    /// Query filter to send; `All` sends none.
    pub fn filter(&self) -> Option<u32> {
        match self {
            GenerationTab::All => None,
            GenerationTab::Generation(value) => Some(*value),
        }
    }

    pub fn label(&self) -> String {
        match self {
            GenerationTab::All => "전체".to_string(),
            GenerationTab::Generation(value) => format!("{}기", value),
        }
    }
}

impl FromStr for GenerationTab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(GenerationTab::All);
        }
        match s.parse::<u32>() {
            Ok(value) if value > 0 => Ok(GenerationTab::Generation(value)),
            _ => Err(Error::InvalidInput(format!("invalid generation tab: {}", s))),
        }
    }
}
