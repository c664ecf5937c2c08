use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub name: String,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ParsedRecord {
    pub fn new(name: String, total: u32, present: u32, absent: u32, code: Option<String>) -> Self {
        Self {
            name,
            total,
            present,
            absent,
            percentage: attendance_percentage(present, total),
            code,
        }
    }

    /// Key used for caller-side renames: the subject code when one was detected.
    pub fn rename_key(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }
}

pub fn attendance_percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }

    f64::from(present) / f64::from(total) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassesNeeded {
    pub can_miss: u32,
    pub need_to_attend: u32,
    pub current_percentage: f64,
    pub is_above_minimum: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAdvice {
    pub name: String,
    pub minimum: ClassesNeeded,
    pub relief: ClassesNeeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub percentage: f64,
    pub advice: ClassesNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Text,
    Ocr,
    Candidates,
}

impl RecordSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Ocr => "ocr",
            Self::Candidates => "candidates",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Thresholds {
    pub minimum_percentage: f64,
    pub relief_percentage: f64,
    pub max_total: u32,
    pub max_placeholder_total: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub report_version: u32,
    pub generated_at: String,
    pub source: RecordSource,
    pub source_sha256: String,
    pub thresholds: Thresholds,
    pub record_count: usize,
    pub records: Vec<ParsedRecord>,
    pub advice: Vec<SubjectAdvice>,
    pub overall: Option<OverallSummary>,
}
