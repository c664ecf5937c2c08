use anyhow::{Result, bail};

use crate::model::{ClassesNeeded, OverallSummary, ParsedRecord, SubjectAdvice, attendance_percentage};

pub const DEFAULT_MINIMUM_PERCENTAGE: f64 = 75.0;
/// Minimum after the 10% medical relief.
pub const RELIEF_PERCENTAGE: f64 = 65.0;

pub fn validate_minimum_percentage(minimum_percentage: f64) -> Result<f64> {
    if !minimum_percentage.is_finite() || minimum_percentage <= 0.0 || minimum_percentage >= 100.0 {
        bail!("minimum percentage must be between 0 and 100 (exclusive), got {minimum_percentage}");
    }

    Ok(minimum_percentage)
}

pub fn classes_needed(present: u32, total: u32, minimum_percentage: f64) -> ClassesNeeded {
    let current_percentage = attendance_percentage(present, total);
    let is_above_minimum = current_percentage >= minimum_percentage;
    let required = (minimum_percentage * f64::from(total) / 100.0).ceil() as u32;

    if is_above_minimum {
        ClassesNeeded {
            can_miss: present.saturating_sub(required),
            need_to_attend: 0,
            current_percentage,
            is_above_minimum,
        }
    } else {
        ClassesNeeded {
            can_miss: 0,
            need_to_attend: required.saturating_sub(present),
            current_percentage,
            is_above_minimum,
        }
    }
}

pub fn subject_advice(record: &ParsedRecord, minimum_percentage: f64) -> SubjectAdvice {
    SubjectAdvice {
        name: record.name.clone(),
        minimum: classes_needed(record.present, record.total, minimum_percentage),
        relief: classes_needed(record.present, record.total, RELIEF_PERCENTAGE),
    }
}

pub fn overall_summary(records: &[ParsedRecord], minimum_percentage: f64) -> Option<OverallSummary> {
    if records.is_empty() {
        return None;
    }

    let total = records
        .iter()
        .fold(0u32, |sum, record| sum.saturating_add(record.total));
    let present = records
        .iter()
        .fold(0u32, |sum, record| sum.saturating_add(record.present));

    Some(OverallSummary {
        total,
        present,
        absent: total.saturating_sub(present),
        percentage: attendance_percentage(present, total),
        advice: classes_needed(present, total, minimum_percentage),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_needed_below_minimum_counts_required_attendance() {
        let result = classes_needed(15, 30, 75.0);
        assert!(!result.is_above_minimum);
        assert_eq!(result.need_to_attend, 8);
        assert_eq!(result.can_miss, 0);
        assert!((result.current_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn classes_needed_above_minimum_counts_spare_absences() {
        let result = classes_needed(31, 34, 75.0);
        assert!(result.is_above_minimum);
        assert_eq!(result.can_miss, 5);
        assert_eq!(result.need_to_attend, 0);
    }

    #[test]
    fn classes_needed_with_no_sessions_is_below_minimum() {
        let result = classes_needed(0, 0, 75.0);
        assert!(!result.is_above_minimum);
        assert_eq!(result.need_to_attend, 0);
        assert_eq!(result.current_percentage, 0.0);
    }

    #[test]
    fn overall_summary_sums_all_records() {
        let records = vec![
            ParsedRecord::new("A".to_string(), 20, 15, 5, None),
            ParsedRecord::new("B".to_string(), 10, 10, 0, None),
        ];

        let summary = overall_summary(&records, 75.0).expect("summary for non-empty records");
        assert_eq!(summary.total, 30);
        assert_eq!(summary.present, 25);
        assert_eq!(summary.absent, 5);
        assert!(summary.advice.is_above_minimum);
        assert!(overall_summary(&[], 75.0).is_none());
    }

    #[test]
    fn subject_advice_includes_relief_threshold() {
        let record = ParsedRecord::new("Physics".to_string(), 20, 14, 6, None);
        let advice = subject_advice(&record, 75.0);

        assert!(!advice.minimum.is_above_minimum);
        assert_eq!(advice.minimum.need_to_attend, 1);
        assert!(advice.relief.is_above_minimum);
        assert_eq!(advice.relief.can_miss, 1);
    }

    #[test]
    fn validate_minimum_percentage_rejects_out_of_range_values() {
        assert!(validate_minimum_percentage(0.0).is_err());
        assert!(validate_minimum_percentage(100.0).is_err());
        assert!(validate_minimum_percentage(f64::NAN).is_err());
        assert_eq!(validate_minimum_percentage(75.0).expect("75 is valid"), 75.0);
    }
}
