use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::model::ParsedRecord;

const FALLBACK_NAME: &str = "Subject";

/// Normalizes a structured extraction result. The payload is either a bare array of
/// subjects or an object holding one under `subjects`; rows without sessions are dropped.
pub(super) fn sanitize_candidates(raw: &[u8]) -> Result<Vec<ParsedRecord>> {
    let payload: Value =
        serde_json::from_slice(raw).context("failed to parse structured candidates json")?;

    let subjects = match &payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(object) => match object.get("subjects") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => bail!("structured candidates field `subjects` is not an array"),
            None => &[],
        },
        _ => bail!("structured candidates must be an array or an object with `subjects`"),
    };

    Ok(subjects
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|subject| {
            let total = count_field(subject.get("total"))?;
            if total == 0 {
                return None;
            }

            let present = count_field(subject.get("present")).unwrap_or(0);
            let absent = count_field(subject.get("absent")).unwrap_or(0);
            Some(ParsedRecord::new(
                name_field(subject.get("name")),
                total,
                present,
                absent,
                None,
            ))
        })
        .collect())
}

fn name_field(value: Option<&Value>) -> String {
    let name = match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

fn count_field(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() || number < 0.0 || number > f64::from(u32::MAX) {
        return None;
    }

    Some(number.round() as u32)
}
