use std::collections::HashSet;

use crate::model::ParsedRecord;

/// Keeps the first record for every case-insensitive name, preserving order.
pub fn dedupe_by_name(records: Vec<ParsedRecord>) -> Vec<ParsedRecord> {
    let mut seen = HashSet::<String>::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.name.to_lowercase()))
        .collect()
}
