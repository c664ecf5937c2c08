use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::ParsedRecord;

/// User-chosen display names keyed by subject code, or by the parsed name when no code
/// was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RenameMap {
    entries: HashMap<String, String>,
}

impl RenameMap {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse rename map {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn apply(&self, records: Vec<ParsedRecord>) -> Vec<ParsedRecord> {
        records
            .into_iter()
            .map(|mut record| {
                if let Some(new_name) = self
                    .entries
                    .get(record.rename_key())
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                {
                    record.name = new_name.to_string();
                }
                record
            })
            .collect()
    }
}

#[cfg(test)]
impl RenameMap {
    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn apply_prefers_code_over_name_as_key() {
        let renames = RenameMap::from_pairs(&[("21CSC201J", "DSA"), ("Subject 1", "Chemistry")]);
        let records = vec![
            ParsedRecord::new(
                "Data Structures".to_string(),
                34,
                31,
                3,
                Some("21CSC201J".to_string()),
            ),
            ParsedRecord::new("Subject 1".to_string(), 10, 8, 2, None),
            ParsedRecord::new("Physics".to_string(), 12, 12, 0, None),
        ];

        let renamed = renames.apply(records);
        assert_eq!(renamed[0].name, "DSA");
        assert_eq!(renamed[1].name, "Chemistry");
        assert_eq!(renamed[2].name, "Physics");
    }

    #[test]
    fn apply_ignores_blank_replacements() {
        let renames = RenameMap::from_pairs(&[("Physics", "   ")]);
        let records = vec![ParsedRecord::new("Physics".to_string(), 12, 12, 0, None)];

        assert_eq!(renames.apply(records)[0].name, "Physics");
    }

    #[test]
    fn load_reads_json_object() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(br#"{"CL": "Class Advisor"}"#)
            .expect("write rename map");

        let renames = RenameMap::load(file.path()).expect("rename map should load");
        assert_eq!(renames.len(), 1);

        let records = vec![ParsedRecord::new(
            "CL".to_string(),
            10,
            9,
            1,
            Some("CL".to_string()),
        )];
        assert_eq!(renames.apply(records)[0].name, "Class Advisor");
    }
}
