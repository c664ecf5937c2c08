use std::collections::HashMap;

use anyhow::{Context, Result};
use regex::Regex;

use super::{CLASS_IN_CHARGE_CODE, is_code_like};

const CLASS_IN_CHARGE_LABEL: &str = "CLASS IN CHARGE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegendMap {
    entries: HashMap<String, String>,
}

impl LegendMap {
    pub fn insert(&mut self, code: &str, name: &str) {
        let resolved = if name.eq_ignore_ascii_case(CLASS_IN_CHARGE_LABEL) {
            CLASS_IN_CHARGE_CODE.to_string()
        } else {
            name.to_string()
        };
        self.entries.insert(code.to_ascii_uppercase(), resolved);
    }

    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.entries
            .get(&code.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug)]
pub struct LegendSplit<'a> {
    pub legend: LegendMap,
    pub body_lines: Vec<&'a str>,
}

#[derive(Debug)]
pub struct LegendExtractor {
    marker: Regex,
    entry: Regex,
}

impl LegendExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            marker: Regex::new(r"(?i)^\s*legend\s*:").context("failed to compile legend marker regex")?,
            entry: Regex::new(r"^(\S[\S ]*?)\s*[-–:]\s*(.+)$")
                .context("failed to compile legend entry regex")?,
        })
    }

    /// Splits trimmed input lines at the first legend marker. Lines from the marker onward
    /// never reach record parsing; the ones after it feed the code-to-name map.
    pub fn split<'a>(&self, lines: &[&'a str]) -> LegendSplit<'a> {
        let Some(marker_index) = lines.iter().position(|line| self.marker.is_match(line)) else {
            return LegendSplit {
                legend: LegendMap::default(),
                body_lines: lines.to_vec(),
            };
        };

        let mut legend = LegendMap::default();
        for line in lines.iter().skip(marker_index + 1) {
            if line.is_empty() {
                continue;
            }

            let Some(captures) = self.entry.captures(line) else {
                continue;
            };
            let left = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let right = captures.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            if right.is_empty() {
                continue;
            }

            if let Some(code) = legend_code(left) {
                legend.insert(&code, right);
            }
        }

        LegendSplit {
            legend,
            body_lines: lines[..marker_index].to_vec(),
        }
    }
}

fn legend_code(left: &str) -> Option<String> {
    let code_like = left
        .split(|character: char| !character.is_ascii_alphanumeric())
        .find(|token| is_code_like(token));
    if let Some(code) = code_like {
        return Some(code.to_ascii_uppercase());
    }

    if left.eq_ignore_ascii_case(CLASS_IN_CHARGE_CODE) {
        return Some(CLASS_IN_CHARGE_CODE.to_string());
    }

    None
}
