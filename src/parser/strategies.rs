use anyhow::{Context, Result};
use regex::{Captures, Regex};

use super::{CLASS_IN_CHARGE_CODE, code_from_name, contains_code_like_token, is_code_like};

const HEADER_KEYWORDS: [&str; 10] = [
    "th", "tc", "ph", "ah", "total", "present", "absent", "code", "percent", "pct",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub total: Option<u32>,
    pub present: Option<u32>,
    pub absent: Option<u32>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    PortalRow,
    ClassInChargeRow,
    LabeledFields,
    NumericFallback,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PortalRow => "portal_row",
            Self::ClassInChargeRow => "class_in_charge_row",
            Self::LabeledFields => "labeled_fields",
            Self::NumericFallback => "numeric_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub strategy: Strategy,
    pub candidate: Candidate,
    pub lines_consumed: usize,
}

type Attempt = fn(&LineExtractor, &[&str], usize) -> Option<(Candidate, usize)>;

const STRATEGIES: [(Strategy, Attempt); 4] = [
    (Strategy::PortalRow, LineExtractor::attempt_portal_row),
    (Strategy::ClassInChargeRow, LineExtractor::attempt_class_in_charge_row),
    (Strategy::LabeledFields, LineExtractor::attempt_labeled_fields),
    (Strategy::NumericFallback, LineExtractor::attempt_numeric_fallback),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RecoveredName {
    name: Option<String>,
    code: Option<String>,
    has_subject_token: bool,
}

#[derive(Debug)]
pub struct LineExtractor {
    portal_row: Regex,
    class_in_charge_row: Regex,
    total_label: Regex,
    present_label: Regex,
    absent_label: Regex,
    total_keyword: Regex,
    present_keyword: Regex,
    absent_keyword: Regex,
    percent_token: Regex,
    number_token: Regex,
}

impl LineExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            portal_row: Regex::new(
                r"^(.*?)\s+([0-9]+)\s+([0-9]+)\s+([0-9]+)(?:\s+[0-9]+(?:\.[0-9]+)?(?:\s+[0-9]+(?:\.[0-9]+)?)?)?\s*$",
            )
            .context("failed to compile portal row regex")?,
            class_in_charge_row: Regex::new(
                r"(?i)^cl\b[\s:–\-]*([0-9]+(?:\s+[0-9]+){1,2})(?:\s+[0-9]+(?:\.[0-9]+)?\s*%)?\s*$",
            )
            .context("failed to compile class-in-charge row regex")?,
            total_label: Regex::new(r"(?i)\b(?:th|tc|total)\b\s*[:\-]?\s*([0-9]+)")
                .context("failed to compile total label regex")?,
            present_label: Regex::new(r"(?i)\b(?:ph|present)\b\s*[:\-]?\s*([0-9]+)")
                .context("failed to compile present label regex")?,
            absent_label: Regex::new(r"(?i)\b(?:ah|absent)\b\s*[:\-]?\s*([0-9]+)")
                .context("failed to compile absent label regex")?,
            total_keyword: Regex::new(r"(?i)\b(?:total|th|tc)\b")
                .context("failed to compile total keyword regex")?,
            present_keyword: Regex::new(r"(?i)\b(?:present|ph)\b")
                .context("failed to compile present keyword regex")?,
            absent_keyword: Regex::new(r"(?i)\b(?:absent|ah)\b")
                .context("failed to compile absent keyword regex")?,
            percent_token: Regex::new(r"[0-9]+(?:\.[0-9]+)?\s*%")
                .context("failed to compile percent token regex")?,
            number_token: Regex::new(r"\b[0-9]+(?:\.[0-9]+)?\b")
                .context("failed to compile number token regex")?,
        })
    }

    /// Runs the strategies in priority order against `lines[index]`; the first one that
    /// produces a candidate wins. `lines_consumed` is 2 when the numeric fallback borrowed
    /// the following line.
    pub fn extract(&self, lines: &[&str], index: usize) -> Option<Extraction> {
        STRATEGIES.iter().find_map(|(strategy, attempt)| {
            attempt(self, lines, index).map(|(candidate, lines_consumed)| Extraction {
                strategy: *strategy,
                candidate,
                lines_consumed,
            })
        })
    }

    fn attempt_portal_row(&self, lines: &[&str], index: usize) -> Option<(Candidate, usize)> {
        let line = lines.get(index)?;
        let captures = self.portal_row.captures(line)?;

        let name = normalize_whitespace(captures.get(1)?.as_str());
        if name.is_empty() {
            return None;
        }

        let total = capture_count(&captures, 2)?;
        let present = capture_count(&captures, 3)?;
        let absent = capture_count(&captures, 4)?;
        if present > total || absent > total {
            return None;
        }

        let code = code_from_name(&name);
        Some((
            Candidate {
                name: Some(name),
                code,
                total: Some(total),
                present: Some(present),
                absent: Some(absent),
            },
            1,
        ))
    }

    fn attempt_class_in_charge_row(
        &self,
        lines: &[&str],
        index: usize,
    ) -> Option<(Candidate, usize)> {
        let line = lines.get(index)?;
        let captures = self.class_in_charge_row.captures(line)?;
        let numbers = captures
            .get(1)?
            .as_str()
            .split_whitespace()
            .filter_map(|token| token.parse::<u32>().ok())
            .collect::<Vec<u32>>();

        let (total, present, absent) = match numbers.as_slice() {
            [total, present, absent] => (*total, *present, *absent),
            [first, second] => {
                let total = (*first).max(*second);
                let present = (*first).min(*second);
                (total, present, total - present)
            }
            _ => return None,
        };

        Some((
            Candidate {
                name: Some(CLASS_IN_CHARGE_CODE.to_string()),
                code: Some(CLASS_IN_CHARGE_CODE.to_string()),
                total: Some(total),
                present: Some(present),
                absent: Some(absent),
            },
            1,
        ))
    }

    fn attempt_labeled_fields(&self, lines: &[&str], index: usize) -> Option<(Candidate, usize)> {
        let line = lines.get(index)?;
        let total = self.total_label.captures(line);
        let present = self.present_label.captures(line);
        let absent = self.absent_label.captures(line);

        let first_label_start = [&total, &present, &absent]
            .into_iter()
            .flatten()
            .filter_map(|captures| captures.get(0))
            .map(|matched| matched.start())
            .min()?;

        let leading = line[..first_label_start].trim();
        let (name, code) = if leading.is_empty() {
            let recovered = self.recover_name(line);
            (recovered.name, recovered.code)
        } else {
            (Some(leading.to_string()), code_from_name(leading))
        };

        Some((
            Candidate {
                name,
                code,
                total: total.as_ref().and_then(|captures| capture_count(captures, 1)),
                present: present.as_ref().and_then(|captures| capture_count(captures, 1)),
                absent: absent.as_ref().and_then(|captures| capture_count(captures, 1)),
            },
            1,
        ))
    }

    fn attempt_numeric_fallback(&self, lines: &[&str], index: usize) -> Option<(Candidate, usize)> {
        let line = lines.get(index)?;
        let recovered = self.recover_name(line);
        if !recovered.has_subject_token {
            return None;
        }

        let mut numbers = self.plain_numbers(line);
        let mut lines_consumed = 1;
        if numbers.len() < 3
            && let Some(next_line) = lines.get(index + 1)
        {
            let next_numbers = self.plain_numbers(next_line);
            if (2..=3).contains(&next_numbers.len()) {
                numbers = next_numbers;
                lines_consumed = 2;
            }
        }

        let mut candidate = Candidate {
            name: recovered.name,
            code: recovered.code,
            ..Candidate::default()
        };

        match numbers.as_slice() {
            [] => return None,
            [only] => {
                if self.total_keyword.is_match(line) {
                    candidate.total = Some(*only);
                } else if self.present_keyword.is_match(line) {
                    candidate.present = Some(*only);
                } else if self.absent_keyword.is_match(line) {
                    candidate.absent = Some(*only);
                } else {
                    candidate.total = Some(*only);
                }
            }
            [first, second] => {
                candidate.total = Some((*first).max(*second));
                candidate.present = Some((*first).min(*second));
            }
            [first, second, third, ..] => {
                let (total, present, absent) = order_unlabeled_counts([*first, *second, *third]);
                candidate.total = Some(total);
                candidate.present = Some(present);
                candidate.absent = Some(absent);
            }
        }

        Some((candidate, lines_consumed))
    }

    fn recover_name(&self, line: &str) -> RecoveredName {
        let mut has_subject_token = contains_code_like_token(line);

        if let Some(digit_index) = line.find(|character: char| character.is_ascii_digit())
            && digit_index > 0
        {
            let leading = line[..digit_index].trim();
            if !leading.is_empty() {
                if is_short_letter_code(leading) {
                    has_subject_token = true;
                }
                return RecoveredName {
                    name: Some(leading.to_string()),
                    code: code_from_name(leading),
                    has_subject_token,
                };
            }
        }

        let tokens = merge_single_letter_runs(
            line.split_whitespace()
                .map(|token| {
                    token
                        .chars()
                        .filter(|character| character.is_ascii_alphanumeric())
                        .collect::<String>()
                })
                .collect(),
        );

        if let Some(code) = tokens.iter().find(|token| is_code_like(token)) {
            return RecoveredName {
                name: Some(code.clone()),
                code: Some(code.to_ascii_uppercase()),
                has_subject_token: true,
            };
        }

        let short_code = tokens
            .iter()
            .find(|token| token.eq_ignore_ascii_case(CLASS_IN_CHARGE_CODE))
            .or_else(|| {
                tokens
                    .iter()
                    .find(|token| is_short_letter_code(token) && !is_header_keyword(token))
            });
        if let Some(short_code) = short_code {
            let code = short_code
                .eq_ignore_ascii_case(CLASS_IN_CHARGE_CODE)
                .then(|| CLASS_IN_CHARGE_CODE.to_string());
            return RecoveredName {
                name: Some(short_code.clone()),
                code,
                has_subject_token: true,
            };
        }

        RecoveredName {
            name: None,
            code: None,
            has_subject_token,
        }
    }

    /// Integers left on the line once percentages are removed. Decimals are never counts.
    fn plain_numbers(&self, line: &str) -> Vec<u32> {
        let without_percentages = self.percent_token.replace_all(line, "");
        self.number_token
            .find_iter(&without_percentages)
            .map(|matched| matched.as_str())
            .filter(|token| !token.contains('.'))
            .filter_map(|token| token.parse::<u32>().ok())
            .collect()
    }
}

/// Largest of three unlabeled counts is the total, the larger remainder is present.
/// Absent is recomputed when the three do not add up.
fn order_unlabeled_counts(values: [u32; 3]) -> (u32, u32, u32) {
    let max_index = values
        .iter()
        .enumerate()
        .fold(0, |best, (index, value)| if *value > values[best] { index } else { best });
    let total = values[max_index];
    let remaining = values
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != max_index)
        .map(|(_, value)| *value)
        .collect::<Vec<u32>>();

    let present = remaining[0].max(remaining[1]);
    let mut absent = remaining[0].min(remaining[1]);
    if present.saturating_add(absent) != total {
        absent = total.saturating_sub(present);
    }

    (total, present, absent)
}

fn merge_single_letter_runs(tokens: Vec<String>) -> Vec<String> {
    let mut merged = Vec::<String>::with_capacity(tokens.len());
    let mut letter_run = String::new();

    for token in tokens {
        if is_single_letter(&token) {
            letter_run.push_str(&token);
            continue;
        }

        if !letter_run.is_empty() {
            merged.push(std::mem::take(&mut letter_run));
        }
        merged.push(token);
    }

    if !letter_run.is_empty() {
        merged.push(letter_run);
    }

    merged
}

fn is_single_letter(token: &str) -> bool {
    let mut characters = token.chars();
    matches!(
        (characters.next(), characters.next()),
        (Some(character), None) if character.is_ascii_alphabetic()
    )
}

fn is_short_letter_code(token: &str) -> bool {
    (2..=6).contains(&token.len()) && token.chars().all(|character| character.is_ascii_alphabetic())
}

fn is_header_keyword(token: &str) -> bool {
    HEADER_KEYWORDS
        .iter()
        .any(|keyword| token.eq_ignore_ascii_case(keyword))
}

fn capture_count(captures: &Captures<'_>, group: usize) -> Option<u32> {
    captures.get(group)?.as_str().parse::<u32>().ok()
}

fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
