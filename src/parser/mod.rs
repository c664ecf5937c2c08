use anyhow::Result;
use tracing::debug;

use crate::model::ParsedRecord;

mod dedup;
mod legend;
mod noise;
mod strategies;
#[cfg(test)]
mod tests;

use dedup::dedupe_by_name;
use legend::{LegendExtractor, LegendMap, LegendSplit};
use noise::NoiseFilter;
use strategies::{Candidate, LineExtractor};

pub const CLASS_IN_CHARGE_CODE: &str = "CL";
pub const DEFAULT_MAX_TOTAL: u32 = 300;
pub const DEFAULT_MAX_PLACEHOLDER_TOTAL: u32 = 200;

const PLACEHOLDER_PREFIX: &str = "Subject";
const MIN_CODE_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// No reporting period has more sessions than this for a single course.
    pub max_total: u32,
    /// Unnamed rows above this total are treated as mis-parsed noise.
    pub max_placeholder_total: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_total: DEFAULT_MAX_TOTAL,
            max_placeholder_total: DEFAULT_MAX_PLACEHOLDER_TOTAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counts {
    total: u32,
    present: u32,
    absent: u32,
}

#[derive(Debug)]
pub struct AttendanceParser {
    config: ParserConfig,
    legend: LegendExtractor,
    noise: NoiseFilter,
    extractor: LineExtractor,
}

impl AttendanceParser {
    pub fn new(config: ParserConfig) -> Result<Self> {
        Ok(Self {
            config,
            legend: LegendExtractor::new()?,
            noise: NoiseFilter::new()?,
            extractor: LineExtractor::new()?,
        })
    }

    /// Recovers attendance records from noisy report text. Never fails: lines that cannot be
    /// read are skipped and inconsistent rows are repaired or dropped.
    pub fn parse(&self, text: &str) -> Vec<ParsedRecord> {
        let all_lines = text.lines().map(str::trim).collect::<Vec<&str>>();
        let LegendSplit { legend, body_lines } = self.legend.split(&all_lines);

        let lines = body_lines
            .into_iter()
            .filter(|line| !line.is_empty() && !self.noise.is_status_stamp(line))
            .collect::<Vec<&str>>();

        let mut context = ParseContext::new(&legend, self.config);
        let mut records = Vec::<ParsedRecord>::new();
        let mut index = 0usize;

        while index < lines.len() {
            let line = lines[index];
            if self.noise.is_noise(line) {
                debug!(line, "skipping header or noise line");
                index += 1;
                continue;
            }

            let Some(extraction) = self.extractor.extract(&lines, index) else {
                debug!(line, "no extraction strategy matched");
                index += 1;
                continue;
            };
            index += extraction.lines_consumed.max(1);

            match context.finalize(extraction.candidate) {
                Some(record) => records.push(record),
                None => debug!(
                    line,
                    strategy = extraction.strategy.as_str(),
                    "discarded implausible or incomplete row"
                ),
            }
        }

        let extracted = records.len();
        let records = dedupe_by_name(records);
        debug!(
            lines = lines.len(),
            legend_entries = legend.len(),
            extracted,
            kept = records.len(),
            "parsed attendance text"
        );

        records
    }
}

/// Per-call state: the legend built from this text and the placeholder counter.
struct ParseContext<'a> {
    legend: &'a LegendMap,
    config: ParserConfig,
    next_placeholder: usize,
}

impl<'a> ParseContext<'a> {
    fn new(legend: &'a LegendMap, config: ParserConfig) -> Self {
        Self {
            legend,
            config,
            next_placeholder: 1,
        }
    }

    fn finalize(&mut self, candidate: Candidate) -> Option<ParsedRecord> {
        let counts = repair_counts(infer_missing_count(
            candidate.total,
            candidate.present,
            candidate.absent,
        )?);

        if counts.total > self.config.max_total
            || counts.present > counts.total
            || counts.absent > counts.total
        {
            return None;
        }

        let legend_name = candidate
            .code
            .as_deref()
            .and_then(|code| self.legend.resolve(code));
        let name = match (legend_name, candidate.name) {
            (Some(resolved), _) => Some(resolved.to_string()),
            (None, Some(name)) if !is_unreliable_fragment(&name) => Some(name),
            _ => None,
        };

        let placeholder = name.as_deref().map(is_placeholder_name).unwrap_or(true);
        if placeholder && counts.total > self.config.max_placeholder_total {
            return None;
        }
        let name = name.unwrap_or_else(|| self.allocate_placeholder());

        Some(ParsedRecord::new(
            name,
            counts.total,
            counts.present,
            counts.absent,
            candidate.code,
        ))
    }

    fn allocate_placeholder(&mut self) -> String {
        let name = format!("{PLACEHOLDER_PREFIX} {}", self.next_placeholder);
        self.next_placeholder += 1;
        name
    }
}

/// Completes a tuple from any two of its fields. Fewer than two known fields is unusable.
fn infer_missing_count(
    total: Option<u32>,
    present: Option<u32>,
    absent: Option<u32>,
) -> Option<Counts> {
    let (total, present, absent) = match (total, present, absent) {
        (Some(total), Some(present), Some(absent)) => (total, present, absent),
        (Some(total), Some(present), None) => (total, present, total.saturating_sub(present)),
        (Some(total), None, Some(absent)) => (total, total.saturating_sub(absent), absent),
        (None, Some(present), Some(absent)) => (present.saturating_add(absent), present, absent),
        _ => return None,
    };

    Some(Counts {
        total,
        present,
        absent,
    })
}

/// OCR misreads small absent counts more often than present counts, so absent gives way
/// first; total only widens when present and absent already exceed it.
fn repair_counts(counts: Counts) -> Counts {
    let Counts {
        mut total,
        present,
        mut absent,
    } = counts;
    let sum = present.saturating_add(absent);

    if present > total || absent > total || sum != total {
        if sum <= total {
            absent = total.saturating_sub(present);
        } else {
            total = total.max(sum);
        }
    }

    Counts {
        total,
        present,
        absent,
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let Some((prefix, number)) = name.split_once(char::is_whitespace) else {
        return false;
    };
    let number = number.trim_start();

    prefix.eq_ignore_ascii_case(PLACEHOLDER_PREFIX)
        && !number.is_empty()
        && number.chars().all(|character| character.is_ascii_digit())
}

fn is_unreliable_fragment(name: &str) -> bool {
    (1..=2).contains(&name.len())
        && name.chars().all(|character| character.is_ascii_alphabetic())
        && !name.eq_ignore_ascii_case(CLASS_IN_CHARGE_CODE)
}

/// Subject codes mix letters and digits, e.g. `21CSC201J`.
pub(crate) fn is_code_like(token: &str) -> bool {
    token.len() >= MIN_CODE_LEN
        && token.chars().all(|character| character.is_ascii_alphanumeric())
        && token.chars().any(|character| character.is_ascii_alphabetic())
        && token.chars().any(|character| character.is_ascii_digit())
}

pub(crate) fn contains_code_like_token(text: &str) -> bool {
    text.split(|character: char| !character.is_ascii_alphanumeric())
        .any(is_code_like)
}

/// Code carried by a recovered name: the reserved `CL`, or its first code-like token.
pub(crate) fn code_from_name(name: &str) -> Option<String> {
    if name.eq_ignore_ascii_case(CLASS_IN_CHARGE_CODE) {
        return Some(CLASS_IN_CHARGE_CODE.to_string());
    }

    name.split(|character: char| !character.is_ascii_alphanumeric())
        .find(|token| is_code_like(token))
        .map(str::to_ascii_uppercase)
}
