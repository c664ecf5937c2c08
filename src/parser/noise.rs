use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug)]
pub struct NoiseFilter {
    header_line: Regex,
    last_updated: Regex,
}

impl NoiseFilter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header_line: Regex::new(
                r"(?i)^(?:code\b|th\b|tc\b|ph\b|ah\b|%\b|description\b|max\.?\s*hours?|att\.?\s*hours?|absent\b|average\b|od/?ml|total\b)",
            )
            .context("failed to compile header line regex")?,
            last_updated: Regex::new(r"(?i)last\s*updated")
                .context("failed to compile last-updated regex")?,
        })
    }

    /// Footer stamps are dropped before the remaining lines are indexed, so they never
    /// take part in lookahead either.
    pub fn is_status_stamp(&self, line: &str) -> bool {
        self.last_updated.is_match(line)
    }

    /// Header rows, the portal's own total row, and lines without a single letter
    /// (clock, battery, bare timestamps).
    pub fn is_noise(&self, line: &str) -> bool {
        self.header_line.is_match(line) || !line.chars().any(|character| character.is_ascii_alphabetic())
    }
}
