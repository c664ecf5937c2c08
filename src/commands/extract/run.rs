use std::fs;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use super::candidates::sanitize_candidates;
use super::ocr::recognize_image;
use super::render::render_report;
use crate::calculator::{
    RELIEF_PERCENTAGE, overall_summary, subject_advice, validate_minimum_percentage,
};
use crate::cli::ExtractArgs;
use crate::model::{ExtractionReport, ParsedRecord, RecordSource, Thresholds};
use crate::parser::{AttendanceParser, ParserConfig};
use crate::renames::RenameMap;
use crate::util::{now_utc_string, read_text_input, sha256_hex, write_output};

const REPORT_VERSION: u32 = 1;

#[derive(Debug)]
struct AcquiredRecords {
    source: RecordSource,
    source_sha256: String,
    records: Vec<ParsedRecord>,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let minimum_percentage = validate_minimum_percentage(args.minimum_percentage)?;
    if args.input.is_none() && args.image.is_none() && args.candidates.is_none() {
        bail!("one of --input, --image or --candidates is required");
    }

    let config = ParserConfig {
        max_total: args.max_total,
        max_placeholder_total: args.max_placeholder_total,
    };
    info!(
        format = args.format.as_str(),
        max_total = config.max_total,
        max_placeholder_total = config.max_placeholder_total,
        "starting extract"
    );

    let acquired = acquire_records(&args, config)?;
    let records = match &args.renames {
        Some(path) => {
            let renames = RenameMap::load(path)?;
            info!(path = %path.display(), entries = renames.len(), "applying rename map");
            renames.apply(acquired.records)
        }
        None => acquired.records,
    };

    if records.is_empty() {
        warn!(source = acquired.source.as_str(), "no subjects found");
    }

    let report = build_report(
        acquired.source,
        acquired.source_sha256,
        config,
        minimum_percentage,
        records,
    );
    let rendered = render_report(&report, args.format)?;
    write_output(args.output.as_deref(), &rendered)?;

    info!(
        source = report.source.as_str(),
        records = report.record_count,
        "extract completed"
    );

    Ok(())
}

fn acquire_records(args: &ExtractArgs, config: ParserConfig) -> Result<AcquiredRecords> {
    let has_text_source = args.input.is_some() || args.image.is_some();

    if let Some(path) = &args.candidates {
        let raw =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let records = sanitize_candidates(&raw)
            .with_context(|| format!("invalid structured candidates in {}", path.display()))?;
        info!(path = %path.display(), candidates = records.len(), "loaded structured candidates");

        if !records.is_empty() || !has_text_source {
            return Ok(AcquiredRecords {
                source: RecordSource::Candidates,
                source_sha256: sha256_hex(&raw),
                records,
            });
        }

        warn!(path = %path.display(), "structured candidates were empty; falling back to text parser");
    }

    let (source, text) = match (&args.image, &args.input) {
        (Some(image), _) => (RecordSource::Ocr, recognize_image(image, &args.ocr_lang)?),
        (None, Some(input)) => (RecordSource::Text, read_text_input(input)?),
        (None, None) => bail!("no text source available to parse"),
    };

    let parser = AttendanceParser::new(config)?;
    let records = parser.parse(&text);
    info!(
        source = source.as_str(),
        lines = text.lines().count(),
        records = records.len(),
        "parsed attendance text"
    );

    Ok(AcquiredRecords {
        source,
        source_sha256: sha256_hex(text.as_bytes()),
        records,
    })
}

fn build_report(
    source: RecordSource,
    source_sha256: String,
    config: ParserConfig,
    minimum_percentage: f64,
    records: Vec<ParsedRecord>,
) -> ExtractionReport {
    let advice = records
        .iter()
        .map(|record| subject_advice(record, minimum_percentage))
        .collect();
    let overall = overall_summary(&records, minimum_percentage);

    ExtractionReport {
        report_version: REPORT_VERSION,
        generated_at: now_utc_string(),
        source,
        source_sha256,
        thresholds: Thresholds {
            minimum_percentage,
            relief_percentage: RELIEF_PERCENTAGE,
            max_total: config.max_total,
            max_placeholder_total: config.max_placeholder_total,
        },
        record_count: records.len(),
        records,
        advice,
        overall,
    }
}
