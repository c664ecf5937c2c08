use std::fmt::Write;

use anyhow::Result;

use crate::cli::OutputFormat;
use crate::commands::advise::advice_sentence;
use crate::model::{ExtractionReport, ParsedRecord};
use crate::util::to_json_pretty;

const CSV_HEADER: [&str; 5] = ["Subject", "Total", "Present", "Absent", "Percentage"];

pub(super) fn render_report(report: &ExtractionReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json_pretty(report),
        OutputFormat::Csv => Ok(records_to_csv(&report.records)),
        OutputFormat::Text => render_text(report),
    }
}

pub(super) fn records_to_csv(records: &[ParsedRecord]) -> String {
    let mut lines = vec![CSV_HEADER.join(",")];
    lines.extend(records.iter().map(|record| {
        [
            escape_csv_cell(&record.name),
            record.total.to_string(),
            record.present.to_string(),
            record.absent.to_string(),
            format!("{:.2}", record.percentage),
        ]
        .join(",")
    }));

    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

fn escape_csv_cell(value: &str) -> String {
    if value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_text(report: &ExtractionReport) -> Result<String> {
    let mut output = String::new();

    if report.records.is_empty() {
        writeln!(output, "No subjects found.")?;
        return Ok(output);
    }

    let name_width = report
        .records
        .iter()
        .map(|record| record.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Subject".len());

    writeln!(
        output,
        "{:<name_width$}  {:>5}  {:>7}  {:>6}  {:>7}",
        "Subject", "Total", "Present", "Absent", "%"
    )?;
    for record in &report.records {
        writeln!(
            output,
            "{:<name_width$}  {:>5}  {:>7}  {:>6}  {:>7.2}",
            record.name, record.total, record.present, record.absent, record.percentage
        )?;
    }

    writeln!(output)?;
    let minimum = report.thresholds.minimum_percentage;
    let relief = report.thresholds.relief_percentage;
    for advice in &report.advice {
        writeln!(output, "{}:", advice.name)?;
        writeln!(output, "  {}", advice_sentence(&advice.minimum, minimum))?;
        writeln!(output, "  With medical relief: {}", advice_sentence(&advice.relief, relief))?;
    }

    if let Some(overall) = &report.overall {
        writeln!(output)?;
        writeln!(
            output,
            "Overall: total={} present={} absent={} current={:.2}% ({} {}%)",
            overall.total,
            overall.present,
            overall.absent,
            overall.percentage,
            if overall.advice.is_above_minimum {
                "above"
            } else {
                "below"
            },
            minimum
        )?;
    }

    Ok(output)
}
