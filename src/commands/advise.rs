use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::calculator::{RELIEF_PERCENTAGE, classes_needed, validate_minimum_percentage};
use crate::cli::AdviseArgs;
use crate::model::ClassesNeeded;
use crate::util::{to_json_pretty, write_output};

#[derive(Debug, Serialize)]
struct AdviseResponse {
    present: u32,
    total: u32,
    minimum_percentage: f64,
    minimum: ClassesNeeded,
    relief_percentage: f64,
    relief: ClassesNeeded,
}

pub fn run(args: AdviseArgs) -> Result<()> {
    let minimum_percentage = validate_minimum_percentage(args.minimum_percentage)?;
    if args.present > args.total {
        bail!(
            "classes attended ({}) cannot exceed total classes ({})",
            args.present,
            args.total
        );
    }

    let response = AdviseResponse {
        present: args.present,
        total: args.total,
        minimum_percentage,
        minimum: classes_needed(args.present, args.total, minimum_percentage),
        relief_percentage: RELIEF_PERCENTAGE,
        relief: classes_needed(args.present, args.total, RELIEF_PERCENTAGE),
    };
    info!(
        present = response.present,
        total = response.total,
        current_percentage = response.minimum.current_percentage,
        "computed attendance advice"
    );

    let rendered = if args.json {
        to_json_pretty(&response).context("failed to serialize advice")?
    } else {
        render_advice_text(&response)
    };

    write_output(None, &rendered)
}

fn render_advice_text(response: &AdviseResponse) -> String {
    format!(
        "Current: {:.2}% ({}/{})\n{}\n{}\n",
        response.minimum.current_percentage,
        response.present,
        response.total,
        advice_sentence(&response.minimum, response.minimum_percentage),
        advice_sentence(&response.relief, response.relief_percentage),
    )
}

pub fn advice_sentence(result: &ClassesNeeded, minimum_percentage: f64) -> String {
    if result.is_above_minimum {
        format!(
            "You can miss {} more classes and still stay above {minimum_percentage}%.",
            result.can_miss
        )
    } else {
        format!(
            "You need to attend {} more classes to reach {minimum_percentage}%.",
            result.need_to_attend
        )
    }
}
