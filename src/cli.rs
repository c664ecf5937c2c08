use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::calculator::DEFAULT_MINIMUM_PERCENTAGE;
use crate::parser::{DEFAULT_MAX_PLACEHOLDER_TOTAL, DEFAULT_MAX_TOTAL};

#[derive(Parser, Debug)]
#[command(
    name = "presently",
    version,
    about = "Recover attendance records from OCR text of attendance reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Advise(AdviseArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Raw report text; `-` reads stdin.
    #[arg(long, conflicts_with = "image")]
    pub input: Option<PathBuf>,

    /// Screenshot to run through tesseract.
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,

    /// Structured extraction result (JSON); bypasses the text parser when non-empty.
    #[arg(long)]
    pub candidates: Option<PathBuf>,

    #[arg(long)]
    pub renames: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MINIMUM_PERCENTAGE)]
    pub minimum_percentage: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_TOTAL)]
    pub max_total: u32,

    #[arg(long, default_value_t = DEFAULT_MAX_PLACEHOLDER_TOTAL)]
    pub max_placeholder_total: u32,
}

#[derive(Args, Debug, Clone)]
pub struct AdviseArgs {
    #[arg(long)]
    pub present: u32,

    #[arg(long)]
    pub total: u32,

    #[arg(long, default_value_t = DEFAULT_MINIMUM_PERCENTAGE)]
    pub minimum_percentage: f64,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
