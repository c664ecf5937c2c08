use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Reads a UTF-8 text file, or stdin when the path is `-`.
pub fn read_text_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut text)
            .context("failed to read text from stdin")?;
        return Ok(text);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read text input: {}", path.display()))
}

/// Writes to the given file, or to stdout when no path is set.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    let Some(path) = path else {
        let mut output = io::BufWriter::new(io::stdout().lock());
        output
            .write_all(content.as_bytes())
            .context("failed to write output to stdout")?;
        output.flush().context("failed to flush stdout")?;
        return Ok(());
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_directory(parent)?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write output file: {}", path.display()))?;

    Ok(())
}

pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut data = serde_json::to_string_pretty(value).context("failed to serialize json")?;
    data.push('\n');
    Ok(data)
}
