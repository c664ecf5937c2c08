use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

const TESSERACT: &str = "tesseract";

pub(super) fn recognize_image(image_path: &Path, ocr_lang: &str) -> Result<String> {
    if !image_path.is_file() {
        bail!("image not found: {}", image_path.display());
    }
    if !command_available(TESSERACT) {
        bail!("OCR requested for {} but tesseract is unavailable", image_path.display());
    }

    let output = Command::new(TESSERACT)
        .arg(image_path)
        .arg("stdout")
        .arg("-l")
        .arg(ocr_lang)
        .output()
        .with_context(|| format!("failed to execute tesseract for {}", image_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "tesseract returned non-zero exit status for {}: {}",
            image_path.display(),
            stderr.trim()
        );
    }

    let text = clean_ocr_output(&output.stdout);
    info!(
        image = %image_path.display(),
        lang = ocr_lang,
        chars = text.chars().count(),
        "recognized image text"
    );

    Ok(text)
}

fn clean_ocr_output(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .replace('\u{0000}', "")
        .replace('\u{000C}', "\n")
        .trim()
        .to_string()
}

fn command_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}
