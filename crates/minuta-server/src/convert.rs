//! Document-to-PDF conversion through an external office suite.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

/// Convert `input` to PDF next to it.
///
/// Returns the PDF path, or `input` unchanged when the converter cannot be
/// run, fails, produces nothing, or exceeds `timeout` (the process is killed).
pub async fn convert_to_pdf(converter: &str, input: &Path, timeout: Duration) -> PathBuf {
    let out_dir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let expected = input.with_extension("pdf");

    let child = Command::new(converter)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(&out_dir)
        .arg(input)
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, child).await {
        Err(_) => {
            warn!(
                "PDF conversion of {} timed out after {:?}",
                input.display(),
                timeout
            );
            input.to_path_buf()
        }
        Ok(Err(e)) => {
            warn!("Could not run PDF converter '{}': {}", converter, e);
            input.to_path_buf()
        }
        Ok(Ok(output)) if !output.status.success() => {
            warn!(
                "PDF converter exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            input.to_path_buf()
        }
        Ok(Ok(_)) if !expected.is_file() => {
            warn!("PDF converter produced no {}", expected.display());
            input.to_path_buf()
        }
        Ok(Ok(_)) => {
            info!("Converted {} to PDF", input.display());
            expected
        }
    }
}
