use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments against the resolved batch root
pub fn validate_inputs(args: &Args, root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(anyhow::anyhow!(
            "Batch root does not exist: {}",
            root.display()
        ));
    }

    let input_dir = root.join(crate::image_processing::RAW_SUBDIR);
    if !input_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Input directory does not exist: {}",
            input_dir.display()
        ));
    }

    if args.workers > 32 {
        return Err(anyhow::anyhow!(
            "Worker count too high (max 32), got: {}",
            args.workers
        ));
    }

    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified extensions (case-insensitive)
pub fn has_valid_extension(path: &Path, extensions: &[&str]) -> bool {
    if let Some(ext) = get_file_extension(path) {
        extensions.contains(&ext.as_str())
    } else {
        false
    }
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}
