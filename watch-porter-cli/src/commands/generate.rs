use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde_json::Value;
use watch_porter_export::{OutputRow, normalize_rows, write_csv_file};

use super::timestamped_output;
use crate::CliError;

/// Read a JSON row document and repair its rows.
pub(crate) fn load_rows(input: &Path) -> Result<Vec<OutputRow>, CliError> {
    let contents = std::fs::read_to_string(input)
        .map_err(|e| CliError::input(format!("Could not read {}: {e}", input.display())))?;
    let document: Value = serde_json::from_str(&contents)?;
    Ok(normalize_rows(&document)?)
}

/// Write edited rows from a JSON file as CSV.
pub(crate) fn run_generate(input: &Path, output: Option<PathBuf>) -> Result<(), CliError> {
    let rows = load_rows(input)?;
    let output = output.unwrap_or_else(|| timestamped_output("wix_watches"));
    write_csv_file(&output, &rows)?;
    log::info!(
        "{} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        output.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
