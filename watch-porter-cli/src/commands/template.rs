use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use watch_porter_core::PlaceholderImages;
use watch_porter_export::{RowBuilder, write_csv_file};

use super::{AppContext, timestamped_output};
use crate::CliError;

/// Write the header and the example row. No network access.
pub(crate) fn run_template(ctx: &AppContext, output: Option<PathBuf>) -> Result<(), CliError> {
    let output = output.unwrap_or_else(|| timestamped_output("wix_template"));
    let row = RowBuilder::new(&ctx.mapping, &PlaceholderImages).template_row();
    write_csv_file(&output, &[row])?;
    log::info!(
        "{} Template written to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        output.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use watch_porter_export::{COLUMN_COUNT, read_csv};

    use super::*;

    #[test]
    fn template_has_header_and_example() {
        let tmp = TempDir::new().unwrap();
        let ctx = AppContext::new(
            Some(tmp.path().join("mapping.json")),
            Some(tmp.path().join("catalog.json")),
            true,
        );
        let output = tmp.path().join("template.csv");
        run_template(&ctx, Some(output.clone())).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("handleId,fieldType,name,"));
        let rows = read_csv(&text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values().len(), COLUMN_COUNT);
        assert_eq!(rows[0].get("sku"), "EXAMPLE001");
    }
}
