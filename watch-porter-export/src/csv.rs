//! CSV serialization: header first, CRLF line endings, UTF-8 without BOM,
//! quoting only where needed.

use std::io::Write;
use std::path::Path;

use ::csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use crate::columns::{COLUMN_COUNT, WIX_COLUMNS};
use crate::error::ExportError;
use crate::row::OutputRow;

/// Write the header and every row to `out`.
pub fn write_csv<W: Write>(rows: &[OutputRow], out: W) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(out);
    writer.write_record(WIX_COLUMNS)?;
    for row in rows {
        writer.write_record(row.values())?;
    }
    writer.flush().map_err(::csv::Error::from)?;
    Ok(())
}

pub fn to_csv_string(rows: &[OutputRow]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ExportError::invalid_document(e.to_string()))
}

/// Write rows to `path`, creating parent directories.
pub fn write_csv_file(path: &Path, rows: &[OutputRow]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| ExportError::io(path, e))?;
    write_csv(rows, std::io::BufWriter::new(file))?;
    log::info!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Parse CSV text written by [`write_csv`]. The header must match the
/// schema exactly.
pub fn read_csv(text: &str) -> Result<Vec<OutputRow>, ExportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let header = reader.headers()?;
    if header.len() != COLUMN_COUNT || header.iter().zip(WIX_COLUMNS).any(|(a, b)| a != b) {
        return Err(ExportError::header(format!(
            "expected {COLUMN_COUNT} schema columns, found {}",
            header.len()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values = std::array::from_fn(|i| record.get(i).unwrap_or_default().to_string());
        rows.push(OutputRow::from_values(values));
    }
    Ok(rows)
}
