//! Export of comparison results.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::DifferenceRecord;

/// Suggested file name for the text export.
pub const EXPORT_FILE_NAME: &str = "pdf-text-diff.txt";

/// Media type of the text export.
pub const EXPORT_MIME_TYPE: &str = "text/plain; charset=utf-8";

const EXPORT_HEADER: &str = "PDF Diff Export";
const NO_DIFFERENCES: &str = "No new text detected in the latest PDF.";

/// JSON output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Format a timestamp the way the export header shows it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One record as a line of the text export.
pub fn describe_record(record: &DifferenceRecord) -> String {
    format!(
        "Page {}: {} new sentence{}. Example: {}",
        record.page,
        record.total,
        if record.total == 1 { "" } else { "s" },
        record.example
    )
}

/// Render records as the plain-text export.
pub fn to_text(records: &[DifferenceRecord], generated_at: DateTime<Utc>) -> String {
    let contents = if records.is_empty() {
        NO_DIFFERENCES.to_string()
    } else {
        records
            .iter()
            .map(describe_record)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "{}\nGenerated: {}\n\nItems unique to the latest PDF:\n\n{}\n",
        EXPORT_HEADER,
        format_timestamp(generated_at),
        contents
    )
}

#[derive(Serialize)]
struct JsonExport<'a> {
    generated_at: String,
    records: &'a [DifferenceRecord],
}

/// Render records as JSON: `{ "generated_at": ..., "records": [...] }`.
pub fn to_json(
    records: &[DifferenceRecord],
    generated_at: DateTime<Utc>,
    format: JsonFormat,
) -> Result<String> {
    let export = JsonExport {
        generated_at: format_timestamp(generated_at),
        records,
    };
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&export),
        JsonFormat::Compact => serde_json::to_string(&export),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
