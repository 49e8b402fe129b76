use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use log::warn;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{TelemetryLog, TelemetryRow};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a telemetry log from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – avionics data log, `#`-prefixed metadata lines first
/// * `.json`         – `[{ "E1 RPM": 650, "AltInd": null, ... }, ...]`
/// * `.parquet`      – one column per telemetry channel, any scalar type
pub fn load_file(path: &Path) -> Result<TelemetryLog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" | "" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Data-logger CSV layout:
///
/// ```text
/// #airframe_info, log_version="1.00", ...
/// #yyy-mm-dd, hh:mm:ss, ...,  ft Baro, ...
///  Lcl Date, Lcl Time, ..., AltInd, ..., E1 RPM, ...
/// 2024-05-05, 13:26:33, ...,       ,  ...,      0, ...
/// ```
///
/// Comment and blank lines are discarded before the header is read. Column
/// names and values are trimmed, and rows with no non-empty value dropped.
fn load_csv(path: &Path) -> Result<TelemetryLog> {
    let text = std::fs::read_to_string(path).context("reading CSV file")?;
    parse_csv(&text)
}

/// Parse comment-prefixed CSV text into a [`TelemetryLog`].
pub fn parse_csv(text: &str) -> Result<TelemetryLog> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            let stripped = line.trim();
            !stripped.is_empty() && !stripped.starts_with('#')
        })
        .collect();

    if lines.len() < 2 {
        warn!("CSV has insufficient data ({} non-comment lines)", lines.len());
        return Ok(TelemetryLog::default());
    }

    let body = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        // Short records are padded with empty cells; surplus cells are ignored.
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), record.get(i).unwrap_or("")));
        rows.push(TelemetryRow::new(row_no, cells));
    }

    Ok(TelemetryLog::from_rows(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Lcl Time": "13:26:33", "AltInd": null, "E1 RPM": 650.0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<TelemetryLog> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            let key = key.trim();
            if !column_names.iter().any(|c| c == key) {
                column_names.push(key.to_string());
            }
        }

        let cells = obj
            .iter()
            .map(|(key, val)| (key.as_str(), json_to_cell(val)));
        rows.push(TelemetryRow::new(i, cells));
    }

    Ok(TelemetryLog::from_rows(column_names, rows))
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing telemetry.
///
/// Every column becomes a telemetry channel. Values are rendered to text the
/// same way a CSV export would show them; nulls become empty cells.
fn load_parquet(path: &Path) -> Result<TelemetryLog> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let options = FormatOptions::default();
    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if column_names.is_empty() {
            column_names = schema
                .fields()
                .iter()
                .map(|f| f.name().trim().to_string())
                .collect();
        }

        let columns = batch.columns();
        let formatters = columns
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()
            .context("preparing parquet column formatters")?;

        for row in 0..batch.num_rows() {
            let cells = schema
                .fields()
                .iter()
                .zip(columns.iter().zip(formatters.iter()))
                .map(|(field, (col, fmt))| {
                    let value = if col.is_null(row) {
                        String::new()
                    } else {
                        fmt.value(row).to_string()
                    };
                    (field.name().as_str(), value)
                });
            rows.push(TelemetryRow::new(rows.len(), cells));
        }
    }

    Ok(TelemetryLog::from_rows(column_names, rows))
}
