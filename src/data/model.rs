use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a raw telemetry cell as a number.
///
/// Surrounding whitespace is ignored. Empty cells, unparseable text and
/// non-finite values (`nan`, `inf`) all yield `None`; this never fails.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// TelemetryRow – one timestamped sample
// ---------------------------------------------------------------------------

/// A single telemetry sample (one data line of the source log).
///
/// Column names and values are stored trimmed. Rows are never mutated after
/// parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRow {
    /// Zero-based position of the sample in the source log.
    pub index: usize,
    /// column_name → raw value.
    pub cells: BTreeMap<String, String>,
}

impl TelemetryRow {
    /// Build a row, normalising names and values.
    pub fn new<I, K, V>(index: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let cells = cells
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_string(), v.as_ref().trim().to_string()))
            .collect();
        TelemetryRow { index, cells }
    }

    /// Raw value of a column, `None` when the column is missing or empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column.trim())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Numeric value of a column; absent on a missing cell or a parse failure.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(parse_numeric)
    }

    /// Whether every value in the row is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.is_empty())
    }
}

impl fmt::Display for TelemetryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample #{}", self.index)
    }
}

// ---------------------------------------------------------------------------
// TelemetryLog – the complete loaded log
// ---------------------------------------------------------------------------

/// Every parsed row of a telemetry log, in file order.
#[derive(Debug, Clone, Default)]
pub struct TelemetryLog {
    pub rows: Vec<TelemetryRow>,
    /// Ordered, trimmed column names as they appeared in the header.
    pub column_names: Vec<String>,
}

impl TelemetryLog {
    /// Assemble a log, dropping rows whose every value is empty.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<TelemetryRow>) -> Self {
        let column_names = column_names
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();
        let rows = rows.into_iter().filter(|r| !r.is_blank()).collect();
        TelemetryLog { rows, column_names }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
