//! Telemetry validation: the reference-row holder and the range classifier.

pub mod classifier;
pub mod outcome;

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::checklist::ChecklistStep;
use crate::data::filter::{self, FilterThresholds};
use crate::data::loader;
use crate::data::model::{TelemetryLog, TelemetryRow};

pub use classifier::classify;
pub use outcome::{ColumnReading, Status, ValidationDetails, ValidationOutcome};

/// One loaded telemetry log, filtered down to its pre-flight rows.
///
/// Instantiate one per file; reloading means building a new validator.
#[derive(Debug, Clone, Default)]
pub struct TelemetryValidator {
    source: Option<PathBuf>,
    total_rows: usize,
    rows: Vec<TelemetryRow>,
    thresholds: FilterThresholds,
}

impl TelemetryValidator {
    /// Load `path`. A missing or unreadable file leaves the validator empty.
    pub fn open(path: &Path, thresholds: FilterThresholds) -> Self {
        let log = if !path.exists() {
            warn!("Telemetry file not found at {}", path.display());
            TelemetryLog::default()
        } else {
            match loader::load_file(path) {
                Ok(log) => log,
                Err(e) => {
                    error!("Error loading telemetry from {}: {e:#}", path.display());
                    TelemetryLog::default()
                }
            }
        };
        let mut validator = Self::from_log(log, thresholds);
        validator.source = Some(path.to_path_buf());
        validator
    }

    /// Build from an already parsed log.
    pub fn from_log(log: TelemetryLog, thresholds: FilterThresholds) -> Self {
        let total_rows = log.len();
        let rows = filter::preflight_rows(&log.rows, &thresholds);
        info!(
            "Loaded {total_rows} total rows, filtered to {} pre-flight rows (removed {})",
            rows.len(),
            total_rows - rows.len()
        );
        Self {
            source: None,
            total_rows,
            rows,
            thresholds,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Rows parsed from the file before filtering.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Rows retained by the pre-flight filter.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[TelemetryRow] {
        &self.rows
    }

    pub fn thresholds(&self) -> &FilterThresholds {
        &self.thresholds
    }

    /// The ground/idle sample used when no row is given explicitly.
    pub fn reference_row(&self) -> Option<&TelemetryRow> {
        filter::reference_row(&self.rows, &self.thresholds)
    }

    /// Validate `step` against `row`, or the reference row when `None`.
    pub fn validate(&self, step: &ChecklistStep, row: Option<&TelemetryRow>) -> ValidationOutcome {
        classify(step, row.or_else(|| self.reference_row()))
    }
}
