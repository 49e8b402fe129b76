use std::path::Path;

use anyhow::{Context, Result};

use crate::data::filter::FilterThresholds;

/// Environment variable naming the telemetry log.
pub const TELEMETRY_ENV: &str = "FLIGHT_DATA_CSV";
/// Environment variable naming the checklist JSON.
pub const CHECKLIST_ENV: &str = "CHECKLIST_JSON";

/// Read filter thresholds from a JSON file; omitted keys keep their defaults.
pub fn load_thresholds(path: Option<&Path>) -> Result<FilterThresholds> {
    let Some(path) = path else {
        return Ok(FilterThresholds::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading thresholds {}", path.display()))?;
    serde_json::from_str(&text).context("parsing thresholds JSON")
}
