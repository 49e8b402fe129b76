//! Checklist definitions: steps, range tiers, and loading from JSON.

pub mod model;

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

pub use model::{Bounds, Checklist, ChecklistStep, RangeSpec, Tier};

/// Load a checklist from a JSON array of steps.
pub fn load_checklist(path: &Path) -> Result<Checklist> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading checklist {}", path.display()))?;
    let steps: Vec<ChecklistStep> =
        serde_json::from_str(&text).context("parsing checklist JSON")?;
    let checklist = Checklist::from_steps(steps)
        .with_context(|| format!("invalid checklist {}", path.display()))?;
    info!("Loaded {} checklist items from {}", checklist.len(), path.display());
    Ok(checklist)
}

/// Load `path` when it exists, otherwise the built-in checklist.
pub fn load_checklist_or_fallback(path: Option<&Path>) -> Result<Checklist> {
    match path {
        Some(p) if p.exists() => load_checklist(p),
        Some(p) => {
            warn!("Checklist file not found at {}, using built-in checklist", p.display());
            Ok(Checklist::fallback())
        }
        None => Ok(Checklist::fallback()),
    }
}
