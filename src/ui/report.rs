use crate::checklist::ChecklistStep;
use crate::color::Painter;
use crate::state::SessionSummary;
use crate::validate::{TelemetryValidator, ValidationOutcome};

/// Join rendered lines, each terminated by a newline.
fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

// ---------------------------------------------------------------------------
// Step outcome
// ---------------------------------------------------------------------------

/// Render one validated step as a status line plus indented detail lines.
pub fn outcome(p: &Painter, step: &ChecklistStep, outcome: &ValidationOutcome) -> String {
    let mut lines = vec![format!(
        "{}  {}  {}",
        p.badge(outcome.status),
        p.dim(&step.step_id),
        p.bold(&step.name)
    )];

    let message = match &outcome.details {
        Some(d) if d.problem.is_some() => d.problem.clone().unwrap_or_default(),
        _ => outcome.message.clone(),
    };
    lines.push(format!("    {}", p.status(outcome.status, &message)));

    if let Some(details) = &outcome.details {
        if let Some(range) = &details.range_description {
            lines.push(format!("    {}", p.dim(range)));
        }
        if let Some(expected) = &details.expected_ranges {
            lines.push(format!("    {}", p.dim(&format!("Expected ranges: {expected}"))));
        }
        if details.raw_values.len() > 1 {
            let readings: Vec<String> = details
                .raw_values
                .iter()
                .map(|r| match r.value {
                    Some(v) => format!("{}={v}", r.column),
                    None => format!("{}=-", r.column),
                })
                .collect();
            lines.push(format!("    {}", p.dim(&readings.join("  "))));
        }
    }
    block(lines)
}

// ---------------------------------------------------------------------------
// Telemetry overview
// ---------------------------------------------------------------------------

/// Row counts and the reference row's filter-relevant readings.
pub fn telemetry(p: &Painter, validator: &TelemetryValidator) -> String {
    let mut lines = Vec::new();
    if let Some(source) = validator.source() {
        lines.push(format!("{} {}", p.bold("Telemetry:"), source.display()));
    }
    lines.push(format!(
        "Rows: {} total, {} pre-flight",
        validator.total_rows(),
        validator.row_count()
    ));

    let Some(row) = validator.reference_row() else {
        lines.push(p.dim("No reference row (no pre-flight data)"));
        return block(lines);
    };

    let t = validator.thresholds();
    lines.push(format!("Reference row: {row}"));
    for column in [
        &t.altitude_column,
        &t.rpm_column,
        &t.fuel_flow_column,
        &t.ground_speed_column,
    ] {
        lines.push(format!("    {column:<10} {}", row.get(column).unwrap_or("-")));
    }
    block(lines)
}

// ---------------------------------------------------------------------------
// Session summary
// ---------------------------------------------------------------------------

pub fn summary(p: &Painter, summary: &SessionSummary) -> String {
    let mut lines = vec![
        p.bold(&summary.message),
        p.dim(&format!(
            "Completed {}/{} steps",
            summary.completed_steps, summary.total_steps
        )),
    ];
    lines.extend(summary.failed_steps.iter().map(|failed| {
        format!(
            "    {} {} ({})",
            p.badge(failed.status),
            failed.step_id,
            failed.step_name
        )
    }));
    block(lines)
}
