use log::debug;

use crate::checklist::model::with_unit;
use crate::checklist::{ChecklistStep, RangeSpec, Tier};
use crate::data::model::TelemetryRow;

use super::outcome::{ColumnReading, Status, ValidationDetails, ValidationOutcome};

/// Steps whose name contains this are summed across their columns.
pub const FUEL_QUANTITY_NAME: &str = "Fuel Quantity";
/// Left-tank column; its presence also marks a fuel-quantity step.
pub const FUEL_LEFT_COLUMN: &str = "FQtyL";

/// Margins below this are reported as "slightly" outside the range.
const SLIGHT_MARGIN: f64 = 1.0;

/// Classify `row` against `step`. Pure: no I/O, no state.
pub fn classify(step: &ChecklistStep, row: Option<&TelemetryRow>) -> ValidationOutcome {
    let outcome = classify_inner(step, row);
    debug!("{}: {} - {}", step.step_id, outcome.status, outcome.message);
    outcome
}

fn classify_inner(step: &ChecklistStep, row: Option<&TelemetryRow>) -> ValidationOutcome {
    let Some(row) = row else {
        return ValidationOutcome::new(Status::NoData, "No telemetry data available");
    };

    let columns = &step.telemetry_columns;
    if columns.is_empty() {
        return ValidationOutcome::new(
            Status::Success,
            "Visual check required - no telemetry validation",
        );
    }

    let Some(states) = step.states.as_ref().filter(|s| !s.is_empty()) else {
        return ValidationOutcome::new(
            Status::Failed,
            "No validation criteria defined for this step",
        );
    };

    let readings: Vec<ColumnReading> = columns
        .iter()
        .map(|column| ColumnReading {
            column: column.clone(),
            value: row.numeric(column),
        })
        .collect();

    let Some((value, value_description)) = check_value(step, states, &readings) else {
        return ValidationOutcome::new(
            Status::NoData,
            format!("No telemetry data available for columns: {}", columns.join(", ")),
        );
    };

    let mut details = ValidationDetails {
        value,
        value_description,
        columns_checked: columns.clone(),
        raw_values: readings,
        range: None,
        range_description: None,
        expected_ranges: None,
        problem: None,
    };

    if let Some((tier, bounds)) = states
        .defined(&Tier::PRIORITY)
        .find(|(_, bounds)| bounds.contains(value))
    {
        let unit = states.unit.as_str();
        let range_description = match (bounds.min, bounds.max) {
            (Some(_), Some(_)) => format!("In {tier} range ({})", bounds.render(unit)),
            (Some(min), None) => {
                format!("At or above {tier} minimum ({})", with_unit(min.to_string(), unit))
            }
            _ => format!(
                "At or below {tier} maximum ({})",
                with_unit(bounds.max.unwrap_or_default().to_string(), unit)
            ),
        };
        let message = match tier {
            Tier::Red => format!("WARNING: {} - In warning range", details.value_description),
            Tier::Yellow => format!("CAUTION: {} - Requires attention", details.value_description),
            Tier::Green => format!("OK: {} - Within normal range", details.value_description),
        };
        details.range = Some(tier);
        details.range_description = Some(range_description);
        return ValidationOutcome::new(Status::from(tier), message).with_details(details);
    }

    let expected = expected_ranges(states);
    let problem = diagnose(value, states);
    let message = format!("{problem} Expected ranges: {expected}");
    details.expected_ranges = Some(expected);
    details.problem = Some(problem);
    ValidationOutcome::new(Status::Failed, message).with_details(details)
}

/// Whether the step reads fuel tanks whose quantities are summed.
pub fn is_fuel_quantity(step: &ChecklistStep) -> bool {
    step.name.contains(FUEL_QUANTITY_NAME)
        || step.telemetry_columns.iter().any(|c| c.trim() == FUEL_LEFT_COLUMN)
}

/// The number to classify plus its description, or `None` if nothing parsed.
fn check_value(
    step: &ChecklistStep,
    states: &RangeSpec,
    readings: &[ColumnReading],
) -> Option<(f64, String)> {
    let mut present = readings.iter().filter_map(|r| r.value.map(|v| (r, v))).peekable();
    present.peek()?;

    if is_fuel_quantity(step) {
        let total: f64 = present.map(|(_, v)| v).sum();
        let text = with_unit(format!("Total fuel: {total:.1}"), &states.unit);
        Some((total, text))
    } else {
        let (reading, value) = present.next()?;
        let text = with_unit(format!("{}: {value:.1}", reading.column.trim()), &states.unit);
        Some((value, text))
    }
}

/// `Green (normal): 55-95 psi | Red (warning): ≥100 psi`
fn expected_ranges(states: &RangeSpec) -> String {
    let parts: Vec<String> = states
        .defined(&Tier::DISPLAY)
        .map(|(tier, bounds)| format!("{}: {}", tier.label(), bounds.render(&states.unit)))
        .collect();
    if parts.is_empty() {
        "No ranges defined".to_string()
    } else {
        parts.join(" | ")
    }
}

/// Explain the miss relative to the nearest violated boundary.
///
/// The green band is the reference when defined; otherwise the closest bound
/// of any tier is used.
fn diagnose(value: f64, states: &RangeSpec) -> String {
    let unit = states.unit.as_str();
    let shown = with_unit(format!("{value:.2}"), unit);

    let nearest = match states.tier(Tier::Green) {
        Some(green) => violated_bound(Tier::Green, green.min, green.max, value),
        None => states
            .defined(&Tier::DISPLAY)
            .filter_map(|(tier, b)| violated_bound(tier, b.min, b.max, value))
            .min_by(|a, b| a.margin.total_cmp(&b.margin)),
    };

    let Some(miss) = nearest else {
        return format!("Value {shown} is outside all defined ranges.");
    };

    let bound = with_unit(miss.bound.to_string(), unit);
    let margin = with_unit(format!("{:.2}", miss.margin), unit);
    let slight = miss.margin < SLIGHT_MARGIN;
    match (miss.tier, miss.above) {
        (Tier::Green, true) => format!(
            "Value {shown} exceeds the maximum normal range of {bound} by {margin}. {}",
            if slight {
                "This is slightly above the normal range - verify manually."
            } else {
                "This exceeds the safe operating range."
            }
        ),
        (Tier::Green, false) => format!(
            "Value {shown} is below the minimum normal range of {bound} by {margin}. {}",
            if slight {
                "This is slightly below the normal range - verify manually."
            } else {
                "This is below the safe operating range."
            }
        ),
        (tier, true) => {
            format!("Value {shown} exceeds the {tier} maximum of {bound} by {margin}.")
        }
        (tier, false) => {
            format!("Value {shown} is below the {tier} minimum of {bound} by {margin}.")
        }
    }
}

struct Miss {
    tier: Tier,
    bound: f64,
    margin: f64,
    above: bool,
}

fn violated_bound(tier: Tier, min: Option<f64>, max: Option<f64>, value: f64) -> Option<Miss> {
    if let Some(max) = max.filter(|max| value > *max) {
        return Some(Miss {
            tier,
            bound: max,
            margin: value - max,
            above: true,
        });
    }
    min.filter(|min| value < *min).map(|min| Miss {
        tier,
        bound: min,
        margin: min - value,
        above: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::Bounds;

    fn step(name: &str, columns: &[&str], states: Option<RangeSpec>) -> ChecklistStep {
        ChecklistStep {
            step_id: "s".into(),
            name: name.into(),
            telemetry_columns: columns.iter().map(|c| c.to_string()).collect(),
            states,
            ..Default::default()
        }
    }

    fn ranges(
        green: Option<(Option<f64>, Option<f64>)>,
        yellow: Option<(Option<f64>, Option<f64>)>,
        red: Option<(Option<f64>, Option<f64>)>,
    ) -> RangeSpec {
        let b = |p: Option<(Option<f64>, Option<f64>)>| p.map(|(min, max)| Bounds::new(min, max));
        RangeSpec {
            green: b(green),
            yellow: b(yellow),
            red: b(red),
            unit: "psi".into(),
        }
    }

    fn row(cells: &[(&str, &str)]) -> TelemetryRow {
        TelemetryRow::new(0, cells.iter().copied())
    }

    fn oil() -> RangeSpec {
        ranges(Some((Some(55.0), Some(95.0))), None, None)
    }

    #[test]
    fn missing_row_is_no_data() {
        let out = classify(&step("Oil", &["E1 OilP"], Some(oil())), None);
        assert_eq!(out.status, Status::NoData);
        assert!(out.details.is_none());
    }

    #[test]
    fn visual_check_ignores_states() {
        let r = row(&[("E1 OilP", "70")]);
        let out = classify(&step("Doors", &[], Some(oil())), Some(&r));
        assert_eq!(out.status, Status::Success);
        assert!(out.message.contains("Visual check"));
        let out = classify(&step("Doors", &[], None), Some(&r));
        assert_eq!(out.status, Status::Success);
    }

    #[test]
    fn missing_states_fails() {
        let r = row(&[("X", "1")]);
        let out = classify(&step("X", &["X"], None), Some(&r));
        assert_eq!(out.status, Status::Failed);
        assert_eq!(out.message, "No validation criteria defined for this step");

        let out = classify(&step("X", &["X"], Some(RangeSpec::default())), Some(&r));
        assert_eq!(out.status, Status::Failed);
    }

    #[test]
    fn absent_columns_are_no_data() {
        let r = row(&[("E1 RPM", "700")]);
        let out = classify(&step("Oil", &["E1 OilP"], Some(oil())), Some(&r));
        assert_eq!(out.status, Status::NoData);
        assert_eq!(out.message, "No telemetry data available for columns: E1 OilP");

        let r = row(&[("E1 OilP", "n/a")]);
        let out = classify(&step("Oil", &["E1 OilP"], Some(oil())), Some(&r));
        assert_eq!(out.status, Status::NoData);
    }

    #[test]
    fn green_boundary_is_inclusive() {
        let s = step("Oil", &["E1 OilP"], Some(oil()));
        let out = classify(&s, Some(&row(&[("E1 OilP", "55")])));
        assert_eq!(out.status, Status::Success);
        let details = out.details.unwrap();
        assert_eq!(details.range, Some(Tier::Green));
        assert_eq!(details.range_description.as_deref(), Some("In green range (55-95 psi)"));

        let out = classify(&s, Some(&row(&[("E1 OilP", "54.999")])));
        assert_eq!(out.status, Status::Failed);
    }

    #[test]
    fn red_beats_yellow_beats_green() {
        let overlapping = ranges(
            Some((Some(0.0), Some(100.0))),
            Some((Some(40.0), Some(100.0))),
            Some((Some(80.0), Some(100.0))),
        );
        let s = step("Oil", &["E1 OilP"], Some(overlapping));
        let status = |v: &str| classify(&s, Some(&row(&[("E1 OilP", v)]))).status;
        assert_eq!(status("90"), Status::Warning);
        assert_eq!(status("50"), Status::Caution);
        assert_eq!(status("10"), Status::Success);
        assert_eq!(status("120"), Status::Failed);
    }

    #[test]
    fn min_only_tiers_cover_values_at_and_above() {
        // Red {min: 245}: high values are red, low ones are not.
        let s = step(
            "Oil Temp",
            &["E1 OilT"],
            Some(ranges(Some((Some(100.0), Some(245.0))), None, Some((Some(245.0), None)))),
        );
        assert_eq!(classify(&s, Some(&row(&[("E1 OilT", "250")]))).status, Status::Warning);
        assert_eq!(classify(&s, Some(&row(&[("E1 OilT", "245")]))).status, Status::Warning);
        assert_eq!(classify(&s, Some(&row(&[("E1 OilT", "200")]))).status, Status::Success);
        assert_eq!(classify(&s, Some(&row(&[("E1 OilT", "50")]))).status, Status::Failed);

        // Yellow {min: 10}: below min is not yellow.
        let s = step("Oil", &["E1 OilP"], Some(ranges(None, Some((Some(10.0), None)), None)));
        let out = classify(&s, Some(&row(&[("E1 OilP", "12")])));
        assert_eq!(out.status, Status::Caution);
        assert_eq!(
            out.details.unwrap().range_description.as_deref(),
            Some("At or above yellow minimum (10 psi)")
        );
        assert_eq!(classify(&s, Some(&row(&[("E1 OilP", "5")]))).status, Status::Failed);
    }

    #[test]
    fn max_only_tiers_cover_values_at_and_below() {
        let s = step("Oil", &["E1 OilP"], Some(ranges(None, None, Some((None, Some(10.0))))));
        let out = classify(&s, Some(&row(&[("E1 OilP", "10")])));
        assert_eq!(out.status, Status::Warning);
        assert_eq!(
            out.details.unwrap().range_description.as_deref(),
            Some("At or below red maximum (10 psi)")
        );
        assert_eq!(classify(&s, Some(&row(&[("E1 OilP", "11")]))).status, Status::Failed);
    }

    #[test]
    fn fuel_quantity_sums_tanks() {
        let mut states = ranges(Some((Some(10.0), Some(56.0))), None, None);
        states.unit = "gal".into();
        let s = step("Fuel Quantity", &["FQtyL", "FQtyR"], Some(states));
        let r = row(&[("FQtyL", "12.0"), ("FQtyR", "8.0")]);
        let out = classify(&s, Some(&r));
        let details = out.details.unwrap();
        assert_eq!(details.value, 20.0);
        assert_eq!(details.value_description, "Total fuel: 20.0 gal");
        assert_eq!(out.status, Status::Success);
    }

    #[test]
    fn fuel_detected_by_left_tank_column() {
        let s = step("Tanks", &["FQtyL", "FQtyR"], Some(oil()));
        let r = row(&[("FQtyL", "30"), ("FQtyR", "")]);
        let out = classify(&s, Some(&r));
        assert_eq!(out.details.unwrap().value, 30.0);
    }

    #[test]
    fn first_present_column_is_checked() {
        let s = step("Engine", &["E1 OilP", "E1 OilT"], Some(oil()));
        let r = row(&[("E1 OilP", ""), ("E1 OilT", "80")]);
        let out = classify(&s, Some(&r));
        let details = out.details.unwrap();
        assert_eq!(details.value, 80.0);
        assert_eq!(details.value_description, "E1 OilT: 80.0 psi");
        assert_eq!(
            details.raw_values,
            vec![
                ColumnReading { column: "E1 OilP".into(), value: None },
                ColumnReading { column: "E1 OilT".into(), value: Some(80.0) },
            ]
        );
    }

    #[test]
    fn miss_above_green_reports_margin() {
        let s = step("Oil", &["E1 OilP"], Some(oil()));
        let out = classify(&s, Some(&row(&[("E1 OilP", "95.5")])));
        assert_eq!(out.status, Status::Failed);
        let details = out.details.unwrap();
        assert_eq!(details.range, None);
        assert_eq!(details.expected_ranges.as_deref(), Some("Green (normal): 55-95 psi"));
        let problem = details.problem.unwrap();
        assert!(problem.contains("exceeds the maximum normal range of 95 psi by 0.50 psi"));
        assert!(problem.contains("slightly above"));
        assert!(out.message.ends_with("Expected ranges: Green (normal): 55-95 psi"));
    }

    #[test]
    fn miss_below_green_reports_margin() {
        let s = step("Oil", &["E1 OilP"], Some(oil()));
        let out = classify(&s, Some(&row(&[("E1 OilP", "40")])));
        let problem = out.details.unwrap().problem.unwrap();
        assert!(problem.contains("below the minimum normal range of 55 psi by 15.00 psi"));
        assert!(problem.contains("below the safe operating range"));
    }

    #[test]
    fn miss_without_green_uses_nearest_bound() {
        let s = step(
            "Volts",
            &["volt1"],
            Some(ranges(None, Some((Some(24.0), Some(26.0))), Some((Some(30.0), Some(32.0))))),
        );
        let out = classify(&s, Some(&row(&[("volt1", "27")])));
        assert_eq!(out.status, Status::Failed);
        let details = out.details.unwrap();
        assert_eq!(
            details.problem.as_deref(),
            Some("Value 27.00 psi exceeds the yellow maximum of 26 psi by 1.00 psi.")
        );
        assert_eq!(
            details.expected_ranges.as_deref(),
            Some("Yellow (caution): 24-26 psi | Red (warning): 30-32 psi")
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let s = step("Oil", &["E1 OilP"], Some(oil()));
        let r = row(&[("E1 OilP", "70")]);
        assert_eq!(classify(&s, Some(&r)), classify(&s, Some(&r)));
    }
}
