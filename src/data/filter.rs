use log::debug;
use serde::Deserialize;

use super::model::TelemetryRow;

// ---------------------------------------------------------------------------
// Thresholds: which columns and limits describe "pre-flight, engine idle"
// ---------------------------------------------------------------------------

/// Column names and limits used by the pre-flight row filter.
///
/// The defaults match a G1000-style single-engine data log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterThresholds {
    pub altitude_column: String,
    pub rpm_column: String,
    pub fuel_flow_column: String,
    pub ground_speed_column: String,
    /// Indicated altitude (ft) below which the aircraft counts as on ground.
    pub ground_altitude_ft: f64,
    /// Minimum RPM for the engine to count as running.
    pub running_rpm: f64,
    /// Ground speed (kt) that counts as moving under power.
    pub moving_ground_speed_kt: f64,
    /// Inclusive RPM band of an idle / run-up sample.
    pub idle_rpm_min: f64,
    pub idle_rpm_max: f64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            altitude_column: "AltInd".into(),
            rpm_column: "E1 RPM".into(),
            fuel_flow_column: "E1 FFlow".into(),
            ground_speed_column: "GndSpd".into(),
            ground_altitude_ft: 50.0,
            running_rpm: 100.0,
            moving_ground_speed_kt: 0.5,
            idle_rpm_min: 500.0,
            idle_rpm_max: 2000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Row classification
// ---------------------------------------------------------------------------

/// Pre-flight classification of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    /// Altitude not recorded and the engine state cannot be decided from the
    /// remaining fields; kept as ground data.
    UnknownAltitude,
    /// On ground with the engine running.
    GroundEngineRunning,
    /// On ground with the engine stopped.
    GroundEngineOff,
    /// Airborne, spinning down, or otherwise not a pre-flight sample.
    Excluded,
}

impl RowPhase {
    pub fn is_retained(self) -> bool {
        !matches!(self, RowPhase::Excluded)
    }
}

/// Read an optional field: empty → `Some(0.0)`, unparseable → `None`.
fn field_or_zero(row: &TelemetryRow, column: &str) -> Option<f64> {
    match row.get(column) {
        None => Some(0.0),
        Some(raw) => super::model::parse_numeric(raw),
    }
}

/// Classify a row against the pre-flight policy.
///
/// The row is kept when it is below the ground altitude and either the engine
/// is running (RPM at or above `running_rpm` with fuel flowing or the aircraft
/// moving) or stopped (RPM exactly zero). With a recorded altitude every
/// non-empty field must parse and empty fields read as zero. An empty or
/// missing altitude counts as ground; see `classify_unknown_altitude`.
pub fn classify_row(row: &TelemetryRow, t: &FilterThresholds) -> RowPhase {
    if row.get(&t.altitude_column).is_none() {
        return classify_unknown_altitude(row, t);
    }

    let parsed = (
        field_or_zero(row, &t.altitude_column),
        field_or_zero(row, &t.rpm_column),
        field_or_zero(row, &t.fuel_flow_column),
        field_or_zero(row, &t.ground_speed_column),
    );
    let (Some(alt), Some(rpm), Some(fflow), Some(gndspd)) = parsed else {
        return RowPhase::Excluded;
    };

    let on_ground = alt < t.ground_altitude_ft;
    let engine_running =
        rpm >= t.running_rpm && (fflow > 0.0 || gndspd >= t.moving_ground_speed_kt);

    match (on_ground, engine_running) {
        (true, true) => RowPhase::GroundEngineRunning,
        (true, false) if rpm == 0.0 => RowPhase::GroundEngineOff,
        _ => RowPhase::Excluded,
    }
}

/// Ground row without an altitude reading.
///
/// Runs the same running/stopped decision, but a field the decision needs
/// that is empty, missing or unparseable leaves the row `UnknownAltitude`
/// instead of reading as zero.
fn classify_unknown_altitude(row: &TelemetryRow, t: &FilterThresholds) -> RowPhase {
    let Some(rpm) = row.numeric(&t.rpm_column) else {
        return RowPhase::UnknownAltitude;
    };
    if rpm == 0.0 {
        return RowPhase::GroundEngineOff;
    }

    let fflow = row.numeric(&t.fuel_flow_column);
    let gndspd = row.numeric(&t.ground_speed_column);
    let fuel_flowing = fflow.is_some_and(|f| f > 0.0);
    let moving = gndspd.is_some_and(|g| g >= t.moving_ground_speed_kt);

    match (fflow, gndspd) {
        _ if rpm >= t.running_rpm && (fuel_flowing || moving) => RowPhase::GroundEngineRunning,
        (Some(_), Some(_)) => RowPhase::Excluded,
        _ => RowPhase::UnknownAltitude,
    }
}

/// Return the rows that pass the pre-flight filter, preserving order.
pub fn preflight_rows(rows: &[TelemetryRow], t: &FilterThresholds) -> Vec<TelemetryRow> {
    rows.iter()
        .filter(|row| {
            let phase = classify_row(row, t);
            debug!("{row}: {phase:?}");
            phase.is_retained()
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Reference row
// ---------------------------------------------------------------------------

/// Pick the sample that best represents "on ground, engine at idle".
///
/// Scans `retained` from newest to oldest for an RPM inside the idle band and
/// falls back to the newest row. `None` only for an empty slice.
pub fn reference_row<'a>(
    retained: &'a [TelemetryRow],
    t: &FilterThresholds,
) -> Option<&'a TelemetryRow> {
    retained
        .iter()
        .rev()
        .find(|row| {
            row.numeric(&t.rpm_column)
                .is_some_and(|rpm| (t.idle_rpm_min..=t.idle_rpm_max).contains(&rpm))
        })
        .or_else(|| retained.last())
}

/// Filter `rows` and pick the reference row in one step.
pub fn select_reference_row(rows: &[TelemetryRow], t: &FilterThresholds) -> Option<TelemetryRow> {
    let retained = preflight_rows(rows, t);
    reference_row(&retained, t).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, alt: &str, rpm: &str, fflow: &str, gndspd: &str) -> TelemetryRow {
        TelemetryRow::new(
            index,
            [("AltInd", alt), ("E1 RPM", rpm), ("E1 FFlow", fflow), ("GndSpd", gndspd)],
        )
    }

    #[test]
    fn running_on_ground_is_kept() {
        let t = FilterThresholds::default();
        assert_eq!(
            classify_row(&row(0, "10", "100", "0.1", "0"), &t),
            RowPhase::GroundEngineRunning
        );
        assert_eq!(
            classify_row(&row(0, "49.9", "2500", "0", "0.5"), &t),
            RowPhase::GroundEngineRunning
        );
    }

    #[test]
    fn engine_off_on_ground_is_kept() {
        let t = FilterThresholds::default();
        assert_eq!(classify_row(&row(0, "0", "0", "", ""), &t), RowPhase::GroundEngineOff);
        assert_eq!(classify_row(&row(0, "5", "", "", ""), &t), RowPhase::GroundEngineOff);
    }

    #[test]
    fn airborne_and_windmilling_rows_are_dropped() {
        let t = FilterThresholds::default();
        assert_eq!(classify_row(&row(0, "50", "2500", "12", "80"), &t), RowPhase::Excluded);
        // Below running RPM but not stopped.
        assert_eq!(classify_row(&row(0, "0", "50", "0", "0"), &t), RowPhase::Excluded);
        // Running RPM without fuel flow or movement.
        assert_eq!(classify_row(&row(0, "0", "600", "0", "0.4"), &t), RowPhase::Excluded);
    }

    #[test]
    fn unparseable_fields() {
        let t = FilterThresholds::default();
        assert_eq!(classify_row(&row(0, "abc", "0", "", ""), &t), RowPhase::Excluded);
        assert_eq!(classify_row(&row(0, "0", "n/a", "", ""), &t), RowPhase::Excluded);
        assert_eq!(classify_row(&row(0, "", "n/a", "", ""), &t), RowPhase::UnknownAltitude);
    }

    #[test]
    fn empty_altitude_still_needs_running_or_stopped_engine() {
        let t = FilterThresholds::default();
        assert_eq!(classify_row(&row(0, "", "50", "0", "0"), &t), RowPhase::Excluded);
        assert_eq!(classify_row(&row(0, "", "600", "0", "0.2"), &t), RowPhase::Excluded);
        assert_eq!(
            classify_row(&row(0, "", "600", "2.5", ""), &t),
            RowPhase::GroundEngineRunning
        );
        assert_eq!(classify_row(&row(0, "", "0", "", ""), &t), RowPhase::GroundEngineOff);
        // Fuel flow and ground speed unknown: the engine state is undecidable.
        assert_eq!(classify_row(&row(0, "", "50", "", ""), &t), RowPhase::UnknownAltitude);
        assert_eq!(classify_row(&row(0, "", "600", "0", "x"), &t), RowPhase::UnknownAltitude);
    }

    #[test]
    fn missing_altitude_column_counts_as_ground() {
        let t = FilterThresholds::default();
        let r = TelemetryRow::new(0, [("E1 RPM", "2700")]);
        assert!(classify_row(&r, &t).is_retained());
    }

    #[test]
    fn reference_prefers_newest_idle_row() {
        let t = FilterThresholds::default();
        let rows = vec![
            row(0, "0", "0", "", ""),
            row(1, "0", "650", "3", "0"),
            row(2, "0", "1000", "4", "0"),
            row(3, "0", "2600", "14", "5"),
            row(4, "900", "2600", "14", "90"),
        ];
        let chosen = select_reference_row(&rows, &t).unwrap();
        assert_eq!(chosen.index, 2);
    }

    #[test]
    fn reference_falls_back_to_newest_retained() {
        let t = FilterThresholds::default();
        let rows = vec![row(0, "0", "0", "", ""), row(1, "0", "2600", "14", "5")];
        assert_eq!(select_reference_row(&rows, &t).unwrap().index, 1);
    }

    #[test]
    fn reference_on_idle_band_edges() {
        let t = FilterThresholds::default();
        let rows = vec![row(0, "0", "500", "2", "0"), row(1, "0", "2000.5", "2", "0")];
        assert_eq!(select_reference_row(&rows, &t).unwrap().index, 0);
        let rows = vec![row(0, "0", "2000", "2", "0"), row(1, "0", "499.9", "2", "0")];
        assert_eq!(select_reference_row(&rows, &t).unwrap().index, 0);
    }

    #[test]
    fn nothing_retained_means_no_reference() {
        let t = FilterThresholds::default();
        let rows = vec![row(0, "3000", "2500", "10", "100")];
        assert!(select_reference_row(&rows, &t).is_none());
        assert!(select_reference_row(&[], &t).is_none());
    }
}
