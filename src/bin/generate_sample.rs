use std::io::Write;

use preflight_copilot::checklist::{Bounds, ChecklistStep, RangeSpec};

/// SplitMix64 stream, seeded once so repeated runs write the same log.
struct Noise(u64);

impl Noise {
    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// `value` plus triangular noise within `±spread`, floored at zero.
    fn jitter(&mut self, value: f64, spread: f64) -> f64 {
        (value + (self.unit() - self.unit()) * spread).max(0.0)
    }
}

/// Nominal readings for one flight phase; `alt` is `None` before the
/// altimeter is powered.
struct Phase {
    name: &'static str,
    rows: usize,
    alt: Option<(f64, f64)>,
    rpm: f64,
    fflow: f64,
    gndspd: (f64, f64),
    oil_t: f64,
    oil_p: f64,
    cht: f64,
    volts: f64,
}

const HEADER: [&str; 12] = [
    " Lcl Date",
    " Lcl Time",
    "  AltInd",
    " GndSpd",
    " E1 RPM",
    " E1 FFlow",
    " E1 OilT",
    " E1 OilP",
    " E1 CHT1",
    "  FQtyL",
    "  FQtyR",
    " volt1",
];

fn phases() -> Vec<Phase> {
    vec![
        Phase { name: "engine off", rows: 20, alt: None, rpm: 0.0, fflow: 0.0, gndspd: (0.0, 0.0), oil_t: 20.0, oil_p: 0.0, cht: 20.0, volts: 24.1 },
        Phase { name: "idle", rows: 40, alt: Some((5.0, 5.0)), rpm: 1000.0, fflow: 3.2, gndspd: (0.0, 0.0), oil_t: 150.0, oil_p: 62.0, cht: 260.0, volts: 28.1 },
        Phase { name: "run-up", rows: 10, alt: Some((5.0, 5.0)), rpm: 1700.0, fflow: 6.0, gndspd: (0.0, 0.0), oil_t: 175.0, oil_p: 72.0, cht: 320.0, volts: 28.2 },
        Phase { name: "taxi", rows: 30, alt: Some((5.0, 5.0)), rpm: 1100.0, fflow: 3.5, gndspd: (8.0, 8.0), oil_t: 180.0, oil_p: 65.0, cht: 300.0, volts: 28.1 },
        Phase { name: "takeoff", rows: 15, alt: Some((5.0, 40.0)), rpm: 2700.0, fflow: 16.0, gndspd: (5.0, 75.0), oil_t: 190.0, oil_p: 80.0, cht: 360.0, volts: 28.2 },
        Phase { name: "climb", rows: 60, alt: Some((50.0, 3000.0)), rpm: 2650.0, fflow: 14.5, gndspd: (80.0, 105.0), oil_t: 205.0, oil_p: 78.0, cht: 380.0, volts: 28.2 },
    ]
}

fn lerp((from, to): (f64, f64), t: f64) -> f64 {
    from + (to - from) * t
}

fn write_log(path: &str, noise: &mut Noise) -> usize {
    let mut file = std::fs::File::create(path).expect("Failed to create output file");
    writeln!(file, "#airframe_info, log_version=\"1.00\", airframe_name=\"SR20\", unit_software_part_number=\"sample\"")
        .expect("Failed to write comment");
    writeln!(file, "#yyy-mm-dd, hh:mm:ss,   ft Baro,  kt, rpm, gph, deg F, psi, deg F, gals, gals, volts")
        .expect("Failed to write comment");

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER).expect("Failed to write header");

    let mut fuel = 28.0_f64;
    let mut second = 0u32;
    for phase in phases() {
        for i in 0..phase.rows {
            let t = i as f64 / phase.rows.max(1) as f64;
            let running = phase.rpm > 0.0;
            let mut jitter = |v: f64, spread: f64| {
                if running { noise.jitter(v, spread) } else { v }
            };

            fuel -= phase.fflow / 3600.0 / 2.0;
            let alt = phase
                .alt
                .map(|band| format!("{:.0}", lerp(band, t)))
                .unwrap_or_default();
            let time = format!("13:{:02}:{:02}", 26 + second / 60, second % 60);
            second += 1;

            let record = [
                "2024-05-05".to_string(),
                time,
                alt,
                format!("{:.1}", lerp(phase.gndspd, t)),
                format!("{:.0}", jitter(phase.rpm, 15.0)),
                format!("{:.2}", jitter(phase.fflow, 0.1)),
                format!("{:.0}", jitter(phase.oil_t, 1.0)),
                format!("{:.1}", jitter(phase.oil_p, 0.5)),
                format!("{:.0}", jitter(phase.cht, 2.0)),
                format!("{fuel:.2}"),
                format!("{fuel:.2}"),
                format!("{:.1}", jitter(phase.volts, 0.05)),
            ];
            writer.write_record(&record).expect("Failed to write row");
        }
        println!("  {:<10} {} rows", phase.name, phase.rows);
    }
    writer.flush().expect("Failed to flush CSV");
    second as usize
}

fn sample_checklist() -> Vec<ChecklistStep> {
    let ranges = |green: Bounds, yellow: Option<Bounds>, red: Option<Bounds>, unit: &str| RangeSpec {
        green: Some(green),
        yellow,
        red,
        unit: unit.to_string(),
    };
    let step = |id: &str, name: &str, desc: &str, cols: &[&str], states: Option<RangeSpec>| ChecklistStep {
        step_id: id.to_string(),
        name: name.to_string(),
        description: desc.to_string(),
        telemetry_columns: cols.iter().map(|c| c.to_string()).collect(),
        states,
        ..Default::default()
    };
    vec![
        step("step_1", "Doors", "Verify doors are latched", &[], None),
        step(
            "step_2",
            "Fuel Quantity",
            "Confirm fuel quantity is adequate",
            &["FQtyL", "FQtyR"],
            Some(ranges(
                Bounds::new(Some(20.0), Some(56.0)),
                Some(Bounds::new(Some(10.0), Some(20.0))),
                Some(Bounds::new(None, Some(10.0))),
                "gal",
            )),
        ),
        step(
            "step_3",
            "Oil Pressure",
            "Oil pressure in the green arc",
            &["E1 OilP"],
            Some(ranges(
                Bounds::new(Some(30.0), Some(60.0)),
                Some(Bounds::new(Some(60.0), Some(100.0))),
                Some(Bounds::new(Some(100.0), None)),
                "psi",
            )),
        ),
        step(
            "step_4",
            "Oil Temperature",
            "Oil temperature in the green arc",
            &["E1 OilT"],
            Some(ranges(
                Bounds::new(Some(100.0), Some(240.0)),
                None,
                Some(Bounds::new(Some(240.0), None)),
                "°F",
            )),
        ),
        step(
            "step_5",
            "Alternator",
            "Bus voltage in the green arc",
            &["volt1"],
            Some(ranges(Bounds::new(Some(27.5), Some(29.0)), None, None, "V")),
        ),
    ]
}

fn main() {
    let mut noise = Noise(42);

    let log_path = "sample_flight_data.csv";
    println!("Writing {log_path}:");
    let rows = write_log(log_path, &mut noise);
    println!("Wrote {rows} samples to {log_path}");

    let checklist_path = "sample_checklist.json";
    let json = serde_json::to_string_pretty(&sample_checklist()).expect("Failed to serialize checklist");
    std::fs::write(checklist_path, json).expect("Failed to write checklist");
    println!("Wrote checklist to {checklist_path}");
}
