/// Data layer: telemetry rows, loading, and pre-flight filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TelemetryLog
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ TelemetryLog  │  Vec<TelemetryRow>, column names
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  ground/idle policy → retained rows → reference row
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
