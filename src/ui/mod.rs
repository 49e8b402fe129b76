/// Terminal rendering of outcomes, telemetry and session summaries.
pub mod report;
