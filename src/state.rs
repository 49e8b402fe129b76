use log::{info, warn};
use serde::Serialize;

use crate::checklist::{Checklist, ChecklistStep};
use crate::validate::{Status, TelemetryValidator, ValidationOutcome};

// ---------------------------------------------------------------------------
// Per-step state
// ---------------------------------------------------------------------------

/// Where a single step is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Running,
    Done(ValidationOutcome),
}

impl StepState {
    pub fn status(&self) -> Option<Status> {
        match self {
            StepState::Done(outcome) => Some(outcome.status),
            _ => None,
        }
    }
}

/// Overall progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    /// Halted on a warning or failed step; see [`ChecklistSession::override_block`].
    Blocked,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedStep {
    pub step_id: String,
    pub step_name: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub completed_steps: usize,
    pub total_steps: usize,
    pub failed_steps: Vec<FailedStep>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One pilot walking through one checklist.
///
/// Owned by the caller; nothing here is global.
pub struct ChecklistSession {
    checklist: Checklist,
    states: Vec<StepState>,
    current: usize,
    status: SessionStatus,
    failed: Vec<FailedStep>,
    /// Record blocking steps as failed but keep going.
    pub continue_on_error: bool,
}

impl ChecklistSession {
    pub fn new(checklist: Checklist) -> Self {
        let states = vec![StepState::Pending; checklist.len()];
        let status = if checklist.is_empty() {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        };
        Self {
            checklist,
            states,
            current: 0,
            status,
            failed: Vec::new(),
            continue_on_error: false,
        }
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn step_state(&self, index: usize) -> Option<&StepState> {
        self.states.get(index)
    }

    /// The step that `run_current` will validate next.
    pub fn current_step(&self) -> Option<&ChecklistStep> {
        match self.status {
            SessionStatus::Completed => None,
            _ => self.checklist.steps().get(self.current),
        }
    }

    /// Id of the step after the current one, if any.
    pub fn next_step_id(&self) -> Option<&str> {
        self.checklist
            .steps()
            .get(self.current + 1)
            .map(|s| s.step_id.as_str())
    }

    /// Validate the current step and advance or block.
    ///
    /// Success, caution and no-data advance. Warning and failed block unless
    /// `continue_on_error` is set. Returns `None` when nothing is runnable.
    pub fn run_current(&mut self, validator: &TelemetryValidator) -> Option<ValidationOutcome> {
        if self.status != SessionStatus::InProgress {
            return None;
        }
        let step = self.checklist.steps().get(self.current)?.clone();

        self.states[self.current] = StepState::Running;
        let outcome = validator.validate(&step, None);
        self.states[self.current] = StepState::Done(outcome.clone());

        if outcome.status.is_blocking() {
            self.failed.push(FailedStep {
                step_id: step.step_id.clone(),
                step_name: step.name.clone(),
                status: outcome.status,
            });
            if !self.continue_on_error {
                warn!("Checklist blocked at {}: {}", step.step_id, outcome.message);
                self.status = SessionStatus::Blocked;
                return Some(outcome);
            }
        }
        self.advance();
        Some(outcome)
    }

    /// Run until the checklist completes or blocks.
    pub fn run_to_end(&mut self, validator: &TelemetryValidator) -> Vec<(String, ValidationOutcome)> {
        let mut results = Vec::new();
        while let Some(step_id) = self.current_step().map(|s| s.step_id.clone()) {
            match self.run_current(validator) {
                Some(outcome) => results.push((step_id, outcome)),
                None => break,
            }
        }
        results
    }

    /// Operator acknowledges a blocking step and continues past it.
    pub fn override_block(&mut self) -> bool {
        if self.status != SessionStatus::Blocked {
            return false;
        }
        info!("Operator override at step index {}", self.current);
        self.status = SessionStatus::InProgress;
        self.advance();
        true
    }

    fn advance(&mut self) {
        self.current += 1;
        if self.current >= self.checklist.len() {
            self.status = SessionStatus::Completed;
        }
    }

    /// Summary of the session so far.
    pub fn complete(&self) -> SessionSummary {
        let completed_steps = self
            .states
            .iter()
            .filter(|s| matches!(s, StepState::Done(_)))
            .count();
        let message = match (self.status, self.failed.is_empty()) {
            (SessionStatus::Completed, true) => {
                "Checklist completed successfully. Aircraft is ready for takeoff.".to_string()
            }
            (SessionStatus::Completed, false) => {
                format!("Checklist completed with {} failed step(s).", self.failed.len())
            }
            (SessionStatus::Blocked, _) => match self.checklist.steps().get(self.current) {
                Some(step) => format!("Checklist blocked at {} ({}).", step.step_id, step.name),
                None => "Checklist blocked.".to_string(),
            },
            (SessionStatus::InProgress, _) => "Checklist in progress.".to_string(),
        };
        SessionSummary {
            completed_steps,
            total_steps: self.checklist.len(),
            failed_steps: self.failed.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{Bounds, RangeSpec};
    use crate::data::filter::FilterThresholds;
    use crate::data::loader::parse_csv;

    fn ranged(id: &str, column: &str, green: (f64, f64), red: Option<(f64, f64)>) -> ChecklistStep {
        ChecklistStep {
            step_id: id.into(),
            name: id.into(),
            telemetry_columns: vec![column.into()],
            states: Some(RangeSpec {
                green: Some(Bounds::new(Some(green.0), Some(green.1))),
                red: red.map(|(lo, hi)| Bounds::new(Some(lo), Some(hi))),
                unit: String::new(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn validator() -> TelemetryValidator {
        let log = parse_csv(
            "AltInd, E1 RPM, E1 FFlow, GndSpd, E1 OilP, E1 OilT\n\
             0, 800, 3, 0, 70, 260\n",
        )
        .unwrap();
        TelemetryValidator::from_log(log, FilterThresholds::default())
    }

    fn checklist() -> Checklist {
        Checklist::from_steps(vec![
            ChecklistStep {
                step_id: "doors".into(),
                name: "Doors".into(),
                ..Default::default()
            },
            ranged("oilt", "E1 OilT", (100.0, 245.0), Some((245.0, 300.0))),
            ranged("oilp", "E1 OilP", (55.0, 95.0), None),
            ranged("missing", "E1 CHT1", (100.0, 400.0), None),
        ])
        .unwrap()
    }

    #[test]
    fn warning_blocks_the_session() {
        let v = validator();
        let mut session = ChecklistSession::new(checklist());
        let results = session.run_to_end(&v);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].1.status, Status::Warning);
        assert_eq!(session.status(), SessionStatus::Blocked);
        assert_eq!(session.current_step().unwrap().step_id, "oilt");
        assert_eq!(session.step_state(2), Some(&StepState::Pending));
        assert!(session.run_current(&v).is_none());
    }

    #[test]
    fn override_continues_after_block() {
        let v = validator();
        let mut session = ChecklistSession::new(checklist());
        session.run_to_end(&v);
        assert!(session.override_block());
        let rest = session.run_to_end(&v);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].1.status, Status::Success);
        // no_data does not block.
        assert_eq!(rest[1].1.status, Status::NoData);
        assert_eq!(session.status(), SessionStatus::Completed);

        let summary = session.complete();
        assert_eq!(summary.completed_steps, 4);
        assert_eq!(summary.total_steps, 4);
        assert_eq!(summary.failed_steps.len(), 1);
        assert_eq!(summary.failed_steps[0].step_id, "oilt");
        assert!(!session.override_block());
    }

    #[test]
    fn continue_on_error_records_failures() {
        let v = validator();
        let mut session = ChecklistSession::new(checklist()).with_continue_on_error(true);
        let results = session.run_to_end(&v);
        assert_eq!(results.len(), 4);
        assert_eq!(session.status(), SessionStatus::Completed);
        let summary = session.complete();
        assert_eq!(summary.failed_steps.len(), 1);
        assert!(summary.message.contains("1 failed step"));
    }

    #[test]
    fn next_step_id_follows_order() {
        let session = ChecklistSession::new(checklist());
        assert_eq!(session.current_step().unwrap().step_id, "doors");
        assert_eq!(session.next_step_id(), Some("oilt"));
    }

    #[test]
    fn empty_checklist_is_complete() {
        let session = ChecklistSession::new(Checklist::default());
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.current_step().is_none());
    }
}
