use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChecklistError;

// ---------------------------------------------------------------------------
// Tier – green / yellow / red band
// ---------------------------------------------------------------------------

/// Classification band of a measured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    /// Evaluation order: most safety-critical first.
    pub const PRIORITY: [Tier; 3] = [Tier::Red, Tier::Yellow, Tier::Green];

    /// Display order used when listing configured ranges.
    pub const DISPLAY: [Tier; 3] = [Tier::Green, Tier::Yellow, Tier::Red];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Green => "Green (normal)",
            Tier::Yellow => "Yellow (caution)",
            Tier::Red => "Red (warning)",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Green => write!(f, "green"),
            Tier::Yellow => write!(f, "yellow"),
            Tier::Red => write!(f, "red"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds / RangeSpec
// ---------------------------------------------------------------------------

/// Inclusive `{min?, max?}` pair. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Bounds { min, max }
    }

    /// Neither side set; the tier is undefined.
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `value` lies in the band.
    ///
    /// Both sides: `min ≤ value ≤ max`. Only `min`: `value ≥ min`.
    /// Only `max`: `value ≤ max`. The same rule holds for every tier.
    pub fn contains(&self, value: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= value && value <= max,
            (Some(min), None) => value >= min,
            (None, Some(max)) => value <= max,
            (None, None) => false,
        }
    }

    /// Compact rendering: `55-95 psi`, `≥55 psi`, `≤95 psi`.
    pub fn render(&self, unit: &str) -> String {
        let text = match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{min}-{max}"),
            (Some(min), None) => format!("≥{min}"),
            (None, Some(max)) => format!("≤{max}"),
            (None, None) => return "undefined".to_string(),
        };
        with_unit(text, unit)
    }
}

pub(crate) fn with_unit(text: String, unit: &str) -> String {
    if unit.is_empty() {
        text
    } else {
        format!("{text} {unit}")
    }
}

/// Green / yellow / red bands for one checklist step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yellow: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<Bounds>,
    #[serde(default)]
    pub unit: String,
}

impl RangeSpec {
    pub fn tier(&self, tier: Tier) -> Option<&Bounds> {
        match tier {
            Tier::Green => self.green.as_ref(),
            Tier::Yellow => self.yellow.as_ref(),
            Tier::Red => self.red.as_ref(),
        }
        .filter(|b| !b.is_empty())
    }

    /// No tier is defined.
    pub fn is_empty(&self) -> bool {
        Tier::DISPLAY.iter().all(|t| self.tier(*t).is_none())
    }

    /// Defined tiers in `order`.
    pub fn defined<'a>(&'a self, order: &'a [Tier]) -> impl Iterator<Item = (Tier, &'a Bounds)> + 'a {
        order.iter().filter_map(move |t| self.tier(*t).map(|b| (*t, b)))
    }

    /// Drop tiers with neither bound set.
    fn normalize(&mut self) {
        for slot in [&mut self.green, &mut self.yellow, &mut self.red] {
            if slot.is_some_and(|b| b.is_empty()) {
                *slot = None;
            }
        }
    }

    fn check(&self, step_id: &str) -> Result<(), ChecklistError> {
        for (tier, bounds) in self.defined(&Tier::DISPLAY) {
            let finite = bounds.min.into_iter().chain(bounds.max).all(f64::is_finite);
            if !finite {
                return Err(ChecklistError::NonFiniteBound {
                    step_id: step_id.to_string(),
                    tier,
                });
            }
            if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                if min > max {
                    return Err(ChecklistError::InvertedBounds {
                        step_id: step_id.to_string(),
                        tier,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChecklistStep / Checklist
// ---------------------------------------------------------------------------

/// One verifiable pre-flight item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistStep {
    pub step_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
    /// Columns to read, in order. Empty for a visual check.
    #[serde(default)]
    pub telemetry_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_logic: Option<String>,
    /// `None` when the step cannot be checked against telemetry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<RangeSpec>,
}

/// An ordered, validated list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Checklist {
    steps: Vec<ChecklistStep>,
}

impl Checklist {
    /// Normalise and validate raw steps.
    ///
    /// Tiers with neither bound are removed and a `states` block left with no
    /// tier becomes `None`.
    pub fn from_steps(mut steps: Vec<ChecklistStep>) -> Result<Self, ChecklistError> {
        let mut seen = BTreeSet::new();
        for (index, step) in steps.iter_mut().enumerate() {
            if step.step_id.trim().is_empty() {
                return Err(ChecklistError::EmptyStepId { index });
            }
            if !seen.insert(step.step_id.clone()) {
                return Err(ChecklistError::DuplicateStepId(step.step_id.clone()));
            }
            if let Some(states) = step.states.as_mut() {
                states.normalize();
                states.check(&step.step_id)?;
            }
            if step.states.as_ref().is_some_and(RangeSpec::is_empty) {
                step.states = None;
            }
        }
        Ok(Checklist { steps })
    }

    /// Built-in checklist used when no checklist file is available.
    pub fn fallback() -> Self {
        let step = |id: &str, name: &str, desc: &str, expected: &str, cols: &[&str], logic: &str| {
            ChecklistStep {
                step_id: id.into(),
                name: name.into(),
                description: desc.into(),
                expected_value: Some(expected.into()),
                telemetry_columns: cols.iter().map(|c| c.to_string()).collect(),
                validation_logic: Some(logic.into()),
                states: None,
            }
        };
        Checklist {
            steps: vec![
                step(
                    "step_1",
                    "Doors",
                    "Verify doors are latched",
                    "LATCHED",
                    &[],
                    "Visual check required",
                ),
                step(
                    "step_2",
                    "Fuel Quantity",
                    "Confirm fuel quantity is adequate",
                    "> minimum required",
                    &["FQtyL", "FQtyR"],
                    "Sum of FQtyL and FQtyR should be above minimum",
                ),
                step(
                    "step_3",
                    "Engine Parameters",
                    "Check engine parameters are within normal ranges",
                    "Within green arcs",
                    &["E1 RPM", "E1 OilT", "E1 OilP", "E1 CHT1"],
                    "All engine parameters should be within normal operating ranges",
                ),
            ],
        }
    }

    pub fn steps(&self) -> &[ChecklistStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.step_id == step_id)
    }

    pub fn get(&self, step_id: &str) -> Option<&ChecklistStep> {
        self.position(step_id).map(|i| &self.steps[i])
    }
}
