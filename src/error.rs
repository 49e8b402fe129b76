use thiserror::Error;

use crate::checklist::Tier;

/// Problems with a checklist definition, caught when it is loaded.
#[derive(Error, Debug, PartialEq)]
pub enum ChecklistError {
    #[error("step {index} has an empty step_id")]
    EmptyStepId { index: usize },

    #[error("duplicate step_id: {0}")]
    DuplicateStepId(String),

    #[error("step {step_id}: {tier} range has min {min} above max {max}")]
    InvertedBounds {
        step_id: String,
        tier: Tier,
        min: f64,
        max: f64,
    },

    #[error("step {step_id}: {tier} range has a non-finite bound")]
    NonFiniteBound { step_id: String, tier: Tier },
}
