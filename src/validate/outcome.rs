use std::fmt;

use serde::Serialize;

use crate::checklist::Tier;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Result tier of one validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Caution,
    Warning,
    Failed,
    NoData,
}

impl Status {
    /// Warning and failed halt a checklist until the operator intervenes.
    pub fn is_blocking(self) -> bool {
        matches!(self, Status::Warning | Status::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Caution => "caution",
            Status::Warning => "warning",
            Status::Failed => "failed",
            Status::NoData => "no_data",
        }
    }
}

impl From<Tier> for Status {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Green => Status::Success,
            Tier::Yellow => Status::Caution,
            Tier::Red => Status::Warning,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

/// Parsed value of one declared column; `None` when missing or unparseable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReading {
    pub column: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationDetails {
    /// The number that was classified.
    pub value: f64,
    pub value_description: String,
    pub columns_checked: Vec<String>,
    pub raw_values: Vec<ColumnReading>,
    /// Matched tier; `None` when the value fell outside every tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_ranges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

// ---------------------------------------------------------------------------
// ValidationOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationDetails>,
}

impl ValidationOutcome {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: ValidationDetails) -> Self {
        self.details = Some(details);
        self
    }
}
