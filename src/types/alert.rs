//! Alert categories and smoke severity tiers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokeLevel {
    Clear,
    Warn,
    Danger,
}

impl SmokeLevel {
    /// Classify a raw sensor value; thresholds are exclusive
    pub fn classify(value: i64, warn: i64, danger: i64) -> Self {
        if value > danger {
            SmokeLevel::Danger
        } else if value > warn {
            SmokeLevel::Warn
        } else {
            SmokeLevel::Clear
        }
    }

    pub fn phrase(&self) -> Option<&'static str> {
        match self {
            SmokeLevel::Danger => Some("Emergency! Heavy smoke!"),
            SmokeLevel::Warn => Some("Caution. Light smoke."),
            SmokeLevel::Clear => None,
        }
    }
}

/// Result of evaluating one snapshot against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertDecision {
    /// Nothing to report
    Quiet,
    /// Would have fired, but the category is cooling down
    Suppressed,
    /// Spoken with this text
    Fired { text: String },
}

impl AlertDecision {
    pub fn fired(&self) -> bool {
        matches!(self, AlertDecision::Fired { .. })
    }
}
