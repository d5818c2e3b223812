//! Scan session state definitions

use serde::{Deserialize, Serialize};

/// Lifecycle of one scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No scan in progress
    Idle,
    /// Frame loop active
    Running,
    /// Frame loop done, building the report
    Summarizing,
}

impl SessionState {
    pub fn emoji(&self) -> &'static str {
        match self {
            SessionState::Idle => "💤",
            SessionState::Running => "👀",
            SessionState::Summarizing => "📝",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "IDLE",
            SessionState::Running => "RUNNING",
            SessionState::Summarizing => "SUMMARIZING",
        };
        write!(f, "{}", name)
    }
}

/// Who asked for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanTrigger {
    /// Voice command or HTTP request: detailed report, failures spoken
    Operator,
    /// Sentry loop: arrivals only, silent failures
    Automatic,
}

impl ScanTrigger {
    /// Operator scans get the detailed summary
    pub fn is_full(&self) -> bool {
        matches!(self, ScanTrigger::Operator)
    }
}
