//! Output structures for the status surface and the terminal

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::types::SessionState;

/// Last known light actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    On,
    Off,
    Unknown,
}

impl From<Option<bool>> for LightState {
    fn from(state: Option<bool>) -> Self {
        match state {
            Some(true) => LightState::On,
            Some(false) => LightState::Off,
            None => LightState::Unknown,
        }
    }
}

impl std::fmt::Display for LightState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LightState::On => "on",
            LightState::Off => "off",
            LightState::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Latest spoken report, as exposed on the status surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub text: String,
    /// Local wall clock "HH:MM:SS", empty before the first scan
    pub timestamp: String,
    pub light: LightState,
}

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            text: "System ready.".to_string(),
            timestamp: String::new(),
            light: LightState::Unknown,
        }
    }
}

impl StatusReport {
    pub fn new(text: impl Into<String>, at: DateTime<Local>, light: LightState) -> Self {
        Self {
            text: text.into(),
            timestamp: at.format("%H:%M:%S").to_string(),
            light,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        format!(
            "\x1b[36m📝 [{}] {}\x1b[0m \x1b[90m(light {})\x1b[0m",
            self.timestamp, self.text, self.light
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!("time={} | light={} | text={}", self.timestamp, self.light, self.text)
    }
}

/// Read-only view served on the status surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub sentry: bool,
    pub auto_light: bool,
    pub latest: StatusReport,
}

/// What a finished (or aborted) scan produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// State the session ended in (always IDLE once returned)
    pub state: SessionState,
    pub aborted: bool,
    pub frames: u64,
    pub hazards: Vec<String>,
    /// Empty when nothing was worth saying
    pub summary: String,
}

impl ScanOutcome {
    pub fn aborted() -> Self {
        Self {
            state: SessionState::Idle,
            aborted: true,
            frames: 0,
            hazards: Vec::new(),
            summary: String::new(),
        }
    }
}
