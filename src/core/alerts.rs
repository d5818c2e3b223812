//! Alert coordinator: hazard and smoke policies
//!
//! Each policy owns one cooldown in the shared state and fires at most once
//! per window. Both smoke tiers share a single cooldown, so a warn alert
//! also holds back a danger alert until the window closes.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::core::ports::SpeechOutput;
use crate::core::state::{lock, AppState};
use crate::core::summary::hazard_clause;
use crate::error::{Result, SentryError};
use crate::types::{AlertDecision, SmokeLevel};

#[derive(Clone)]
pub struct AlertCoordinator {
    state: Arc<AppState>,
    speech: Arc<dyn SpeechOutput>,
}

impl AlertCoordinator {
    pub fn new(state: Arc<AppState>, speech: Arc<dyn SpeechOutput>) -> Self {
        Self { state, speech }
    }

    /// Hazard policy for one frame. Hazards always accumulate into
    /// `session_hazards`, even while the alert is cooling down.
    pub fn evaluate_hazards(
        &self,
        frame_hazards: &BTreeSet<String>,
        session_hazards: &mut BTreeSet<String>,
        now: Instant,
    ) -> AlertDecision {
        if frame_hazards.is_empty() {
            return AlertDecision::Quiet;
        }
        session_hazards.extend(frame_hazards.iter().cloned());

        if !lock(&self.state.hazard_cooldown).try_fire(now) {
            debug!(?frame_hazards, "hazard alert suppressed by cooldown");
            return AlertDecision::Suppressed;
        }

        let text = hazard_clause(frame_hazards);
        warn!("🚨 {}", text);
        self.speech.speak(&text);
        AlertDecision::Fired { text }
    }

    /// Smoke policy for one sensor value
    pub fn evaluate_smoke(&self, value: i64, now: Instant) -> AlertDecision {
        let config = &self.state.config;
        let level = SmokeLevel::classify(value, config.smoke_warn_threshold, config.smoke_danger_threshold);
        let Some(phrase) = level.phrase() else {
            return AlertDecision::Quiet;
        };

        if !lock(&self.state.smoke_cooldown).try_fire(now) {
            debug!(value, ?level, "smoke alert suppressed by cooldown");
            return AlertDecision::Suppressed;
        }

        match level {
            SmokeLevel::Danger => warn!(value, "🚨 heavy smoke"),
            _ => info!(value, "⚠️ light smoke"),
        }
        self.speech.speak(phrase);
        AlertDecision::Fired {
            text: phrase.to_string(),
        }
    }

    /// Parse a raw datagram and evaluate it
    pub fn handle_smoke_payload(&self, payload: &[u8], now: Instant) -> Result<AlertDecision> {
        let value = parse_smoke(payload)?;
        Ok(self.evaluate_smoke(value, now))
    }
}

/// Smoke datagrams carry one decimal integer, optionally padded with whitespace
pub fn parse_smoke(payload: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| SentryError::TelemetryMalformed("payload is not UTF-8".into()))?;
    text.trim()
        .parse::<i64>()
        .map_err(|_| SentryError::TelemetryMalformed(format!("not an integer: {:?}", text.trim())))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Speech output that just remembers what it was asked to say
    #[derive(Default)]
    pub struct RecordingSpeech {
        pub spoken: Mutex<Vec<String>>,
    }

    impl SpeechOutput for RecordingSpeech {
        fn speak(&self, text: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
    }

    fn coordinator() -> (AlertCoordinator, Arc<RecordingSpeech>) {
        let speech = Arc::new(RecordingSpeech::default());
        let coordinator = AlertCoordinator::new(Arc::new(AppState::default()), speech.clone());
        (coordinator, speech)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_smoke_danger_cooldown_cycle() {
        let (alerts, speech) = coordinator();
        let t0 = Instant::now();

        assert!(alerts.evaluate_smoke(2500, t0).fired());
        assert_eq!(alerts.evaluate_smoke(2500, t0 + Duration::from_secs(5)), AlertDecision::Suppressed);
        assert!(alerts.evaluate_smoke(2500, t0 + Duration::from_secs(11)).fired());
        assert_eq!(
            *speech.spoken.lock().unwrap(),
            vec!["Emergency! Heavy smoke!", "Emergency! Heavy smoke!"]
        );
    }

    #[test]
    fn test_warn_holds_back_danger_in_same_window() {
        let (alerts, speech) = coordinator();
        let t0 = Instant::now();

        assert!(alerts.evaluate_smoke(800, t0).fired());
        assert_eq!(alerts.evaluate_smoke(2500, t0 + Duration::from_secs(3)), AlertDecision::Suppressed);
        assert_eq!(*speech.spoken.lock().unwrap(), vec!["Caution. Light smoke."]);
    }

    #[test]
    fn test_clear_reading_is_quiet_and_keeps_gate_open() {
        let (alerts, _) = coordinator();
        let t0 = Instant::now();
        assert_eq!(alerts.evaluate_smoke(120, t0), AlertDecision::Quiet);
        assert!(alerts.evaluate_smoke(900, t0).fired());
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let (alerts, speech) = coordinator();
        let err = alerts.handle_smoke_payload(b"smoky", Instant::now()).unwrap_err();
        assert!(matches!(err, SentryError::TelemetryMalformed(_)));
        assert!(speech.spoken.lock().unwrap().is_empty());
        assert_eq!(parse_smoke(b" 2100\n").unwrap(), 2100);
    }

    #[test]
    fn test_hazards_accumulate_while_suppressed() {
        let (alerts, speech) = coordinator();
        let t0 = Instant::now();
        let mut seen = BTreeSet::new();

        let first = alerts.evaluate_hazards(&set(&["knife"]), &mut seen, t0);
        assert_eq!(first, AlertDecision::Fired { text: "ALERT! I see knife.".into() });

        let second = alerts.evaluate_hazards(&set(&["scissors", "gun"]), &mut seen, t0 + Duration::from_secs(1));
        assert_eq!(second, AlertDecision::Suppressed);
        assert_eq!(seen, set(&["gun", "knife", "scissors"]));
        assert_eq!(speech.spoken.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_hazard_frame_is_quiet() {
        let (alerts, _) = coordinator();
        let mut seen = BTreeSet::new();
        assert_eq!(alerts.evaluate_hazards(&BTreeSet::new(), &mut seen, Instant::now()), AlertDecision::Quiet);
        assert!(seen.is_empty());
    }
}
