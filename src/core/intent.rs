//! Voice intent router: transcribed text → scan / light on / light off
//!
//! Each category is scored with token-set similarity (0-100) against its
//! trigger phrases; the best category dispatches when it beats the threshold.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::core::ports::{LightActuator, SessionLauncher, SpeechOutput};
use crate::core::state::{lock, AppState};
use crate::types::{Intent, IntentScores, ScanTrigger};

lazy_static! {
    /// Anything that is not a letter or digit separates tokens
    static ref RE_NON_WORD: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();
}

pub struct VoiceIntentRouter {
    state: Arc<AppState>,
    launcher: Arc<dyn SessionLauncher>,
    actuator: Arc<dyn LightActuator>,
    speech: Arc<dyn SpeechOutput>,
}

impl VoiceIntentRouter {
    pub fn new(
        state: Arc<AppState>,
        launcher: Arc<dyn SessionLauncher>,
        actuator: Arc<dyn LightActuator>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self {
        Self {
            state,
            launcher,
            actuator,
            speech,
        }
    }

    /// Best score per category; `None` for blank input
    pub fn score(&self, text: &str) -> Option<IntentScores> {
        if normalize(text).is_empty() {
            return None;
        }
        let config = &self.state.config;
        Some(IntentScores {
            scan: best_score(text, &config.scan_triggers),
            light_on: best_score(text, &config.light_on_triggers),
            light_off: best_score(text, &config.light_off_triggers),
        })
    }

    /// Winning intent if it beats the threshold
    pub fn route(&self, text: &str) -> Option<(Intent, u32)> {
        let (intent, score) = self.score(text)?.best();
        if score > self.state.config.intent_threshold {
            Some((intent, score))
        } else {
            debug!(text, score, "no voice intent above threshold");
            None
        }
    }

    /// Route and dispatch; returns what was dispatched
    pub fn handle(&self, text: &str) -> Option<Intent> {
        let (intent, score) = self.route(text)?;
        info!(?intent, score, "🧠 voice intent");
        self.dispatch(intent);
        Some(intent)
    }

    fn dispatch(&self, intent: Intent) {
        match intent {
            Intent::Scan => self.launcher.launch(ScanTrigger::Operator),
            Intent::LightOn => self.switch_light(true),
            Intent::LightOff => self.switch_light(false),
        }
    }

    fn switch_light(&self, on: bool) {
        match self.actuator.set_light(on) {
            Ok(()) => {
                lock(&self.state.light).record_manual(on, Instant::now());
                self.speech.speak(if on { "Light on." } else { "Light off." });
            }
            Err(e) => warn!(error = %e, on, "voice light command failed"),
        }
    }
}

/// Max token-set score of `text` against any trigger
fn best_score(text: &str, triggers: &[String]) -> u32 {
    triggers
        .iter()
        .map(|t| token_set_ratio(text, t))
        .max()
        .unwrap_or(0)
}

/// Lowercase, non-word runs to single spaces, trimmed
fn normalize(text: &str) -> String {
    RE_NON_WORD
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Similarity of two strings: 200 * LCS / (|a| + |b|), rounded
pub fn ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Rolling single-row LCS table
    let mut row = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut diag = 0;
        for (j, cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    let lcs = row[b.len()];
    (200.0 * lcs as f64 / total as f64).round() as u32
}

/// Token-set similarity: compares the shared tokens against each side's
/// shared-plus-remaining tokens, so extra words on one side cost little
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = ta.intersection(&tb).copied().collect::<Vec<_>>().join(" ");
    let only_a = ta.difference(&tb).copied().collect::<Vec<_>>().join(" ");
    let only_b = tb.difference(&ta).copied().collect::<Vec<_>>().join(" ");

    let combined_a = format!("{} {}", sect, only_a).trim().to_string();
    let combined_b = format!("{} {}", sect, only_b).trim().to_string();

    [
        ratio(&sect, &combined_a),
        ratio(&sect, &combined_b),
        ratio(&combined_a, &combined_b),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

// =============================================================================
// TESTS
// =============================================================================
