//! Voice intent structures

use serde::{Deserialize, Serialize};

/// The three things a voice command can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Scan,
    LightOn,
    LightOff,
}

impl Intent {
    /// Tie-break order when scores are equal
    pub const ALL: [Intent; 3] = [Intent::Scan, Intent::LightOn, Intent::LightOff];
}

/// Best-scoring trigger per category for one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentScores {
    pub scan: u32,
    pub light_on: u32,
    pub light_off: u32,
}

impl IntentScores {
    pub fn get(&self, intent: Intent) -> u32 {
        match intent {
            Intent::Scan => self.scan,
            Intent::LightOn => self.light_on,
            Intent::LightOff => self.light_off,
        }
    }

    /// Highest category; earlier categories win ties
    pub fn best(&self) -> (Intent, u32) {
        let mut best = (Intent::Scan, self.scan);
        for intent in Intent::ALL {
            let score = self.get(intent);
            if score > best.1 {
                best = (intent, score);
            }
        }
        best
    }
}
