//! Cross-frame track hypothesis

use serde::{Deserialize, Serialize};

use crate::types::Centroid;

/// One hypothesised object instance, identified only by spatial continuity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub centroid: Centroid,
    /// Successful matches, including the frame that created the track
    pub match_count: u32,
    /// Consecutive updates without a match
    pub age: u32,
}

impl TrackedObject {
    pub fn new(centroid: Centroid) -> Self {
        Self {
            centroid,
            match_count: 1,
            age: 0,
        }
    }

    pub fn distance_to(&self, other: Centroid) -> f64 {
        let dx = (self.centroid.0 - other.0) as f64;
        let dy = (self.centroid.1 - other.1) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn matched(&mut self, centroid: Centroid) {
        self.centroid = centroid;
        self.match_count += 1;
        self.age = 0;
    }

    pub fn is_stable(&self, min_frames: u32) -> bool {
        self.match_count >= min_frames
    }
}
