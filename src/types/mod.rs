//! Core types for the sentry

mod alert;
mod detection;
mod frame;
mod intent;
mod memory;
mod output;
mod state;
mod tracked;

pub use alert::{AlertDecision, SmokeLevel};
pub use detection::{BBox, Centroid, Detection};
pub use frame::Frame;
pub use intent::{Intent, IntentScores};
pub use memory::MemorySnapshot;
pub use output::{LightState, ScanOutcome, StatusReport, StatusSnapshot};
pub use state::{ScanTrigger, SessionState};
pub use tracked::TrackedObject;
