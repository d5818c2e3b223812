//! Aether Eye: room sentry core
//!
//! Fuses detector output, ambient light, smoke telemetry and voice commands
//! into spoken reports and light switch commands.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::SentryConfig;
pub use error::{Result, SentryError};

// =============================================================================
// NETWORK
// =============================================================================

/// HTTP status/command surface bind address
pub const SERVER_ADDR: &str = "0.0.0.0:5000";

/// Inbound microphone PCM datagrams
pub const MIC_UDP_PORT: u16 = 4444;

/// Outbound speaker PCM datagrams
pub const SPK_UDP_PORT: u16 = 5555;

/// Inbound smoke sensor readings
pub const SMOKE_UDP_PORT: u16 = 6666;

pub const SPEAKER_HOST: &str = "10.239.67.196";
pub const LIGHT_ON_URL: &str = "http://10.239.67.247/light/on";
pub const LIGHT_OFF_URL: &str = "http://10.239.67.247/light/off";

/// Actuator request timeout (milliseconds)
pub const ACTUATOR_TIMEOUT_MS: u64 = 2000;

// =============================================================================
// ALERTS
// =============================================================================

pub const SMOKE_WARN_THRESHOLD: i64 = 500;
pub const SMOKE_DANGER_THRESHOLD: i64 = 2000;

/// Shared by both smoke tiers (seconds)
pub const SMOKE_ALERT_COOLDOWN_SECS: f64 = 10.0;

pub const HAZARD_ALERT_COOLDOWN_SECS: f64 = 10.0;

// =============================================================================
// LIGHT + SCAN
// =============================================================================

/// Mean HSV value below this means the room needs light
pub const LIGHT_THRESHOLD: f64 = 60.0;
pub const LIGHT_SWITCH_COOLDOWN_SECS: f64 = 2.0;

/// Length of one scan session (seconds)
pub const SCAN_DURATION_SECS: f64 = 30.0;

/// Sentry loop polling interval (seconds)
pub const SENTRY_INTERVAL_SECS: f64 = 10.0;

/// Pause after a failed frame read (milliseconds)
pub const FRAME_RETRY_MS: u64 = 100;

pub const BRIGHTNESS_ALPHA: f64 = 1.3;
pub const BRIGHTNESS_BETA: f64 = 12.0;

// =============================================================================
// FACES + TRACKER
// =============================================================================

/// Padding around a face box when suppressing animal detections (pixels)
pub const FACE_REGION_EXPAND: i32 = 30;

/// Re-resolve cached faces every N frames
pub const FACE_REFRESH_FRAMES: u64 = 15;

/// Max encoding distance for a face match
pub const FACE_TOLERANCE: f32 = 0.6;

pub const MIN_FRAMES_STABLE: u32 = 2;
pub const SPATIAL_CLUSTERING_DISTANCE: f64 = 80.0;
pub const MAX_TRACK_AGE: u32 = 30;

/// Name reported for a face that matched nobody
pub const UNKNOWN_NAME: &str = "Unknown";

// =============================================================================
// AUDIO
// =============================================================================

pub const SPK_SAMPLE_RATE: u32 = 16000;
pub const SPK_CHUNK_SIZE: usize = 1024;

/// Hold the speaking flag this long after playback (milliseconds)
pub const SPEAKING_TAIL_MS: u64 = 500;

/// Fuzzy score a voice command must exceed
pub const INTENT_THRESHOLD: u32 = 65;

// =============================================================================
// VOCABULARY
// =============================================================================

pub const PERSON_ALIASES: &[&str] = &["person", "man", "woman", "boy", "girl"];
pub const ANIMAL_CLASSES: &[&str] = &["dog", "cat", "bird", "horse", "sheep", "cow"];
pub const HAZARD_LIST: &[&str] = &["knife", "scissors", "fire", "smoke", "pistol", "gun", "weapon"];

pub const SCAN_TRIGGERS: &[&str] = &[
    "scan room",
    "room scan",
    "scandal",
    "start scan",
    "check room",
    "look around",
    "room scan karo",
    "Hey Aether",
];
pub const LIGHT_ON_TRIGGERS: &[&str] = &["light on", "turn on light", "lights on"];
pub const LIGHT_OFF_TRIGGERS: &[&str] = &["light off", "turn off light", "lights off"];

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
