//! Runtime configuration
//!
//! Every field defaults to the matching constant in the crate root, so a
//! config file only needs the values it changes.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentryError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryConfig {
    // Network
    pub server_addr: String,
    pub mic_udp_port: u16,
    pub smoke_udp_port: u16,
    pub speaker_host: String,
    pub speaker_port: u16,
    pub light_on_url: String,
    pub light_off_url: String,
    pub actuator_timeout_ms: u64,

    // Alerts
    pub smoke_warn_threshold: i64,
    pub smoke_danger_threshold: i64,
    pub smoke_alert_cooldown_secs: f64,
    pub hazard_alert_cooldown_secs: f64,

    // Light + scan
    pub auto_light_enabled: bool,
    pub sentry_enabled: bool,
    pub light_threshold: f64,
    pub light_switch_cooldown_secs: f64,
    pub scan_duration_secs: f64,
    pub sentry_interval_secs: f64,
    pub frame_retry_ms: u64,
    pub brightness_boost: bool,
    pub brightness_alpha: f64,
    pub brightness_beta: f64,

    // Faces + tracker
    pub face_priority: bool,
    pub animal_filter: bool,
    pub face_region_expand: i32,
    pub face_refresh_frames: u64,
    pub face_tolerance: f32,
    pub face_db_path: String,
    pub min_frames_stable: u32,
    pub spatial_clustering_distance: f64,
    pub max_track_age: u32,

    // Audio
    pub spk_sample_rate: u32,
    pub spk_chunk_size: usize,
    pub speaking_tail_ms: u64,
    pub intent_threshold: u32,
    /// Primary speech synthesizer command line (text is appended)
    pub tts_command: Option<Vec<String>>,
    /// Fallback synthesizer, tried when the primary fails
    pub tts_fallback_command: Option<Vec<String>>,

    // Vocabulary
    pub person_aliases: BTreeSet<String>,
    pub animal_classes: BTreeSet<String>,
    pub hazard_list: BTreeSet<String>,
    pub scan_triggers: Vec<String>,
    pub light_on_triggers: Vec<String>,
    pub light_off_triggers: Vec<String>,
}

fn owned_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn owned_vec(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            server_addr: crate::SERVER_ADDR.to_string(),
            mic_udp_port: crate::MIC_UDP_PORT,
            smoke_udp_port: crate::SMOKE_UDP_PORT,
            speaker_host: crate::SPEAKER_HOST.to_string(),
            speaker_port: crate::SPK_UDP_PORT,
            light_on_url: crate::LIGHT_ON_URL.to_string(),
            light_off_url: crate::LIGHT_OFF_URL.to_string(),
            actuator_timeout_ms: crate::ACTUATOR_TIMEOUT_MS,

            smoke_warn_threshold: crate::SMOKE_WARN_THRESHOLD,
            smoke_danger_threshold: crate::SMOKE_DANGER_THRESHOLD,
            smoke_alert_cooldown_secs: crate::SMOKE_ALERT_COOLDOWN_SECS,
            hazard_alert_cooldown_secs: crate::HAZARD_ALERT_COOLDOWN_SECS,

            auto_light_enabled: true,
            sentry_enabled: false,
            light_threshold: crate::LIGHT_THRESHOLD,
            light_switch_cooldown_secs: crate::LIGHT_SWITCH_COOLDOWN_SECS,
            scan_duration_secs: crate::SCAN_DURATION_SECS,
            sentry_interval_secs: crate::SENTRY_INTERVAL_SECS,
            frame_retry_ms: crate::FRAME_RETRY_MS,
            brightness_boost: true,
            brightness_alpha: crate::BRIGHTNESS_ALPHA,
            brightness_beta: crate::BRIGHTNESS_BETA,

            face_priority: true,
            animal_filter: true,
            face_region_expand: crate::FACE_REGION_EXPAND,
            face_refresh_frames: crate::FACE_REFRESH_FRAMES,
            face_tolerance: crate::FACE_TOLERANCE,
            face_db_path: "face_encodings.json".to_string(),
            min_frames_stable: crate::MIN_FRAMES_STABLE,
            spatial_clustering_distance: crate::SPATIAL_CLUSTERING_DISTANCE,
            max_track_age: crate::MAX_TRACK_AGE,

            spk_sample_rate: crate::SPK_SAMPLE_RATE,
            spk_chunk_size: crate::SPK_CHUNK_SIZE,
            speaking_tail_ms: crate::SPEAKING_TAIL_MS,
            intent_threshold: crate::INTENT_THRESHOLD,
            tts_command: None,
            tts_fallback_command: None,

            person_aliases: owned_set(crate::PERSON_ALIASES),
            animal_classes: owned_set(crate::ANIMAL_CLASSES),
            hazard_list: owned_set(crate::HAZARD_LIST),
            scan_triggers: owned_vec(crate::SCAN_TRIGGERS),
            light_on_triggers: owned_vec(crate::LIGHT_ON_TRIGGERS),
            light_off_triggers: owned_vec(crate::LIGHT_OFF_TRIGGERS),
        }
    }
}

impl SentryConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: SentryConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.smoke_warn_threshold >= self.smoke_danger_threshold {
            return Err(SentryError::Config(format!(
                "smoke_warn_threshold ({}) must be below smoke_danger_threshold ({})",
                self.smoke_warn_threshold, self.smoke_danger_threshold
            )));
        }
        if self.spk_chunk_size == 0 || self.spk_sample_rate == 0 {
            return Err(SentryError::Config("speaker chunk size and sample rate must be non-zero".into()));
        }
        if self.min_frames_stable == 0 {
            return Err(SentryError::Config("min_frames_stable must be at least 1".into()));
        }
        for (name, secs) in [
            ("smoke_alert_cooldown_secs", self.smoke_alert_cooldown_secs),
            ("hazard_alert_cooldown_secs", self.hazard_alert_cooldown_secs),
            ("light_switch_cooldown_secs", self.light_switch_cooldown_secs),
            ("scan_duration_secs", self.scan_duration_secs),
            ("sentry_interval_secs", self.sentry_interval_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(SentryError::Config(format!("{} must be a non-negative number", name)));
            }
        }
        Ok(())
    }

    pub fn smoke_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.smoke_alert_cooldown_secs)
    }

    pub fn hazard_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.hazard_alert_cooldown_secs)
    }

    pub fn light_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.light_switch_cooldown_secs)
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs_f64(self.scan_duration_secs)
    }

    pub fn sentry_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sentry_interval_secs)
    }

    pub fn is_person(&self, class: &str) -> bool {
        self.person_aliases.contains(class)
    }

    pub fn is_hazard(&self, class: &str) -> bool {
        self.hazard_list.contains(class)
    }

    /// Classes whose detections are dropped when they overlap a known face
    pub fn is_face_suppressed(&self, class: &str) -> bool {
        self.face_priority && self.animal_filter && self.animal_classes.contains(class)
    }
}
