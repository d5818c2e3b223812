//! Shared process state
//!
//! One explicit object injected into every component. Each field carries its
//! own synchronisation; cooldown check-and-fire happens under a single lock so
//! concurrent writers cannot both fire inside one window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::broadcast;

use crate::config::SentryConfig;
use crate::core::cooldown::Cooldown;
use crate::core::light::LightController;
use crate::types::{MemorySnapshot, StatusReport, StatusSnapshot};

/// Lock a mutex, recovering the data if a holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// "Currently speaking" flag, read by the microphone listener to drop echoes.
/// Counts overlapping utterances so the first one to finish does not clear it.
#[derive(Debug, Default)]
pub struct SpeakingFlag {
    active: Mutex<u32>,
}

impl SpeakingFlag {
    /// Mark speech in progress until the guard drops
    pub fn begin(self: &Arc<Self>) -> SpeakingGuard {
        *lock(&self.active) += 1;
        SpeakingGuard { flag: Arc::clone(self) }
    }

    pub fn is_speaking(&self) -> bool {
        *lock(&self.active) > 0
    }
}

#[derive(Debug)]
pub struct SpeakingGuard {
    flag: Arc<SpeakingFlag>,
}

impl Drop for SpeakingGuard {
    fn drop(&mut self) {
        let mut active = lock(&self.flag.active);
        *active = active.saturating_sub(1);
    }
}

#[derive(Debug)]
pub struct AppState {
    pub config: SentryConfig,
    sentry_active: AtomicBool,
    auto_light_active: AtomicBool,
    pub speaking: Arc<SpeakingFlag>,
    latest: RwLock<StatusReport>,
    pub memory: Mutex<MemorySnapshot>,
    pub hazard_cooldown: Mutex<Cooldown>,
    pub smoke_cooldown: Mutex<Cooldown>,
    pub light: Mutex<LightController>,
    updates: broadcast::Sender<StatusReport>,
}

impl AppState {
    pub fn new(config: SentryConfig) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            sentry_active: AtomicBool::new(config.sentry_enabled),
            auto_light_active: AtomicBool::new(config.auto_light_enabled),
            speaking: Arc::new(SpeakingFlag::default()),
            latest: RwLock::new(StatusReport::default()),
            memory: Mutex::new(MemorySnapshot::default()),
            hazard_cooldown: Mutex::new(Cooldown::new(config.hazard_cooldown())),
            smoke_cooldown: Mutex::new(Cooldown::new(config.smoke_cooldown())),
            light: Mutex::new(LightController::new(config.light_cooldown())),
            updates,
            config,
        }
    }

    pub fn sentry_active(&self) -> bool {
        self.sentry_active.load(Ordering::Relaxed)
    }

    pub fn set_sentry_active(&self, on: bool) {
        self.sentry_active.store(on, Ordering::Relaxed);
    }

    pub fn auto_light_active(&self) -> bool {
        self.auto_light_active.load(Ordering::Relaxed)
    }

    pub fn set_auto_light_active(&self, on: bool) {
        self.auto_light_active.store(on, Ordering::Relaxed);
    }

    pub fn latest(&self) -> StatusReport {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the latest report and notify live subscribers
    pub fn publish(&self, report: StatusReport) {
        *self
            .latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = report.clone();
        // No subscribers is fine
        let _ = self.updates.send(report);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusReport> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            sentry: self.sentry_active(),
            auto_light: self.auto_light_active(),
            latest: self.latest(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SentryConfig::default())
    }
}
