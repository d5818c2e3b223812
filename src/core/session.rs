//! Session orchestrator: one scan, IDLE → RUNNING → SUMMARIZING → IDLE
//!
//! Per frame: boost, light reading, detectors, face resolution, tracker,
//! hazard policy. At the end the summary goes into the shared status report
//! and out through speech. Only one session runs at a time; the camera is
//! not shared.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::core::alerts::AlertCoordinator;
use crate::core::light::{LightDecision, LightStep};
use crate::core::ports::{Camera, Detector, FaceIdentifier, FrameStream, LightActuator, SessionLauncher, SpeechOutput};
use crate::core::state::{lock, AppState};
use crate::core::summary::{self, SummaryInput};
use crate::core::tracker::{ObjectTracker, TrackerConfig};
use crate::types::{BBox, Detection, Frame, ScanOutcome, ScanTrigger, SessionState, StatusReport};
use crate::UNKNOWN_NAME;

/// Mutable state of one running scan
#[derive(Debug)]
pub struct ScanSession {
    pub started: Instant,
    pub budget: Duration,
    pub frame_count: u64,
    pub hazards_seen: BTreeSet<String>,
    /// persistent id → resolved name (possibly `UNKNOWN_NAME`)
    pub face_cache: BTreeMap<i64, String>,
    pub tracker: ObjectTracker,
}

impl ScanSession {
    pub fn new(budget: Duration, tracker: TrackerConfig) -> Self {
        Self {
            started: Instant::now(),
            budget,
            frame_count: 0,
            hazards_seen: BTreeSet::new(),
            face_cache: BTreeMap::new(),
            tracker: ObjectTracker::new(tracker),
        }
    }

    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    /// Known names seen this session
    pub fn names(&self) -> BTreeSet<String> {
        self.face_cache
            .values()
            .filter(|name| name.as_str() != UNKNOWN_NAME)
            .cloned()
            .collect()
    }

    /// Tracked people that never resolved to a known face
    pub fn unknown_count(&self) -> usize {
        self.face_cache
            .values()
            .filter(|name| name.as_str() == UNKNOWN_NAME)
            .count()
    }
}

pub struct SessionOrchestrator {
    state: Arc<AppState>,
    camera: Option<Arc<dyn Camera>>,
    detectors: Vec<Arc<dyn Detector>>,
    faces: Option<Arc<dyn FaceIdentifier>>,
    actuator: Arc<dyn LightActuator>,
    speech: Arc<dyn SpeechOutput>,
    alerts: AlertCoordinator,
    busy: AtomicBool,
}

impl SessionOrchestrator {
    pub fn new(state: Arc<AppState>, actuator: Arc<dyn LightActuator>, speech: Arc<dyn SpeechOutput>) -> Self {
        let alerts = AlertCoordinator::new(state.clone(), speech.clone());
        Self {
            state,
            camera: None,
            detectors: Vec::new(),
            faces: None,
            actuator,
            speech,
            alerts,
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_camera(mut self, camera: Arc<dyn Camera>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn with_face_identifier(mut self, faces: Arc<dyn FaceIdentifier>) -> Self {
        self.faces = Some(faces);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one scan to completion. Blocks for the whole scan budget.
    pub fn run(&self, trigger: ScanTrigger) -> ScanOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(?trigger, "scan already running, request ignored");
            return ScanOutcome::aborted();
        }
        let _busy = BusyGuard(&self.busy);
        self.run_exclusive(trigger)
    }

    fn run_exclusive(&self, trigger: ScanTrigger) -> ScanOutcome {
        let mut stream = match self.open_stream() {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, ?trigger, "❌ camera offline, scan aborted");
                if trigger.is_full() {
                    self.speech.speak("Camera offline.");
                }
                return ScanOutcome::aborted();
            }
        };

        let config = &self.state.config;
        let mut session = ScanSession::new(config.scan_duration(), TrackerConfig::from(config));
        log_transition(SessionState::Running, trigger);

        while !session.expired() {
            match stream.read() {
                Ok(frame) => self.process_frame(&mut session, frame),
                Err(e) => {
                    debug!(error = %e, "frame read failed, retrying");
                    std::thread::sleep(Duration::from_millis(config.frame_retry_ms));
                }
            }
        }
        drop(stream);

        log_transition(SessionState::Summarizing, trigger);
        let text = self.summarize(&session, trigger);
        log_transition(SessionState::Idle, trigger);

        ScanOutcome {
            state: SessionState::Idle,
            aborted: false,
            frames: session.frame_count,
            hazards: session.hazards_seen.into_iter().collect(),
            summary: text,
        }
    }

    /// The light lock is released while the actuator call is in flight;
    /// a manual command landing meanwhile is overwritten by the commit.
    fn feed_light(&self, needs_light: bool) -> LightDecision {
        let now = Instant::now();
        let step = lock(&self.state.light).decide(needs_light, self.state.auto_light_active(), now);
        match step {
            LightStep::Done(decision) => decision,
            LightStep::Switch(on) => {
                let result = self.actuator.set_light(on);
                lock(&self.state.light).commit(on, result, now)
            }
        }
    }

    fn open_stream(&self) -> crate::Result<Box<dyn FrameStream>> {
        match &self.camera {
            Some(camera) => camera.open(),
            None => Err(crate::SentryError::SourceUnavailable("no camera configured".into())),
        }
    }

    /// One RUNNING iteration
    pub fn process_frame(&self, session: &mut ScanSession, mut frame: Frame) {
        let config = &self.state.config;
        session.frame_count += 1;

        if config.brightness_boost {
            frame.boost(config.brightness_alpha, config.brightness_beta);
        }

        let brightness = frame.mean_value();
        let needs_light = brightness < config.light_threshold;
        let decision = self.feed_light(needs_light);
        debug!(brightness, needs_light, ?decision, "light reading");

        let detections = self.detect(&frame);

        let mut face_regions: Vec<BBox> = Vec::new();
        let mut by_class: BTreeMap<String, Vec<BBox>> = BTreeMap::new();
        let mut frame_hazards: BTreeSet<String> = BTreeSet::new();

        for detection in &detections {
            let class = &detection.class_label;
            if config.is_hazard(class) {
                frame_hazards.insert(class.clone());
            }
            if config.is_person(class) {
                if let Some(id) = detection.persistent_id {
                    let refreshed = self.resolve_face(session, &frame, detection, id);
                    let known = session
                        .face_cache
                        .get(&id)
                        .is_some_and(|name| name.as_str() != UNKNOWN_NAME);
                    if known {
                        if refreshed {
                            face_regions.push(detection.bbox);
                        }
                        continue;
                    }
                }
            }
            by_class.entry(class.clone()).or_default().push(detection.bbox);
        }

        session.tracker.set_face_regions(face_regions);
        session.tracker.update(&by_class);
        self.alerts
            .evaluate_hazards(&frame_hazards, &mut session.hazards_seen, Instant::now());
    }

    fn detect(&self, frame: &Frame) -> Vec<Detection> {
        let mut detections = Vec::new();
        for detector in &self.detectors {
            match detector.detect(frame) {
                Ok(found) => detections.extend(found),
                Err(e) => warn!(detector = detector.name(), error = %e, "detector failed on frame"),
            }
        }
        detections
    }

    /// Identify the face behind a tracked person when it is new or due for a
    /// refresh; returns true if the identifier ran this frame
    fn resolve_face(&self, session: &mut ScanSession, frame: &Frame, detection: &Detection, id: i64) -> bool {
        let refresh_every = self.state.config.face_refresh_frames.max(1);
        let due = !session.face_cache.contains_key(&id) || session.frame_count % refresh_every == 0;
        if !due {
            return false;
        }
        let name = match &self.faces {
            Some(faces) => faces.identify(frame, &detection.bbox),
            None => UNKNOWN_NAME.to_string(),
        };
        if session.face_cache.get(&id) != Some(&name) {
            info!(id, %name, "👤 face resolved");
        }
        session.face_cache.insert(id, name);
        true
    }

    /// SUMMARIZING: build, publish and speak the report
    fn summarize(&self, session: &ScanSession, trigger: ScanTrigger) -> String {
        let names = session.names();
        let stable = session.tracker.get_stable();
        let light = lock(&self.state.light).light_state();
        let input = SummaryInput {
            names: &names,
            unknown_count: session.unknown_count(),
            stable: &stable,
            hazards: &session.hazards_seen,
            light,
            full: trigger.is_full(),
        };
        let text = {
            let mut memory = lock(&self.state.memory);
            summary::generate(&input, &mut memory, &self.state.config)
        };

        if !text.is_empty() {
            info!("📝 {}", text);
            self.state.publish(StatusReport::new(text.clone(), Local::now(), light));
            self.speech.speak(&text);
        }
        text
    }
}

/// Clears the busy flag even if the scan panics
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn log_transition(to: SessionState, trigger: ScanTrigger) {
    info!(?trigger, "{} {}", to.emoji(), to);
}

/// Starts scans on the blocking pool without waiting for them
#[derive(Clone)]
pub struct ScanService {
    orchestrator: Arc<SessionOrchestrator>,
    runtime: Handle,
}

impl ScanService {
    /// Must be called inside a tokio runtime
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self {
            orchestrator,
            runtime: Handle::current(),
        }
    }

    pub fn orchestrator(&self) -> &Arc<SessionOrchestrator> {
        &self.orchestrator
    }

    /// Run a scan on the blocking pool and wait for it
    pub async fn scan(&self, trigger: ScanTrigger) -> ScanOutcome {
        let orchestrator = Arc::clone(&self.orchestrator);
        match tokio::task::spawn_blocking(move || orchestrator.run(trigger)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "scan task panicked");
                ScanOutcome::aborted()
            }
        }
    }
}

impl SessionLauncher for ScanService {
    fn launch(&self, trigger: ScanTrigger) {
        let orchestrator = Arc::clone(&self.orchestrator);
        self.runtime.spawn_blocking(move || orchestrator.run(trigger));
    }
}
