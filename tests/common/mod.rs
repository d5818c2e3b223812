//! Fakes shared by the integration tests

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use aether_eye::core::{Camera, Detector, FrameStream, LightActuator, SessionLauncher, SpeechOutput};
use aether_eye::types::{Detection, Frame, ScanTrigger};
use aether_eye::{Result, SentryError};

#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn said(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

#[derive(Default)]
pub struct RecordingActuator {
    pub commands: Mutex<Vec<bool>>,
    pub fail: bool,
}

impl LightActuator for RecordingActuator {
    fn set_light(&self, on: bool) -> Result<()> {
        if self.fail {
            return Err(SentryError::ActuatorUnreachable("fake".into()));
        }
        self.commands.lock().unwrap().push(on);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<ScanTrigger>>,
}

impl SessionLauncher for RecordingLauncher {
    fn launch(&self, trigger: ScanTrigger) {
        self.launched.lock().unwrap().push(trigger);
    }
}

/// Camera that serves the same frame forever
pub struct StillCamera(pub Frame);

struct StillStream(Frame);

impl Camera for StillCamera {
    fn open(&self) -> Result<Box<dyn FrameStream>> {
        Ok(Box::new(StillStream(self.0.clone())))
    }
}

impl FrameStream for StillStream {
    fn read(&mut self) -> Result<Frame> {
        // Roughly camera pace, keeps the scan loop from spinning
        std::thread::sleep(Duration::from_millis(5));
        Ok(self.0.clone())
    }
}

/// Detector returning the same detections for every frame
pub struct FixedDetector(pub Vec<Detection>);

impl Detector for FixedDetector {
    fn name(&self) -> &str {
        "fixed"
    }

    fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>> {
        Ok(self.0.clone())
    }
}

/// Poll `check` until it holds or the deadline passes
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
