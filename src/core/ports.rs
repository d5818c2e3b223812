//! Boundaries to the outside world
//!
//! Models, camera, speech engines and hardware live behind these traits.
//! Every call here may block; async callers go through `spawn_blocking`.

use crate::error::Result;
use crate::types::{BBox, Detection, Frame, ScanTrigger};

/// Camera that can be opened once per session
pub trait Camera: Send + Sync {
    fn open(&self) -> Result<Box<dyn FrameStream>>;
}

pub trait FrameStream: Send {
    /// Next frame; `FrameReadFailure` is transient
    fn read(&mut self) -> Result<Frame>;
}

/// Object detector with its own persistent-id tracker
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// Resolves a person box to a name, or `UNKNOWN_NAME`
pub trait FaceIdentifier: Send + Sync {
    fn identify(&self, frame: &Frame, region: &BBox) -> String;
}

/// Turns a face crop into an embedding; `None` when no face is found
pub trait FaceEncoder: Send + Sync {
    fn encode(&self, frame: &Frame, region: &BBox) -> Option<Vec<f32>>;
}

/// Streaming speech-to-text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Partial(String),
    /// End of utterance
    Final(String),
}

pub trait Transcriber: Send {
    fn accept(&mut self, pcm: &[u8]) -> Transcript;
}

/// Text → raw 16-bit mono PCM
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Fire-and-forget speech; never blocks the caller
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

/// Light switch; failures come back as `ActuatorUnreachable`
pub trait LightActuator: Send + Sync {
    fn set_light(&self, on: bool) -> Result<()>;
}

/// Starts a scan in the background
pub trait SessionLauncher: Send + Sync {
    fn launch(&self, trigger: ScanTrigger);
}
