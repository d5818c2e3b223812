//! Error taxonomy for the sentry

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentryError {
    /// Camera or model missing; aborts a session before it starts
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Transient; the frame is skipped
    #[error("Frame read failure: {0}")]
    FrameReadFailure(String),

    #[error("Malformed telemetry: {0}")]
    TelemetryMalformed(String),

    #[error("Actuator unreachable: {0}")]
    ActuatorUnreachable(String),

    #[error("Speech render failure: {0}")]
    RenderFailure(String),

    /// Nothing to recognise: empty frame, no face, empty database
    #[error("Nothing recognised")]
    RecognitionNoOp,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SentryError>;
