//! Core modules for Aether Eye

pub mod alerts;
pub mod api;
pub mod cooldown;
pub mod facedb;
pub mod hardware;
pub mod intent;
pub mod light;
pub mod ports;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod state;
pub mod summary;
pub mod tracker;

pub use alerts::{parse_smoke, AlertCoordinator};
pub use api::{create_router, run_server, AppContext};
pub use cooldown::Cooldown;
pub use facedb::{DatabaseFaceIdentifier, FaceDatabase, FaceRecords};
pub use hardware::HttpLightActuator;
pub use intent::{ratio, token_set_ratio, VoiceIntentRouter};
pub use light::{LightController, LightDecision, LightStep};
pub use ports::{
    Camera, Detector, FaceEncoder, FaceIdentifier, FrameStream, LightActuator, SessionLauncher, SpeechOutput,
    SpeechSynthesizer, Transcriber, Transcript,
};
pub use runtime::{handle_transcript, Supervisor};
pub use session::{ScanService, ScanSession, SessionOrchestrator};
pub use speech::{pcm_payload, CommandSynthesizer, Speaker, UdpSpeakerLink};
pub use state::{AppState, SpeakingFlag, SpeakingGuard};
pub use summary::{generate as generate_summary, hazard_clause, SummaryInput};
pub use tracker::{ObjectTracker, TrackerConfig};
