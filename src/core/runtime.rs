//! Background loop supervisor
//!
//! Loops:
//! - sentry: automatic scan, then sleep `sentry_interval`, while sentry mode is on
//! - microphone: UDP PCM → transcriber → voice intents (own speech discarded)
//! - smoke: UDP integer samples → smoke policy
//!
//! All loops share one cancellation token; `shutdown` cancels and joins them.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_util::future::join_all;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::alerts::AlertCoordinator;
use crate::core::intent::VoiceIntentRouter;
use crate::core::ports::{Transcriber, Transcript};
use crate::core::session::ScanService;
use crate::core::state::{lock, AppState};
use crate::types::ScanTrigger;

/// Largest microphone datagram accepted
pub const MIC_DATAGRAM_MAX: usize = 4096;
/// Largest smoke datagram accepted
pub const SMOKE_DATAGRAM_MAX: usize = 1024;

#[derive(Debug, Default)]
pub struct Supervisor {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    pub fn spawn_sentry_loop(&mut self, state: Arc<AppState>, scans: ScanService) {
        let shutdown = self.shutdown.clone();
        let interval = state.config.sentry_interval();
        let handle = tokio::spawn(async move {
            loop {
                if state.sentry_active() {
                    info!("🛡️ sentry scan");
                    let outcome = scans.scan(ScanTrigger::Automatic).await;
                    debug!(frames = outcome.frames, aborted = outcome.aborted, "sentry scan finished");
                }
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("sentry loop shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });
        self.handles.push(handle);
    }

    pub fn spawn_mic_listener(
        &mut self,
        state: Arc<AppState>,
        socket: UdpSocket,
        transcriber: Box<dyn Transcriber>,
        router: Arc<VoiceIntentRouter>,
    ) {
        let shutdown = self.shutdown.clone();
        let transcriber = Arc::new(Mutex::new(transcriber));
        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; MIC_DATAGRAM_MAX];
            loop {
                let n = tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("microphone listener shutting down");
                        break;
                    }
                    received = socket.recv_from(&mut buf) => match received {
                        Ok((n, _)) => n,
                        Err(e) => {
                            warn!(error = %e, "microphone receive failed");
                            continue;
                        }
                    }
                };

                let pcm = buf[..n].to_vec();
                let engine = Arc::clone(&transcriber);
                let transcript = match tokio::task::spawn_blocking(move || lock(&engine).accept(&pcm)).await {
                    Ok(transcript) => transcript,
                    Err(e) => {
                        warn!(error = %e, "transcriber task failed");
                        continue;
                    }
                };
                handle_transcript(&state, &router, transcript).await;
            }
        });
        self.handles.push(handle);
    }

    pub fn spawn_smoke_listener(&mut self, socket: UdpSocket, alerts: AlertCoordinator) {
        let shutdown = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; SMOKE_DATAGRAM_MAX];
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("smoke listener shutting down");
                        break;
                    }
                    received = socket.recv_from(&mut buf) => match received {
                        Ok((n, _)) => {
                            if let Err(e) = alerts.handle_smoke_payload(&buf[..n], Instant::now()) {
                                debug!(error = %e, "smoke datagram discarded");
                            }
                        }
                        Err(e) => warn!(error = %e, "smoke receive failed"),
                    }
                }
            }
        });
        self.handles.push(handle);
    }

    /// Cancel every loop and wait for them to exit
    pub async fn shutdown(self) {
        info!(tasks = self.handles.len(), "stopping background loops");
        self.shutdown.cancel();
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                warn!(error = %e, "background loop ended abnormally");
            }
        }
    }
}

/// Act on a finished utterance unless it is our own voice
pub async fn handle_transcript(state: &AppState, router: &Arc<VoiceIntentRouter>, transcript: Transcript) {
    let Transcript::Final(text) = transcript else {
        return;
    };
    let text = text.trim().to_string();
    if text.is_empty() {
        return;
    }
    if state.speaking.is_speaking() {
        debug!(%text, "🔇 own speech discarded");
        return;
    }
    info!("🎤 heard: {}", text);
    let router = Arc::clone(router);
    if let Err(e) = tokio::task::spawn_blocking(move || router.handle(&text)).await {
        warn!(error = %e, "voice intent task failed");
    }
}
