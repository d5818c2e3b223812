//! Speech output: render text to PCM and stream it to the remote speaker
//!
//! `speak` returns immediately; rendering and playback run as a detached
//! task holding the speaking flag, plus a short tail so the microphone does
//! not pick up the end of our own sentence.

use std::net::SocketAddr;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::core::ports::{SpeechOutput, SpeechSynthesizer};
use crate::core::state::AppState;
use crate::error::{Result, SentryError};

/// Minimum pause between chunks
const MIN_CHUNK_PAUSE: Duration = Duration::from_millis(5);

/// Datagram transport to the speaker, 16-bit mono PCM
#[derive(Debug, Clone)]
pub struct UdpSpeakerLink {
    target: SocketAddr,
    chunk_size: usize,
    sample_rate: u32,
}

impl UdpSpeakerLink {
    pub fn new(target: SocketAddr, chunk_size: usize, sample_rate: u32) -> Self {
        Self {
            target,
            chunk_size: chunk_size.max(2),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Pause between chunks: 80% of one chunk's play time, at least 5 ms
    pub fn chunk_pause(&self) -> Duration {
        let bytes_per_second = self.sample_rate as f64 * 2.0;
        let play = Duration::from_secs_f64(self.chunk_size as f64 / bytes_per_second);
        play.mul_f64(0.8).max(MIN_CHUNK_PAUSE)
    }

    pub async fn stream(&self, pcm: &[u8]) -> Result<()> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        let pause = self.chunk_pause();
        for chunk in pcm.chunks(self.chunk_size) {
            socket.send_to(chunk, self.target).await?;
            tokio::time::sleep(pause).await;
        }
        Ok(())
    }
}

/// Synthesizer backed by an external program that writes PCM (or WAV) to
/// stdout; the text is passed as the last argument
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// `argv[0]` is the program; `None` for an empty command line
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .output()
            .map_err(|e| SentryError::RenderFailure(format!("{}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(SentryError::RenderFailure(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        if output.stdout.is_empty() {
            return Err(SentryError::RenderFailure(format!("{} produced no audio", self.program)));
        }
        Ok(pcm_payload(&output.stdout).to_vec())
    }
}

/// Sample data of a RIFF/WAVE buffer, or the buffer itself if it is raw PCM
pub fn pcm_payload(bytes: &[u8]) -> &[u8] {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return bytes;
    }
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        let body = offset + 8;
        if id == b"data" {
            return &bytes[body..(body + size).min(bytes.len())];
        }
        offset = body + size + (size & 1);
    }
    bytes
}

struct SpeakerInner {
    state: Arc<AppState>,
    primary: Option<Arc<dyn SpeechSynthesizer>>,
    fallback: Option<Arc<dyn SpeechSynthesizer>>,
    link: UdpSpeakerLink,
}

/// Fire-and-forget speech with a primary and a fallback engine
#[derive(Clone)]
pub struct Speaker {
    inner: Arc<SpeakerInner>,
    runtime: Handle,
}

impl Speaker {
    /// Must be called inside a tokio runtime
    pub fn new(
        state: Arc<AppState>,
        primary: Option<Arc<dyn SpeechSynthesizer>>,
        fallback: Option<Arc<dyn SpeechSynthesizer>>,
        link: UdpSpeakerLink,
    ) -> Self {
        Self {
            inner: Arc::new(SpeakerInner {
                state,
                primary,
                fallback,
                link,
            }),
            runtime: Handle::current(),
        }
    }
}

impl SpeakerInner {
    /// Primary engine, then fallback
    async fn render(&self, text: &str) -> Result<Vec<u8>> {
        let mut last_err = SentryError::RenderFailure("no speech synthesizer configured".into());
        for engine in [&self.primary, &self.fallback].into_iter().flatten() {
            let engine = Arc::clone(engine);
            let owned = text.to_string();
            let rendered = tokio::task::spawn_blocking(move || engine.synthesize(&owned))
                .await
                .map_err(|e| SentryError::RenderFailure(e.to_string()))
                .and_then(|r| r);
            match rendered {
                Ok(pcm) => return Ok(pcm),
                Err(e) => {
                    warn!(error = %e, "speech engine failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    async fn say(&self, text: String) {
        let _speaking = self.state.speaking.begin();
        match self.render(&text).await {
            Ok(pcm) => {
                if let Err(e) = self.link.stream(&pcm).await {
                    warn!(error = %e, "speaker stream failed");
                }
            }
            Err(e) => debug!(error = %e, %text, "speech dropped"),
        }
        tokio::time::sleep(Duration::from_millis(self.state.config.speaking_tail_ms)).await;
    }
}

impl SpeechOutput for Speaker {
    fn speak(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        info!("🤖 Speaking: {}", text);
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        self.runtime.spawn(async move { inner.say(text).await });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SentryConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSynth {
        result: Option<Vec<u8>>,
        calls: AtomicUsize,
    }

    impl FixedSynth {
        fn new(result: Option<Vec<u8>>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl SpeechSynthesizer for FixedSynth {
        fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| SentryError::RenderFailure("fixed failure".into()))
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(SentryConfig {
            speaking_tail_ms: 0,
            ..SentryConfig::default()
        }))
    }

    #[test]
    fn test_chunk_pause() {
        let addr: SocketAddr = "127.0.0.1:5555".parse().unwrap();
        // 1024 bytes at 16 kHz 16-bit = 32 ms, 80% = 25.6 ms
        let link = UdpSpeakerLink::new(addr, 1024, 16000);
        let pause = link.chunk_pause().as_secs_f64();
        assert!((pause - 0.0256).abs() < 1e-6, "got {}", pause);

        let tiny = UdpSpeakerLink::new(addr, 16, 16000);
        assert_eq!(tiny.chunk_pause(), MIN_CHUNK_PAUSE);
    }

    #[test]
    fn test_wav_header_is_stripped() {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&0u32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(&[1, 0, 1, 0]);
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(&[9, 8, 7, 6]);

        assert_eq!(pcm_payload(&wav), &[9, 8, 7, 6]);
        assert_eq!(pcm_payload(&[1, 2, 3]), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fallback_engine_used_when_primary_fails() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let link = UdpSpeakerLink::new(receiver.local_addr().unwrap(), 4, 16000);
        let primary = FixedSynth::new(None);
        let fallback = FixedSynth::new(Some(vec![1, 2, 3, 4, 5, 6]));
        let inner = SpeakerInner {
            state: state(),
            primary: Some(primary.clone() as Arc<dyn SpeechSynthesizer>),
            fallback: Some(fallback.clone() as Arc<dyn SpeechSynthesizer>),
            link,
        };

        inner.say("hello".into()).await;

        let mut buf = [0u8; 16];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3, 4]);
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[5, 6]);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_engines_failing_drops_silently() {
        let state = state();
        let inner = SpeakerInner {
            state: state.clone(),
            primary: Some(FixedSynth::new(None)),
            fallback: Some(FixedSynth::new(None)),
            link: UdpSpeakerLink::new("127.0.0.1:9".parse().unwrap(), 1024, 16000),
        };
        inner.say("hello".into()).await;
        assert!(!state.speaking.is_speaking());
    }

    #[tokio::test]
    async fn test_speak_holds_flag_until_done() {
        let state = Arc::new(AppState::new(SentryConfig {
            speaking_tail_ms: 200,
            ..SentryConfig::default()
        }));
        let speaker = Speaker::new(
            state.clone(),
            None,
            None,
            UdpSpeakerLink::new("127.0.0.1:9".parse().unwrap(), 1024, 16000),
        );

        speaker.speak("Light on.");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(state.speaking.is_speaking());
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!state.speaking.is_speaking());
    }
}
