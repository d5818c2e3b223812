//! Aether Eye CLI
//!
//! Usage:
//!   aether-eye                              # Run the sentry and its HTTP API
//!   aether-eye --config sentry.json         # Load settings from JSON
//!   aether-eye --sentry --addr 0.0.0.0:8080 # Start with sentry mode on
//!   aether-eye --status [--json]            # Query a running instance

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aether_eye::core::{
    run_server, AlertCoordinator, AppContext, AppState, CommandSynthesizer, FaceDatabase, HttpLightActuator,
    ScanService, SessionOrchestrator, Speaker, SpeechOutput, SpeechSynthesizer, Supervisor, UdpSpeakerLink,
};
use aether_eye::types::StatusSnapshot;
use aether_eye::{Result, SentryConfig, SentryError, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "aether-eye",
    version = VERSION,
    about = "Aether Eye - room sentry with spoken reports and light control",
    long_about = "Aether Eye fuses object detections, ambient light, smoke telemetry\n\
                  and voice commands into spoken room reports and light control.\n\n\
                  Loops:\n  \
                  sentry      - automatic scan every interval while sentry mode is on\n  \
                  microphone  - voice commands over UDP\n  \
                  smoke       - smoke sensor samples over UDP\n\n\
                  Backends: this binary links no camera, detector, face encoder\n\
                  or speech-to-text engine. Scans report the camera offline, the\n\
                  microphone loop stays off, and /faces/reload only refreshes the\n\
                  table for an identifier registered through the library ports."
)]
struct Args {
    /// JSON settings file (missing keys keep their defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP bind address, overrides the settings file
    #[arg(long)]
    addr: Option<String>,

    /// Start with sentry mode on
    #[arg(long)]
    sentry: bool,

    /// Start with auto light off
    #[arg(long)]
    no_autolight: bool,

    /// Query a running instance instead of starting one
    #[arg(long)]
    status: bool,

    /// Output as JSON (with --status)
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), e);
            std::process::exit(2);
        }
    };

    let result = if args.status {
        run_status(&config, &args).await
    } else {
        run_serve(config).await
    };
    if let Err(e) = result {
        error!(error = %e, "aether-eye stopped");
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<SentryConfig> {
    let mut config = match &args.config {
        Some(path) => SentryConfig::load(path)?,
        None => SentryConfig::default(),
    };
    if let Some(addr) = &args.addr {
        config.server_addr = addr.clone();
    }
    if args.sentry {
        config.sentry_enabled = true;
    }
    if args.no_autolight {
        config.auto_light_enabled = false;
    }
    Ok(config)
}

/// Query `/status` on a running instance
async fn run_status(config: &SentryConfig, args: &Args) -> Result<()> {
    let url = format!("http://{}/status", config.server_addr.replace("0.0.0.0", "127.0.0.1"));
    let snapshot: StatusSnapshot = reqwest::get(&url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SentryError::SourceUnavailable(format!("{}: {}", url, e)))?
        .json()
        .await
        .map_err(|e| SentryError::TelemetryMalformed(e.to_string()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let flag = |on: bool| if on { "on".green().bold() } else { "off".dimmed() };
    println!("{} {}", "sentry:    ".bold(), flag(snapshot.sentry));
    println!("{} {}", "auto light:".bold(), flag(snapshot.auto_light));
    if args.no_color {
        println!("{}", snapshot.latest.to_parseable_string());
    } else {
        println!("{}", snapshot.latest.to_terminal_string());
    }
    Ok(())
}

fn print_banner(config: &SentryConfig) {
    println!();
    println!("{}", "╔══════════════════════════════════════════════╗".cyan());
    println!("{}  {}", "║".cyan(), format!("👁️  Aether Eye v{}", VERSION).as_str().bold());
    println!("{}", "╚══════════════════════════════════════════════╝".cyan());
    println!("  API      {}", config.server_addr.as_str().yellow());
    println!("  speaker  {}:{}", config.speaker_host, config.speaker_port);
    println!("  mic/smoke udp {}/{}", config.mic_udp_port, config.smoke_udp_port);
    println!();
}

fn synthesizer(argv: &Option<Vec<String>>) -> Option<Arc<dyn SpeechSynthesizer>> {
    let engine: Arc<dyn SpeechSynthesizer> = Arc::new(CommandSynthesizer::from_argv(argv.as_deref()?)?);
    Some(engine)
}

/// Run every loop plus the HTTP API until Ctrl-C
async fn run_serve(config: SentryConfig) -> Result<()> {
    print_banner(&config);

    let speaker_addr: SocketAddr = tokio::net::lookup_host((config.speaker_host.as_str(), config.speaker_port))
        .await?
        .next()
        .ok_or_else(|| SentryError::Config(format!("cannot resolve speaker host {}", config.speaker_host)))?;
    let link = UdpSpeakerLink::new(speaker_addr, config.spk_chunk_size, config.spk_sample_rate);

    let primary = synthesizer(&config.tts_command);
    let fallback = synthesizer(&config.tts_fallback_command);
    if primary.is_none() && fallback.is_none() {
        warn!("no speech synthesizer configured, spoken output disabled");
    }

    let faces = Arc::new(FaceDatabase::open(&config.face_db_path)?);
    let mic_port = config.mic_udp_port;
    let smoke_port = config.smoke_udp_port;
    let server_addr = config.server_addr.clone();

    let state = Arc::new(AppState::new(config));
    let speech: Arc<dyn SpeechOutput> = Arc::new(Speaker::new(state.clone(), primary, fallback, link));
    let actuator = Arc::new(HttpLightActuator::new(&state.config)?);

    // No camera, detector or face encoder backend is linked into this binary;
    // scans report the camera as offline until one is registered.
    warn!("no camera backend linked, scans will abort");
    let orchestrator = Arc::new(SessionOrchestrator::new(state.clone(), actuator.clone(), speech.clone()));
    let scans = ScanService::new(orchestrator);

    let mut supervisor = Supervisor::new();
    supervisor.spawn_sentry_loop(state.clone(), scans.clone());

    let smoke_socket = tokio::net::UdpSocket::bind(("0.0.0.0", smoke_port)).await?;
    supervisor.spawn_smoke_listener(smoke_socket, AlertCoordinator::new(state.clone(), speech.clone()));
    info!(port = smoke_port, "💨 smoke listener up");

    warn!(port = mic_port, "no speech-to-text backend linked, microphone listener disabled");
    warn!(faces = faces.len(), "no face encoder linked, face database is loaded but unused");

    let context = Arc::new(AppContext {
        state: state.clone(),
        launcher: Arc::new(scans),
        actuator,
        faces: Some(faces),
    });
    let shutdown = supervisor.token();
    let mut server = tokio::spawn(async move { run_server(&server_addr, context, shutdown).await });

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Ctrl-C received, shutting down");
            None
        }
        result = &mut server => Some(result),
    };
    supervisor.shutdown().await;

    let result = match finished {
        Some(result) => result,
        None => server.await,
    };
    match result {
        Ok(served) => served,
        Err(e) => Err(SentryError::Config(format!("server task failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_help_names_missing_backends() {
        let command = Args::command();
        let help = command.get_long_about().map(|s| s.to_string()).unwrap_or_default();
        assert!(help.contains("links no camera"));
        assert!(help.contains("/faces/reload"));
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["aether-eye", "--sentry", "--no-autolight", "--addr", "127.0.0.1:9000"]);
        let config = load_config(&args).unwrap();
        assert!(config.sentry_enabled);
        assert!(!config.auto_light_enabled);
        assert_eq!(config.server_addr, "127.0.0.1:9000");
    }
}
