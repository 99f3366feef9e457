//! handtrackd - stream-profile gesture daemon
//!
//! This daemon:
//! 1. Binds the stream port and blocks until exactly one client connects
//! 2. Pulls landmark frames from the configured source at the target rate
//! 3. Classifies, debounces, and serializes one JSON record per cycle
//! 4. Ends the session when the client drops; a new client needs a new run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use handlink::config::TrackerdConfig;
use handlink::ingest::{open_source, LandmarkSource};
use handlink::transport::StreamSession;
use handlink::{GestureSession, SessionConfig, StreamServer};

const SOURCE_RETRY_PAUSE: Duration = Duration::from_millis(100);
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Listen address for the stream client.
    #[arg(long)]
    addr: Option<String>,
    /// Landmark source spec (stub://, exec:, or a replay path).
    #[arg(long)]
    source: Option<String>,
    /// Classifier profile: rules | pinch-open.
    #[arg(long)]
    classifier: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Flags feed the same override layer the environment uses, so one code
    // path resolves and validates the final config.
    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var("HANDLINK_CONFIG", config);
    }
    if let Some(addr) = &args.addr {
        std::env::set_var("HANDLINK_ADDR", addr);
    }
    if let Some(source) = &args.source {
        std::env::set_var("HANDLINK_SOURCE", source);
    }
    if let Some(classifier) = &args.classifier {
        std::env::set_var("HANDLINK_CLASSIFIER", classifier);
    }
    let cfg = TrackerdConfig::load()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_handler.store(true, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    let server = StreamServer::bind(&cfg.addr)?;
    let mut source = open_source(&cfg.common.source)?;
    source.connect()?;

    log::info!(
        "handtrackd running: source={} classifier={} rate={}fps",
        cfg.common.source,
        cfg.classifier.name(),
        cfg.common.target_fps
    );
    log::info!("waiting for client to connect...");

    let result = match server.accept_one(&shutdown)? {
        Some(client) => run_session(&cfg, source.as_mut(), client, &shutdown),
        None => {
            log::info!("shutdown before a client connected");
            Ok(())
        }
    };

    // Release the source on every exit path; a leaked camera handle blocks
    // the next run.
    source.close();
    result
}

fn run_session(
    cfg: &TrackerdConfig,
    source: &mut dyn LandmarkSource,
    mut client: StreamSession,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut session = GestureSession::new(SessionConfig {
        profile: cfg.classifier,
        frame_size: cfg.common.frame_size,
        cooldown: cfg.common.cooldown,
        drawing: false,
    });

    let cycle_delay = cfg.common.cycle_delay();
    let mut last_health_log = Instant::now();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            log::info!("shutdown signal received, ending session");
            break;
        }

        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("frame acquisition failed: {}", err);
                std::thread::sleep(SOURCE_RETRY_PAUSE);
                continue;
            }
        };

        let output = session.process(frame.as_ref(), Instant::now());
        if let Err(err) = client.send(&output.record) {
            // The client is gone; the session is over, no reconnect.
            log::info!("client {} disconnected: {}", client.peer(), err);
            break;
        }

        if !source.is_healthy() {
            log::info!("landmark source exhausted, ending session");
            break;
        }

        if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            let stats = source.stats();
            log::info!(
                "source health={} frames={} detections={} spec={}",
                source.is_healthy(),
                stats.frames,
                stats.detections,
                stats.spec
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(cycle_delay);
    }
    Ok(())
}
