//! hand_detector - stdio-profile drawing tool
//!
//! This tool:
//! 1. Reads CLEAR/EXIT commands line-by-line from stdin (other lines ignored)
//! 2. Pulls landmark frames and runs the pinch-driven drawing state machine
//! 3. Writes one JSON record per cycle to stdout, flushed per line
//! 4. Reports shape_detected / canvas_cleared events and structured errors
//!
//! A fault inside a cycle becomes an `{"error": ...}` line and a backoff
//! pause; the process only exits on EXIT, EOF, or Ctrl-C.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use handlink::config::DetectorConfig;
use handlink::ingest::{open_source, LandmarkSource};
use handlink::transport::stdio::{
    emit_line, CommandPump, DetectorCommand, DetectorEvent, DetectorRecord, ErrorRecord,
};
use handlink::{GestureSession, SessionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Landmark source spec (stub://, exec:, or a replay path).
    #[arg(long)]
    source: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var("HANDLINK_CONFIG", config);
    }
    if let Some(source) = &args.source {
        std::env::set_var("HANDLINK_SOURCE", source);
    }
    let cfg = DetectorConfig::load()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_handler.store(true, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    let mut source = open_source(&cfg.common.source)?;
    source.connect()?;

    let mut session = GestureSession::new(SessionConfig {
        frame_size: cfg.common.frame_size,
        cooldown: cfg.common.cooldown,
        drawing: true,
        ..SessionConfig::default()
    });

    let mut pump = CommandPump::spawn();
    let mut stdout = std::io::stdout();
    log::info!("hand_detector started: source={}", cfg.common.source);

    let cycle_delay = cfg.common.cycle_delay();
    loop {
        if shutdown.load(Ordering::SeqCst) {
            log::info!("shutdown signal received");
            break;
        }

        match pump.try_next() {
            Some(DetectorCommand::Exit) => {
                log::info!("EXIT received");
                break;
            }
            Some(DetectorCommand::Clear) => {
                session.clear_drawing();
                emit_line(&mut stdout, &DetectorEvent::CanvasCleared)?;
            }
            None => {}
        }

        if let Err(err) = run_cycle(source.as_mut(), &mut session, &mut stdout) {
            // Report the fault on the protocol and keep the process alive.
            emit_line(
                &mut stdout,
                &ErrorRecord {
                    error: err.to_string(),
                },
            )?;
            std::thread::sleep(cfg.error_backoff);
            continue;
        }

        std::thread::sleep(cycle_delay);
    }

    source.close();
    Ok(())
}

fn run_cycle<W: Write>(
    source: &mut dyn LandmarkSource,
    session: &mut GestureSession,
    out: &mut W,
) -> Result<()> {
    let frame = source.next_frame()?;
    let output = session.process(frame.as_ref(), Instant::now());

    emit_line(
        out,
        &DetectorRecord {
            hand_detected: output.hand_detected,
            is_drawing: session.is_drawing(),
            drawn_points: session.drawn_points(),
        },
    )?;

    if let Some(shape) = output.shape {
        emit_line(out, &DetectorEvent::from(shape))?;
    }
    Ok(())
}
