//! hand_engine - datagram-profile sign daemon
//!
//! This daemon:
//! 1. Listens for plain-text START/STOP datagrams that gate capture
//! 2. While active, pulls landmark frames and runs the finger-count table
//! 3. Fires one plain-text sign datagram at the peer per qualifying frame
//! 4. Releases the capture source whenever the client says STOP
//!
//! The loop waits on the command socket with a short timeout between frames,
//! so commands stay responsive without busy polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use handlink::classify::ClassifierProfile;
use handlink::config::EngineConfig;
use handlink::ingest::open_source;
use handlink::transport::{DatagramChannel, DatagramConfig, EngineCommand};
use handlink::{GestureSession, SessionConfig};

const SOURCE_RETRY_PAUSE: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Landmark source spec (stub://, exec:, or a replay path).
    #[arg(long)]
    source: Option<String>,
    /// Local address for inbound START/STOP commands.
    #[arg(long)]
    listen_addr: Option<String>,
    /// Destination for outbound sign datagrams.
    #[arg(long)]
    peer_addr: Option<String>,
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
    if let Some(addr) = &args.listen_addr {
        std::env::set_var("HANDLINK_LISTEN_ADDR", addr);
    }
    if let Some(addr) = &args.peer_addr {
        std::env::set_var("HANDLINK_PEER_ADDR", addr);
    }
    let cfg = EngineConfig::load()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_handler.store(true, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    let channel = DatagramChannel::bind(&DatagramConfig {
        listen_addr: cfg.listen_addr.clone(),
        peer_addr: cfg.peer_addr.clone(),
    })?;
    let mut source = open_source(&cfg.common.source)?;

    let mut session = GestureSession::new(SessionConfig {
        profile: ClassifierProfile::FingerCount,
        frame_size: cfg.common.frame_size,
        cooldown: cfg.common.cooldown,
        drawing: false,
    });

    log::info!(
        "hand_engine waiting: source={} (capture idle until START)",
        cfg.common.source
    );

    let mut active = false;
    while !shutdown.load(Ordering::SeqCst) {
        // Check the command channel first; a 10ms wait while active doubles
        // as the inter-frame pacing gap.
        let timeout = if active {
            cfg.active_poll
        } else {
            cfg.idle_poll
        };
        match channel.poll_command(timeout) {
            Ok(Some(EngineCommand::Start)) => {
                if !active {
                    log::info!("START received, acquiring capture source");
                    match source.connect() {
                        Ok(()) => active = true,
                        Err(err) => log::error!("capture source unavailable: {}", err),
                    }
                }
            }
            Ok(Some(EngineCommand::Stop)) => {
                if active {
                    log::info!("STOP received, releasing capture source");
                    active = false;
                    source.close();
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("command channel error: {}", err);
            }
        }

        if !active {
            continue;
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
        if let Some(sign) = output.sign {
            if let Err(err) = channel.send_sign(sign) {
                // Fire-and-forget: log and move on, never retry.
                log::warn!("sign send failed: {}", err);
            } else {
                log::debug!("sent sign: {}", sign.as_str());
            }
        }
    }

    log::info!("shutdown signal received");
    source.close();
    Ok(())
}
