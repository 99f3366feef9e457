//! Daemon configuration.
//!
//! All knobs are static at process start: an optional JSON config file named
//! by `HANDLINK_CONFIG`, then `HANDLINK_*` environment overrides, then
//! validation. Each binary resolves its own config struct from the shared
//! file shape.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::classify::ClassifierProfile;
use crate::landmark::FrameSize;

const DEFAULT_SOURCE: &str = "stub://hand";
const DEFAULT_FRAME_WIDTH: u32 = 320;
const DEFAULT_FRAME_HEIGHT: u32 = 240;
const DEFAULT_TARGET_FPS: u32 = 30;
const DEFAULT_COOLDOWN_SECS: f64 = 1.0;
const DEFAULT_STREAM_ADDR: &str = "127.0.0.1:12345";
const DEFAULT_ENGINE_LISTEN_ADDR: &str = "127.0.0.1:5006";
const DEFAULT_ENGINE_PEER_ADDR: &str = "127.0.0.1:5005";
const DEFAULT_ACTIVE_POLL_MS: u64 = 10;
const DEFAULT_IDLE_POLL_MS: u64 = 100;
const DEFAULT_ERROR_BACKOFF_SECS: u64 = 1;

#[derive(Debug, Deserialize, Default)]
struct HandlinkConfigFile {
    source: Option<String>,
    frame: Option<FrameConfigFile>,
    target_fps: Option<u32>,
    cooldown_secs: Option<f64>,
    stream: Option<StreamConfigFile>,
    engine: Option<EngineConfigFile>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct StreamConfigFile {
    addr: Option<String>,
    classifier: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EngineConfigFile {
    listen_addr: Option<String>,
    peer_addr: Option<String>,
    active_poll_ms: Option<u64>,
    idle_poll_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    error_backoff_secs: Option<u64>,
}

/// Settings shared by every deployment profile.
#[derive(Debug, Clone)]
pub struct CommonSettings {
    pub source: String,
    pub frame_size: FrameSize,
    pub target_fps: u32,
    pub cooldown: Duration,
}

impl CommonSettings {
    fn from_file(file: &HandlinkConfigFile) -> Result<Self> {
        let frame_size = FrameSize {
            width: file
                .frame
                .as_ref()
                .and_then(|frame| frame.width)
                .unwrap_or(DEFAULT_FRAME_WIDTH),
            height: file
                .frame
                .as_ref()
                .and_then(|frame| frame.height)
                .unwrap_or(DEFAULT_FRAME_HEIGHT),
        };
        Ok(Self {
            source: file
                .source
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            frame_size,
            target_fps: file.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
            cooldown: cooldown_from_secs(file.cooldown_secs.unwrap_or(DEFAULT_COOLDOWN_SECS))?,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(source) = std::env::var("HANDLINK_SOURCE") {
            if !source.trim().is_empty() {
                self.source = source;
            }
        }
        if let Ok(fps) = std::env::var("HANDLINK_TARGET_FPS") {
            self.target_fps = fps
                .parse()
                .map_err(|_| anyhow!("HANDLINK_TARGET_FPS must be an integer"))?;
        }
        if let Ok(cooldown) = std::env::var("HANDLINK_COOLDOWN_SECS") {
            let seconds: f64 = cooldown
                .parse()
                .map_err(|_| anyhow!("HANDLINK_COOLDOWN_SECS must be a number of seconds"))?;
            self.cooldown = cooldown_from_secs(seconds)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(anyhow!("source must not be empty"));
        }
        if self.frame_size.width == 0 || self.frame_size.height == 0 {
            return Err(anyhow!("frame dimensions must be non-zero"));
        }
        if self.target_fps == 0 {
            return Err(anyhow!("target_fps must be greater than zero"));
        }
        if self.cooldown.is_zero() {
            return Err(anyhow!("cooldown must be greater than zero"));
        }
        Ok(())
    }

    /// Inter-cycle delay derived from the target rate.
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(1000 / self.target_fps as u64)
    }
}

/// Configuration for the `handtrackd` stream daemon.
#[derive(Debug, Clone)]
pub struct TrackerdConfig {
    pub common: CommonSettings,
    pub addr: String,
    pub classifier: ClassifierProfile,
}

impl TrackerdConfig {
    pub fn load() -> Result<Self> {
        let file = read_config_file_from_env()?;
        let mut common = CommonSettings::from_file(&file)?;
        common.apply_env()?;

        let mut addr = file
            .stream
            .as_ref()
            .and_then(|stream| stream.addr.clone())
            .unwrap_or_else(|| DEFAULT_STREAM_ADDR.to_string());
        if let Ok(env_addr) = std::env::var("HANDLINK_ADDR") {
            if !env_addr.trim().is_empty() {
                addr = env_addr;
            }
        }

        let mut classifier_name = file
            .stream
            .as_ref()
            .and_then(|stream| stream.classifier.clone())
            .unwrap_or_else(|| ClassifierProfile::RuleTable.name().to_string());
        if let Ok(env_classifier) = std::env::var("HANDLINK_CLASSIFIER") {
            if !env_classifier.trim().is_empty() {
                classifier_name = env_classifier;
            }
        }
        let classifier = ClassifierProfile::from_name(&classifier_name)?;

        let cfg = Self {
            common,
            addr,
            classifier,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if self.addr.trim().is_empty() {
            return Err(anyhow!("stream addr must not be empty"));
        }
        // The sign vocabulary has no stream-record mapping; it belongs to
        // the engine deployment.
        if self.classifier == ClassifierProfile::FingerCount {
            return Err(anyhow!(
                "classifier 'finger-count' is an engine profile; use 'rules' or 'pinch-open'"
            ));
        }
        Ok(())
    }
}

/// Configuration for the `hand_engine` datagram daemon.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub common: CommonSettings,
    pub listen_addr: String,
    pub peer_addr: String,
    /// Command poll timeout while capture is active.
    pub active_poll: Duration,
    /// Command poll timeout while idle.
    pub idle_poll: Duration,
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        let file = read_config_file_from_env()?;
        let mut common = CommonSettings::from_file(&file)?;
        common.apply_env()?;

        let mut listen_addr = file
            .engine
            .as_ref()
            .and_then(|engine| engine.listen_addr.clone())
            .unwrap_or_else(|| DEFAULT_ENGINE_LISTEN_ADDR.to_string());
        if let Ok(env_addr) = std::env::var("HANDLINK_LISTEN_ADDR") {
            if !env_addr.trim().is_empty() {
                listen_addr = env_addr;
            }
        }
        let mut peer_addr = file
            .engine
            .as_ref()
            .and_then(|engine| engine.peer_addr.clone())
            .unwrap_or_else(|| DEFAULT_ENGINE_PEER_ADDR.to_string());
        if let Ok(env_addr) = std::env::var("HANDLINK_PEER_ADDR") {
            if !env_addr.trim().is_empty() {
                peer_addr = env_addr;
            }
        }

        let active_poll = Duration::from_millis(
            file.engine
                .as_ref()
                .and_then(|engine| engine.active_poll_ms)
                .unwrap_or(DEFAULT_ACTIVE_POLL_MS),
        );
        let idle_poll = Duration::from_millis(
            file.engine
                .as_ref()
                .and_then(|engine| engine.idle_poll_ms)
                .unwrap_or(DEFAULT_IDLE_POLL_MS),
        );

        let cfg = Self {
            common,
            listen_addr,
            peer_addr,
            active_poll,
            idle_poll,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if self.listen_addr.trim().is_empty() || self.peer_addr.trim().is_empty() {
            return Err(anyhow!("engine addresses must not be empty"));
        }
        if self.active_poll.is_zero() || self.idle_poll.is_zero() {
            return Err(anyhow!("engine poll timeouts must be greater than zero"));
        }
        Ok(())
    }
}

/// Configuration for the `hand_detector` stdio tool.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub common: CommonSettings,
    pub error_backoff: Duration,
}

impl DetectorConfig {
    pub fn load() -> Result<Self> {
        let file = read_config_file_from_env()?;
        let mut common = CommonSettings::from_file(&file)?;
        common.apply_env()?;

        let error_backoff = Duration::from_secs(
            file.detector
                .as_ref()
                .and_then(|detector| detector.error_backoff_secs)
                .unwrap_or(DEFAULT_ERROR_BACKOFF_SECS),
        );

        let cfg = Self {
            common,
            error_backoff,
        };
        cfg.common.validate()?;
        Ok(cfg)
    }
}

fn cooldown_from_secs(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(anyhow!("cooldown must be a positive number of seconds"));
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn read_config_file_from_env() -> Result<HandlinkConfigFile> {
    match std::env::var("HANDLINK_CONFIG").ok() {
        Some(path) => read_config_file(Path::new(&path)),
        None => Ok(HandlinkConfigFile::default()),
    }
}

fn read_config_file(path: &Path) -> Result<HandlinkConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
