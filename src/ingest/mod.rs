//! Landmark sources.
//!
//! The hand-landmark detector is an external collaborator; this module only
//! defines where frames come from:
//! - `stub://` specs: deterministic synthetic hand (tests, demos)
//! - local `.jsonl` paths: replay of recorded landmark frames
//! - `exec:` specs: an external detector child process, one JSON frame per
//!   stdout line
//!
//! Every source yields at most one `LandmarkFrame` per cycle ("no hand" is a
//! normal `None` cycle, not an error) and must release its resources in
//! `close` on every exit path; a leaked camera handle blocks subsequent runs.

pub mod replay;
pub mod script;
pub mod synthetic;

pub use replay::ReplaySource;
pub use script::ScriptSource;
pub use synthetic::SyntheticSource;

use anyhow::{anyhow, Result};

use crate::landmark::LandmarkFrame;

/// A supplier of landmark frames, one per processing cycle.
pub trait LandmarkSource: Send {
    /// Source identifier for logs.
    fn name(&self) -> &'static str;

    /// Acquire the underlying resource (file, child process).
    fn connect(&mut self) -> Result<()>;

    /// Produce the next cycle's detection: `Ok(None)` when no hand.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;

    /// False once the source cannot produce further frames.
    fn is_healthy(&self) -> bool;

    /// Frame statistics.
    fn stats(&self) -> SourceStats;

    /// Release the underlying resource. Idempotent.
    fn close(&mut self);
}

/// Statistics shared by all sources.
#[derive(Clone, Debug)]
pub struct SourceStats {
    /// Cycles served (with or without a hand).
    pub frames: u64,
    /// Cycles that carried a detected hand.
    pub detections: u64,
    pub spec: String,
}

/// Build a source from its config spec string.
pub fn open_source(spec: &str) -> Result<Box<dyn LandmarkSource>> {
    if spec.trim().is_empty() {
        return Err(anyhow!("landmark source spec must not be empty"));
    }
    if spec.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(spec.to_string())));
    }
    if let Some(command) = spec.strip_prefix("exec:") {
        return Ok(Box::new(ScriptSource::new(script::ScriptConfig {
            command: command.to_string(),
            ..script::ScriptConfig::default()
        })?));
    }
    if spec.contains("://") {
        return Err(anyhow!(
            "unsupported landmark source scheme in '{}' (use stub://, exec:, or a local path)",
            spec
        ));
    }
    Ok(Box::new(ReplaySource::new(replay::ReplayConfig {
        path: spec.to_string(),
        ..replay::ReplayConfig::default()
    })))
}
