//! Replay source for recorded landmark frames.
//!
//! Reads a local JSONL file, one cycle per line: either `null` (no hand this
//! cycle) or an array of exactly 21 `{x, y}` normalized points. Recordings
//! are taken downstream of the detector's mirror flip, so frames replay
//! as-is. Only local paths are accepted, no URL schemes.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use anyhow::{anyhow, Context, Result};

use crate::ingest::{LandmarkSource, SourceStats};
use crate::landmark::{Landmark, LandmarkFrame};

/// Configuration for a replay source.
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Local JSONL file path.
    pub path: String,
    /// Restart from the top on EOF instead of going unhealthy.
    pub loop_playback: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            loop_playback: false,
        }
    }
}

/// Replays recorded landmark frames from a file.
pub struct ReplaySource {
    config: ReplayConfig,
    lines: Option<Lines<BufReader<File>>>,
    exhausted: bool,
    frame_count: u64,
    detections: u64,
}

impl ReplaySource {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            lines: None,
            exhausted: false,
            frame_count: 0,
            detections: 0,
        }
    }

    fn open_file(&mut self) -> Result<()> {
        let file = File::open(&self.config.path)
            .with_context(|| format!("failed to open replay file {}", self.config.path))?;
        self.lines = Some(BufReader::new(file).lines());
        Ok(())
    }

    fn parse_line(line: &str) -> Result<Option<LandmarkFrame>> {
        let points: Option<Vec<Landmark>> = serde_json::from_str(line.trim())
            .map_err(|e| anyhow!("invalid replay line: {}", e))?;
        match points {
            None => Ok(None),
            Some(points) => Ok(Some(LandmarkFrame::from_slice(&points)?)),
        }
    }
}

impl LandmarkSource for ReplaySource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn connect(&mut self) -> Result<()> {
        self.open_file()?;
        log::info!("landmark source: replaying {}", self.config.path);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        if self.exhausted {
            return Ok(None);
        }
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| anyhow!("replay source used before connect"))?;

        let line = match lines.next() {
            Some(line) => line?,
            None if self.config.loop_playback => {
                self.open_file()?;
                match self.lines.as_mut().and_then(|lines| lines.next()) {
                    Some(line) => line?,
                    // Empty file: nothing to loop over.
                    None => {
                        self.exhausted = true;
                        return Ok(None);
                    }
                }
            }
            None => {
                log::info!("replay exhausted after {} frames", self.frame_count);
                self.exhausted = true;
                return Ok(None);
            }
        };

        self.frame_count += 1;
        let frame = Self::parse_line(&line)?;
        if frame.is_some() {
            self.detections += 1;
        }
        Ok(frame)
    }

    fn is_healthy(&self) -> bool {
        !self.exhausted
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames: self.frame_count,
            detections: self.detections,
            spec: self.config.path.clone(),
        }
    }

    fn close(&mut self) {
        self.lines = None;
    }
}
