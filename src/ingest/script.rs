//! External detector child-process source.
//!
//! Spawns the configured hand-landmark detector command and reads one JSON
//! payload per stdout line: `null` for no hand, or an array of 21 normalized
//! points. The detector owns the camera; killing the child on `close`
//! releases the device for subsequent runs.
//!
//! The capture view is mirrored by default so the streamed hand moves like
//! the user's own; detectors that already flip can turn it off.

use std::io::{BufRead, BufReader, Lines};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{anyhow, Context, Result};

use crate::ingest::{LandmarkSource, SourceStats};
use crate::landmark::{Landmark, LandmarkFrame};

/// Configuration for the detector child process.
#[derive(Clone, Debug)]
pub struct ScriptConfig {
    /// Detector command line, whitespace-separated.
    pub command: String,
    /// Mirror frames horizontally (`x -> 1 - x`).
    pub mirror: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            mirror: true,
        }
    }
}

/// Landmark frames from an external detector process.
pub struct ScriptSource {
    config: ScriptConfig,
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    lines: Option<Lines<BufReader<ChildStdout>>>,
    frame_count: u64,
    detections: u64,
}

impl ScriptSource {
    pub fn new(config: ScriptConfig) -> Result<Self> {
        let mut parts = config.command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("detector command must not be empty"))?;
        let args: Vec<String> = parts.collect();
        Ok(Self {
            config,
            program,
            args,
            child: None,
            lines: None,
            frame_count: 0,
            detections: 0,
        })
    }

    fn parse_line(&self, line: &str) -> Result<Option<LandmarkFrame>> {
        let points: Option<Vec<Landmark>> = serde_json::from_str(line.trim())
            .map_err(|e| anyhow!("invalid detector output: {}", e))?;
        let Some(points) = points else {
            return Ok(None);
        };
        let frame = LandmarkFrame::from_slice(&points)?;
        Ok(Some(if self.config.mirror {
            frame.mirrored()
        } else {
            frame
        }))
    }
}

impl LandmarkSource for ScriptSource {
    fn name(&self) -> &'static str {
        "script"
    }

    fn connect(&mut self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::piped())
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn detector '{}'", self.program))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("detector stdout unavailable"))?;
        self.lines = Some(BufReader::new(stdout).lines());
        self.child = Some(child);
        log::info!("landmark source: detector '{}' started", self.config.command);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| anyhow!("script source used before connect"))?;
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(anyhow!("detector closed its output stream")),
        };

        self.frame_count += 1;
        let frame = self.parse_line(&line)?;
        if frame.is_some() {
            self.detections += 1;
        }
        Ok(frame)
    }

    fn is_healthy(&self) -> bool {
        self.child.is_some() && self.lines.is_some()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames: self.frame_count,
            detections: self.detections,
            spec: self.config.command.clone(),
        }
    }

    fn close(&mut self) {
        self.lines = None;
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                log::warn!("failed to stop detector: {}", err);
            }
            let _ = child.wait();
            log::info!("detector stopped");
        }
    }
}

impl Drop for ScriptSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        assert!(ScriptSource::new(ScriptConfig {
            command: "  ".to_string(),
            ..ScriptConfig::default()
        })
        .is_err());
    }

    #[test]
    fn parses_and_mirrors_detector_lines() {
        let source = ScriptSource::new(ScriptConfig {
            command: "detector".to_string(),
            mirror: true,
        })
        .unwrap();

        let mut points = vec![serde_json::json!({"x": 0.5, "y": 0.5}); 21];
        points[8] = serde_json::json!({"x": 0.2, "y": 0.7});
        let line = serde_json::to_string(&points).unwrap();

        let frame = source.parse_line(&line).unwrap().unwrap();
        assert!((frame.get(8).x - 0.8).abs() < 1e-6);

        assert!(source.parse_line("null").unwrap().is_none());
        assert!(source.parse_line("garbage").is_err());
    }

    #[test]
    fn reads_frames_from_a_real_child_process() {
        // `cat` over a here-style file stands in for a detector.
        let mut points = vec![serde_json::json!({"x": 0.5, "y": 0.5}); 21];
        points[8] = serde_json::json!({"x": 0.25, "y": 0.5});
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "{}", serde_json::to_string(&points).unwrap()).unwrap();
        writeln!(file, "null").unwrap();

        let mut source = ScriptSource::new(ScriptConfig {
            command: format!("cat {}", file.path().display()),
            mirror: false,
        })
        .unwrap();
        source.connect().unwrap();

        let frame = source.next_frame().unwrap().expect("first line is a hand");
        assert!((frame.get(8).x - 0.25).abs() < 1e-6);
        assert!(source.next_frame().unwrap().is_none());
        // EOF is a source failure: the detector should never stop on its own.
        assert!(source.next_frame().is_err());

        source.close();
        assert!(!source.is_healthy());
    }
}
