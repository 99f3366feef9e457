//! Line-oriented subprocess protocol (stdin commands, stdout JSON records).
//!
//! The host process writes `CLEAR` or `EXIT` lines to our stdin and reads one
//! JSON object per stdout line. Output is flushed per line; unrecognized
//! input lines are ignored.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use serde::Serialize;

use crate::shape::{ShapeEvent, ShapeOutcome};

/// Commands recognized on stdin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorCommand {
    Clear,
    Exit,
}

impl DetectorCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "CLEAR" => Some(DetectorCommand::Clear),
            "EXIT" => Some(DetectorCommand::Exit),
            _ => None,
        }
    }
}

/// Per-cycle status record written to stdout.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DetectorRecord {
    pub hand_detected: bool,
    pub is_drawing: bool,
    pub drawn_points: usize,
}

/// Discrete protocol events written to stdout.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DetectorEvent {
    ShapeDetected { shape: ShapeOutcome, points: usize },
    CanvasCleared,
}

impl From<ShapeEvent> for DetectorEvent {
    fn from(event: ShapeEvent) -> Self {
        DetectorEvent::ShapeDetected {
            shape: event.outcome,
            points: event.points,
        }
    }
}

/// Structured fault record; the process continues after emitting one.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorRecord {
    pub error: String,
}

/// Write one value as a JSON line, flushed immediately.
pub fn emit_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    let line = serde_json::to_string(value)?;
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

/// Pumps stdin lines into commands on a background thread.
///
/// The reader thread is the only blocking stdin consumer; the processing loop
/// polls `try_next` once per cycle. The thread exits on EOF or after an
/// `EXIT` line.
pub struct CommandPump {
    rx: Receiver<DetectorCommand>,
    disconnected: bool,
}

impl CommandPump {
    /// Spawn the pump over process stdin.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let Some(command) = DetectorCommand::parse(&line) else {
                    continue;
                };
                let exit = command == DetectorCommand::Exit;
                if tx.send(command).is_err() || exit {
                    break;
                }
            }
        });
        Self {
            rx,
            disconnected: false,
        }
    }

    /// Build a pump from a pre-filled channel (tests).
    pub fn from_receiver(rx: Receiver<DetectorCommand>) -> Self {
        Self {
            rx,
            disconnected: false,
        }
    }

    /// Next pending command, if any. A closed stdin reads as `Exit` once.
    pub fn try_next(&mut self) -> Option<DetectorCommand> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.disconnected {
                    None
                } else {
                    self.disconnected = true;
                    Some(DetectorCommand::Exit)
                }
            }
        }
    }
}
