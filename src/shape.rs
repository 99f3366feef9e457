//! Freehand drawing sessions and shape classification.
//!
//! A `DrawingSession` is a two-state machine (Idle / Drawing) driven by the
//! pixel-space pinch signal. Pinch contact starts a session and clears the
//! path; every cycle while the pinch holds appends the index fingertip; pinch
//! release classifies the accumulated path and yields a `ShapeEvent`.
//!
//! The aspect-ratio-to-direction mapping below is carried over verbatim from
//! the shipped behavior, including its non-geometric label choices (a wide
//! stroke is `right`, a squarish one `left`). Consumers depend on the labels
//! as they are; renaming them is a product decision, not a code fix.

use serde::{Deserialize, Serialize};

use crate::landmark::PixelPoint;
use crate::Direction;

/// Paths shorter than this classify as `Unknown` (accidental pinches).
pub const MIN_SHAPE_POINTS: usize = 10;

/// Defensive bound on path growth for pathologically long drawing gestures.
pub const MAX_PATH_POINTS: usize = 4096;

/// Outcome of classifying one completed drawing path.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShapeOutcome {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Unknown,
}

impl ShapeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeOutcome::Up => "up",
            ShapeOutcome::Down => "down",
            ShapeOutcome::Left => "left",
            ShapeOutcome::Right => "right",
            ShapeOutcome::Unknown => "unknown",
        }
    }
}

impl From<Direction> for ShapeOutcome {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => ShapeOutcome::Up,
            Direction::Down => ShapeOutcome::Down,
            Direction::Left => ShapeOutcome::Left,
            Direction::Right => ShapeOutcome::Right,
        }
    }
}

/// Emitted once when a drawing session completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeEvent {
    pub outcome: ShapeOutcome,
    /// Number of captured path points.
    pub points: usize,
}

/// Classify a completed path by its axis-aligned bounding box.
pub fn classify_path(path: &[PixelPoint]) -> ShapeOutcome {
    if path.len() < MIN_SHAPE_POINTS {
        return ShapeOutcome::Unknown;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for p in path {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let width = max_x - min_x;
    let height = max_y - min_y;
    let aspect = if height > 0.0 { width / height } else { 0.0 };

    if aspect > 1.5 {
        ShapeOutcome::Right
    } else if aspect < 0.66 {
        ShapeOutcome::Up
    } else if width > 50.0 && height > 50.0 {
        if height > width * 1.3 {
            ShapeOutcome::Down
        } else {
            ShapeOutcome::Left
        }
    } else {
        ShapeOutcome::Unknown
    }
}

/// Two-state drawing session driven by pinch contact.
#[derive(Debug, Default)]
pub struct DrawingSession {
    active: bool,
    path: Vec<PixelPoint>,
    last_point: Option<PixelPoint>,
    overflow_warned: bool,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn point_count(&self) -> usize {
        self.path.len()
    }

    /// The segment drawn this cycle, for visualization only.
    pub fn last_segment(&self) -> Option<(PixelPoint, PixelPoint)> {
        let len = self.path.len();
        if len >= 2 && self.last_point == Some(self.path[len - 1]) {
            Some((self.path[len - 2], self.path[len - 1]))
        } else {
            None
        }
    }

    /// Advance the state machine with this cycle's pinch signal and index
    /// fingertip. Returns a `ShapeEvent` on the Drawing -> Idle transition.
    pub fn update(&mut self, pinching: bool, index_tip: PixelPoint) -> Option<ShapeEvent> {
        match (self.active, pinching) {
            (false, true) => {
                self.active = true;
                self.path.clear();
                self.last_point = None;
                self.overflow_warned = false;
                self.append(index_tip);
                None
            }
            (true, true) => {
                self.append(index_tip);
                None
            }
            (true, false) => {
                self.active = false;
                let outcome = classify_path(&self.path);
                let event = ShapeEvent {
                    outcome,
                    points: self.path.len(),
                };
                Some(event)
            }
            (false, false) => None,
        }
    }

    /// Force the session back to Idle, discarding any partial path.
    ///
    /// Safe to call while Idle; the discarded path never classifies.
    pub fn clear(&mut self) {
        self.active = false;
        self.path.clear();
        self.last_point = None;
        self.overflow_warned = false;
    }

    fn append(&mut self, point: PixelPoint) {
        if self.path.len() >= MAX_PATH_POINTS {
            if !self.overflow_warned {
                log::warn!(
                    "drawing path reached {} points; further points dropped",
                    MAX_PATH_POINTS
                );
                self.overflow_warned = true;
            }
            return;
        }
        self.path.push(point);
        self.last_point = Some(point);
    }
}
