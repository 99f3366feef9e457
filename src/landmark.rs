//! Hand landmark frames.
//!
//! A `LandmarkFrame` is the unit handed over by a landmark source: exactly 21
//! normalized 2D points following the standard hand landmark numbering
//! (wrist 0; fingertips 4, 8, 12, 16, 20; the joint preceding each tip at
//! 3, 6, 10, 14, 18). Frames are owned by the current processing cycle and
//! discarded after classification.
//!
//! Coordinates are normalized to `[0, 1]` relative to frame width/height with
//! the origin at the top-left, so a smaller `y` is higher on screen.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical landmark indices.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// One landmark in normalized image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in normalized coordinate space.
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One point in pixel coordinates, as sent on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixel space.
    pub fn distance_to(&self, other: &PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Frame dimensions used to project normalized landmarks into pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        // Capture resolution used by all deployments.
        Self {
            width: 320,
            height: 240,
        }
    }
}

/// Ordered set of exactly 21 landmarks for one detected hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build a frame from a slice, rejecting any count other than 21.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| anyhow!("landmark frame requires {} points, got {}", LANDMARK_COUNT, points.len()))?;
        Ok(Self { points })
    }

    pub fn get(&self, idx: usize) -> Landmark {
        self.points[idx]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Project one landmark into pixel coordinates.
    pub fn pixel(&self, idx: usize, size: FrameSize) -> PixelPoint {
        let lm = self.points[idx];
        PixelPoint::new(lm.x * size.width as f32, lm.y * size.height as f32)
    }

    /// Project all landmarks into pixel coordinates, in index order.
    pub fn pixels(&self, size: FrameSize) -> Vec<PixelPoint> {
        self.points
            .iter()
            .map(|lm| PixelPoint::new(lm.x * size.width as f32, lm.y * size.height as f32))
            .collect()
    }

    /// Mirror the frame horizontally (`x -> 1 - x`).
    ///
    /// Sources apply this so the on-screen hand moves like the user's own;
    /// classification never needs to know about it.
    pub fn mirrored(mut self) -> Self {
        for lm in &mut self.points {
            lm.x = 1.0 - lm.x;
        }
        self
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = anyhow::Error;

    fn try_from(points: Vec<Landmark>) -> Result<Self> {
        Self::from_slice(&points)
    }
}

impl From<LandmarkFrame> for Vec<Landmark> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points.to_vec()
    }
}
