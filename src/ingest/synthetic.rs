//! Synthetic landmark source for `stub://` specs.
//!
//! Cycles through a fixed schedule of hand poses so every downstream path
//! (gestures, signs, pinch drawing, no-hand cycles) is exercisable without a
//! camera or detector. Poses carry sub-threshold jitter so consumers see
//! realistic coordinate noise without any classification flapping.

use anyhow::Result;
use rand::Rng;

use crate::ingest::{LandmarkSource, SourceStats};
use crate::landmark::{index, Landmark, LandmarkFrame, LANDMARK_COUNT};

/// Frames each scheduled pose is held for (~1.5 s at 30 Hz).
const HOLD_FRAMES: u64 = 45;

/// Jitter amplitude, far below every classification margin.
const JITTER: f32 = 0.002;

#[derive(Clone, Copy, Debug)]
enum Pose {
    NoHand,
    OpenHand,
    Fist,
    Peace,
    Point,
    FourFingers,
    /// Pinched hand sweeping left to right across the frame.
    PinchSweep,
}

const SCHEDULE: &[Pose] = &[
    Pose::NoHand,
    Pose::OpenHand,
    Pose::Fist,
    Pose::Peace,
    Pose::PinchSweep,
    Pose::Point,
    Pose::FourFingers,
];

/// Deterministic synthetic hand.
pub struct SyntheticSource {
    spec: String,
    frame_count: u64,
    detections: u64,
}

impl SyntheticSource {
    pub fn new(spec: String) -> Self {
        Self {
            spec,
            frame_count: 0,
            detections: 0,
        }
    }

    fn pose_for_frame(&self, frame: u64) -> (Pose, f32) {
        let slot = (frame / HOLD_FRAMES) as usize % SCHEDULE.len();
        let progress = (frame % HOLD_FRAMES) as f32 / HOLD_FRAMES as f32;
        (SCHEDULE[slot], progress)
    }

    fn build_frame(pose: Pose, progress: f32) -> Option<LandmarkFrame> {
        let fingers = [
            (index::THUMB_TIP, index::THUMB_IP),
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ];
        // Fingers fan out left to right with tips well clear of both pinch
        // thresholds; an open tip sits above and left of its joint so the
        // vertical and the horizontal thumb test agree.
        let open = |points: &mut [Landmark; LANDMARK_COUNT], i: usize| {
            let (tip, joint) = fingers[i];
            points[joint] = Landmark::new(0.30 + 0.15 * i as f32, 0.50);
            points[tip] = Landmark::new(0.25 + 0.15 * i as f32, 0.38);
        };
        let closed = |points: &mut [Landmark; LANDMARK_COUNT], i: usize| {
            let (tip, joint) = fingers[i];
            points[joint] = Landmark::new(0.30 + 0.15 * i as f32, 0.50);
            points[tip] = Landmark::new(0.35 + 0.15 * i as f32, 0.60);
        };

        let mut points = [Landmark::new(0.5, 0.7); LANDMARK_COUNT];
        points[index::WRIST] = Landmark::new(0.5, 0.85);

        match pose {
            Pose::NoHand => return None,
            Pose::OpenHand => {
                for i in 0..5 {
                    open(&mut points, i);
                }
            }
            Pose::Fist => {
                for i in 0..5 {
                    closed(&mut points, i);
                }
            }
            Pose::Peace => {
                for i in 0..5 {
                    closed(&mut points, i);
                }
                open(&mut points, 1);
                open(&mut points, 2);
            }
            Pose::Point => {
                for i in 0..5 {
                    closed(&mut points, i);
                }
                open(&mut points, 0);
                open(&mut points, 1);
            }
            Pose::FourFingers => {
                for i in 1..5 {
                    open(&mut points, i);
                }
                closed(&mut points, 0);
            }
            Pose::PinchSweep => {
                for i in 0..5 {
                    closed(&mut points, i);
                }
                // Thumb and index tips touching, tracing a wide shallow
                // stroke (a strictly flat one would hit the zero-height
                // classification quirk).
                let x = 0.2 + 0.6 * progress;
                let y = 0.5 + 0.02 * progress;
                points[index::INDEX_TIP] = Landmark::new(x, y);
                points[index::THUMB_TIP] = Landmark::new(x + 0.005, y);
            }
        }
        Some(LandmarkFrame::new(points))
    }
}

impl LandmarkSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn connect(&mut self) -> Result<()> {
        log::info!("landmark source: connected to {} (synthetic)", self.spec);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        let (pose, progress) = self.pose_for_frame(self.frame_count);
        self.frame_count += 1;

        let Some(frame) = Self::build_frame(pose, progress) else {
            return Ok(None);
        };
        self.detections += 1;

        let mut rng = rand::thread_rng();
        let mut points = *frame.points();
        for lm in &mut points {
            lm.x += rng.gen_range(-JITTER..JITTER);
            lm.y += rng.gen_range(-JITTER..JITTER);
        }
        Ok(Some(LandmarkFrame::new(points)))
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames: self.frame_count,
            detections: self.detections,
            spec: self.spec.clone(),
        }
    }

    fn close(&mut self) {}
}
