//! Per-session processing context.
//!
//! `GestureSession` carries all mutable state a deployment needs across
//! cycles (classifier profile, debounce window, drawing path). Nothing lives
//! in process globals: multiple sessions can coexist and tests drive cycles
//! with explicit clock readings.

use std::time::{Duration, Instant};

use crate::classify::{ClassifierProfile, FingerCountClassifier, RuleTableClassifier};
use crate::features::HandFeatures;
use crate::landmark::{FrameSize, LandmarkFrame};
use crate::shape::{DrawingSession, ShapeEvent};
use crate::transport::OutboundRecord;
use crate::{Direction, GestureLabel, SpellDebouncer, SpellEvent};

/// Knobs fixed at session start.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub profile: ClassifierProfile,
    pub frame_size: FrameSize,
    pub cooldown: Duration,
    /// Whether the drawing state machine runs (stdio profile).
    pub drawing: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: ClassifierProfile::RuleTable,
            frame_size: FrameSize::default(),
            cooldown: SpellDebouncer::DEFAULT_COOLDOWN,
            drawing: false,
        }
    }
}

/// Everything one processing cycle produced.
#[derive(Clone, Debug)]
pub struct CycleOutput {
    /// Stream-profile record; full fixed-key shape every cycle.
    pub record: OutboundRecord,
    /// Completed drawing, when a pinch released this cycle.
    pub shape: Option<ShapeEvent>,
    /// Finger-count sign, when that profile is active and a sign applies.
    pub sign: Option<Direction>,
    pub hand_detected: bool,
}

/// Session state threaded through every cycle.
pub struct GestureSession {
    config: SessionConfig,
    rules: RuleTableClassifier,
    count: FingerCountClassifier,
    debouncer: SpellDebouncer,
    drawing: DrawingSession,
}

impl GestureSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            rules: RuleTableClassifier::new(),
            count: FingerCountClassifier::new(),
            debouncer: SpellDebouncer::new(config.cooldown),
            drawing: DrawingSession::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_active()
    }

    pub fn drawn_points(&self) -> usize {
        self.drawing.point_count()
    }

    /// Force the drawing state machine back to Idle, discarding any partial
    /// path. Idempotent while Idle.
    pub fn clear_drawing(&mut self) {
        self.drawing.clear();
    }

    /// Run one processing cycle.
    ///
    /// `frame` is the landmark source's output for this cycle (`None` when no
    /// hand was detected); `now` is a monotonic clock reading. A no-hand
    /// cycle emits the fixed-shape default record and leaves the drawing
    /// state untouched.
    pub fn process(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> CycleOutput {
        let Some(frame) = frame else {
            return CycleOutput {
                record: OutboundRecord::default(),
                shape: None,
                sign: None,
                hand_detected: false,
            };
        };

        let features = HandFeatures::extract(frame, self.config.frame_size);

        let gesture = match self.config.profile {
            ClassifierProfile::RuleTable => self.rules.classify(features.flags),
            ClassifierProfile::PinchOpen => {
                if features.is_pinching_norm() {
                    GestureLabel::Pinch
                } else {
                    GestureLabel::OpenHand
                }
            }
            // The sign vocabulary replaces gestures entirely in this profile.
            ClassifierProfile::FingerCount => GestureLabel::None,
        };

        let sign = match self.config.profile {
            ClassifierProfile::FingerCount => self.count.classify(features.flags_mirrored_thumb),
            _ => None,
        };

        let spell = self.debouncer.update(gesture, now);
        if spell != SpellEvent::None {
            log::info!("spell cast: {} (gesture {})", spell.as_str(), gesture.as_str());
        }

        let shape = if self.config.drawing {
            let event = self
                .drawing
                .update(features.is_pinching_px(), features.index_tip);
            if let Some(event) = event {
                log::info!(
                    "shape detected: {} ({} points)",
                    event.outcome.as_str(),
                    event.points
                );
            }
            event
        } else {
            None
        };

        CycleOutput {
            record: OutboundRecord {
                landmarks: frame.pixels(self.config.frame_size),
                gesture,
                index_tip: features.index_tip,
                pinch: features.is_pinching_norm(),
                spell,
            },
            shape,
            sign,
            hand_detected: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{index, Landmark, LANDMARK_COUNT};
    use crate::shape::ShapeOutcome;

    fn open_hand_frame() -> LandmarkFrame {
        let mut points = [Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        let fingers = [
            (index::THUMB_TIP, index::THUMB_IP),
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ];
        // Tips fan out so no pair sits within a pinch threshold.
        for (i, (tip, joint)) in fingers.into_iter().enumerate() {
            points[joint] = Landmark::new(0.30 + 0.15 * i as f32, 0.5);
            points[tip] = Landmark::new(0.25 + 0.15 * i as f32, 0.38);
        }
        LandmarkFrame::new(points)
    }

    /// Pinched hand with the index tip at the given normalized position.
    fn pinched_frame(x: f32, y: f32) -> LandmarkFrame {
        let mut points = [Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        points[index::INDEX_TIP] = Landmark::new(x, y);
        points[index::THUMB_TIP] = Landmark::new(x, y);
        LandmarkFrame::new(points)
    }

    #[test]
    fn no_hand_cycle_emits_default_record() {
        let mut session = GestureSession::new(SessionConfig::default());
        let out = session.process(None, Instant::now());
        assert!(!out.hand_detected);
        assert_eq!(out.record, OutboundRecord::default());
        assert!(out.shape.is_none());
        assert!(out.sign.is_none());
    }

    #[test]
    fn held_open_hand_casts_water_once_per_window() {
        let mut session = GestureSession::new(SessionConfig {
            cooldown: Duration::from_secs(1),
            ..SessionConfig::default()
        });
        let frame = open_hand_frame();
        let t0 = Instant::now();

        // Two seconds of frames at ~30 Hz.
        let mut emissions = Vec::new();
        for i in 0..60 {
            let now = t0 + Duration::from_millis(i * 33);
            let out = session.process(Some(&frame), now);
            assert_eq!(out.record.gesture, GestureLabel::OpenHand);
            if out.record.spell != SpellEvent::None {
                emissions.push((i, out.record.spell));
            }
        }

        // First frame fires; the next qualifying frame is the first one past
        // the 1 s window (31 * 33 ms = 1.023 s).
        assert_eq!(
            emissions,
            vec![(0, SpellEvent::Water), (31, SpellEvent::Water)]
        );
    }

    #[test]
    fn finger_count_profile_signs_without_spells() {
        let mut session = GestureSession::new(SessionConfig {
            profile: ClassifierProfile::FingerCount,
            ..SessionConfig::default()
        });
        let out = session.process(Some(&open_hand_frame()), Instant::now());
        assert_eq!(out.sign, Some(Direction::Left));
        assert_eq!(out.record.gesture, GestureLabel::None);
        assert_eq!(out.record.spell, SpellEvent::None);
    }

    #[test]
    fn pinch_open_profile_uses_minimal_vocabulary() {
        let mut session = GestureSession::new(SessionConfig {
            profile: ClassifierProfile::PinchOpen,
            ..SessionConfig::default()
        });

        let out = session.process(Some(&pinched_frame(0.5, 0.5)), Instant::now());
        assert_eq!(out.record.gesture, GestureLabel::Pinch);
        assert!(out.record.pinch);

        let out = session.process(Some(&open_hand_frame()), Instant::now());
        assert_eq!(out.record.gesture, GestureLabel::OpenHand);
        assert!(!out.record.pinch);
    }

    #[test]
    fn drawing_profile_completes_a_shape_on_release() {
        let mut session = GestureSession::new(SessionConfig {
            drawing: true,
            ..SessionConfig::default()
        });
        let t0 = Instant::now();

        // Sweep a wide, slightly sloped pinched stroke across the frame.
        for i in 0..20 {
            let x = 0.1 + 0.04 * i as f32;
            let y = 0.5 + 0.004 * i as f32;
            let out = session.process(Some(&pinched_frame(x, y)), t0);
            assert!(out.shape.is_none());
        }
        assert!(session.is_drawing());
        assert_eq!(session.drawn_points(), 20);

        // Release the pinch.
        let out = session.process(Some(&open_hand_frame()), t0);
        let shape = out.shape.expect("shape event on release");
        assert_eq!(shape.outcome, ShapeOutcome::Right);
        assert_eq!(shape.points, 20);
        assert!(!session.is_drawing());
    }

    #[test]
    fn clear_discards_partial_drawing_without_an_event() {
        let mut session = GestureSession::new(SessionConfig {
            drawing: true,
            ..SessionConfig::default()
        });
        let t0 = Instant::now();
        for i in 0..15 {
            session.process(Some(&pinched_frame(0.1 + 0.05 * i as f32, 0.5)), t0);
        }
        assert!(session.is_drawing());

        session.clear_drawing();
        assert!(!session.is_drawing());
        assert_eq!(session.drawn_points(), 0);

        // The release that would have classified the path now yields nothing.
        let out = session.process(Some(&open_hand_frame()), t0);
        assert!(out.shape.is_none());
    }
}
