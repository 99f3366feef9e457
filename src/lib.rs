//! handlink - hand gesture streaming engine
//!
//! This crate turns hand landmark frames (21 normalized points per detected
//! hand, produced by an external detector) into discrete symbolic events and
//! streams them to a game client.
//!
//! # Architecture
//!
//! One processing cycle flows leaf-first through:
//!
//! 1. **Landmark source** (`ingest`): zero or one `LandmarkFrame` per cycle.
//! 2. **Feature extractor** (`features`): per-finger open flags and pinch
//!    distances, keeping normalized-space and pixel-space units distinct.
//! 3. **Classifiers** (`classify`, `shape`): ordered-rule gesture table,
//!    finger-count sign table, and the drawing-path shape classifier.
//! 4. **Debouncer** (`SpellDebouncer`): one global cooldown converting a held
//!    gesture into at most one spell emission per window.
//! 5. **Emitter** (`transport`): newline-delimited JSON stream, plain-text
//!    UDP signs, or the stdio line protocol.
//!
//! `session::GestureSession` owns the per-cycle mutable state so a deployment
//! never leans on process globals and tests can drive cycles deterministically.
//!
//! # Module Structure
//!
//! - `landmark`: landmark frames and anatomical indices
//! - `features`: derived measurements used by classification
//! - `classify`: gesture classifier strategies (never merged vocabularies)
//! - `shape`: drawing session state machine and shape classification
//! - `session`: per-cycle context object
//! - `ingest`: landmark sources (synthetic, replay, external detector)
//! - `transport`: stream / datagram / stdio emitters
//! - `config`: per-daemon configuration

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub mod classify;
pub mod config;
pub mod features;
pub mod ingest;
pub mod landmark;
pub mod session;
pub mod shape;
pub mod transport;

pub use classify::{ClassifierProfile, FingerCountClassifier, RuleTableClassifier};
pub use features::{FingerFlags, HandFeatures};
pub use ingest::{
    replay::ReplayConfig, script::ScriptConfig, LandmarkSource, ReplaySource, ScriptSource,
    SyntheticSource,
};
pub use landmark::{FrameSize, Landmark, LandmarkFrame, PixelPoint};
pub use session::{CycleOutput, GestureSession, SessionConfig};
pub use shape::{DrawingSession, ShapeEvent, ShapeOutcome, MAX_PATH_POINTS};
pub use transport::{DatagramChannel, OutboundRecord, StreamServer};

// -------------------- Gesture vocabulary --------------------

/// Discrete gesture derived from one frame's finger flags.
///
/// The vocabulary is closed; unmatched flag combinations classify as
/// `Unknown`, and `None` is reserved for frames with no detected hand.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    #[default]
    None,
    Fist,
    OpenHand,
    Point,
    Peace,
    Pinch,
    FourFingers,
    Unknown,
}

impl GestureLabel {
    /// Wire string, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            GestureLabel::None => "none",
            GestureLabel::Fist => "fist",
            GestureLabel::OpenHand => "open_hand",
            GestureLabel::Point => "point",
            GestureLabel::Peace => "peace",
            GestureLabel::Pinch => "pinch",
            GestureLabel::FourFingers => "four_fingers",
            GestureLabel::Unknown => "unknown",
        }
    }
}

/// Direction sign shared by the finger-count vocabulary and the shape
/// classifier outcome.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

// -------------------- Spells --------------------

/// Rate-limited event emitted when a held gesture passes the debouncer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpellEvent {
    #[default]
    None,
    Fire,
    Lightning,
    Earth,
    Water,
    Wind,
}

impl SpellEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            SpellEvent::None => "none",
            SpellEvent::Fire => "fire",
            SpellEvent::Lightning => "lightning",
            SpellEvent::Earth => "earth",
            SpellEvent::Water => "water",
            SpellEvent::Wind => "wind",
        }
    }
}

/// Fixed gesture-to-spell table. Gestures without an entry never cast.
pub fn spell_for_gesture(gesture: GestureLabel) -> SpellEvent {
    match gesture {
        GestureLabel::Fist => SpellEvent::Fire,
        GestureLabel::Point => SpellEvent::Lightning,
        GestureLabel::FourFingers => SpellEvent::Earth,
        GestureLabel::OpenHand => SpellEvent::Water,
        GestureLabel::Peace => SpellEvent::Wind,
        GestureLabel::None | GestureLabel::Pinch | GestureLabel::Unknown => SpellEvent::None,
    }
}

// -------------------- Debouncer --------------------

/// Suppresses repeated spell emission while a gesture is held.
///
/// One cooldown window gates all gestures: rapidly alternating qualifying
/// gestures inside the window still yield a single emission total. The first
/// qualifying gesture after construction fires immediately.
#[derive(Debug)]
pub struct SpellDebouncer {
    cooldown: Duration,
    last_emission: Option<Instant>,
}

impl SpellDebouncer {
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emission: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Map the current gesture through the spell table, gated by the
    /// cooldown. Returns `SpellEvent::None` while the window is open.
    pub fn update(&mut self, gesture: GestureLabel, now: Instant) -> SpellEvent {
        let spell = spell_for_gesture(gesture);
        if spell == SpellEvent::None {
            return SpellEvent::None;
        }
        match self.last_emission {
            Some(last) if now.duration_since(last) <= self.cooldown => SpellEvent::None,
            _ => {
                self.last_emission = Some(now);
                spell
            }
        }
    }
}

impl Default for SpellDebouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spell_table_matches_vocabulary() {
        assert_eq!(spell_for_gesture(GestureLabel::OpenHand), SpellEvent::Water);
        assert_eq!(spell_for_gesture(GestureLabel::Fist), SpellEvent::Fire);
        assert_eq!(
            spell_for_gesture(GestureLabel::Point),
            SpellEvent::Lightning
        );
        assert_eq!(spell_for_gesture(GestureLabel::Peace), SpellEvent::Wind);
        assert_eq!(
            spell_for_gesture(GestureLabel::FourFingers),
            SpellEvent::Earth
        );
        assert_eq!(spell_for_gesture(GestureLabel::Pinch), SpellEvent::None);
        assert_eq!(spell_for_gesture(GestureLabel::Unknown), SpellEvent::None);
    }

    #[test]
    fn first_qualifying_gesture_fires_immediately() {
        let mut debouncer = SpellDebouncer::default();
        let t0 = Instant::now();
        assert_eq!(
            debouncer.update(GestureLabel::OpenHand, t0),
            SpellEvent::Water
        );
    }

    #[test]
    fn cooldown_gates_repeat_emissions() {
        let mut debouncer = SpellDebouncer::new(Duration::from_secs(1));
        let t0 = Instant::now();

        let times = [
            (Duration::ZERO, SpellEvent::Water),
            (Duration::from_millis(100), SpellEvent::None),
            (Duration::from_millis(500), SpellEvent::None),
            (Duration::from_millis(1200), SpellEvent::Water),
        ];
        for (offset, expected) in times {
            assert_eq!(
                debouncer.update(GestureLabel::OpenHand, t0 + offset),
                expected,
                "offset {offset:?}"
            );
        }
    }

    #[test]
    fn cooldown_is_global_across_gestures() {
        let mut debouncer = SpellDebouncer::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert_eq!(debouncer.update(GestureLabel::Fist, t0), SpellEvent::Fire);
        // A different qualifying gesture inside the window is still gated.
        assert_eq!(
            debouncer.update(GestureLabel::Peace, t0 + Duration::from_millis(300)),
            SpellEvent::None
        );
        assert_eq!(
            debouncer.update(GestureLabel::Peace, t0 + Duration::from_millis(1400)),
            SpellEvent::Wind
        );
    }

    #[test]
    fn non_casting_gestures_never_consume_the_window() {
        let mut debouncer = SpellDebouncer::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert_eq!(
            debouncer.update(GestureLabel::Unknown, t0),
            SpellEvent::None
        );
        // The window was never opened, so the next qualifying gesture fires.
        assert_eq!(
            debouncer.update(GestureLabel::Fist, t0 + Duration::from_millis(10)),
            SpellEvent::Fire
        );
    }

    #[test]
    fn labels_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&GestureLabel::OpenHand).unwrap(),
            r#""open_hand""#
        );
        assert_eq!(
            serde_json::to_string(&SpellEvent::None).unwrap(),
            r#""none""#
        );
        assert_eq!(
            serde_json::to_string(&Direction::Left).unwrap(),
            r#""left""#
        );
    }
}
