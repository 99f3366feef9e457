//! Seven-class ordered rule table.
//!
//! The rules are an explicit ordered list of `(predicate, label)` pairs and
//! are evaluated top to bottom with first match winning. Order is the only
//! disambiguation mechanism: the `point` and `pinch` patterns cover the same
//! flag combination, so `point` wins purely by position. Keep the list a
//! list; an unordered map would silently change the vocabulary.

use crate::features::FingerFlags;
use crate::GestureLabel;

type Predicate = fn(FingerFlags) -> bool;

/// Ordered rule table. First match wins.
const RULES: &[(Predicate, GestureLabel)] = &[
    (
        |f| f.index && f.middle && !f.ring && !f.pinky && !f.thumb,
        GestureLabel::Peace,
    ),
    (
        |f| f.index && !f.middle && !f.ring && !f.pinky && f.thumb,
        GestureLabel::Point,
    ),
    (|f| f.all_open(), GestureLabel::OpenHand),
    (|f| f.all_closed(), GestureLabel::Fist),
    (
        |f| f.index && f.thumb && !f.middle && !f.ring && !f.pinky,
        GestureLabel::Pinch,
    ),
    (
        |f| f.index && f.middle && f.ring && f.pinky && !f.thumb,
        GestureLabel::FourFingers,
    ),
];

/// Classifier over the ordered rule table.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleTableClassifier;

impl RuleTableClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, flags: FingerFlags) -> GestureLabel {
        classify_with(RULES, flags)
    }
}

fn classify_with(rules: &[(Predicate, GestureLabel)], flags: FingerFlags) -> GestureLabel {
    for (predicate, label) in rules {
        if predicate(flags) {
            return *label;
        }
    }
    GestureLabel::Unknown
}
