//! Four-class finger-count sign table (datagram engine vocabulary).

use crate::features::FingerFlags;
use crate::Direction;

/// Classifier counting open fingers into direction signs.
///
/// Expects flags computed with the mirrored horizontal thumb test
/// (`HandFeatures::flags_mirrored_thumb`); the engine deployment reads a
/// mirrored view and judges the thumb on the x axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct FingerCountClassifier;

impl FingerCountClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when no sign applies; the engine stays silent then.
    pub fn classify(&self, flags: FingerFlags) -> Option<Direction> {
        let total = flags.open_count();
        if total == 0 {
            Some(Direction::Down)
        } else if flags.index && flags.middle && total == 2 {
            Some(Direction::Up)
        } else if total == 5 {
            Some(Direction::Left)
        } else if flags.thumb && total == 1 {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> FingerFlags {
        FingerFlags::new(thumb, index, middle, ring, pinky)
    }

    #[test]
    fn closed_fist_signs_down() {
        let classifier = FingerCountClassifier::new();
        assert_eq!(
            classifier.classify(flags(false, false, false, false, false)),
            Some(Direction::Down)
        );
    }

    #[test]
    fn index_middle_pair_signs_up() {
        let classifier = FingerCountClassifier::new();
        assert_eq!(
            classifier.classify(flags(false, true, true, false, false)),
            Some(Direction::Up)
        );
        // Same pair plus thumb is three fingers: no sign.
        assert_eq!(classifier.classify(flags(true, true, true, false, false)), None);
    }

    #[test]
    fn open_hand_signs_left() {
        let classifier = FingerCountClassifier::new();
        assert_eq!(
            classifier.classify(flags(true, true, true, true, true)),
            Some(Direction::Left)
        );
    }

    #[test]
    fn lone_thumb_signs_right() {
        let classifier = FingerCountClassifier::new();
        assert_eq!(
            classifier.classify(flags(true, false, false, false, false)),
            Some(Direction::Right)
        );
        // A lone index finger is one open finger but not the thumb.
        assert_eq!(classifier.classify(flags(false, true, false, false, false)), None);
    }
}
