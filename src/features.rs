//! Derived measurements used by classification.
//!
//! The extractor never errors on a well-formed `LandmarkFrame`; every output
//! is a pure function of the 21 points and the frame size.
//!
//! Two distance units coexist and must not be conflated: pinch detection for
//! the stream profile compares in normalized coordinate space (threshold
//! 0.05), while the drawing trigger compares in pixel space (threshold 40 px).
//! Both helpers are provided and callers pick the one their threshold is
//! calibrated for.

use crate::landmark::{index, FrameSize, LandmarkFrame, PixelPoint};

/// Normalized-space pinch threshold (stream profile `pinch` field).
pub const PINCH_THRESHOLD_NORM: f32 = 0.05;

/// Pixel-space pinch threshold (drawing trigger).
pub const PINCH_THRESHOLD_PX: f32 = 40.0;

/// Per-finger open/closed flags, thumb first.
///
/// A finger counts as open when its tip sits above its reference joint on
/// screen (tip.y < joint.y, image origin top-left). This is the simplified
/// test from the source deployments and only holds for an upright hand
/// facing the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerFlags {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerFlags {
    pub fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    /// Number of open fingers.
    pub fn open_count(&self) -> u8 {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .into_iter()
            .filter(|open| *open)
            .count() as u8
    }

    pub fn all_open(&self) -> bool {
        self.open_count() == 5
    }

    pub fn all_closed(&self) -> bool {
        self.open_count() == 0
    }
}

/// Measurements extracted from one frame.
#[derive(Clone, Copy, Debug)]
pub struct HandFeatures {
    /// Vertical-test flags for all five fingers (rule-table profile).
    pub flags: FingerFlags,
    /// Same flags but with the mirrored horizontal thumb test
    /// (finger-count profile).
    pub flags_mirrored_thumb: FingerFlags,
    /// Thumb-tip/index-tip distance in normalized coordinate space.
    pub pinch_distance_norm: f32,
    /// Thumb-tip/index-tip distance in pixel space.
    pub pinch_distance_px: f32,
    /// Index fingertip in pixel coordinates.
    pub index_tip: PixelPoint,
    /// Thumb tip in pixel coordinates.
    pub thumb_tip: PixelPoint,
}

impl HandFeatures {
    pub fn extract(frame: &LandmarkFrame, size: FrameSize) -> Self {
        let open_y = |tip: usize, joint: usize| frame.get(tip).y < frame.get(joint).y;

        let flags = FingerFlags::new(
            open_y(index::THUMB_TIP, index::THUMB_IP),
            open_y(index::INDEX_TIP, index::INDEX_PIP),
            open_y(index::MIDDLE_TIP, index::MIDDLE_PIP),
            open_y(index::RING_TIP, index::RING_PIP),
            open_y(index::PINKY_TIP, index::PINKY_PIP),
        );

        // The engine deployment tests the thumb on the x axis (mirror view,
        // right hand): tip left of the preceding joint means extended.
        let thumb_x = frame.get(index::THUMB_TIP).x < frame.get(index::THUMB_IP).x;
        let flags_mirrored_thumb = FingerFlags {
            thumb: thumb_x,
            ..flags
        };

        let thumb = frame.get(index::THUMB_TIP);
        let index_tip_norm = frame.get(index::INDEX_TIP);
        let index_tip = frame.pixel(index::INDEX_TIP, size);
        let thumb_tip = frame.pixel(index::THUMB_TIP, size);

        Self {
            flags,
            flags_mirrored_thumb,
            pinch_distance_norm: thumb.distance_to(&index_tip_norm),
            pinch_distance_px: thumb_tip.distance_to(&index_tip),
            index_tip,
            thumb_tip,
        }
    }

    /// Pinch contact in normalized units (stream profile).
    pub fn is_pinching_norm(&self) -> bool {
        self.pinch_distance_norm < PINCH_THRESHOLD_NORM
    }

    /// Pinch contact in pixel units (drawing trigger).
    pub fn is_pinching_px(&self) -> bool {
        self.pinch_distance_px < PINCH_THRESHOLD_PX
    }
}
