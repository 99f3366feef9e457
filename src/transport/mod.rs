//! Emitters moving classification results to the external game client.
//!
//! Three transports exist, mutually exclusive per deployment:
//! - `stream`: accept-one-client TCP, one JSON record per line
//! - `datagram`: fire-and-forget UDP signs plus an inbound command channel
//! - `stdio`: line-oriented subprocess protocol on stdin/stdout
//!
//! None of them acknowledge or retry. The consumer buffers by newline (stream
//! and stdio) or by datagram boundary.

pub mod datagram;
pub mod stdio;
pub mod stream;

pub use datagram::{DatagramChannel, DatagramConfig, EngineCommand};
pub use stdio::{CommandPump, DetectorCommand, DetectorEvent, DetectorRecord, ErrorRecord};
pub use stream::{StreamServer, StreamSession};

use serde::{Deserialize, Serialize};

use crate::landmark::PixelPoint;
use crate::{GestureLabel, SpellEvent};

/// The serialized unit sent to the stream client once per cycle.
///
/// The key set is fixed: a cycle with no detected hand still serializes every
/// field with its default so the consumer never sees a truncated record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OutboundRecord {
    /// All 21 landmarks in pixel coordinates; empty when no hand.
    pub landmarks: Vec<PixelPoint>,
    /// Current gesture label.
    pub gesture: GestureLabel,
    /// Index fingertip in pixel coordinates, `(0, 0)` when no hand.
    pub index_tip: PixelPoint,
    /// Pinch contact by the normalized-space threshold.
    pub pinch: bool,
    /// Debounced spell emission, `none` outside the emission cycle.
    #[serde(default)]
    pub spell: SpellEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_field_for_field() {
        let record = OutboundRecord {
            landmarks: vec![PixelPoint::new(12.0, 34.0), PixelPoint::new(56.0, 78.0)],
            gesture: GestureLabel::Peace,
            index_tip: PixelPoint::new(56.0, 78.0),
            pinch: false,
            spell: SpellEvent::Wind,
        };
        let line = serde_json::to_string(&record).unwrap();
        let back: OutboundRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn empty_record_keeps_the_fixed_key_shape() {
        let line = serde_json::to_string(&OutboundRecord::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["landmarks", "gesture", "index_tip", "pinch", "spell"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["gesture"], "none");
        assert_eq!(obj["spell"], "none");
        assert_eq!(obj["index_tip"]["x"], 0.0);
    }

    #[test]
    fn spell_defaults_to_none_when_absent() {
        let record: OutboundRecord = serde_json::from_str(
            r#"{"landmarks":[],"gesture":"open_hand","index_tip":{"x":0.0,"y":0.0},"pinch":false}"#,
        )
        .unwrap();
        assert_eq!(record.spell, SpellEvent::None);
    }
}
