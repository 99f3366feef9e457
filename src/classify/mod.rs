//! Gesture classifier strategies.
//!
//! Two incompatible vocabularies ship with the system: the seven-class rule
//! table used by the stream and stdio deployments, and the four-class
//! finger-count sign table used by the datagram engine. They serve the same
//! role in different deployments and are deliberately kept apart; a profile
//! selects one, nothing ever merges the tables.

mod count;
mod rules;

pub use count::FingerCountClassifier;
pub use rules::RuleTableClassifier;

use anyhow::{anyhow, Result};

/// Deployment classifier profile, selected by config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassifierProfile {
    /// Seven-class ordered rule table (`peace`, `point`, ...).
    #[default]
    RuleTable,
    /// Minimal two-state vocabulary of the original tracker server:
    /// `pinch` when the normalized pinch distance closes, else `open`.
    PinchOpen,
    /// Four-class finger-count sign table (`up`, `down`, `left`, `right`).
    FingerCount,
}

impl ClassifierProfile {
    /// Profile identifier as used in config files.
    pub fn name(self) -> &'static str {
        match self {
            ClassifierProfile::RuleTable => "rules",
            ClassifierProfile::PinchOpen => "pinch-open",
            ClassifierProfile::FingerCount => "finger-count",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "rules" | "rule-table" => Ok(ClassifierProfile::RuleTable),
            "pinch-open" => Ok(ClassifierProfile::PinchOpen),
            "finger-count" | "signs" => Ok(ClassifierProfile::FingerCount),
            other => Err(anyhow!("unknown classifier profile '{}'", other)),
        }
    }
}
