//! Signal-fusion leaf components for the exam monitoring engine.
//!
//! Everything in this crate is pure computation over retained timer and
//! window state: raw per-tick detections go in, time-qualified discrete
//! events and risk assessments come out. Alert policy (cooldowns,
//! penalties, termination) lives in the `alerting` crate.

pub mod behavior;
pub mod debounce;
pub mod sound;
pub mod types;

pub use behavior::{
    BehaviorAnalyzer, BehaviorAssessment, BehaviorCategory, BehaviorConfig, PatternKind,
    RiskLevel, RiskSummary, Trend,
};
pub use debounce::{DebounceConfig, DebouncedSignal, RawSignal, SignalDebouncer};
pub use sound::{
    bands_from_features, AmplitudeBand, FrequencyBand, SoundBandConfig, SoundCounterConfig,
    SoundCounters, SoundPattern,
};
pub use types::{BehaviorFlags, DetectedObject, Direction, ObjectSeverity};
