//! Behavioral pattern analysis.
//!
//! Maintains a sliding time window of event timestamps per behavior
//! category and derives three things each tick: a weighted 0-100 risk
//! score over the short window, a list of named suspicious patterns, and a
//! short-term trend over the recorded score history. The analyzer never
//! touches the cumulative cheating score; that belongs to the alert
//! manager.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::BehaviorFlags;

/// Categories in fixed report order. The order is part of the contract:
/// pattern lists come out in this sequence regardless of input order.
pub const CATEGORIES: [BehaviorCategory; 5] = [
    BehaviorCategory::LookingAway,
    BehaviorCategory::RapidMovement,
    BehaviorCategory::HandToFace,
    BehaviorCategory::PostureChange,
    BehaviorCategory::ObjectDetection,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorCategory {
    LookingAway,
    RapidMovement,
    HandToFace,
    PostureChange,
    ObjectDetection,
}

impl BehaviorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LookingAway => "looking_away",
            Self::RapidMovement => "rapid_head_movement",
            Self::HandToFace => "hand_to_face",
            Self::PostureChange => "posture_change",
            Self::ObjectDetection => "object_detection",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::LookingAway => 0,
            Self::RapidMovement => 1,
            Self::HandToFace => 2,
            Self::PostureChange => 3,
            Self::ObjectDetection => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    FrequentLookingAway,
    NervousBehavior,
    PhoneUsageSuspected,
    MultipleForbiddenObjects,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrequentLookingAway => "frequent_looking_away",
            Self::NervousBehavior => "nervous_behavior",
            Self::PhoneUsageSuspected => "phone_usage_suspected",
            Self::MultipleForbiddenObjects => "multiple_forbidden_objects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Normal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Window lengths, score weights/caps, and level thresholds.
///
/// Level thresholds are pluggable but must stay monotone
/// (high > medium > low); `validate` enforces that at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorConfig {
    pub short_window_secs: f64,
    pub medium_window_secs: f64,
    pub long_window_secs: f64,
    pub high_risk_threshold: u32,
    pub medium_risk_threshold: u32,
    pub low_risk_threshold: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            short_window_secs: 10.0,
            medium_window_secs: 30.0,
            long_window_secs: 60.0,
            high_risk_threshold: 70,
            medium_risk_threshold: 40,
            low_risk_threshold: 20,
        }
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.low_risk_threshold >= self.medium_risk_threshold
            || self.medium_risk_threshold >= self.high_risk_threshold
        {
            return Err(format!(
                "risk thresholds must be strictly increasing: low {} medium {} high {}",
                self.low_risk_threshold, self.medium_risk_threshold, self.high_risk_threshold
            ));
        }
        if self.short_window_secs <= 0.0 || self.medium_window_secs <= 0.0 {
            return Err("analysis windows must be positive".to_string());
        }
        Ok(())
    }

    pub fn risk_level(&self, score: u32) -> RiskLevel {
        if score >= self.high_risk_threshold {
            RiskLevel::High
        } else if score >= self.medium_risk_threshold {
            RiskLevel::Medium
        } else if score >= self.low_risk_threshold {
            RiskLevel::Low
        } else {
            RiskLevel::Normal
        }
    }

    /// Scoring window, weight, and contribution cap for a category.
    fn rule(&self, category: BehaviorCategory) -> (f64, u32, u32) {
        match category {
            BehaviorCategory::LookingAway => (self.short_window_secs, 5, 30),
            BehaviorCategory::RapidMovement => (self.short_window_secs, 3, 20),
            BehaviorCategory::HandToFace => (self.short_window_secs, 4, 25),
            BehaviorCategory::PostureChange => (self.medium_window_secs, 2, 15),
            BehaviorCategory::ObjectDetection => (self.short_window_secs, 10, 40),
        }
    }
}

/// Time-ordered event timestamps for one category. Entries older than the
/// active window are excluded at read time; pruning against the long
/// window happens lazily on record to bound memory.
#[derive(Debug, Default)]
struct PatternWindow {
    times: VecDeque<f64>,
}

impl PatternWindow {
    fn record(&mut self, now: f64, horizon_secs: f64) {
        self.times.push_back(now);
        while let Some(&front) = self.times.front() {
            if now - front > horizon_secs {
                self.times.pop_front();
            } else {
                break;
            }
        }
    }

    fn count_within(&self, now: f64, window_secs: f64) -> u32 {
        self.times
            .iter()
            .filter(|&&t| now - t < window_secs)
            .count() as u32
    }
}

#[derive(Debug, Clone, Copy)]
struct RiskSample {
    timestamp: f64,
    score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorAssessment {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub patterns: Vec<PatternKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub current_risk: u32,
    pub average_risk: f64,
    pub peak_risk: u32,
    pub risk_level: RiskLevel,
    pub trend: Trend,
}

const RISK_HISTORY_CAP: usize = 100;
const TREND_SAMPLE_LEN: usize = 10;

#[derive(Debug)]
pub struct BehaviorAnalyzer {
    config: BehaviorConfig,
    windows: [PatternWindow; 5],
    risk_history: VecDeque<RiskSample>,
    current_risk: u32,
}

impl BehaviorAnalyzer {
    pub fn new(config: BehaviorConfig) -> Self {
        Self {
            config,
            windows: Default::default(),
            risk_history: VecDeque::with_capacity(RISK_HISTORY_CAP),
            current_risk: 0,
        }
    }

    /// Record this tick's flags and recompute the assessment.
    pub fn analyze(&mut self, flags: &BehaviorFlags, now: f64) -> BehaviorAssessment {
        let horizon = self.config.long_window_secs;
        if flags.looking_away {
            self.windows[BehaviorCategory::LookingAway.index()].record(now, horizon);
        }
        if flags.rapid_movement {
            self.windows[BehaviorCategory::RapidMovement.index()].record(now, horizon);
        }
        if flags.hand_near_face {
            self.windows[BehaviorCategory::HandToFace.index()].record(now, horizon);
        }
        if flags.posture_change {
            self.windows[BehaviorCategory::PostureChange.index()].record(now, horizon);
        }
        if flags.object_detected {
            self.windows[BehaviorCategory::ObjectDetection.index()].record(now, horizon);
        }

        let risk_score = self.risk_score(now);
        self.current_risk = risk_score;
        if self.risk_history.len() >= RISK_HISTORY_CAP {
            self.risk_history.pop_front();
        }
        self.risk_history.push_back(RiskSample {
            timestamp: now,
            score: risk_score,
        });

        BehaviorAssessment {
            risk_score,
            risk_level: self.config.risk_level(risk_score),
            patterns: self.identify_patterns(now),
        }
    }

    /// Weighted, capped sum over the category windows. Always derivable
    /// from current window contents alone.
    pub fn risk_score(&self, now: f64) -> u32 {
        let mut score = 0u32;
        for category in CATEGORIES {
            let (window, weight, cap) = self.config.rule(category);
            let count = self.windows[category.index()].count_within(now, window);
            score += (count * weight).min(cap);
        }
        score.min(100)
    }

    fn identify_patterns(&self, now: f64) -> Vec<PatternKind> {
        let short = self.config.short_window_secs;
        let mut patterns = Vec::new();

        if self.count(BehaviorCategory::LookingAway, now, short) > 5 {
            patterns.push(PatternKind::FrequentLookingAway);
        }
        if self.count(BehaviorCategory::RapidMovement, now, short) > 8 {
            patterns.push(PatternKind::NervousBehavior);
        }
        if self.count(BehaviorCategory::HandToFace, now, short) > 3 {
            patterns.push(PatternKind::PhoneUsageSuspected);
        }
        if self.count(BehaviorCategory::ObjectDetection, now, short) > 2 {
            patterns.push(PatternKind::MultipleForbiddenObjects);
        }

        patterns
    }

    fn count(&self, category: BehaviorCategory, now: f64, window_secs: f64) -> u32 {
        self.windows[category.index()].count_within(now, window_secs)
    }

    /// Compare the mean of the last ten recorded scores against the ten
    /// before them. Needs at least twenty samples to move off `Stable`.
    pub fn trend(&self) -> Trend {
        if self.risk_history.len() < 2 * TREND_SAMPLE_LEN {
            return Trend::Stable;
        }
        let scores: Vec<f64> = self
            .risk_history
            .iter()
            .rev()
            .take(2 * TREND_SAMPLE_LEN)
            .map(|s| s.score as f64)
            .collect();
        // `scores` is newest-first: the first ten are the recent sample.
        let recent: f64 = scores[..TREND_SAMPLE_LEN].iter().sum::<f64>() / TREND_SAMPLE_LEN as f64;
        let older: f64 = scores[TREND_SAMPLE_LEN..].iter().sum::<f64>() / TREND_SAMPLE_LEN as f64;

        if recent > older * 1.2 {
            Trend::Increasing
        } else if recent < older * 0.8 {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    /// Risk summary over the long window, used when escalating a
    /// high-risk alert. `None` until at least one score has been recorded
    /// inside the window.
    pub fn risk_summary(&self, now: f64) -> Option<RiskSummary> {
        let recent: Vec<u32> = self
            .risk_history
            .iter()
            .filter(|s| now - s.timestamp < self.config.long_window_secs)
            .map(|s| s.score)
            .collect();
        if recent.is_empty() {
            return None;
        }

        let average_risk = recent.iter().map(|&s| s as f64).sum::<f64>() / recent.len() as f64;
        let peak_risk = recent.iter().copied().max().unwrap_or(0);

        Some(RiskSummary {
            current_risk: self.current_risk,
            average_risk,
            peak_risk,
            risk_level: self.config.risk_level(average_risk.round() as u32),
            trend: self.trend(),
        })
    }

    pub fn reset(&mut self) {
        self.windows = Default::default();
        self.risk_history.clear();
        self.current_risk = 0;
    }
}

impl Default for BehaviorAnalyzer {
    fn default() -> Self {
        Self::new(BehaviorConfig::default())
    }
}
