//! Alert policy authority for the exam monitoring engine.
//!
//! Owns the user-visible cumulative cheating score, the cooldown and
//! dedup gates in front of it, the coarse real-time metrics, the incident
//! log, and the exam termination state machine. Every mutation funnels
//! through [`AlertManager::add_alert`], which keeps the ordering contract:
//! score update happens before the termination check within one call.

pub mod termination;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use detection::{DetectedObject, ObjectSeverity};

pub use termination::{ExamTermination, TerminationConfig, TerminationState};

pub const MAX_CUMULATIVE_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    FaceAway,
    PersonAbsent,
    MultiplePeople,
    ForbiddenObject,
    Talking,
    FaceMovement,
    SuspiciousSounds,
    SuspiciousBehavior,
    HighRiskBehavior,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FaceAway => "face_away",
            Self::PersonAbsent => "person_absent",
            Self::MultiplePeople => "multiple_people",
            Self::ForbiddenObject => "forbidden_object",
            Self::Talking => "talking",
            Self::FaceMovement => "face_movement",
            Self::SuspiciousSounds => "suspicious_sounds",
            Self::SuspiciousBehavior => "suspicious_behavior",
            Self::HighRiskBehavior => "high_risk_behavior",
        }
    }
}

/// Score penalties per alert kind. A kind without a penalty still emits
/// alerts and counts in the metrics; it just cannot move the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTable {
    pub multiple_people: u32,
    pub face_away: u32,
    pub forbidden_object: u32,
    pub person_absent: u32,
    pub talking: u32,
    pub face_movement: u32,
    pub suspicious_sounds: u32,
}

impl Default for PenaltyTable {
    fn default() -> Self {
        Self {
            multiple_people: 20,
            face_away: 10,
            forbidden_object: 25,
            person_absent: 15,
            talking: 20,
            face_movement: 15,
            suspicious_sounds: 15,
        }
    }
}

impl PenaltyTable {
    pub fn penalty(&self, kind: AlertKind) -> Option<u32> {
        match kind {
            AlertKind::MultiplePeople => Some(self.multiple_people),
            AlertKind::FaceAway => Some(self.face_away),
            AlertKind::ForbiddenObject => Some(self.forbidden_object),
            AlertKind::PersonAbsent => Some(self.person_absent),
            AlertKind::Talking => Some(self.talking),
            AlertKind::FaceMovement => Some(self.face_movement),
            AlertKind::SuspiciousSounds => Some(self.suspicious_sounds),
            AlertKind::SuspiciousBehavior | AlertKind::HighRiskBehavior => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    /// Minimum gap between any two emitted alerts, across all kinds.
    pub cooldown_secs: f64,
    /// Display ring capacity (most recent alerts shown to viewers).
    pub display_cap: usize,
    /// Dedup ring capacity (formatted messages checked for repeats).
    pub history_cap: usize,
    pub penalties: PenaltyTable,
    pub termination: TerminationConfig,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 5.0,
            display_cap: 5,
            history_cap: 10,
            penalties: PenaltyTable::default(),
            termination: TerminationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: f64,
    pub message: String,
    pub kind: AlertKind,
}

/// Durable record of one object detection, appended for the session even
/// when the matching alert was suppressed by cooldown or dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub timestamp: f64,
    pub object: String,
    pub confidence: f32,
    pub severity: ObjectSeverity,
    pub position: (i32, i32, i32, i32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealTimeMetrics {
    pub face_movements: u64,
    pub audio_violations: u64,
    pub object_violations: u64,
    pub communication_attempts: u64,
    pub suspicious_behavior: u64,
}

impl RealTimeMetrics {
    pub fn total_violations(&self) -> u64 {
        self.face_movements
            + self.audio_violations
            + self.object_violations
            + self.communication_attempts
            + self.suspicious_behavior
    }
}

/// Final per-session snapshot emitted on termination or clean stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub timestamp: i64,
    pub final_score: u32,
    pub total_violations: u64,
    pub incidents: Vec<Incident>,
    pub exam_duration: f64,
    pub metrics: RealTimeMetrics,
}

#[derive(Debug)]
pub struct AlertManager {
    config: AlertConfig,
    score: u32,
    alerts: VecDeque<Alert>,
    message_history: VecDeque<String>,
    last_alert_time: Option<f64>,
    metrics: RealTimeMetrics,
    incidents: Vec<Incident>,
    termination: ExamTermination,
}

impl AlertManager {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            termination: ExamTermination::new(config.termination),
            config,
            score: 0,
            alerts: VecDeque::new(),
            message_history: VecDeque::new(),
            last_alert_time: None,
            metrics: RealTimeMetrics::default(),
            incidents: Vec::new(),
        }
    }

    /// Gate, record, score, and arm termination for one alert.
    ///
    /// Returns true only when the alert was actually emitted. Suppressed
    /// calls (cooldown, repeated message, terminated session) leave every
    /// piece of state untouched.
    pub fn add_alert(&mut self, message: impl Into<String>, kind: AlertKind, now: f64) -> bool {
        if self.termination.is_terminated() {
            return false;
        }

        if let Some(last) = self.last_alert_time {
            if now - last < self.config.cooldown_secs {
                return false;
            }
        }

        let message = message.into();
        // Dedup on the timestamp-qualified formatted message: the same
        // text re-raised in the same second (e.g. identical detections in
        // one fan-out batch) is suppressed even with a zero cooldown.
        let formatted = format!("[{}s] {}", now.floor() as i64, message);
        if self.message_history.iter().any(|m| *m == formatted) {
            debug!(kind = kind.as_str(), "suppressed repeated alert message");
            return false;
        }

        self.alerts.push_back(Alert {
            timestamp: now,
            message: message.clone(),
            kind,
        });
        while self.alerts.len() > self.config.display_cap {
            self.alerts.pop_front();
        }
        self.message_history.push_back(formatted);
        while self.message_history.len() > self.config.history_cap {
            self.message_history.pop_front();
        }

        // Score before termination check; the countdown arms on the same
        // call that first reaches the ceiling.
        if let Some(penalty) = self.config.penalties.penalty(kind) {
            self.score = (self.score + penalty).min(MAX_CUMULATIVE_SCORE);
        }
        if self.score >= MAX_CUMULATIVE_SCORE {
            self.termination.trigger(now);
        }

        self.bump_metrics(kind);
        self.last_alert_time = Some(now);

        info!(
            kind = kind.as_str(),
            score = self.score,
            message = %message,
            "alert emitted"
        );
        true
    }

    /// Fan out one alert per detected object and record each detection in
    /// the incident log. The global cooldown still applies across the
    /// individual alerts; incidents are appended regardless.
    pub fn add_object_alert(&mut self, detections: &[DetectedObject], now: f64) -> usize {
        let mut emitted = 0;
        for object in detections {
            let message = format!(
                "Unauthorized object: {} (confidence {:.2})",
                object.name, object.confidence
            );
            if self.add_alert(message, AlertKind::ForbiddenObject, now) {
                emitted += 1;
            }
            self.incidents.push(Incident {
                timestamp: now,
                object: object.name.clone(),
                confidence: object.confidence,
                severity: object.severity,
                position: object.position,
            });
        }
        emitted
    }

    fn bump_metrics(&mut self, kind: AlertKind) {
        match kind {
            AlertKind::FaceMovement => self.metrics.face_movements += 1,
            AlertKind::Talking | AlertKind::SuspiciousSounds => {
                self.metrics.audio_violations += 1;
            }
            AlertKind::ForbiddenObject => self.metrics.object_violations += 1,
            AlertKind::MultiplePeople => self.metrics.communication_attempts += 1,
            AlertKind::FaceAway
            | AlertKind::PersonAbsent
            | AlertKind::SuspiciousBehavior
            | AlertKind::HighRiskBehavior => self.metrics.suspicious_behavior += 1,
        }
    }

    /// Advance the termination countdown. Returns true on the single tick
    /// that crosses into `Terminated`, which is the runtime's cue to emit
    /// the final report.
    pub fn tick_termination(&mut self, now: f64) -> bool {
        self.termination.tick(now)
    }

    pub fn termination_state(&self) -> TerminationState {
        self.termination.state()
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_terminated()
    }

    pub fn countdown_remaining(&self) -> Option<f64> {
        self.termination.countdown_remaining()
    }

    pub fn cheating_score(&self) -> u32 {
        self.score
    }

    pub fn metrics(&self) -> RealTimeMetrics {
        self.metrics
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn recent_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    /// Discard all per-session state; the next session starts clean.
    pub fn reset_session(&mut self) {
        self.score = 0;
        self.alerts.clear();
        self.message_history.clear();
        self.last_alert_time = None;
        self.metrics = RealTimeMetrics::default();
        self.incidents.clear();
        self.termination.reset();
    }

    pub fn final_report(&self, exam_duration: f64, now_unix: i64) -> FinalReport {
        FinalReport {
            timestamp: now_unix,
            final_score: self.score,
            total_violations: self.metrics.total_violations(),
            incidents: self.incidents.clone(),
            exam_duration,
            metrics: self.metrics,
        }
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
