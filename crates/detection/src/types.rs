use serde::{Deserialize, Serialize};

/// Direction a held face movement resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectSeverity {
    Medium,
    High,
}

impl ObjectSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A forbidden object reported by the vision collaborator for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    pub confidence: f32,
    pub severity: ObjectSeverity,
    /// Bounding box as (x1, y1, x2, y2) in frame pixels.
    pub position: (i32, i32, i32, i32),
}

/// Boolean per-tick outcomes fed into the behavior analyzer.
///
/// A detector that failed this tick simply leaves its flag false; degraded
/// categories stop contributing to the risk score without any other effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BehaviorFlags {
    pub looking_away: bool,
    pub rapid_movement: bool,
    pub hand_near_face: bool,
    pub posture_change: bool,
    pub object_detected: bool,
}
