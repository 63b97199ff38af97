//! Per-tick sensor payloads.
//!
//! Detection collaborators (vision, pose, hands) are out of scope; they
//! hand the engine one `SensorFrame` per processing tick. A collaborator
//! that failed leaves its field at `None`/false, and that category simply
//! contributes no signal for the tick.

use detection::{DetectedObject, Direction};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorFrame {
    /// `None` when the face detector produced no reading this tick.
    pub face_present: Option<bool>,
    /// `None` when the pose detector produced no reading this tick.
    pub person_present: Option<bool>,
    pub multiple_people: bool,
    /// Dominant face movement direction, when one was measured.
    pub face_direction: Option<Direction>,
    pub hand_near_face: bool,
    pub typing_pattern: bool,
    pub posture_suspicious: bool,
    pub objects: Vec<DetectedObject>,
}

impl SensorFrame {
    /// A frame with both presence detectors reporting a quiet scene.
    pub fn nominal() -> Self {
        Self {
            face_present: Some(true),
            person_present: Some(true),
            ..Self::default()
        }
    }
}
