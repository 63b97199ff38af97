use serde::{Deserialize, Serialize};

use alerting::RealTimeMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Start,
    Stop,
    AddStudent,
    RemoveStudent,
}

/// One dashboard command as it sits in the durable queue. Fields beyond
/// `action` are optional; each handler validates what it needs and the
/// timestamp is carried opaquely for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub action: CommandAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ControlCommand {
    pub fn start(student_id: &str, exam_id: &str) -> Self {
        Self {
            action: CommandAction::Start,
            student_id: Some(student_id.to_string()),
            student_name: None,
            exam_id: Some(exam_id.to_string()),
            exam_title: None,
            timestamp: None,
        }
    }

    pub fn stop() -> Self {
        Self {
            action: CommandAction::Stop,
            student_id: None,
            student_name: None,
            exam_id: None,
            exam_title: None,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardControl {
    pub is_running: bool,
    pub current_student: Option<String>,
    pub exam_start_time: Option<i64>,
    pub exam_duration: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminationStatus {
    pub countdown: Option<f64>,
    pub terminated: bool,
}

/// Outward-facing snapshot republished after every state-affecting event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub timestamp: i64,
    pub cheating_score: u32,
    pub real_time_metrics: RealTimeMetrics,
    pub session_duration: f64,
    pub incidents_count: usize,
    pub dashboard_control: DashboardControl,
    pub exam_termination: TerminationStatus,
}
