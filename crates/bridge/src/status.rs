use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use alerting::FinalReport;

use crate::types::EngineStatus;
use crate::write_json_atomic;

/// Writes the engine status snapshot for polling consumers. A failed
/// publish is logged and superseded by the next one; engine state is
/// never affected.
#[derive(Debug)]
pub struct StatusPublisher {
    path: PathBuf,
}

impl StatusPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn publish(&self, status: &EngineStatus) {
        if let Err(err) = write_json_atomic(&self.path, status) {
            warn!(
                path = %self.path.display(),
                error = %err,
                "status publish failed; next publish supersedes"
            );
        }
    }
}

/// Writes the final per-session report under a session-labelled file name.
#[derive(Debug)]
pub struct ReportSink {
    dir: PathBuf,
}

impl ReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, report: &FinalReport, session_label: &str) -> Result<PathBuf> {
        let sanitized: String = session_label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let path = self
            .dir
            .join(format!("exam_report_{sanitized}_{}.json", report.timestamp));
        write_json_atomic(&path, report)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DashboardControl, TerminationStatus};
    use alerting::RealTimeMetrics;

    fn temp_dir(tag: &str) -> PathBuf {
        let unique = format!(
            "examguard-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        );
        std::env::temp_dir().join(unique)
    }

    #[test]
    fn published_status_roundtrips() {
        let dir = temp_dir("status");
        let path = dir.join("status.json");
        let publisher = StatusPublisher::new(&path);

        let status = EngineStatus {
            timestamp: 1_700_000_123,
            cheating_score: 45,
            real_time_metrics: RealTimeMetrics {
                object_violations: 1,
                ..RealTimeMetrics::default()
            },
            session_duration: 62.5,
            incidents_count: 1,
            dashboard_control: DashboardControl {
                is_running: true,
                current_student: Some("S1".to_string()),
                exam_start_time: Some(1_700_000_061),
                exam_duration: 62.5,
            },
            exam_termination: TerminationStatus {
                countdown: None,
                terminated: false,
            },
        };
        publisher.publish(&status);

        let raw = std::fs::read_to_string(&path).expect("read status");
        let parsed: EngineStatus = serde_json::from_str(&raw).expect("parse status");
        assert_eq!(parsed, status);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn report_sink_labels_files_per_session() {
        let dir = temp_dir("report");
        let sink = ReportSink::new(&dir);
        let report = FinalReport {
            timestamp: 1_700_000_500,
            final_score: 100,
            total_violations: 4,
            incidents: Vec::new(),
            exam_duration: 420.0,
            metrics: RealTimeMetrics::default(),
        };

        let path = sink.write(&report, "S1/exam 9").expect("write report");
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name")
            .starts_with("exam_report_S1_exam_9_"));
        let raw = std::fs::read_to_string(&path).expect("read report");
        let parsed: FinalReport = serde_json::from_str(&raw).expect("parse report");
        assert_eq!(parsed.final_score, 100);
        let _ = std::fs::remove_dir_all(dir);
    }
}
