//! Shared alert state.
//!
//! The alert manager is the one structure touched from both the video
//! tick and the audio listener, so every mutation funnels through this
//! wrapper and its single mutex. Callers never hold the lock across an
//! await point; each method locks, mutates, and releases.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use alerting::{AlertKind, AlertManager, FinalReport, RealTimeMetrics, TerminationState};
use detection::DetectedObject;

/// Read-only view of the manager used when assembling a status snapshot.
#[derive(Debug, Clone)]
pub struct AlertSnapshot {
    pub cheating_score: u32,
    pub metrics: RealTimeMetrics,
    pub incidents_count: usize,
    pub countdown_remaining: Option<f64>,
    pub terminated: bool,
}

#[derive(Clone)]
pub struct SharedAlertState {
    inner: Arc<Mutex<AlertManager>>,
}

impl SharedAlertState {
    pub fn new(manager: AlertManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, AlertManager>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("alert state lock poisoned"))
    }

    pub fn add_alert(&self, message: impl Into<String>, kind: AlertKind, now: f64) -> Result<bool> {
        Ok(self.lock()?.add_alert(message, kind, now))
    }

    pub fn add_object_alert(&self, detections: &[DetectedObject], now: f64) -> Result<usize> {
        Ok(self.lock()?.add_object_alert(detections, now))
    }

    /// Returns true on the tick that transitions into `Terminated`.
    pub fn tick_termination(&self, now: f64) -> Result<bool> {
        Ok(self.lock()?.tick_termination(now))
    }

    pub fn termination_state(&self) -> Result<TerminationState> {
        Ok(self.lock()?.termination_state())
    }

    pub fn is_terminated(&self) -> Result<bool> {
        Ok(self.lock()?.is_terminated())
    }

    pub fn snapshot(&self) -> Result<AlertSnapshot> {
        let guard = self.lock()?;
        Ok(AlertSnapshot {
            cheating_score: guard.cheating_score(),
            metrics: guard.metrics(),
            incidents_count: guard.incidents().len(),
            countdown_remaining: guard.countdown_remaining(),
            terminated: guard.is_terminated(),
        })
    }

    pub fn reset_session(&self) -> Result<()> {
        self.lock()?.reset_session();
        Ok(())
    }

    pub fn final_report(&self, exam_duration: f64, now_unix: i64) -> Result<FinalReport> {
        Ok(self.lock()?.final_report(exam_duration, now_unix))
    }
}
