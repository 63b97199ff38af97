//! Per-tick runtime.
//!
//! One synchronous processing loop owns the debouncer, the behavior
//! analyzer, and the control bridge; the audio listener runs beside it and
//! funnels into the same shared alert state. Commands are read, applied,
//! then acknowledged, so each one lands at most once; the status snapshot
//! is republished at the end of every tick.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use alerting::{AlertKind, AlertManager};
use bridge::{
    CommandAction, CommandQueue, ControlCommand, DashboardControl, EngineStatus, ReportSink,
    StatusPublisher, TerminationStatus,
};
use detection::{
    BehaviorAnalyzer, BehaviorFlags, DebouncedSignal, RawSignal, RiskLevel, SignalDebouncer,
};

use crate::alert_state::SharedAlertState;
use crate::audio::{spawn_audio_listener, AudioFeatures, AudioListener, AudioWorkerConfig};
use crate::config::EngineConfig;
use crate::roster::Roster;
use crate::sensors::SensorFrame;

const SENSOR_CHANNEL_CAPACITY: usize = 64;
const AUDIO_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct SessionContext {
    student_id: String,
    exam_id: Option<String>,
    started_at: f64,
    started_at_unix: i64,
}

pub struct MonitorRuntime {
    config: EngineConfig,
    debouncer: SignalDebouncer,
    analyzer: BehaviorAnalyzer,
    alert_state: SharedAlertState,
    commands: CommandQueue,
    publisher: StatusPublisher,
    reports: ReportSink,
    roster: Roster,
    frames_tx: mpsc::Sender<SensorFrame>,
    frames_rx: mpsc::Receiver<SensorFrame>,
    audio: Option<AudioListener>,
    audio_tx: Option<mpsc::Sender<AudioFeatures>>,
    session: Option<SessionContext>,
    is_running: bool,
    report_written: bool,
    tick_count: u64,
}

impl MonitorRuntime {
    pub fn new(config: EngineConfig) -> Self {
        let commands = CommandQueue::file(&config.command_queue_path);
        Self::with_command_queue(config, commands)
    }

    pub fn with_command_queue(config: EngineConfig, commands: CommandQueue) -> Self {
        let (frames_tx, frames_rx) = mpsc::channel(SENSOR_CHANNEL_CAPACITY);
        Self {
            debouncer: SignalDebouncer::new(config.debounce),
            analyzer: BehaviorAnalyzer::new(config.behavior),
            alert_state: SharedAlertState::new(AlertManager::new(config.alerts)),
            publisher: StatusPublisher::new(&config.status_path),
            reports: ReportSink::new(&config.report_dir),
            roster: Roster::load(&config.roster_path),
            commands,
            frames_tx,
            frames_rx,
            audio: None,
            audio_tx: None,
            session: None,
            is_running: false,
            report_written: false,
            tick_count: 0,
            config,
        }
    }

    /// Handle for detection collaborators pushing per-tick frames.
    pub fn sensor_input(&self) -> mpsc::Sender<SensorFrame> {
        self.frames_tx.clone()
    }

    /// Handle for the audio capture collaborator; present while running.
    pub fn audio_input(&self) -> Option<mpsc::Sender<AudioFeatures>> {
        self.audio_tx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn alert_state(&self) -> SharedAlertState {
        self.alert_state.clone()
    }

    /// One processing tick: commands, at most one sensor frame, the
    /// termination countdown, then a status publish.
    pub async fn tick(&mut self, now: f64, now_unix: i64) -> Result<()> {
        self.tick_count = self.tick_count.saturating_add(1);
        self.process_commands(now, now_unix).await?;

        let frame = self.frames_rx.try_recv().ok();
        if let Some(frame) = frame {
            if self.is_running && !self.alert_state.is_terminated()? {
                self.process_frame(&frame, now)?;
            }
        }

        if self.alert_state.tick_termination(now)? {
            self.handle_termination(now, now_unix).await?;
        }

        self.publish_status(now, now_unix)?;
        Ok(())
    }

    /// Read-apply-acknowledge over the durable queue. Entries appended
    /// while a batch is in flight survive the acknowledge.
    async fn process_commands(&mut self, now: f64, now_unix: i64) -> Result<()> {
        let batch = self.commands.poll()?;
        if batch.is_empty() {
            return Ok(());
        }

        let mut applied = 0usize;
        for command in &batch {
            if let Err(err) = self.apply_command(command, now, now_unix).await {
                warn!(action = ?command.action, error = %err, "command failed; skipped");
            }
            applied += 1;
        }
        self.commands.acknowledge(applied)?;
        Ok(())
    }

    async fn apply_command(
        &mut self,
        command: &ControlCommand,
        now: f64,
        now_unix: i64,
    ) -> Result<()> {
        match command.action {
            CommandAction::Start => self.apply_start(command, now, now_unix).await,
            CommandAction::Stop => self.apply_stop(now, now_unix).await,
            CommandAction::AddStudent => {
                let Some(student_id) = command.student_id.as_deref() else {
                    warn!("add_student command without student_id ignored");
                    return Ok(());
                };
                let name = command.student_name.as_deref().unwrap_or(student_id);
                self.roster.add_student(student_id, name)?;
                Ok(())
            }
            CommandAction::RemoveStudent => {
                let Some(student_id) = command.student_id.as_deref() else {
                    warn!("remove_student command without student_id ignored");
                    return Ok(());
                };
                self.roster.remove_student(student_id)?;
                Ok(())
            }
        }
    }

    async fn apply_start(
        &mut self,
        command: &ControlCommand,
        now: f64,
        now_unix: i64,
    ) -> Result<()> {
        let Some(student_id) = command.student_id.as_deref() else {
            warn!("start command without student_id ignored");
            return Ok(());
        };

        if self.is_running {
            if self
                .session
                .as_ref()
                .is_some_and(|s| s.student_id == student_id)
            {
                info!(student_id, "start ignored: session already running");
                return Ok(());
            }
            // Switching students: close out the current session first.
            self.apply_stop(now, now_unix).await?;
        }

        self.alert_state.reset_session()?;
        self.analyzer.reset();
        self.debouncer = SignalDebouncer::new(self.config.debounce);
        self.report_written = false;

        let (audio_tx, audio_rx) = mpsc::channel(AUDIO_CHANNEL_CAPACITY);
        self.audio = Some(spawn_audio_listener(
            audio_rx,
            self.alert_state.clone(),
            AudioWorkerConfig {
                listen_timeout: Duration::from_millis(self.config.audio_listen_timeout_ms),
                bands: self.config.sound_bands,
                counts: self.config.sound_counts,
                debounce: self.config.debounce,
            },
        ));
        self.audio_tx = Some(audio_tx);

        self.session = Some(SessionContext {
            student_id: student_id.to_string(),
            exam_id: command.exam_id.clone(),
            started_at: now,
            started_at_unix: now_unix,
        });
        self.is_running = true;

        info!(
            student_id,
            exam_id = command.exam_id.as_deref().unwrap_or("-"),
            "monitoring session started"
        );
        Ok(())
    }

    async fn apply_stop(&mut self, now: f64, now_unix: i64) -> Result<()> {
        if !self.is_running {
            return Ok(());
        }
        self.is_running = false;
        self.stop_audio().await;
        self.write_final_report(now, now_unix);
        // Session state stays visible until the next start resets it.
        info!("monitoring session stopped");
        Ok(())
    }

    async fn handle_termination(&mut self, now: f64, now_unix: i64) -> Result<()> {
        self.is_running = false;
        self.stop_audio().await;
        self.write_final_report(now, now_unix);
        Ok(())
    }

    async fn stop_audio(&mut self) {
        self.audio_tx = None;
        if let Some(listener) = self.audio.take() {
            listener.stop().await;
        }
    }

    fn write_final_report(&mut self, now: f64, now_unix: i64) {
        if self.report_written {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let exam_duration = (now - session.started_at).max(0.0);
        let label = match session.exam_id.as_deref() {
            Some(exam_id) => format!("{}_{}", session.student_id, exam_id),
            None => session.student_id.clone(),
        };
        match self.alert_state.final_report(exam_duration, now_unix) {
            Ok(report) => match self.reports.write(&report, &label) {
                Ok(path) => {
                    self.report_written = true;
                    info!(path = %path.display(), final_score = report.final_score, "final report written");
                }
                Err(err) => warn!(error = %err, "final report write failed"),
            },
            Err(err) => warn!(error = %err, "final report assembly failed"),
        }
    }

    /// Convert one sensor frame into debounced alerts and a behavior
    /// assessment. A collaborator that produced no reading contributes no
    /// signal this tick.
    fn process_frame(&mut self, frame: &SensorFrame, now: f64) -> Result<()> {
        let mut flags = BehaviorFlags::default();

        if let Some(face_present) = frame.face_present {
            if let Some(DebouncedSignal::FaceAway) = self
                .debouncer
                .observe(RawSignal::FaceAway(!face_present), now)
            {
                self.alert_state
                    .add_alert("Student looking away", AlertKind::FaceAway, now)?;
                flags.looking_away = true;
            }
        }

        if let Some(person_present) = frame.person_present {
            if let Some(DebouncedSignal::PersonAbsent) = self
                .debouncer
                .observe(RawSignal::PersonAbsent(!person_present), now)
            {
                self.alert_state
                    .add_alert("Student not present", AlertKind::PersonAbsent, now)?;
            }
        }

        if frame.multiple_people {
            self.alert_state.add_alert(
                "Multiple people detected",
                AlertKind::MultiplePeople,
                now,
            )?;
        }

        if let Some(DebouncedSignal::FaceMovement(direction)) = self
            .debouncer
            .observe(RawSignal::FaceMovement(frame.face_direction), now)
        {
            self.alert_state.add_alert(
                format!(
                    "Face looking {} for {}s",
                    direction.as_str(),
                    self.config.debounce.face_movement_secs
                ),
                AlertKind::FaceMovement,
                now,
            )?;
            flags.rapid_movement = true;
        }

        if frame.hand_near_face {
            self.alert_state.add_alert(
                "Suspicious hand movement detected (possible phone usage)",
                AlertKind::SuspiciousBehavior,
                now,
            )?;
            flags.hand_near_face = true;
        }

        if frame.typing_pattern {
            self.alert_state.add_alert(
                "Typing pattern detected (possible device usage)",
                AlertKind::SuspiciousBehavior,
                now,
            )?;
        }

        if frame.posture_suspicious {
            self.alert_state.add_alert(
                "Suspicious posture detected",
                AlertKind::SuspiciousBehavior,
                now,
            )?;
            flags.posture_change = true;
        }

        if !frame.objects.is_empty() {
            self.alert_state.add_object_alert(&frame.objects, now)?;
            flags.object_detected = true;
        }

        let assessment = self.analyzer.analyze(&flags, now);
        if assessment.risk_level == RiskLevel::High {
            if let Some(summary) = self.analyzer.risk_summary(now) {
                self.alert_state.add_alert(
                    format!(
                        "High risk behavior detected (risk score {})",
                        summary.current_risk
                    ),
                    AlertKind::HighRiskBehavior,
                    now,
                )?;
            }
        }

        Ok(())
    }

    fn publish_status(&self, now: f64, now_unix: i64) -> Result<()> {
        let snapshot = self.alert_state.snapshot()?;
        let session_duration = self
            .session
            .as_ref()
            .map(|s| (now - s.started_at).max(0.0))
            .unwrap_or(0.0);

        self.publisher.publish(&EngineStatus {
            timestamp: now_unix,
            cheating_score: snapshot.cheating_score,
            real_time_metrics: snapshot.metrics,
            session_duration,
            incidents_count: snapshot.incidents_count,
            dashboard_control: DashboardControl {
                is_running: self.is_running,
                current_student: self.session.as_ref().map(|s| s.student_id.clone()),
                exam_start_time: self.session.as_ref().map(|s| s.started_at_unix),
                exam_duration: session_duration,
            },
            exam_termination: TerminationStatus {
                countdown: snapshot.countdown_remaining,
                terminated: snapshot.terminated,
            },
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests;
