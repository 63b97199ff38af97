use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use super::paths::resolve_config_path;
use super::types::EngineConfig;

/// TOML shape: every field optional; present values override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_root: Option<String>,
    command_queue_path: Option<String>,
    status_path: Option<String>,
    report_dir: Option<String>,
    roster_path: Option<String>,
    tick_interval_ms: Option<u64>,
    audio_listen_timeout_ms: Option<u64>,

    #[serde(default)]
    thresholds: ThresholdSection,
    #[serde(default)]
    penalties: PenaltySection,
    #[serde(default)]
    risk: RiskSection,
    #[serde(default)]
    sound: SoundSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdSection {
    face_away_secs: Option<f64>,
    person_absent_secs: Option<f64>,
    talking_secs: Option<f64>,
    face_movement_secs: Option<f64>,
    alert_cooldown_secs: Option<f64>,
    termination_countdown_secs: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PenaltySection {
    multiple_people: Option<u32>,
    face_away: Option<u32>,
    forbidden_object: Option<u32>,
    person_absent: Option<u32>,
    talking: Option<u32>,
    face_movement: Option<u32>,
    suspicious_sounds: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RiskSection {
    high_threshold: Option<u32>,
    medium_threshold: Option<u32>,
    low_threshold: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SoundSection {
    high_amplitude: Option<f64>,
    medium_amplitude: Option<f64>,
    high_frequency: Option<f64>,
    low_frequency: Option<f64>,
    whispering_count: Option<u32>,
    talking_count: Option<u32>,
    keyboard_typing_count: Option<u32>,
    paper_rustling_count: Option<u32>,
}

impl EngineConfig {
    pub(super) fn apply_file_config(&mut self) -> Result<()> {
        let path = resolve_config_path(&self.data_root);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "config file unreadable; using defaults");
                return Ok(());
            }
        };

        let file: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        self.apply_parsed(file);
        Ok(())
    }

    fn apply_parsed(&mut self, file: FileConfig) {
        if let Some(v) = file.data_root {
            self.data_root = v;
        }
        if let Some(v) = file.command_queue_path {
            self.command_queue_path = v;
        }
        if let Some(v) = file.status_path {
            self.status_path = v;
        }
        if let Some(v) = file.report_dir {
            self.report_dir = v;
        }
        if let Some(v) = file.roster_path {
            self.roster_path = v;
        }
        if let Some(v) = file.tick_interval_ms {
            self.tick_interval_ms = v;
        }
        if let Some(v) = file.audio_listen_timeout_ms {
            self.audio_listen_timeout_ms = v;
        }

        let t = file.thresholds;
        if let Some(v) = t.face_away_secs {
            self.debounce.face_away_secs = v;
        }
        if let Some(v) = t.person_absent_secs {
            self.debounce.person_absent_secs = v;
        }
        if let Some(v) = t.talking_secs {
            self.debounce.talking_secs = v;
        }
        if let Some(v) = t.face_movement_secs {
            self.debounce.face_movement_secs = v;
        }
        if let Some(v) = t.alert_cooldown_secs {
            self.alerts.cooldown_secs = v;
        }
        if let Some(v) = t.termination_countdown_secs {
            self.alerts.termination.countdown_secs = v;
        }

        let p = file.penalties;
        if let Some(v) = p.multiple_people {
            self.alerts.penalties.multiple_people = v;
        }
        if let Some(v) = p.face_away {
            self.alerts.penalties.face_away = v;
        }
        if let Some(v) = p.forbidden_object {
            self.alerts.penalties.forbidden_object = v;
        }
        if let Some(v) = p.person_absent {
            self.alerts.penalties.person_absent = v;
        }
        if let Some(v) = p.talking {
            self.alerts.penalties.talking = v;
        }
        if let Some(v) = p.face_movement {
            self.alerts.penalties.face_movement = v;
        }
        if let Some(v) = p.suspicious_sounds {
            self.alerts.penalties.suspicious_sounds = v;
        }

        let r = file.risk;
        if let Some(v) = r.high_threshold {
            self.behavior.high_risk_threshold = v;
        }
        if let Some(v) = r.medium_threshold {
            self.behavior.medium_risk_threshold = v;
        }
        if let Some(v) = r.low_threshold {
            self.behavior.low_risk_threshold = v;
        }

        let s = file.sound;
        if let Some(v) = s.high_amplitude {
            self.sound_bands.high_amplitude = v;
        }
        if let Some(v) = s.medium_amplitude {
            self.sound_bands.medium_amplitude = v;
        }
        if let Some(v) = s.high_frequency {
            self.sound_bands.high_frequency = v;
        }
        if let Some(v) = s.low_frequency {
            self.sound_bands.low_frequency = v;
        }
        if let Some(v) = s.whispering_count {
            self.sound_counts.whispering = v;
        }
        if let Some(v) = s.talking_count {
            self.sound_counts.talking = v;
        }
        if let Some(v) = s.keyboard_typing_count {
            self.sound_counts.keyboard_typing = v;
        }
        if let Some(v) = s.paper_rustling_count {
            self.sound_counts.paper_rustling = v;
        }
    }
}
