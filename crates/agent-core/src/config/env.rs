use super::types::EngineConfig;
use super::util::{env_f64, env_non_empty, env_u32, env_u64};

impl EngineConfig {
    pub(super) fn apply_env_overrides(&mut self) {
        self.apply_env_paths();
        self.apply_env_timing();
        self.apply_env_thresholds();
        self.apply_env_penalties();
        self.apply_env_risk();
        self.apply_env_sound();
    }

    fn apply_env_paths(&mut self) {
        if let Some(v) = env_non_empty("EXAMGUARD_DATA_ROOT") {
            self.data_root = v;
        }
        if let Some(v) = env_non_empty("EXAMGUARD_COMMAND_QUEUE_PATH") {
            self.command_queue_path = v;
        }
        if let Some(v) = env_non_empty("EXAMGUARD_STATUS_PATH") {
            self.status_path = v;
        }
        if let Some(v) = env_non_empty("EXAMGUARD_REPORT_DIR") {
            self.report_dir = v;
        }
        if let Some(v) = env_non_empty("EXAMGUARD_ROSTER_PATH") {
            self.roster_path = v;
        }
    }

    fn apply_env_timing(&mut self) {
        if let Some(v) = env_u64("EXAMGUARD_TICK_INTERVAL_MS") {
            self.tick_interval_ms = v;
        }
        if let Some(v) = env_u64("EXAMGUARD_AUDIO_LISTEN_TIMEOUT_MS") {
            self.audio_listen_timeout_ms = v;
        }
    }

    fn apply_env_thresholds(&mut self) {
        if let Some(v) = env_f64("EXAMGUARD_FACE_AWAY_THRESHOLD") {
            self.debounce.face_away_secs = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_PERSON_ABSENT_THRESHOLD") {
            self.debounce.person_absent_secs = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_TALKING_THRESHOLD") {
            self.debounce.talking_secs = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_FACE_MOVEMENT_THRESHOLD") {
            self.debounce.face_movement_secs = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_ALERT_COOLDOWN_SECS") {
            self.alerts.cooldown_secs = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_TERMINATION_COUNTDOWN_SECS") {
            self.alerts.termination.countdown_secs = v;
        }
    }

    fn apply_env_penalties(&mut self) {
        if let Some(v) = env_u32("EXAMGUARD_MULTIPLE_PEOPLE_PENALTY") {
            self.alerts.penalties.multiple_people = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_FACE_AWAY_PENALTY") {
            self.alerts.penalties.face_away = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_FORBIDDEN_OBJECT_PENALTY") {
            self.alerts.penalties.forbidden_object = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_PERSON_ABSENT_PENALTY") {
            self.alerts.penalties.person_absent = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_TALKING_PENALTY") {
            self.alerts.penalties.talking = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_FACE_MOVEMENT_PENALTY") {
            self.alerts.penalties.face_movement = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_SUSPICIOUS_SOUNDS_PENALTY") {
            self.alerts.penalties.suspicious_sounds = v;
        }
    }

    fn apply_env_risk(&mut self) {
        if let Some(v) = env_u32("EXAMGUARD_HIGH_RISK_THRESHOLD") {
            self.behavior.high_risk_threshold = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_MEDIUM_RISK_THRESHOLD") {
            self.behavior.medium_risk_threshold = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_LOW_RISK_THRESHOLD") {
            self.behavior.low_risk_threshold = v;
        }
    }

    fn apply_env_sound(&mut self) {
        if let Some(v) = env_f64("EXAMGUARD_SOUND_HIGH_AMPLITUDE") {
            self.sound_bands.high_amplitude = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_SOUND_MEDIUM_AMPLITUDE") {
            self.sound_bands.medium_amplitude = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_SOUND_HIGH_FREQUENCY") {
            self.sound_bands.high_frequency = v;
        }
        if let Some(v) = env_f64("EXAMGUARD_SOUND_LOW_FREQUENCY") {
            self.sound_bands.low_frequency = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_WHISPERING_COUNT") {
            self.sound_counts.whispering = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_TALKING_COUNT") {
            self.sound_counts.talking = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_KEYBOARD_COUNT") {
            self.sound_counts.keyboard_typing = v;
        }
        if let Some(v) = env_u32("EXAMGUARD_PAPER_COUNT") {
            self.sound_counts.paper_rustling = v;
        }
    }
}
