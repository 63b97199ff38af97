use alerting::AlertConfig;
use detection::{BehaviorConfig, DebounceConfig, SoundBandConfig, SoundCounterConfig};

use super::types::EngineConfig;

#[cfg(target_os = "windows")]
fn default_data_root() -> &'static str {
    r"C:\ProgramData\ExamGuard"
}

#[cfg(target_os = "macos")]
fn default_data_root() -> &'static str {
    "/Library/Application Support/ExamGuard"
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_data_root() -> &'static str {
    "/var/lib/examguard-agent"
}

fn under_root(file: &str) -> String {
    format!("{}/{}", default_data_root(), file)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root().to_string(),
            command_queue_path: under_root("control/commands.json"),
            status_path: under_root("control/status.json"),
            report_dir: under_root("reports"),
            roster_path: under_root("roster.json"),
            tick_interval_ms: 33,
            audio_listen_timeout_ms: 1000,
            debounce: DebounceConfig::default(),
            sound_bands: SoundBandConfig::default(),
            sound_counts: SoundCounterConfig::default(),
            behavior: BehaviorConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}
