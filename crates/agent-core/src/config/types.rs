use alerting::AlertConfig;
use detection::{BehaviorConfig, DebounceConfig, SoundBandConfig, SoundCounterConfig};

/// Immutable engine configuration, assembled once at startup from
/// defaults, the optional TOML file, and `EXAMGUARD_*` environment
/// overrides. Components receive the sub-structs at construction; nothing
/// reads the environment after load.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root for all engine data files.
    pub data_root: String,
    /// Durable dashboard command queue (JSON array file).
    pub command_queue_path: String,
    /// Engine status snapshot for polling consumers.
    pub status_path: String,
    /// Directory receiving final per-session reports.
    pub report_dir: String,
    /// Student roster registry.
    pub roster_path: String,

    /// Video-tick cadence for the processing loop.
    pub tick_interval_ms: u64,
    /// Bounded audio listen timeout; `stop` takes effect within one cycle.
    pub audio_listen_timeout_ms: u64,

    pub debounce: DebounceConfig,
    pub sound_bands: SoundBandConfig,
    pub sound_counts: SoundCounterConfig,
    pub behavior: BehaviorConfig,
    pub alerts: AlertConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.behavior
            .validate()
            .map_err(|msg| anyhow::anyhow!("behavior config: {msg}"))?;
        if self.alerts.cooldown_secs < 0.0 {
            anyhow::bail!("alert cooldown must be non-negative");
        }
        if self.tick_interval_ms == 0 || self.audio_listen_timeout_ms == 0 {
            anyhow::bail!("tick and audio listen intervals must be positive");
        }
        Ok(())
    }
}
