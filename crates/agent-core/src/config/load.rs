use anyhow::Result;

use super::types::EngineConfig;

impl EngineConfig {
    /// defaults -> optional TOML file -> environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_file_config()?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }
}
