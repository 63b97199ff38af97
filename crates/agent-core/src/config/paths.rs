use std::path::PathBuf;

use super::util::env_non_empty;

pub(super) const CONFIG_FILE_NAME: &str = "examguard.toml";

/// Resolve the TOML config path: explicit override first, then the file
/// under the data root.
pub(crate) fn resolve_config_path(data_root: &str) -> PathBuf {
    if let Some(explicit) = env_non_empty("EXAMGUARD_CONFIG_PATH") {
        return PathBuf::from(explicit);
    }
    PathBuf::from(data_root).join(CONFIG_FILE_NAME)
}
