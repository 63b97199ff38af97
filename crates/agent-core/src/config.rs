mod defaults;
mod env;
mod file;
mod load;
mod paths;
mod types;
mod util;

pub use types::EngineConfig;

#[cfg(test)]
pub(crate) use paths::resolve_config_path;
#[cfg(test)]
pub(crate) use util::{env_f64, env_u32, parse_f64};
