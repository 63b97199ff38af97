//! Cross-process control bridge.
//!
//! Commands flow in from the dashboard through a durable JSON FIFO with
//! acknowledged consumption; engine state flows out as an atomically
//! replaced JSON snapshot any polling consumer can read. Both sides
//! tolerate a missing or corrupt file by treating it as empty rather than
//! failing the engine.

mod command;
mod status;
mod types;

pub use command::{CommandQueue, FileQueue, MemoryQueue};
pub use status::{ReportSink, StatusPublisher};
pub use types::{CommandAction, ControlCommand, DashboardControl, EngineStatus, TerminationStatus};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Replace `path` with the serialized value via a temp-file rename, so a
/// reader polling the file never observes a half-written snapshot.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let payload = serde_json::to_vec_pretty(value).context("serializing json payload")?;
    let tmp = path.with_extension("json.tmp");
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating parent dir {}", parent.display()))?;
        }
    }
    fs::write(&tmp, payload).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replacing {} atomically", path.display()))?;
    Ok(())
}
