mod alert_state;
mod audio;
mod config;
mod lifecycle;
mod roster;
mod sensors;

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tokio::signal;
use tracing::info;

use config::EngineConfig;
use lifecycle::MonitorRuntime;

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = EngineConfig::load()?;
    let tick_interval = Duration::from_millis(config.tick_interval_ms);

    info!(
        command_queue = %config.command_queue_path,
        status_path = %config.status_path,
        tick_interval_ms = config.tick_interval_ms,
        "examguard-agent core started"
    );

    let mut runtime = MonitorRuntime::new(config);
    let session_clock = Instant::now();
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                let now = session_clock.elapsed().as_secs_f64();
                runtime.tick(now, now_unix()).await?;
            }
        }
    }

    info!("examguard-agent stopped");
    Ok(())
}
