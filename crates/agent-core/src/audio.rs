//! Concurrent audio listener.
//!
//! Audio capture runs independently of the video tick: the capture
//! collaborator pushes one `AudioFeatures` per chunk into an mpsc channel
//! and this worker classifies them into sound-pattern and talking alerts
//! against the shared alert state. The receive is bounded by a listen
//! timeout so a `stop` request takes effect within one cycle, and the
//! shared lock is only taken after a chunk has been classified, never
//! while waiting for one.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use alerting::AlertKind;
use detection::{
    bands_from_features, DebounceConfig, DebouncedSignal, RawSignal, SignalDebouncer,
    SoundBandConfig, SoundCounterConfig, SoundCounters, SoundPattern,
};

use crate::alert_state::SharedAlertState;

/// One captured audio chunk, reduced by the capture collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFeatures {
    pub rms: f64,
    pub zero_crossings: f64,
    /// Whether the speech recognizer produced text for this chunk.
    pub speech_detected: bool,
    /// Session-clock timestamp of the chunk, in seconds.
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AudioWorkerConfig {
    pub listen_timeout: Duration,
    pub bands: SoundBandConfig,
    pub counts: SoundCounterConfig,
    pub debounce: DebounceConfig,
}

pub struct AudioListener {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AudioListener {
    /// Signal the worker and wait for it to drain. Bounded by the listen
    /// timeout: the worker re-checks the stop flag at least once per
    /// cycle.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.handle.await {
            warn!(error = %err, "audio listener join failed");
        }
    }
}

pub fn spawn_audio_listener(
    mut frames: mpsc::Receiver<AudioFeatures>,
    alert_state: SharedAlertState,
    config: AudioWorkerConfig,
) -> AudioListener {
    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut counters = SoundCounters::new(config.counts);
        // The talking hold timer is owned by this task alone; the video
        // tick keeps its own debouncer for the visual signals.
        let mut debouncer = SignalDebouncer::new(config.debounce);
        loop {
            if *stop_rx.borrow() {
                debug!("audio listener stopping");
                break;
            }
            match tokio::time::timeout(config.listen_timeout, frames.recv()).await {
                Ok(Some(features)) => {
                    if let Err(err) =
                        process_chunk(&alert_state, &mut counters, &mut debouncer, &config, features)
                    {
                        warn!(error = %err, "audio chunk processing failed");
                    }
                }
                Ok(None) => {
                    debug!("audio frame channel closed");
                    break;
                }
                // Listen timeout: loop back and re-check the stop flag.
                Err(_) => continue,
            }
        }
    });
    AudioListener { stop_tx, handle }
}

fn process_chunk(
    alert_state: &SharedAlertState,
    counters: &mut SoundCounters,
    debouncer: &mut SignalDebouncer,
    config: &AudioWorkerConfig,
    features: AudioFeatures,
) -> Result<()> {
    if let Some((amplitude, frequency)) =
        bands_from_features(features.rms, features.zero_crossings, &config.bands)
    {
        if let Some(pattern) = counters.observe(amplitude, frequency) {
            let (message, kind) = alert_for_pattern(pattern);
            alert_state.add_alert(message, kind, features.timestamp)?;
        }
    }

    if let Some(DebouncedSignal::Talking) = debouncer.observe(
        RawSignal::Talking(features.speech_detected),
        features.timestamp,
    ) {
        alert_state.add_alert(
            "Sustained talking detected",
            AlertKind::Talking,
            features.timestamp,
        )?;
    }

    Ok(())
}

fn alert_for_pattern(pattern: SoundPattern) -> (&'static str, AlertKind) {
    match pattern {
        SoundPattern::Talking => ("Suspicious talking detected", AlertKind::Talking),
        SoundPattern::Whispering => ("Whispering detected", AlertKind::SuspiciousSounds),
        SoundPattern::KeyboardTyping => (
            "Suspicious keyboard activity detected",
            AlertKind::SuspiciousSounds,
        ),
        SoundPattern::PaperRustling => ("Paper rustling detected", AlertKind::SuspiciousSounds),
    }
}
