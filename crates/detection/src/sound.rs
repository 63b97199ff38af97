//! Sound-pattern classification policy.
//!
//! The audio collaborator reduces each captured chunk to a coarse
//! `(amplitude, frequency)` band pair; a fixed decision table maps the pair
//! onto one of four named counters. A counter that exceeds its configured
//! count emits a discrete sound-pattern event and resets to zero. Counters
//! are independent; nothing is shared across categories.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmplitudeBand {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyBand {
    High,
    Mid,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundPattern {
    Whispering,
    Talking,
    KeyboardTyping,
    PaperRustling,
}

impl SoundPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whispering => "whispering",
            Self::Talking => "talking",
            Self::KeyboardTyping => "keyboard_typing",
            Self::PaperRustling => "paper_rustling",
        }
    }
}

/// Band cutoffs applied to the raw `(rms, zero_crossings)` feature pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundBandConfig {
    pub high_amplitude: f64,
    pub medium_amplitude: f64,
    pub high_frequency: f64,
    pub low_frequency: f64,
}

impl Default for SoundBandConfig {
    fn default() -> Self {
        Self {
            high_amplitude: 1000.0,
            medium_amplitude: 500.0,
            high_frequency: 1000.0,
            low_frequency: 100.0,
        }
    }
}

/// Reduce a chunk's RMS amplitude and zero-crossing count to bands.
/// Returns `None` below the medium amplitude cutoff; quiet chunks are not
/// classified at all.
pub fn bands_from_features(
    rms: f64,
    zero_crossings: f64,
    config: &SoundBandConfig,
) -> Option<(AmplitudeBand, FrequencyBand)> {
    let amplitude = if rms > config.high_amplitude {
        AmplitudeBand::High
    } else if rms > config.medium_amplitude {
        AmplitudeBand::Medium
    } else {
        return None;
    };

    let frequency = if zero_crossings > config.high_frequency {
        FrequencyBand::High
    } else if zero_crossings < config.low_frequency {
        FrequencyBand::Low
    } else {
        FrequencyBand::Mid
    };

    Some((amplitude, frequency))
}

/// Per-category count thresholds; a counter emits when it exceeds its
/// threshold, not when it reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundCounterConfig {
    pub whispering: u32,
    pub talking: u32,
    pub keyboard_typing: u32,
    pub paper_rustling: u32,
}

impl Default for SoundCounterConfig {
    fn default() -> Self {
        Self {
            whispering: 5,
            talking: 3,
            keyboard_typing: 5,
            paper_rustling: 8,
        }
    }
}

impl SoundCounterConfig {
    fn threshold(&self, pattern: SoundPattern) -> u32 {
        match pattern {
            SoundPattern::Whispering => self.whispering,
            SoundPattern::Talking => self.talking,
            SoundPattern::KeyboardTyping => self.keyboard_typing,
            SoundPattern::PaperRustling => self.paper_rustling,
        }
    }
}

#[derive(Debug, Default)]
pub struct SoundCounters {
    config: SoundCounterConfig,
    whispering: u32,
    talking: u32,
    keyboard_typing: u32,
    paper_rustling: u32,
}

impl SoundCounters {
    pub fn new(config: SoundCounterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Route one band pair through the decision table. Returns the pattern
    /// whose counter crossed its threshold, if any.
    pub fn observe(
        &mut self,
        amplitude: AmplitudeBand,
        frequency: FrequencyBand,
    ) -> Option<SoundPattern> {
        let pattern = match (amplitude, frequency) {
            (AmplitudeBand::High, FrequencyBand::High) => SoundPattern::KeyboardTyping,
            (AmplitudeBand::High, _) => SoundPattern::Talking,
            (AmplitudeBand::Medium, FrequencyBand::Low) => SoundPattern::Whispering,
            (AmplitudeBand::Medium, _) => SoundPattern::PaperRustling,
            (AmplitudeBand::Low, _) => return None,
        };

        let threshold = self.config.threshold(pattern);
        let counter = self.counter_mut(pattern);
        *counter += 1;
        if *counter > threshold {
            *counter = 0;
            Some(pattern)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.whispering = 0;
        self.talking = 0;
        self.keyboard_typing = 0;
        self.paper_rustling = 0;
    }

    fn counter_mut(&mut self, pattern: SoundPattern) -> &mut u32 {
        match pattern {
            SoundPattern::Whispering => &mut self.whispering,
            SoundPattern::Talking => &mut self.talking,
            SoundPattern::KeyboardTyping => &mut self.keyboard_typing,
            SoundPattern::PaperRustling => &mut self.paper_rustling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_derivation_matches_cutoffs() {
        let cfg = SoundBandConfig::default();
        assert_eq!(
            bands_from_features(1500.0, 1500.0, &cfg),
            Some((AmplitudeBand::High, FrequencyBand::High))
        );
        assert_eq!(
            bands_from_features(1500.0, 500.0, &cfg),
            Some((AmplitudeBand::High, FrequencyBand::Mid))
        );
        assert_eq!(
            bands_from_features(700.0, 50.0, &cfg),
            Some((AmplitudeBand::Medium, FrequencyBand::Low))
        );
        assert_eq!(bands_from_features(100.0, 2000.0, &cfg), None);
    }

    #[test]
    fn talking_counter_emits_after_exceeding_threshold() {
        let mut counters = SoundCounters::default();
        // talking threshold is 3: silent on the first three observations.
        for _ in 0..3 {
            assert_eq!(
                counters.observe(AmplitudeBand::High, FrequencyBand::Low),
                None
            );
        }
        assert_eq!(
            counters.observe(AmplitudeBand::High, FrequencyBand::Low),
            Some(SoundPattern::Talking)
        );
        // Reset on emission: the next observation starts over.
        assert_eq!(
            counters.observe(AmplitudeBand::High, FrequencyBand::Low),
            None
        );
    }

    #[test]
    fn categories_count_independently() {
        let mut counters = SoundCounters::default();
        for _ in 0..5 {
            assert_eq!(
                counters.observe(AmplitudeBand::Medium, FrequencyBand::Low),
                None
            );
            assert_eq!(
                counters.observe(AmplitudeBand::High, FrequencyBand::High),
                None
            );
        }
        // Both cross their (equal) thresholds on the sixth observation.
        assert_eq!(
            counters.observe(AmplitudeBand::Medium, FrequencyBand::Low),
            Some(SoundPattern::Whispering)
        );
        assert_eq!(
            counters.observe(AmplitudeBand::High, FrequencyBand::High),
            Some(SoundPattern::KeyboardTyping)
        );
    }

    #[test]
    fn low_amplitude_is_never_classified() {
        let mut counters = SoundCounters::default();
        for _ in 0..50 {
            assert_eq!(
                counters.observe(AmplitudeBand::Low, FrequencyBand::High),
                None
            );
        }
    }

    #[test]
    fn mid_frequency_medium_amplitude_counts_as_rustling() {
        let mut counters = SoundCounters::default();
        for _ in 0..8 {
            assert_eq!(
                counters.observe(AmplitudeBand::Medium, FrequencyBand::Mid),
                None
            );
        }
        assert_eq!(
            counters.observe(AmplitudeBand::Medium, FrequencyBand::Mid),
            Some(SoundPattern::PaperRustling)
        );
    }
}
