//! Exam termination state machine.
//!
//! `Normal -> CountingDown -> Terminated`, with `Terminated` absorbing.
//! The countdown arms exactly once per session, the instant the cumulative
//! score first reaches its ceiling; arming again while counting down or
//! terminated is a no-op.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationConfig {
    pub countdown_secs: f64,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminationState {
    Normal,
    CountingDown { started_at: f64, remaining: f64 },
    Terminated,
}

#[derive(Debug)]
pub struct ExamTermination {
    config: TerminationConfig,
    state: TerminationState,
}

impl ExamTermination {
    pub fn new(config: TerminationConfig) -> Self {
        Self {
            config,
            state: TerminationState::Normal,
        }
    }

    /// Arm the countdown. Only the `Normal -> CountingDown` edge does
    /// anything; returns whether the transition happened.
    pub fn trigger(&mut self, now: f64) -> bool {
        if !matches!(self.state, TerminationState::Normal) {
            return false;
        }
        self.state = TerminationState::CountingDown {
            started_at: now,
            remaining: self.config.countdown_secs,
        };
        warn!(
            countdown_secs = self.config.countdown_secs,
            "exam termination countdown armed"
        );
        true
    }

    /// Recompute the remaining countdown. Returns true on the single tick
    /// that crosses into `Terminated`.
    pub fn tick(&mut self, now: f64) -> bool {
        let TerminationState::CountingDown { started_at, .. } = self.state else {
            return false;
        };
        let remaining = (self.config.countdown_secs - (now - started_at)).max(0.0);
        if remaining > 0.0 {
            self.state = TerminationState::CountingDown {
                started_at,
                remaining,
            };
            return false;
        }
        self.state = TerminationState::Terminated;
        warn!("exam terminated: cumulative score ceiling held through countdown");
        true
    }

    pub fn state(&self) -> TerminationState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, TerminationState::Terminated)
    }

    pub fn countdown_remaining(&self) -> Option<f64> {
        match self.state {
            TerminationState::CountingDown { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = TerminationState::Normal;
    }
}

impl Default for ExamTermination {
    fn default() -> Self {
        Self::new(TerminationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_arms_only_from_normal() {
        let mut term = ExamTermination::default();
        assert!(term.trigger(100.0));
        // Re-triggering while counting down must not restart the clock.
        assert!(!term.trigger(105.0));
        assert!(!term.tick(104.0));
        assert_eq!(term.countdown_remaining(), Some(6.0));
    }

    #[test]
    fn countdown_reaches_terminated_once() {
        let mut term = ExamTermination::default();
        term.trigger(0.0);
        assert!(!term.tick(5.0));
        assert_eq!(term.countdown_remaining(), Some(5.0));
        assert!(term.tick(10.0));
        assert!(term.is_terminated());
        // Absorbing: further ticks and triggers change nothing.
        assert!(!term.tick(20.0));
        assert!(!term.trigger(20.0));
        assert!(term.is_terminated());
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let mut term = ExamTermination::default();
        term.trigger(0.0);
        assert!(term.tick(500.0));
        assert_eq!(term.countdown_remaining(), None);
    }

    #[test]
    fn reset_returns_to_normal() {
        let mut term = ExamTermination::default();
        term.trigger(0.0);
        term.tick(20.0);
        term.reset();
        assert_eq!(term.state(), TerminationState::Normal);
        assert!(term.trigger(30.0));
    }
}
