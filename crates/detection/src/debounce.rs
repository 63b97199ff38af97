//! Per-signal debouncing: a raw condition must hold continuously past its
//! configured threshold before it becomes a discrete event.
//!
//! Timers are edge-triggered. An absence-style signal emits once when the
//! hold crosses the threshold and will not emit again until the condition
//! toggles off and back on. A direction-hold signal re-arms whenever the
//! direction changes and stays silent after emitting until it changes again.

use crate::types::Direction;

/// Hold thresholds in seconds, pluggable per deployment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceConfig {
    pub face_away_secs: f64,
    pub person_absent_secs: f64,
    pub talking_secs: f64,
    pub face_movement_secs: f64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            face_away_secs: 5.0,
            person_absent_secs: 3.0,
            talking_secs: 2.0,
            face_movement_secs: 3.0,
        }
    }
}

/// Raw per-tick observation for one debounced signal kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSignal {
    /// true while no face is visible.
    FaceAway(bool),
    /// true while no person is visible.
    PersonAbsent(bool),
    /// true while speech is being recognized.
    Talking(bool),
    /// Dominant movement direction this tick, if any.
    FaceMovement(Option<Direction>),
}

/// A raw condition that survived its hold threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncedSignal {
    FaceAway,
    PersonAbsent,
    Talking,
    FaceMovement(Direction),
}

/// Timer for absence-style binary conditions.
#[derive(Debug, Clone, Copy)]
struct HoldTimer {
    threshold_secs: f64,
    armed_since: Option<f64>,
    /// Set after an emission; the condition must drop before the timer
    /// can arm again.
    latched: bool,
}

impl HoldTimer {
    fn new(threshold_secs: f64) -> Self {
        Self {
            threshold_secs,
            armed_since: None,
            latched: false,
        }
    }

    fn observe(&mut self, active: bool, now: f64) -> bool {
        if !active {
            self.armed_since = None;
            self.latched = false;
            return false;
        }
        if self.latched {
            return false;
        }
        match self.armed_since {
            None => {
                self.armed_since = Some(now);
                false
            }
            Some(since) if now - since > self.threshold_secs => {
                self.armed_since = None;
                self.latched = true;
                true
            }
            Some(_) => false,
        }
    }
}

/// Timer for direction-hold conditions: a change of direction restarts the
/// hold without emitting.
#[derive(Debug, Clone, Copy)]
struct DirectionTimer {
    threshold_secs: f64,
    current: Option<Direction>,
    held_since: Option<f64>,
}

impl DirectionTimer {
    fn new(threshold_secs: f64) -> Self {
        Self {
            threshold_secs,
            current: None,
            held_since: None,
        }
    }

    fn observe(&mut self, direction: Option<Direction>, now: f64) -> Option<Direction> {
        let direction = direction?;
        if self.current != Some(direction) {
            self.current = Some(direction);
            self.held_since = Some(now);
            return None;
        }
        match self.held_since {
            Some(since) if now - since > self.threshold_secs => {
                // Disarmed until the direction changes and returns.
                self.held_since = None;
                Some(direction)
            }
            _ => None,
        }
    }
}

/// One timer per debounced signal kind. No side effects beyond the timers;
/// alert policy stays in the caller.
#[derive(Debug)]
pub struct SignalDebouncer {
    face_away: HoldTimer,
    person_absent: HoldTimer,
    talking: HoldTimer,
    face_movement: DirectionTimer,
}

impl SignalDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            face_away: HoldTimer::new(config.face_away_secs),
            person_absent: HoldTimer::new(config.person_absent_secs),
            talking: HoldTimer::new(config.talking_secs),
            face_movement: DirectionTimer::new(config.face_movement_secs),
        }
    }

    pub fn observe(&mut self, signal: RawSignal, now: f64) -> Option<DebouncedSignal> {
        match signal {
            RawSignal::FaceAway(active) => self
                .face_away
                .observe(active, now)
                .then_some(DebouncedSignal::FaceAway),
            RawSignal::PersonAbsent(active) => self
                .person_absent
                .observe(active, now)
                .then_some(DebouncedSignal::PersonAbsent),
            RawSignal::Talking(active) => self
                .talking
                .observe(active, now)
                .then_some(DebouncedSignal::Talking),
            RawSignal::FaceMovement(direction) => self
                .face_movement
                .observe(direction, now)
                .map(DebouncedSignal::FaceMovement),
        }
    }
}

impl Default for SignalDebouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_below_threshold_never_emits() {
        let mut deb = SignalDebouncer::default();
        // face_away threshold is 5.0s; hold for 3.0s then release.
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 0.0), None);
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 3.0), None);
        assert_eq!(deb.observe(RawSignal::FaceAway(false), 3.5), None);
        // Re-arming starts the hold over.
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 4.0), None);
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 8.9), None);
    }

    #[test]
    fn held_past_threshold_emits_exactly_once() {
        let mut deb = SignalDebouncer::default();
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 0.0), None);
        assert_eq!(
            deb.observe(RawSignal::FaceAway(true), 5.1),
            Some(DebouncedSignal::FaceAway)
        );
        // Still true, but the timer disarmed on emission.
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 11.0), None);
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 20.0), None);
        // Toggling off and back on re-arms.
        assert_eq!(deb.observe(RawSignal::FaceAway(false), 21.0), None);
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 22.0), None);
        assert_eq!(
            deb.observe(RawSignal::FaceAway(true), 27.2),
            Some(DebouncedSignal::FaceAway)
        );
    }

    #[test]
    fn person_absent_uses_its_own_threshold() {
        let mut deb = SignalDebouncer::default();
        assert_eq!(deb.observe(RawSignal::PersonAbsent(true), 0.0), None);
        assert_eq!(deb.observe(RawSignal::PersonAbsent(true), 2.9), None);
        assert_eq!(
            deb.observe(RawSignal::PersonAbsent(true), 3.1),
            Some(DebouncedSignal::PersonAbsent)
        );
    }

    #[test]
    fn direction_change_rearms_without_emitting() {
        let mut deb = SignalDebouncer::default();
        let left = RawSignal::FaceMovement(Some(Direction::Left));
        let right = RawSignal::FaceMovement(Some(Direction::Right));

        assert_eq!(deb.observe(left, 0.0), None);
        assert_eq!(deb.observe(left, 2.0), None);
        // Switching to the right restarts the hold.
        assert_eq!(deb.observe(right, 2.5), None);
        assert_eq!(deb.observe(right, 5.0), None);
        assert_eq!(
            deb.observe(right, 5.6),
            Some(DebouncedSignal::FaceMovement(Direction::Right))
        );
        // Same direction after emission stays silent.
        assert_eq!(deb.observe(right, 10.0), None);
        // Change and return re-arms.
        assert_eq!(deb.observe(left, 11.0), None);
        assert_eq!(
            deb.observe(left, 14.2),
            Some(DebouncedSignal::FaceMovement(Direction::Left))
        );
    }

    #[test]
    fn missing_direction_leaves_timer_untouched() {
        let mut deb = SignalDebouncer::default();
        let up = RawSignal::FaceMovement(Some(Direction::Up));
        assert_eq!(deb.observe(up, 0.0), None);
        assert_eq!(deb.observe(RawSignal::FaceMovement(None), 1.0), None);
        assert_eq!(
            deb.observe(up, 3.5),
            Some(DebouncedSignal::FaceMovement(Direction::Up))
        );
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let mut deb = SignalDebouncer::new(DebounceConfig {
            face_away_secs: 1.0,
            ..DebounceConfig::default()
        });
        assert_eq!(deb.observe(RawSignal::FaceAway(true), 0.0), None);
        assert_eq!(
            deb.observe(RawSignal::FaceAway(true), 1.2),
            Some(DebouncedSignal::FaceAway)
        );
    }
}
