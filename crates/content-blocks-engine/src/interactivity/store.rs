use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::runtime::AttachError;
use super::timer::{TimerId, TimerQueue};
use crate::blocks::interactive_counter as defaults;
use crate::schema::clamp;

/// Reactive state persisted in a counter's `data-cb-context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CounterContext {
    pub value: i64,
    pub step: i64,
    pub min: i64,
    pub max: i64,
    pub auto_increment: bool,
    pub auto_increment_interval: u64,
}

impl Default for CounterContext {
    fn default() -> Self {
        Self {
            value: defaults::DEFAULT_VALUE,
            step: defaults::DEFAULT_STEP,
            min: defaults::DEFAULT_MIN,
            max: defaults::DEFAULT_MAX,
            auto_increment: false,
            auto_increment_interval: defaults::DEFAULT_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    AutoRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Increase,
    Decrease,
    Reset,
    ToggleAutoIncrement,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueChange {
    pub old: i64,
    pub new: i64,
}

/// Counter state machine for one attached fragment.
///
/// `value` always stays within `[min, max]`. The store owns at most one
/// timer in the queue it is given and cancels that timer itself whenever it
/// leaves [`Mode::AutoRunning`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStore {
    value: i64,
    step: i64,
    min: i64,
    max: i64,
    initial: i64,
    auto_increment_enabled: bool,
    interval: Duration,
    timer: Option<TimerId>,
}

impl ViewStore {
    /// Build a store from persisted context. The value is clamped into
    /// bounds and becomes the reset target.
    pub fn new(context: CounterContext) -> Result<Self, AttachError> {
        if context.min > context.max {
            return Err(AttachError::InvertedBounds {
                min: context.min,
                max: context.max,
            });
        }
        if context.step < 1 {
            return Err(AttachError::InvalidStep(context.step));
        }
        let value = clamp(context.value, context.min, context.max);
        Ok(Self {
            value,
            step: context.step,
            min: context.min,
            max: context.max,
            initial: value,
            auto_increment_enabled: context.auto_increment,
            interval: Duration::from_millis(context.auto_increment_interval),
            timer: None,
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn initial(&self) -> i64 {
        self.initial
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn auto_increment_enabled(&self) -> bool {
        self.auto_increment_enabled
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn mode(&self) -> Mode {
        if self.timer.is_some() {
            Mode::AutoRunning
        } else {
            Mode::Idle
        }
    }

    pub fn is_at_min(&self) -> bool {
        self.value <= self.min
    }

    pub fn is_at_max(&self) -> bool {
        self.value >= self.max
    }

    /// The value with its magnitude zero-padded to three digits.
    pub fn formatted_value(&self) -> String {
        let sign = if self.value < 0 { "-" } else { "" };
        format!("{sign}{:03}", self.value.unsigned_abs())
    }

    /// `None` when already at `max`.
    pub fn increase(&mut self) -> Option<ValueChange> {
        self.move_to(self.value.saturating_add(self.step))
    }

    /// `None` when already at `min`.
    pub fn decrease(&mut self) -> Option<ValueChange> {
        self.move_to(self.value.saturating_sub(self.step))
    }

    /// Restore the initial value and stop auto increment.
    pub fn reset(&mut self, timers: &mut TimerQueue) -> ValueChange {
        self.stop(timers);
        let old = self.value;
        self.value = self.initial;
        ValueChange {
            old,
            new: self.value,
        }
    }

    /// Start or stop auto increment. Returns the new running state, or `None`
    /// when the persisted state does not enable auto increment.
    pub fn toggle_auto_increment(&mut self, timers: &mut TimerQueue) -> Option<bool> {
        if !self.auto_increment_enabled {
            return None;
        }
        match self.timer {
            Some(_) => {
                self.stop(timers);
                Some(false)
            }
            None => {
                self.timer = Some(timers.schedule_repeating(self.interval));
                Some(true)
            }
        }
    }

    /// One auto-increment step. Reaching (or sitting at) `max` stops the
    /// timer within the same tick.
    pub fn tick(&mut self, timers: &mut TimerQueue) -> Option<ValueChange> {
        if self.timer.is_none() {
            return None;
        }
        let change = self.increase();
        if self.is_at_max() {
            self.stop(timers);
        }
        change
    }

    /// Cancel the timer, if any. Returns whether one was running.
    pub fn stop(&mut self, timers: &mut TimerQueue) -> bool {
        match self.timer.take() {
            Some(id) => {
                timers.cancel(id);
                true
            }
            None => false,
        }
    }

    fn move_to(&mut self, candidate: i64) -> Option<ValueChange> {
        let candidate = clamp(candidate, self.min, self.max);
        if candidate == self.value {
            return None;
        }
        let old = self.value;
        self.value = candidate;
        Some(ValueChange { old, new: candidate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn store(value: i64, step: i64, min: i64, max: i64) -> ViewStore {
        ViewStore::new(CounterContext {
            value,
            step,
            min,
            max,
            auto_increment: true,
            auto_increment_interval: 100,
        })
        .unwrap()
    }

    #[rstest]
    #[case(0, "000")]
    #[case(7, "007")]
    #[case(-5, "-005")]
    #[case(1234, "1234")]
    fn formats_value(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(store(value, 1, -10_000, 10_000).formatted_value(), expected);
    }

    #[test]
    fn clamps_initial_value() {
        let s = store(500, 1, 0, 10);
        assert_eq!(s.value(), 10);
        assert_eq!(s.initial(), 10);
    }

    #[test]
    fn rejects_bad_context() {
        let inverted = CounterContext {
            min: 5,
            max: 1,
            ..CounterContext::default()
        };
        assert!(matches!(ViewStore::new(inverted), Err(AttachError::InvertedBounds { .. })));

        let zero_step = CounterContext {
            step: 0,
            ..CounterContext::default()
        };
        assert!(matches!(ViewStore::new(zero_step), Err(AttachError::InvalidStep(0))));
    }

    #[test]
    fn step_overshoot_clamps_to_bound() {
        let mut s = store(8, 5, 0, 10);
        assert_eq!(s.increase(), Some(ValueChange { old: 8, new: 10 }));
        assert_eq!(s.increase(), None);
        assert!(s.is_at_max());
    }

    #[test]
    fn toggle_requires_enabled_auto_increment() {
        let mut timers = TimerQueue::new();
        let mut s = ViewStore::new(CounterContext::default()).unwrap();
        assert_eq!(s.toggle_auto_increment(&mut timers), None);
        assert_eq!(s.mode(), Mode::Idle);
        assert!(timers.is_empty());
    }

    #[test]
    fn toggle_twice_cancels_timer() {
        let mut timers = TimerQueue::new();
        let mut s = store(0, 1, 0, 10);

        assert_eq!(s.toggle_auto_increment(&mut timers), Some(true));
        let id = s.timer().unwrap();
        assert!(timers.is_active(id));

        assert_eq!(s.toggle_auto_increment(&mut timers), Some(false));
        assert!(!timers.is_active(id));
        assert_eq!(s.mode(), Mode::Idle);
    }

    #[test]
    fn tick_at_max_stops_without_change() {
        let mut timers = TimerQueue::new();
        let mut s = store(10, 1, 0, 10);
        s.toggle_auto_increment(&mut timers);

        assert_eq!(s.tick(&mut timers), None);
        assert_eq!(s.mode(), Mode::Idle);
        assert!(timers.is_empty());
    }

    #[test]
    fn tick_without_timer_is_ignored() {
        let mut timers = TimerQueue::new();
        let mut s = store(0, 1, 0, 10);
        assert_eq!(s.tick(&mut timers), None);
        assert_eq!(s.value(), 0);
    }
}
