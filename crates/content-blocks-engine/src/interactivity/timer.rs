use std::time::Duration;

/// Handle of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    interval: Duration,
    due: Duration,
}

/// Repeating timers on a virtual clock.
///
/// Nothing fires on its own: the embedding loop calls [`TimerQueue::pop_due`]
/// (usually through `ViewRuntime::advance`). A cancelled timer is gone for
/// good and its id is never reused.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule a timer that first fires one `interval` from now.
    pub fn schedule_repeating(&mut self, interval: Duration) -> TimerId {
        let interval = interval.max(Duration::from_millis(1));
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            interval,
            due: self.now + interval,
        });
        id
    }

    /// Remove a timer. Returns false if it was not scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Fire the earliest timer due at or before `until`, moving the clock to
    /// its due time and rescheduling it. Ties go to the older timer.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.due <= until)
            .min_by_key(|t| (t.due, t.id))?;
        self.now = self.now.max(timer.due);
        timer.due += timer.interval;
        Some(timer.id)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }
}
