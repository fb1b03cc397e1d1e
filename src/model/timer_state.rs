use std::time::{Duration, SystemTime};

/// Wall-clock span of one game. Elapsed time is always derived from the
/// timestamps, never accumulated by polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerState {
    pub started_timestamp: SystemTime,
    pub ended_timestamp: Option<SystemTime>,
}

impl TimerState {
    pub fn started(now: SystemTime) -> TimerState {
        Self {
            started_timestamp: now,
            ended_timestamp: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ended_timestamp.is_none()
    }

    pub fn elapsed_at(&self, now: SystemTime) -> Duration {
        let until_time = self.ended_timestamp.unwrap_or(now);

        until_time
            .duration_since(self.started_timestamp)
            .unwrap_or(Duration::default())
    }

    /// Freezes the timer; stopping an already stopped timer keeps the first end time.
    pub fn ended(&self, now: SystemTime) -> TimerState {
        let mut new_state = *self;
        if new_state.ended_timestamp.is_none() {
            new_state.ended_timestamp = Some(now);
        }
        new_state
    }
}
