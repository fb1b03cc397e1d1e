use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use crate::model::TimerState;

/// Source of wall-clock time for the engine.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

/// At most one running span per game; `start` after `stop` begins a fresh span.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    state: Option<TimerState>,
}

impl Timer {
    pub fn start(&mut self, now: SystemTime) {
        self.state = Some(TimerState::started(now));
    }

    pub fn stop(&mut self, now: SystemTime) {
        if let Some(state) = self.state {
            self.state = Some(state.ended(now));
        }
    }

    pub fn elapsed(&self, now: SystemTime) -> Duration {
        self.state
            .map(|state| state.elapsed_at(now))
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some_and(|state| state.is_running())
    }

    pub fn state(&self) -> Option<TimerState> {
        self.state
    }
}
