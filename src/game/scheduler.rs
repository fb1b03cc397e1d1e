use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::model::ScheduledTask;

/// Accepts deferred engine work. The host hands each task back to
/// [`GameEngine::run_scheduled`](super::game_engine::GameEngine::run_scheduled)
/// once its delay has passed.
pub trait Scheduler {
    fn schedule(&self, task: ScheduledTask);
}

/// FIFO queue of tasks; nothing fires until the host pops it. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<VecDeque<ScheduledTask>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<ScheduledTask> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> Vec<ScheduledTask> {
        self.queue.borrow().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Delay of the task that would fire next.
    pub fn next_delay(&self) -> Option<Duration> {
        self.queue.borrow().front().map(|task| task.delay)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: ScheduledTask) {
        self.queue.borrow_mut().push_back(task);
    }
}
