//! Single-threaded execution queue with a virtual clock.
//!
//! Everything an overlay schedules (delayed posts, deferred animation
//! restores) runs on the host's [`TaskQueue`]. Nothing blocks: tasks are
//! continuations that run when the owner advances the clock. Tasks with equal
//! due times run in the order they were posted, and a task may post further
//! tasks, which run in the same drain if they are already due.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

type Task = Box<dyn FnOnce()>;

/// Handle returned by the `post*` methods, usable with [`TaskQueue::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Default)]
pub struct TaskQueue {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    tasks: RefCell<BTreeMap<(Duration, u64), Task>>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Current uptime of the queue's clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Schedules `task` to run at the current time, after already-due tasks.
    pub fn post(&self, task: impl FnOnce() + 'static) -> TaskId {
        self.post_at(task, self.now())
    }

    /// Schedules `task` to run `delay` from now.
    pub fn post_delayed(&self, task: impl FnOnce() + 'static, delay: Duration) -> TaskId {
        self.post_at(task, self.now().saturating_add(delay))
    }

    /// Schedules `task` at an absolute uptime. Past times run on the next drain.
    pub fn post_at(&self, task: impl FnOnce() + 'static, uptime: Duration) -> TaskId {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.tasks.borrow_mut().insert((uptime, seq), Box::new(task));
        TaskId(seq)
    }

    /// Removes a task that has not run yet. Returns `true` if it was pending.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.borrow_mut();
        let key = tasks.keys().find(|(_, seq)| *seq == id.0).copied();
        key.and_then(|key| tasks.remove(&key)).is_some()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Runs every task due at the current time. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        self.drain_until(self.now())
    }

    /// Moves the clock forward by `by`, running tasks as their time comes.
    ///
    /// While a task runs, [`now`](Self::now) reports that task's due time.
    ///
    /// ```rust
    /// use scrim::host::TaskQueue;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use std::time::Duration;
    ///
    /// let queue = TaskQueue::new();
    /// let ran = Rc::new(Cell::new(false));
    /// let flag = Rc::clone(&ran);
    /// queue.post_delayed(move || flag.set(true), Duration::from_millis(50));
    ///
    /// queue.advance(Duration::from_millis(49));
    /// assert!(!ran.get());
    /// queue.advance(Duration::from_millis(1));
    /// assert!(ran.get());
    /// ```
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let ran = self.drain_until(target);
        self.now.set(target);
        ran
    }

    fn drain_until(&self, limit: Duration) -> usize {
        let mut ran = 0;
        loop {
            let next = {
                let mut tasks = self.tasks.borrow_mut();
                match tasks.first_key_value().map(|(&(due, _), _)| due) {
                    Some(due) if due <= limit => tasks.pop_first(),
                    _ => None,
                }
            };
            let Some(((due, _), task)) = next else {
                break;
            };
            if due > self.now() {
                self.now.set(due);
            }
            task();
            ran += 1;
        }
        ran
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}
