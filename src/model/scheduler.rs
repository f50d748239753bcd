//! Cooperative, single-threaded task scheduling.
//!
//! Long work is split into tasks that are queued with [`Scheduler::defer`]
//! and run later, in the order they were queued. A task may queue further
//! tasks (for example the next slice of a parse).

use log::trace;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Host-provided deferral mechanism
pub trait Scheduler {
    /// Queue `task` to run once, later, without blocking the caller
    fn defer(&self, task: Task);
}

/// FIFO task queue shared by cloning
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the oldest queued task; false if the queue was empty
    pub fn run_next(&self) -> bool {
        // The borrow must end before the task runs so it can defer more work
        let next = self.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks until the queue is empty, returning how many ran
    ///
    /// A task that re-queues itself forever keeps this from returning;
    /// use [`TaskQueue::run_at_most`] for polling tasks.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        trace!("Task queue idle after {} tasks", ran);
        ran
    }

    /// Run at most `limit` tasks, returning how many ran
    pub fn run_at_most(&self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit && self.run_next() {
            ran += 1;
        }
        ran
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}
