//! Deferred tasks for fixed-delay round transitions

use std::time::Duration;

#[derive(Debug)]
struct Pending<T> {
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    due: Duration,
    task: T,
}

/// Queue of tasks that become due after a delay.
///
/// Time only moves through [`Scheduler::advance`]. Tasks due at the same
/// instant come out in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has passed
    pub fn schedule(&mut self, delay: Duration, task: T) {
        self.next_seq += 1;
        self.pending.push(Pending {
            seq: self.next_seq,
            due: self.now + delay,
            task,
        });
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Let `dt` pass and return the tasks that became due, oldest first.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;
        let now = self.now;

        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;

        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }
}
