//! Deferred task queue
//!
//! Work that must run after the current synchronous call finishes (the
//! browser's "next tick") is pushed here and drained by the host. Tasks are
//! stamped with the load generation they belong to; tasks from a superseded
//! scene load are dropped at drain time.

use std::collections::VecDeque;
use tracing::debug;

/// Monotonic counter bumped on every scene load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadGeneration(u64);

impl LoadGeneration {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Advance to the next generation and return it
    pub fn bump(&mut self) -> LoadGeneration {
        self.0 += 1;
        *self
    }
}

#[derive(Debug, Clone)]
struct Deferred<T> {
    generation: LoadGeneration,
    task: T,
}

/// Single-threaded FIFO of deferred tasks
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    tasks: VecDeque<Deferred<T>>,
}

impl<T: std::fmt::Debug> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    pub fn push(&mut self, generation: LoadGeneration, task: T) {
        self.tasks.push_back(Deferred { generation, task });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Take every queued task in FIFO order, discarding the ones that do not
    /// belong to `current`
    pub fn drain(&mut self, current: LoadGeneration) -> Vec<T> {
        let mut ready = Vec::with_capacity(self.tasks.len());
        while let Some(deferred) = self.tasks.pop_front() {
            if deferred.generation == current {
                ready.push(deferred.task);
            } else {
                debug!(
                    task = ?deferred.task,
                    generation = deferred.generation.value(),
                    current = current.value(),
                    "Discarding stale deferred task"
                );
            }
        }
        ready
    }
}

impl<T: std::fmt::Debug> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut generation = LoadGeneration::default();
        let current = generation.bump();
        let mut queue = TaskQueue::new();
        queue.push(current, "first");
        queue.push(current, "second");
        queue.push(current, "third");

        assert_eq!(queue.drain(current), vec!["first", "second", "third"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stale_tasks_dropped() {
        let mut generation = LoadGeneration::default();
        let old = generation.bump();
        let mut queue = TaskQueue::new();
        queue.push(old, 1);

        let current = generation.bump();
        queue.push(current, 2);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain(current), vec![2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_generation_is_monotonic() {
        let mut generation = LoadGeneration::default();
        let a = generation.bump();
        let b = generation.bump();
        assert!(b > a);
        assert_eq!(b.value(), 2);
    }
}
