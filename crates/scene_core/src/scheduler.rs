//! Cooperative periodic-task scheduling
//!
//! The core registers periodic work (interpolator playback, inertial
//! spin) with a scheduler the host pumps once per frame. Tasks fire
//! synchronously inside [`Scheduler::advance`], in registration order;
//! nothing here blocks or spawns threads.

use slotmap::{new_key_type, SlotMap};
use std::time::Duration;

new_key_type! {
    /// Handle to a registered periodic task.
    pub struct TaskKey;
}

#[derive(Debug, Clone)]
struct TaskRecord {
    interval: Duration,
    elapsed: Duration,
    active: bool,
}

/// Registry of periodic tasks with explicit, host-driven time.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: SlotMap<TaskKey, TaskRecord>,
    order: Vec<TaskKey>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task (initially stopped) and return its handle.
    pub fn register(&mut self) -> TaskKey {
        let key = self.tasks.insert(TaskRecord {
            interval: Duration::from_millis(40),
            elapsed: Duration::ZERO,
            active: false,
        });
        self.order.push(key);
        key
    }

    /// Remove a task from the registry.
    pub fn unregister(&mut self, key: TaskKey) {
        self.tasks.remove(key);
        self.order.retain(|k| *k != key);
    }

    /// Arm a task with the given firing interval. Idempotent: re-running
    /// an active task only updates the interval.
    pub fn run(&mut self, key: TaskKey, interval: Duration) {
        if let Some(task) = self.tasks.get_mut(key) {
            task.interval = interval.max(Duration::from_millis(1));
            if !task.active {
                task.active = true;
                task.elapsed = Duration::ZERO;
            }
        } else {
            log::warn!("scheduler: run on unregistered task");
        }
    }

    /// Disarm a task. Idempotent.
    pub fn stop(&mut self, key: TaskKey) {
        if let Some(task) = self.tasks.get_mut(key) {
            task.active = false;
            task.elapsed = Duration::ZERO;
        }
    }

    /// Whether the task is currently armed.
    pub fn is_active(&self, key: TaskKey) -> bool {
        self.tasks.get(key).is_some_and(|t| t.active)
    }

    /// The task's firing interval.
    pub fn interval(&self, key: TaskKey) -> Option<Duration> {
        self.tasks.get(key).map(|t| t.interval)
    }

    /// Advance all armed tasks by `dt` and return the tasks that fired,
    /// in registration order. A task whose interval elapsed more than
    /// once appears once per elapse (catch-up).
    pub fn advance(&mut self, dt: Duration) -> Vec<TaskKey> {
        let mut fired = Vec::new();
        for &key in &self.order {
            let Some(task) = self.tasks.get_mut(key) else {
                continue;
            };
            if !task.active {
                continue;
            }
            task.elapsed += dt;
            while task.elapsed >= task.interval {
                task.elapsed -= task.interval;
                fired.push(key);
            }
        }
        fired
    }
}
