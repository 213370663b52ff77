// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Worker registry with id assignment and insertion-ordered iteration.

use crate::worker::Worker;
use std::fmt;

/// Registry-assigned identifier of a worker. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-worker policy supplied at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerOptions {
    /// If `true`, a failure of this worker makes the whole application
    /// unhealthy instead of leaving it running degraded.
    pub mandatory: bool,
}

/// Entry in the worker registry.
#[derive(Debug)]
pub struct WorkerEntry {
    /// Assigned id.
    pub id: WorkerId,
    /// The worker itself.
    pub worker: Worker,
    /// Registration policy.
    pub options: WorkerOptions,
}

/// Holds every registered worker in registration order.
///
/// Iteration order is insertion order; no dependency resolution is attempted.
#[derive(Debug)]
pub struct WorkerRegistry {
    entries: Vec<WorkerEntry>,
    next_id: u32,
}

impl WorkerRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a worker and returns its newly assigned id.
    pub fn register(&mut self, worker: Worker, options: WorkerOptions) -> WorkerId {
        let id = WorkerId(self.next_id);
        self.next_id += 1;
        log::info!(
            "WorkerRegistry: Registered '{}' as {} (mandatory={})",
            worker.name(),
            id,
            options.mandatory
        );
        self.entries.push(WorkerEntry {
            id,
            worker,
            options,
        });
        id
    }

    /// Returns the number of registered workers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no workers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkerEntry> {
        self.entries.iter()
    }

    /// Iterates mutably over all entries in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WorkerEntry> {
        self.entries.iter_mut()
    }

    /// Returns the worker with the given id, if registered.
    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.worker)
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metronome_core::{Daemon, DaemonContext, DaemonError};

    struct Idle(&'static str);

    impl Daemon for Idle {
        fn name(&self) -> &str {
            self.0
        }
        fn tick_rate(&self) -> f64 {
            10.0
        }
        fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
            Ok(())
        }
    }

    #[test]
    fn test_ids_follow_registration_order() {
        let mut registry = WorkerRegistry::new();
        let a = registry.register(Worker::new(Idle("a")).unwrap(), WorkerOptions::default());
        let b = registry.register(Worker::new(Idle("b")).unwrap(), WorkerOptions::default());
        let c = registry.register(Worker::new(Idle("c")).unwrap(), WorkerOptions::default());

        assert_eq!((a, b, c), (WorkerId(1), WorkerId(2), WorkerId(3)));
        let names: Vec<_> = registry.iter().map(|e| e.worker.name().to_string()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut registry = WorkerRegistry::new();
        let id = registry.register(Worker::new(Idle("render")).unwrap(), WorkerOptions::default());

        assert_eq!(registry.get(id).map(Worker::name), Some("render"));
        assert!(registry.get(WorkerId(42)).is_none());
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
