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

//! Collective lifecycle management for a small set of workers.

use crate::error::{OrchestratorError, WorkerError, WorkerFailure};
use crate::registry::{WorkerId, WorkerOptions, WorkerRegistry};
use crate::worker::{Worker, WorkerMonitor};
use metronome_core::{quit_channel, Daemon, QuitListener, QuitSignal};
use std::time::{Duration, Instant};

/// Configuration for the [`Orchestrator`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long `stop_all` waits for each worker to exit.
    /// `Duration::ZERO` waits indefinitely.
    pub join_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            join_timeout: Duration::from_secs(2),
        }
    }
}

/// Outcome of [`Orchestrator::start_all`].
#[derive(Debug, Default)]
pub struct StartReport {
    /// Workers whose thread was spawned (or was already running).
    pub started: Vec<WorkerId>,
    /// Workers that could not be started.
    pub failed: Vec<(WorkerId, WorkerError)>,
}

/// Outcome of [`Orchestrator::stop_all`].
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Workers whose thread exited (or never ran).
    pub joined: Vec<WorkerId>,
    /// Workers still alive when their join timeout fired.
    pub timed_out: Vec<WorkerId>,
    /// Workers whose join failed for another reason.
    pub errors: Vec<(WorkerId, WorkerError)>,
    /// Failures recorded by workers during their run.
    pub failures: Vec<(WorkerId, WorkerFailure)>,
    /// Wall time the whole shutdown took.
    pub elapsed: Duration,
}

impl ShutdownReport {
    /// Returns `true` if every worker exited and none recorded a failure.
    pub fn is_clean(&self) -> bool {
        self.timed_out.is_empty() && self.errors.is_empty() && self.failures.is_empty()
    }
}

/// Owns the application's workers and drives their lifecycle as a group.
///
/// Start order and stop order are both registration order. Failures are
/// contained per worker: no single worker can make `start_all` or `stop_all`
/// fail, and with a non-zero join timeout a stuck worker only delays shutdown
/// by that timeout.
///
/// The orchestrator is created by the host entry point and passed explicitly
/// to whatever needs it. Code that only needs to end the application gets a
/// [`QuitSignal`] instead.
#[derive(Debug)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    registry: WorkerRegistry,
    quit_signal: QuitSignal,
    quit_listener: QuitListener,
}

impl Orchestrator {
    /// Creates an orchestrator with no workers.
    pub fn new(config: OrchestratorConfig) -> Self {
        let (quit_signal, quit_listener) = quit_channel();
        Self {
            config,
            registry: WorkerRegistry::new(),
            quit_signal,
            quit_listener,
        }
    }

    /// Wraps `daemon` in a worker and registers it with default options.
    pub fn register<D: Daemon + 'static>(&mut self, daemon: D) -> Result<WorkerId, WorkerError> {
        self.register_with(daemon, WorkerOptions::default())
    }

    /// Wraps `daemon` in a worker and registers it with `options`.
    ///
    /// # Errors
    /// Returns [`WorkerError::InvalidRate`] if the daemon's tick rate is invalid;
    /// nothing is registered in that case.
    pub fn register_with<D: Daemon + 'static>(
        &mut self,
        daemon: D,
        options: WorkerOptions,
    ) -> Result<WorkerId, WorkerError> {
        let worker = Worker::new(daemon)?;
        Ok(self.registry.register(worker, options))
    }

    /// Registers an already constructed worker.
    pub fn register_worker(&mut self, worker: Worker, options: WorkerOptions) -> WorkerId {
        self.registry.register(worker, options)
    }

    /// Starts every worker in registration order.
    ///
    /// Does not wait for any worker to reach its first tick: initializations
    /// proceed concurrently.
    pub fn start_all(&mut self) -> StartReport {
        let mut report = StartReport::default();
        for entry in self.registry.iter_mut() {
            match entry.worker.start() {
                Ok(()) => {
                    log::info!("Orchestrator: started {} '{}'.", entry.id, entry.worker.name());
                    report.started.push(entry.id);
                }
                Err(e) => {
                    log::error!("Orchestrator: could not start {}: {}", entry.id, e);
                    report.failed.push((entry.id, e));
                }
            }
        }
        report
    }

    /// Stops and joins every worker in registration order.
    ///
    /// Each worker gets the configured join timeout; a timeout or error is
    /// recorded and the remaining workers are still stopped and joined.
    pub fn stop_all(&mut self) -> ShutdownReport {
        let started_at = Instant::now();
        let timeout = self.config.join_timeout;
        let mut report = ShutdownReport::default();

        for entry in self.registry.iter_mut() {
            let name = entry.worker.name().to_string();
            entry.worker.stop();
            log::debug!("Orchestrator: waiting for {} '{}' to finish.", entry.id, name);

            match entry.worker.join(timeout) {
                Ok(()) => report.joined.push(entry.id),
                Err(WorkerError::JoinTimeout { .. }) => {
                    log::warn!(
                        "Orchestrator: {} '{}' did not exit within {:?}. Giving up on it.",
                        entry.id,
                        name,
                        timeout
                    );
                    report.timed_out.push(entry.id);
                }
                Err(e) => {
                    log::warn!("Orchestrator: joining {} failed: {}", entry.id, e);
                    report.errors.push((entry.id, e));
                }
            }

            if let Some(failure) = entry.worker.failure() {
                report.failures.push((entry.id, failure));
            }
        }

        report.elapsed = started_at.elapsed();
        log::info!(
            "Orchestrator: shutdown finished in {:?} ({} joined, {} timed out).",
            report.elapsed,
            report.joined.len(),
            report.timed_out.len()
        );
        report
    }

    /// Returns a handle that requests application shutdown when fired.
    pub fn quit_signal(&self) -> QuitSignal {
        self.quit_signal.clone()
    }

    /// Blocks until a quit is requested or `timeout` elapses.
    pub fn wait_for_quit(&self, timeout: Duration) -> bool {
        self.quit_listener.wait(timeout)
    }

    /// Every failure recorded so far, in registration order.
    pub fn failures(&self) -> Vec<(WorkerId, WorkerFailure)> {
        self.registry
            .iter()
            .filter_map(|entry| entry.worker.failure().map(|f| (entry.id, f)))
            .collect()
    }

    /// Checks the mandatory workers.
    ///
    /// Failed optional workers leave the application running degraded and are
    /// only reported through [`failures`](Self::failures).
    ///
    /// # Errors
    /// Returns [`OrchestratorError::MandatoryWorkerFailed`] for the first
    /// mandatory worker that recorded a failure.
    pub fn health(&self) -> Result<(), OrchestratorError> {
        for entry in self.registry.iter().filter(|e| e.options.mandatory) {
            if let Some(failure) = entry.worker.failure() {
                return Err(OrchestratorError::MandatoryWorkerFailed {
                    id: entry.id,
                    name: entry.worker.name().to_string(),
                    failure,
                });
            }
        }
        Ok(())
    }

    /// Returns the worker with the given id, if registered.
    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.registry.get(id)
    }

    /// Returns a thread-safe view of the worker with the given id.
    pub fn monitor(&self, id: WorkerId) -> Option<WorkerMonitor> {
        self.registry.get(id).map(Worker::monitor)
    }

    /// Returns the number of registered workers.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if no workers are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}
