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

//! A daemon running on its own dedicated, paced thread.

use crate::error::{WorkerError, WorkerFailure};
use metronome_core::{Daemon, DaemonContext, TickPacer};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Coarse lifecycle state of a [`Worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, never started.
    Idle,
    /// The thread is alive and the run flag is set.
    Running,
    /// A stop was requested but the thread has not exited yet.
    Stopping,
    /// The thread has exited. A worker never leaves this state.
    Exited,
}

#[derive(Debug, Default)]
struct Progress {
    started: bool,
    exited: bool,
}

/// State crossing the thread boundary between a worker and its owner.
#[derive(Debug)]
struct Shared {
    running: Arc<AtomicBool>,
    progress: Mutex<Progress>,
    progress_changed: Condvar,
    failure: Mutex<Option<WorkerFailure>>,
    measured_rate: AtomicU64,
    ticks: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            progress: Mutex::new(Progress::default()),
            progress_changed: Condvar::new(),
            failure: Mutex::new(None),
            measured_rate: AtomicU64::new(0f64.to_bits()),
            ticks: AtomicU64::new(0),
        }
    }

    fn update_progress(&self, update: impl FnOnce(&mut Progress)) {
        match self.progress.lock() {
            Ok(mut progress) => update(&mut progress),
            Err(poisoned) => update(&mut poisoned.into_inner()),
        }
        self.progress_changed.notify_all();
    }

    fn record_failure(&self, failure: WorkerFailure) {
        match self.failure.lock() {
            Ok(mut slot) => *slot = Some(failure),
            Err(poisoned) => *poisoned.into_inner() = Some(failure),
        }
    }

    fn publish(&self, pacer: &TickPacer) {
        self.measured_rate
            .store(pacer.actual_rate().to_bits(), Ordering::Relaxed);
        self.ticks.store(pacer.total_ticks(), Ordering::Relaxed);
    }
}

/// A cheap, thread-safe, read-only view of a worker.
///
/// Can be handed to other threads to wait on the start barrier or to read
/// diagnostics. The values it reports are point-in-time snapshots.
#[derive(Debug, Clone)]
pub struct WorkerMonitor {
    name: Arc<str>,
    shared: Arc<Shared>,
}

impl WorkerMonitor {
    /// The worker's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocks until the worker has begun its first tick, its thread has exited,
    /// or `timeout` elapses. A zero timeout waits indefinitely.
    ///
    /// Returns whether the worker has started.
    pub fn wait_for_start(&self, timeout: Duration) -> bool {
        if let Err(e) = self.wait_for(timeout, |p| p.started || p.exited) {
            log::warn!("{e}");
        }
        self.has_started()
    }

    /// Returns `true` once the worker has entered its loop. Never resets.
    pub fn has_started(&self) -> bool {
        self.shared
            .progress
            .lock()
            .map(|p| p.started)
            .unwrap_or(false)
    }

    /// Returns `true` once the worker's thread has finished.
    pub fn has_exited(&self) -> bool {
        self.shared
            .progress
            .lock()
            .map(|p| p.exited)
            .unwrap_or(false)
    }

    /// Returns `true` iff the worker has started and has not been asked to stop.
    ///
    /// This reflects "actively looping", not "thread alive": a worker that was
    /// told to stop reports `false` even while finishing its last tick.
    pub fn is_running(&self) -> bool {
        self.has_started() && self.shared.running.load(Ordering::Acquire)
    }

    /// The tick rate measured over the worker's last complete second.
    pub fn measured_rate(&self) -> f64 {
        f64::from_bits(self.shared.measured_rate.load(Ordering::Relaxed))
    }

    /// Number of ticks the worker has completed.
    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    /// The failure that ended the worker's loop, if any.
    pub fn failure(&self) -> Option<WorkerFailure> {
        self.shared
            .failure
            .lock()
            .ok()
            .and_then(|failure| failure.clone())
    }

    /// Waits until `done` holds for the worker's progress. Returns whether it
    /// held when the wait ended.
    fn wait_for<F>(&self, timeout: Duration, done: F) -> Result<bool, WorkerError>
    where
        F: Fn(&Progress) -> bool,
    {
        let interrupted = || WorkerError::InterruptedWait {
            name: self.name.to_string(),
            reason: "progress lock poisoned".to_string(),
        };

        let guard = self.shared.progress.lock().map_err(|_| interrupted())?;
        let guard = if timeout.is_zero() {
            self.shared
                .progress_changed
                .wait_while(guard, |p| !done(p))
                .map_err(|_| interrupted())?
        } else {
            self.shared
                .progress_changed
                .wait_timeout_while(guard, timeout, |p| !done(p))
                .map_err(|_| interrupted())?
                .0
        };
        Ok(done(&guard))
    }
}

/// Owns one daemon and the dedicated thread that drives it.
///
/// The thread calls [`Daemon::init`] once, then repeatedly calls
/// [`Daemon::execute`] and paces itself with a [`TickPacer`] until the run
/// flag is cleared. A worker runs at most once: the daemon moves into the
/// thread on the first [`start`](Self::start), so a stopped worker must be
/// replaced by a fresh instance.
pub struct Worker {
    monitor: WorkerMonitor,
    daemon: Option<Box<dyn Daemon>>,
    pacer: Option<TickPacer>,
    handle: Option<JoinHandle<()>>,
    launched: bool,
}

impl Worker {
    /// Wraps `daemon` in a worker that is not yet running.
    ///
    /// # Errors
    /// Returns [`WorkerError::InvalidRate`] if the daemon's tick rate is not
    /// a positive, finite number.
    pub fn new<D: Daemon + 'static>(daemon: D) -> Result<Self, WorkerError> {
        Self::from_boxed(Box::new(daemon))
    }

    /// Same as [`new`](Self::new), for an already boxed daemon.
    pub fn from_boxed(daemon: Box<dyn Daemon>) -> Result<Self, WorkerError> {
        let name = daemon.name().to_string();
        let pacer = TickPacer::new(daemon.tick_rate()).map_err(|source| {
            WorkerError::InvalidRate {
                name: name.clone(),
                source,
            }
        })?;

        Ok(Self {
            monitor: WorkerMonitor {
                name: name.into(),
                shared: Arc::new(Shared::new()),
            },
            daemon: Some(daemon),
            pacer: Some(pacer),
            handle: None,
            launched: false,
        })
    }

    /// The worker's name.
    pub fn name(&self) -> &str {
        self.monitor.name()
    }

    /// Returns a thread-safe view of this worker.
    pub fn monitor(&self) -> WorkerMonitor {
        self.monitor.clone()
    }

    /// Spawns the worker's thread and returns immediately.
    ///
    /// Does nothing if the worker is already running. Use
    /// [`wait_for_start`](Self::wait_for_start) to wait for the first tick.
    ///
    /// # Errors
    /// Returns [`WorkerError::NotRestartable`] if the worker has already been
    /// stopped, or [`WorkerError::Spawn`] if the thread could not be created.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        let shared = &self.monitor.shared;
        if self.launched {
            if shared.running.load(Ordering::Acquire) {
                log::debug!("Worker '{}': already running.", self.name());
                return Ok(());
            }
            return Err(self.not_restartable());
        }

        let (Some(daemon), Some(pacer)) = (self.daemon.take(), self.pacer.take()) else {
            return Err(self.not_restartable());
        };

        self.launched = true;
        shared.running.store(true, Ordering::Release);

        let thread_shared = Arc::clone(shared);
        let spawned = thread::Builder::new()
            .name(self.name().to_string())
            .spawn(move || run_daemon(daemon, pacer, thread_shared));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                log::info!("Worker '{}': started.", self.name());
                Ok(())
            }
            Err(e) => {
                shared.running.store(false, Ordering::Release);
                shared.update_progress(|p| p.exited = true);
                Err(WorkerError::Spawn {
                    name: self.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Asks the loop to exit at its next iteration boundary. Never blocks.
    pub fn stop(&self) {
        if self.monitor.shared.running.swap(false, Ordering::AcqRel) {
            log::debug!("Worker '{}': stop requested.", self.name());
        }
    }

    /// Blocks until the worker's thread has exited or `timeout` elapses.
    /// A zero timeout waits indefinitely.
    ///
    /// Does nothing if the worker was never started or was already joined.
    ///
    /// # Errors
    /// Returns [`WorkerError::JoinTimeout`] if the thread is still alive when
    /// the timeout fires; the worker can be joined again later.
    pub fn join(&mut self, timeout: Duration) -> Result<(), WorkerError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match self.monitor.wait_for(timeout, |p| p.exited) {
            Ok(true) => {}
            Ok(false) => {
                self.handle = Some(handle);
                return Err(WorkerError::JoinTimeout {
                    name: self.name().to_string(),
                    timeout,
                });
            }
            Err(e) => {
                self.handle = Some(handle);
                return Err(e);
            }
        }

        handle.join().map_err(|_| WorkerError::InterruptedWait {
            name: self.name().to_string(),
            reason: "worker thread panicked outside its loop".to_string(),
        })?;
        log::info!("Worker '{}': joined.", self.name());
        Ok(())
    }

    /// See [`WorkerMonitor::wait_for_start`].
    pub fn wait_for_start(&self, timeout: Duration) -> bool {
        self.monitor.wait_for_start(timeout)
    }

    /// See [`WorkerMonitor::is_running`].
    pub fn is_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// The failure that ended the worker's loop, if any.
    pub fn failure(&self) -> Option<WorkerFailure> {
        self.monitor.failure()
    }

    /// The worker's current lifecycle state.
    pub fn state(&self) -> WorkerState {
        if !self.launched {
            WorkerState::Idle
        } else if self.monitor.has_exited() {
            WorkerState::Exited
        } else if self.monitor.shared.running.load(Ordering::Acquire) {
            WorkerState::Running
        } else {
            WorkerState::Stopping
        }
    }

    fn not_restartable(&self) -> WorkerError {
        WorkerError::NotRestartable {
            name: self.name().to_string(),
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
        if self.handle.take().is_some() && !self.monitor.has_exited() {
            log::debug!("Worker '{}': dropped while alive, detaching thread.", self.name());
        }
    }
}

/// Body of a worker thread.
fn run_daemon(mut daemon: Box<dyn Daemon>, mut pacer: TickPacer, shared: Arc<Shared>) {
    let name = daemon.name().to_string();
    let context = DaemonContext::new(name.clone(), Arc::clone(&shared.running));
    log::debug!("Worker '{name}': thread started.");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        drive(daemon.as_mut(), &mut pacer, &context, &shared)
    }));
    let mut failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(failure)) => Some(failure),
        Err(payload) => Some(WorkerFailure::Panicked(panic_message(payload.as_ref()))),
    };

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| daemon.shutdown())) {
        let message = panic_message(payload.as_ref());
        log::error!("Worker '{name}': shutdown panicked: {message}");
        failure.get_or_insert(WorkerFailure::Panicked(message));
    }

    if let Some(failure) = failure {
        log::error!("Worker '{name}': {failure}");
        shared.record_failure(failure);
    }

    shared.running.store(false, Ordering::Release);
    shared.publish(&pacer);
    shared.update_progress(|p| p.exited = true);
    log::debug!("Worker '{name}': thread exiting.");
}

/// Runs `init` once, then ticks until the run flag is cleared.
fn drive(
    daemon: &mut dyn Daemon,
    pacer: &mut TickPacer,
    context: &DaemonContext,
    shared: &Shared,
) -> Result<(), WorkerFailure> {
    match daemon.init(context) {
        Ok(()) => {}
        Err(e) if e.is_interrupted() && context.is_stop_requested() => {
            log::info!(
                "Worker '{}': stopped before initialization completed.",
                context.name()
            );
            return Ok(());
        }
        Err(e) => return Err(WorkerFailure::Initialization(e)),
    }

    // Initialization may have blocked for a long time.
    pacer.restart_clock();

    let mut first_tick = true;
    while shared.running.load(Ordering::Acquire) {
        if first_tick {
            first_tick = false;
            shared.update_progress(|p| p.started = true);
            log::debug!("Worker '{}': entered its loop.", context.name());
        }

        match daemon.execute(context) {
            Ok(()) => {}
            Err(e) if e.is_interrupted() && context.is_stop_requested() => break,
            Err(e) => return Err(WorkerFailure::Execution(e)),
        }

        if let Some(rate) = context.take_requested_rate() {
            pacer
                .set_target_rate(rate)
                .map_err(|e| WorkerFailure::Execution(e.into()))?;
            log::debug!("Worker '{}': now pacing at {rate} ticks/s.", context.name());
        }

        pacer.tick();
        shared.publish(pacer);
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metronome_core::DaemonError;
    use std::sync::atomic::AtomicUsize;

    struct CountingDaemon {
        inits: Arc<AtomicUsize>,
        executes: Arc<AtomicUsize>,
    }

    impl Daemon for CountingDaemon {
        fn name(&self) -> &str {
            "Counting"
        }
        fn tick_rate(&self) -> f64 {
            200.0
        }
        fn init(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
            self.executes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counting() -> (Worker, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let inits = Arc::new(AtomicUsize::new(0));
        let executes = Arc::new(AtomicUsize::new(0));
        let worker = Worker::new(CountingDaemon {
            inits: Arc::clone(&inits),
            executes: Arc::clone(&executes),
        })
        .unwrap();
        (worker, inits, executes)
    }

    struct PanickingDaemon;

    impl Daemon for PanickingDaemon {
        fn name(&self) -> &str {
            "Panicking"
        }
        fn tick_rate(&self) -> f64 {
            100.0
        }
        fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
            panic!("boom");
        }
    }

    #[test]
    fn test_worker_lifecycle_states() {
        let (mut worker, _, _) = counting();
        assert_eq!(worker.state(), WorkerState::Idle);

        worker.start().unwrap();
        assert!(worker.wait_for_start(Duration::from_secs(5)));
        assert_eq!(worker.state(), WorkerState::Running);

        worker.stop();
        worker.join(Duration::ZERO).unwrap();
        assert_eq!(worker.state(), WorkerState::Exited);
    }

    #[test]
    fn test_double_start_spawns_one_loop() {
        let (mut worker, inits, _) = counting();
        worker.start().unwrap();
        worker.start().unwrap();
        assert!(worker.wait_for_start(Duration::from_secs(5)));

        worker.stop();
        worker.join(Duration::ZERO).unwrap();
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stopped_worker_is_not_restartable() {
        let (mut worker, _, _) = counting();
        worker.start().unwrap();
        worker.stop();
        worker.join(Duration::ZERO).unwrap();

        assert!(matches!(
            worker.start(),
            Err(WorkerError::NotRestartable { .. })
        ));
    }

    #[test]
    fn test_join_before_start_is_noop() {
        let (mut worker, _, executes) = counting();
        worker.join(Duration::from_millis(10)).unwrap();
        assert_eq!(executes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panic_is_recorded_as_failure() {
        let mut worker = Worker::new(PanickingDaemon).unwrap();
        worker.start().unwrap();
        worker.join(Duration::from_secs(5)).unwrap();

        assert!(matches!(worker.failure(), Some(WorkerFailure::Panicked(m)) if m == "boom"));
        assert!(!worker.is_running());
    }

    #[test]
    fn test_monitor_reports_ticks() {
        let (mut worker, _, executes) = counting();
        let monitor = worker.monitor();
        worker.start().unwrap();
        assert!(monitor.wait_for_start(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(50));
        worker.stop();
        worker.join(Duration::ZERO).unwrap();

        assert!(monitor.tick_count() > 0);
        assert_eq!(monitor.tick_count(), executes.load(Ordering::SeqCst) as u64);
    }
}
