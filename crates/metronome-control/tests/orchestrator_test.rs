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

use metronome_control::{
    Orchestrator, OrchestratorConfig, OrchestratorError, WorkerError, WorkerFailure, WorkerId,
    WorkerOptions,
};
use metronome_core::{Daemon, DaemonContext, DaemonError, QuitSignal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type EventLog = Arc<Mutex<Vec<String>>>;

/// Records its init and shutdown into a shared log.
struct Journaled {
    name: &'static str,
    log: EventLog,
}

impl Journaled {
    fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            name,
            log: Arc::clone(log),
        }
    }
}

impl Daemon for Journaled {
    fn name(&self) -> &str {
        self.name
    }
    fn tick_rate(&self) -> f64 {
        100.0
    }
    fn init(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
        self.log.lock().unwrap().push(format!("init {}", self.name));
        Ok(())
    }
    fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
        Ok(())
    }
    fn shutdown(&mut self) {
        self.log.lock().unwrap().push(format!("shutdown {}", self.name));
    }
}

/// Ignores the stop request until `release` is set.
struct Stubborn {
    release: Arc<AtomicBool>,
}

impl Daemon for Stubborn {
    fn name(&self) -> &str {
        "Stubborn"
    }
    fn tick_rate(&self) -> f64 {
        100.0
    }
    fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
        while !self.release.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }
}

struct BrokenDevice;

impl Daemon for BrokenDevice {
    fn name(&self) -> &str {
        "BrokenDevice"
    }
    fn tick_rate(&self) -> f64 {
        30.0
    }
    fn init(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
        Err(DaemonError::init("no such device"))
    }
    fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
        Ok(())
    }
}

/// Requests a quit on its tenth tick.
struct Quitter {
    ticks: u32,
    quit: QuitSignal,
}

impl Daemon for Quitter {
    fn name(&self) -> &str {
        "Quitter"
    }
    fn tick_rate(&self) -> f64 {
        200.0
    }
    fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
        self.ticks += 1;
        if self.ticks == 10 {
            self.quit.request();
        }
        Ok(())
    }
}

fn all_started(orchestrator: &Orchestrator, ids: &[WorkerId]) -> bool {
    ids.iter().all(|id| {
        orchestrator
            .monitor(*id)
            .is_some_and(|m| m.wait_for_start(Duration::from_secs(5)))
    })
}

#[test]
fn test_start_and_stop_follow_registration_order() {
    let log = EventLog::default();
    let mut orchestrator = Orchestrator::default();
    let ids: Vec<_> = ["render", "input", "audio"]
        .into_iter()
        .map(|name| orchestrator.register(Journaled::new(name, &log)).unwrap())
        .collect();
    assert_eq!(ids, [WorkerId(1), WorkerId(2), WorkerId(3)]);

    let started = orchestrator.start_all();
    assert_eq!(started.started, ids);
    assert!(started.failed.is_empty());
    assert!(all_started(&orchestrator, &ids));

    let report = orchestrator.stop_all();
    assert!(report.is_clean());
    assert_eq!(report.joined, ids);

    let shutdowns: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|event| event.starts_with("shutdown"))
        .cloned()
        .collect();
    assert_eq!(
        shutdowns,
        ["shutdown render", "shutdown input", "shutdown audio"]
    );
}

#[test]
fn test_stuck_worker_does_not_block_shutdown() {
    let log = EventLog::default();
    let release = Arc::new(AtomicBool::new(false));
    let mut orchestrator = Orchestrator::new(OrchestratorConfig {
        join_timeout: Duration::from_millis(200),
    });

    let first = orchestrator.register(Journaled::new("first", &log)).unwrap();
    let stuck = orchestrator
        .register(Stubborn {
            release: Arc::clone(&release),
        })
        .unwrap();
    let last = orchestrator.register(Journaled::new("last", &log)).unwrap();

    orchestrator.start_all();
    assert!(all_started(&orchestrator, &[first, stuck, last]));

    let begin = Instant::now();
    let report = orchestrator.stop_all();
    let elapsed = begin.elapsed();

    assert!(elapsed < Duration::from_secs(2), "shutdown took {elapsed:?}");
    assert_eq!(report.joined, [first, last]);
    assert_eq!(report.timed_out, [stuck]);
    assert!(!report.is_clean());
    assert!(log.lock().unwrap().contains(&"shutdown last".to_string()));

    release.store(true, Ordering::Release);
}

#[test]
fn test_optional_worker_failure_leaves_app_degraded() {
    let log = EventLog::default();
    let mut orchestrator = Orchestrator::default();
    let render = orchestrator
        .register_with(
            Journaled::new("render", &log),
            WorkerOptions { mandatory: true },
        )
        .unwrap();
    let input = orchestrator.register(BrokenDevice).unwrap();

    orchestrator.start_all();
    assert!(all_started(&orchestrator, &[render]));
    let input_monitor = orchestrator.monitor(input).unwrap();
    assert!(!input_monitor.wait_for_start(Duration::from_secs(5)));

    assert!(orchestrator.health().is_ok());
    assert!(orchestrator.worker(render).unwrap().is_running());
    let failures = orchestrator.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, input);
    assert!(matches!(failures[0].1, WorkerFailure::Initialization(_)));

    let report = orchestrator.stop_all();
    assert_eq!(report.joined, [render, input]);
    assert_eq!(report.failures.len(), 1);
}

#[test]
fn test_mandatory_worker_failure_is_unhealthy() {
    let mut orchestrator = Orchestrator::default();
    let input = orchestrator
        .register_with(BrokenDevice, WorkerOptions { mandatory: true })
        .unwrap();

    orchestrator.start_all();
    let monitor = orchestrator.monitor(input).unwrap();
    assert!(!monitor.wait_for_start(Duration::from_secs(5)));

    match orchestrator.health() {
        Err(OrchestratorError::MandatoryWorkerFailed { id, name, .. }) => {
            assert_eq!(id, input);
            assert_eq!(name, "BrokenDevice");
        }
        other => panic!("expected a mandatory failure, got {other:?}"),
    }
    orchestrator.stop_all();
}

#[test]
fn test_invalid_rate_is_not_registered() {
    struct Frozen;
    impl Daemon for Frozen {
        fn name(&self) -> &str {
            "Frozen"
        }
        fn tick_rate(&self) -> f64 {
            -1.0
        }
        fn execute(&mut self, _: &DaemonContext) -> Result<(), DaemonError> {
            Ok(())
        }
    }

    let mut orchestrator = Orchestrator::default();
    assert!(matches!(
        orchestrator.register(Frozen),
        Err(WorkerError::InvalidRate { .. })
    ));
    assert!(orchestrator.is_empty());
}

#[test]
fn test_worker_can_request_quit() {
    let mut orchestrator = Orchestrator::default();
    let quit = orchestrator.quit_signal();
    orchestrator.register(Quitter { ticks: 0, quit }).unwrap();

    assert!(!orchestrator.wait_for_quit(Duration::from_millis(1)));
    orchestrator.start_all();
    assert!(orchestrator.wait_for_quit(Duration::from_secs(5)));

    let report = orchestrator.stop_all();
    assert!(report.is_clean());
}

#[test]
fn test_stop_all_without_start_is_harmless() {
    let log = EventLog::default();
    let mut orchestrator = Orchestrator::default();
    let id = orchestrator.register(Journaled::new("idle", &log)).unwrap();

    let report = orchestrator.stop_all();
    assert_eq!(report.joined, [id]);
    assert!(log.lock().unwrap().is_empty());
}
