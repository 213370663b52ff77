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

use metronome_agents::input_daemon::{DEFAULT_INPUT_RATE, SNAPSHOT_QUEUE_CAPACITY};
use metronome_agents::{InputDaemon, RenderConfig, RenderDaemon};
use metronome_control::{Orchestrator, Worker, WorkerFailure, WorkerOptions};
use metronome_core::{Daemon, QuitSignal};
use metronome_infra::headless::{
    HeadlessDisplay, HeadlessGraphics, HeadlessInput, HeadlessStats, HeadlessSurfaceBuilder,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_publishes_snapshots_in_order() {
    let (daemon, snapshots) = InputDaemon::new(Box::new(HeadlessInput::new()));
    assert_eq!(daemon.tick_rate(), DEFAULT_INPUT_RATE);

    let mut worker = Worker::new(daemon).unwrap();
    worker.start().unwrap();

    let received: Vec<_> = (0..5)
        .map(|_| snapshots.recv_timeout(Duration::from_secs(2)).unwrap())
        .collect();
    worker.stop();
    worker.join(Duration::from_secs(5)).unwrap();

    let sequences: Vec<_> = received.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, [1, 2, 3, 4, 5]);
    assert!(received.iter().all(|s| !s.quit_requested));
}

#[test]
fn test_slow_consumer_does_not_stall_polling() {
    let (daemon, snapshots) = InputDaemon::new(Box::new(HeadlessInput::new()));
    let mut worker = Worker::new(daemon.with_tick_rate(1000.0)).unwrap();
    let monitor = worker.monitor();
    worker.start().unwrap();
    thread::sleep(Duration::from_millis(300));
    worker.stop();
    worker.join(Duration::from_secs(5)).unwrap();

    assert_eq!(snapshots.len(), SNAPSHOT_QUEUE_CAPACITY);
    assert!(monitor.tick_count() > SNAPSHOT_QUEUE_CAPACITY as u64);
    assert!(monitor.failure().is_none());
}

#[test]
fn test_quit_request_fires_quit_signal() {
    let mut orchestrator = Orchestrator::default();
    let (daemon, _snapshots) = InputDaemon::new(Box::new(HeadlessInput::new().with_quit_after(3)));
    orchestrator
        .register(daemon.with_tick_rate(100.0).with_quit_signal(orchestrator.quit_signal()))
        .unwrap();

    orchestrator.start_all();
    assert!(orchestrator.wait_for_quit(Duration::from_secs(5)));
    assert!(orchestrator.stop_all().is_clean());
}

fn render_daemon(quit: QuitSignal, stats: &Arc<HeadlessStats>) -> RenderDaemon {
    let surface = Arc::new(HeadlessSurfaceBuilder::new().build());
    RenderDaemon::new(
        RenderConfig::default(),
        surface,
        Box::new(HeadlessDisplay::new(Arc::clone(stats))),
        Box::new(HeadlessGraphics::new(Arc::clone(stats))),
        Box::new(|| {}),
    )
    .with_quit_signal(quit)
}

#[test]
fn test_unavailable_device_does_not_stop_rendering() {
    let stats = Arc::new(HeadlessStats::default());
    let mut orchestrator = Orchestrator::default();
    let render = orchestrator
        .register_with(
            render_daemon(orchestrator.quit_signal(), &stats),
            WorkerOptions { mandatory: true },
        )
        .unwrap();
    let (input_daemon, _snapshots) = InputDaemon::new(Box::new(HeadlessInput::unavailable()));
    let input = orchestrator.register(input_daemon).unwrap();

    orchestrator.start_all();
    let render_monitor = orchestrator.monitor(render).unwrap();
    let input_monitor = orchestrator.monitor(input).unwrap();
    assert!(render_monitor.wait_for_start(Duration::from_secs(5)));
    assert!(!input_monitor.wait_for_start(Duration::from_secs(5)));

    thread::sleep(Duration::from_millis(100));
    assert!(render_monitor.is_running());
    assert!(orchestrator.health().is_ok());
    assert!(matches!(
        input_monitor.failure(),
        Some(WorkerFailure::Initialization(_))
    ));

    let report = orchestrator.stop_all();
    assert!(report.timed_out.is_empty());
    assert!(stats.frames_presented() > 0);
    assert!(stats.is_destroyed());
}
