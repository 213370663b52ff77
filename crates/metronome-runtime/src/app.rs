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

//! The host application: owns the orchestrator and the platform collaborators.

use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use metronome_agents::{InputDaemon, RenderDaemon};
use metronome_control::{Orchestrator, ShutdownReport, WorkerId, WorkerOptions};
use metronome_core::platform::InputSnapshot;
use metronome_infra::headless::{
    HeadlessDisplay, HeadlessGraphics, HeadlessInput, HeadlessStats, HeadlessSurface,
    HeadlessSurfaceBuilder,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long the host blocks on the quit signal between health checks.
const SUPERVISION_SLICE: Duration = Duration::from_millis(250);

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Frames the render callback drew.
    pub frames_rendered: u64,
    /// Input snapshots the host consumed.
    pub snapshots_received: u64,
    /// The orchestrator's shutdown report.
    pub shutdown: ShutdownReport,
}

/// A render daemon and an input daemon running on a headless platform.
pub struct Application {
    config: RuntimeConfig,
    orchestrator: Orchestrator,
    surface: Arc<HeadlessSurface>,
    stats: Arc<HeadlessStats>,
    frames: Arc<AtomicU64>,
    snapshots: Receiver<InputSnapshot>,
    snapshots_received: u64,
    render: WorkerId,
    input: WorkerId,
}

impl Application {
    /// Builds the platform collaborators and registers both daemons.
    ///
    /// The render daemon is registered first, so it is started first and
    /// stopped first.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let mut orchestrator = Orchestrator::new(config.orchestrator());

        let surface = Arc::new(
            HeadlessSurfaceBuilder::new()
                .with_dimensions(config.width, config.height)
                .ready_after(Duration::from_millis(config.surface_delay_ms))
                .build(),
        );
        let stats = Arc::new(HeadlessStats::default());
        let frames = Arc::new(AtomicU64::new(0));

        let frame_counter = Arc::clone(&frames);
        let render_daemon = RenderDaemon::new(
            config.render(),
            surface.clone(),
            Box::new(HeadlessDisplay::new(Arc::clone(&stats))),
            Box::new(HeadlessGraphics::new(Arc::clone(&stats))),
            Box::new(move || {
                frame_counter.fetch_add(1, Ordering::Relaxed);
            }),
        )
        .with_quit_signal(orchestrator.quit_signal());
        let render = orchestrator
            .register_with(
                render_daemon,
                WorkerOptions {
                    mandatory: config.render_mandatory,
                },
            )
            .context("failed to register the render daemon")?;

        let device = match config.quit_after_polls {
            Some(polls) => HeadlessInput::new().with_quit_after(polls),
            None => HeadlessInput::new(),
        };
        let (input_daemon, snapshots) = InputDaemon::new(Box::new(device));
        let input = orchestrator
            .register(
                input_daemon
                    .with_tick_rate(config.input_rate)
                    .with_quit_signal(orchestrator.quit_signal()),
            )
            .context("failed to register the input daemon")?;

        Ok(Self {
            config,
            orchestrator,
            surface,
            stats,
            frames,
            snapshots,
            snapshots_received: 0,
            render,
            input,
        })
    }

    /// The surface the render daemon draws to.
    pub fn surface(&self) -> Arc<HeadlessSurface> {
        Arc::clone(&self.surface)
    }

    /// Starts every daemon, supervises them until a quit is requested, the
    /// configured run time is over, or a mandatory daemon fails, then shuts
    /// everything down.
    ///
    /// # Errors
    /// Returns an error if a mandatory daemon failed. Shutdown has completed
    /// by then.
    pub fn run(&mut self) -> Result<RunSummary> {
        let started = self.orchestrator.start_all();
        for (id, e) in &started.failed {
            log::error!("Application: worker {id} did not start: {e}");
        }

        let begin = Instant::now();
        let run_for = self.config.run_for_ms.map(Duration::from_millis);
        log::info!(
            "Application: running (render {}, input {}){}.",
            self.render,
            self.input,
            match run_for {
                Some(limit) => format!(" for {limit:?}"),
                None => " until a quit is requested".to_string(),
            }
        );

        let outcome = loop {
            let slice = match run_for {
                Some(limit) => limit.saturating_sub(begin.elapsed()).min(SUPERVISION_SLICE),
                None => SUPERVISION_SLICE,
            };
            if self.orchestrator.wait_for_quit(slice) {
                log::info!("Application: quit requested.");
                break Ok(());
            }
            self.drain_input();
            if let Err(e) = self.orchestrator.health() {
                break Err(e);
            }
            if run_for.is_some_and(|limit| begin.elapsed() >= limit) {
                log::info!("Application: run time elapsed.");
                break Ok(());
            }
        };

        let shutdown = self.orchestrator.stop_all();
        self.drain_input();
        for (id, failure) in &shutdown.failures {
            log::warn!("Application: worker {id} failed: {failure}");
        }
        outcome.context("application stopped because a mandatory worker failed")?;

        Ok(RunSummary {
            frames_rendered: self.frames.load(Ordering::Relaxed),
            snapshots_received: self.snapshots_received,
            shutdown,
        })
    }

    /// Whether the graphics context was torn down.
    pub fn graphics_destroyed(&self) -> bool {
        self.stats.is_destroyed()
    }

    fn drain_input(&mut self) {
        for snapshot in self.snapshots.try_iter() {
            self.snapshots_received += 1;
            log::trace!("Application: input snapshot #{}", snapshot.sequence);
        }
    }
}
