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

//! Metronome runtime: runs the render and input daemons on a headless platform.
//!
//! Usage: `metronome-runtime [config.json]`

mod app;
mod config;

use anyhow::Result;
use app::Application;
use config::RuntimeConfig;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::from_file(&path)?,
        None => {
            log::info!("No configuration file given, using defaults.");
            RuntimeConfig::default()
        }
    };

    let mut app = Application::new(config)?;
    let summary = app.run()?;

    log::info!(
        "'{}' rendered {} frame(s), consumed {} input snapshot(s); shutdown took {:?}.",
        app.surface().title(),
        summary.frames_rendered,
        summary.snapshots_received,
        summary.shutdown.elapsed
    );
    if !app.graphics_destroyed() {
        log::warn!("The graphics context was not torn down.");
    }
    if !summary.shutdown.timed_out.is_empty() {
        log::warn!(
            "{} worker(s) were abandoned at shutdown.",
            summary.shutdown.timed_out.len()
        );
    }
    Ok(())
}
