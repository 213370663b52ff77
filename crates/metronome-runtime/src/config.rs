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

//! Host configuration, loaded from JSON.

use anyhow::{Context, Result};
use metronome_agents::RenderConfig;
use metronome_control::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Everything the runtime binary can be configured with.
///
/// Any field missing from the JSON document takes its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Application name, used as the surface title.
    pub app_name: String,
    /// Requested width of the display mode.
    pub width: u32,
    /// Requested height of the display mode.
    pub height: u32,
    /// Whether to request an exclusive full-screen mode.
    pub fullscreen: bool,
    /// Frames per second of the render daemon.
    pub render_rate: u32,
    /// Polls per second of the input daemon.
    pub input_rate: f64,
    /// Per-worker join timeout at shutdown, in milliseconds. 0 waits forever.
    pub join_timeout_ms: u64,
    /// Delay between two surface readiness checks, in milliseconds.
    pub surface_poll_interval_ms: u64,
    /// How long the headless surface takes to become displayable.
    pub surface_delay_ms: u64,
    /// Stops the application on its own after this many milliseconds.
    pub run_for_ms: Option<u64>,
    /// Whether a render failure should bring the application down.
    pub render_mandatory: bool,
    /// Makes the headless input device report a quit after this many polls.
    pub quit_after_polls: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            app_name: "Game".to_string(),
            width: 640,
            height: 400,
            fullscreen: false,
            render_rate: 60,
            input_rate: 30.0,
            join_timeout_ms: 2000,
            surface_poll_interval_ms: 200,
            surface_delay_ms: 0,
            run_for_ms: None,
            render_mandatory: true,
            quit_after_polls: None,
        }
    }
}

impl RuntimeConfig {
    /// Load the configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid runtime configuration")
    }

    /// Load the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Settings for the orchestrator.
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            join_timeout: Duration::from_millis(self.join_timeout_ms),
        }
    }

    /// Settings for the render daemon.
    pub fn render(&self) -> RenderConfig {
        RenderConfig {
            title: self.app_name.clone(),
            width: self.width,
            height: self.height,
            fullscreen: self.fullscreen,
            frame_rate: self.render_rate,
            surface_poll_interval: Duration::from_millis(self.surface_poll_interval_ms),
            ..RenderConfig::default()
        }
    }
}
