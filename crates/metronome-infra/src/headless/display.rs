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

use super::graphics::HeadlessStats;
use metronome_core::platform::{DisplayBackend, DisplayMode};
use std::sync::Arc;

/// The desktop mode of a default headless display.
pub const HEADLESS_DESKTOP_MODE: DisplayMode = DisplayMode::new(1920, 1080, 60, 32);

/// A display with a fixed list of supported modes.
#[derive(Debug)]
pub struct HeadlessDisplay {
    desktop: DisplayMode,
    modes: Vec<DisplayMode>,
    stats: Arc<HeadlessStats>,
}

impl HeadlessDisplay {
    /// A 1920x1080 desktop offering a handful of common modes.
    pub fn new(stats: Arc<HeadlessStats>) -> Self {
        let modes = vec![
            DisplayMode::new(640, 480, 60, 32),
            DisplayMode::new(1280, 720, 60, 32),
            DisplayMode::new(1920, 1080, 30, 32),
            HEADLESS_DESKTOP_MODE,
        ];
        Self::with_modes(HEADLESS_DESKTOP_MODE, modes, stats)
    }

    /// A display with an explicit desktop mode and mode list.
    pub fn with_modes(
        desktop: DisplayMode,
        modes: Vec<DisplayMode>,
        stats: Arc<HeadlessStats>,
    ) -> Self {
        Self {
            desktop,
            modes,
            stats,
        }
    }
}

impl DisplayBackend for HeadlessDisplay {
    fn desktop_mode(&self) -> DisplayMode {
        self.desktop
    }

    fn available_modes(&self) -> Vec<DisplayMode> {
        self.modes.clone()
    }

    fn apply_display_mode(&mut self, mode: DisplayMode, fullscreen: bool) -> bool {
        if mode.width == 0 || mode.height == 0 {
            log::warn!("Headless display: refusing empty mode {mode}.");
            return false;
        }
        if fullscreen && !self.modes.contains(&mode) {
            log::warn!("Headless display: {mode} is not a supported full-screen mode.");
            return false;
        }
        log::info!("Headless display: applied {mode} (fullscreen={fullscreen}).");
        self.stats.record_mode(mode, fullscreen);
        true
    }
}
