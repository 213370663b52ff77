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

//! Defines the RenderDaemon, which owns the graphics context and draws frames.

use super::config::RenderConfig;
use metronome_core::platform::{
    DisplayBackend, DisplayMode, FrameRenderer, GraphicsBackend, GraphicsContext, OutputSurface,
};
use metronome_core::{Daemon, DaemonContext, DaemonError, QuitSignal};
use std::sync::Arc;

/// The daemon that renders the application's frames.
///
/// During `init` it blocks (interruptibly) until the output surface is
/// displayable, titles it, negotiates a display mode and creates the graphics
/// context. Each tick then clears, calls the frame callback and presents.
pub struct RenderDaemon {
    config: RenderConfig,
    surface: Arc<dyn OutputSurface>,
    display: Box<dyn DisplayBackend>,
    graphics: Box<dyn GraphicsBackend>,
    renderer: Box<dyn FrameRenderer>,
    /// Created on the worker thread during `init`.
    context: Option<Box<dyn GraphicsContext>>,
    quit: Option<QuitSignal>,
    frames: u64,
}

impl RenderDaemon {
    /// Creates a new `RenderDaemon`.
    ///
    /// # Arguments
    /// * `config`: Title, display mode request and frame rate.
    /// * `surface`: The output surface, shared with the host that created it.
    /// * `display`: Enumerates and applies display modes.
    /// * `graphics`: Creates the graphics context once the surface is ready.
    /// * `renderer`: The per-frame draw callback.
    pub fn new(
        config: RenderConfig,
        surface: Arc<dyn OutputSurface>,
        display: Box<dyn DisplayBackend>,
        graphics: Box<dyn GraphicsBackend>,
        renderer: Box<dyn FrameRenderer>,
    ) -> Self {
        Self {
            config,
            surface,
            display,
            graphics,
            renderer,
            context: None,
            quit: None,
            frames: 0,
        }
    }

    /// Fires `quit` when the surface reports that the user asked to close it.
    pub fn with_quit_signal(mut self, quit: QuitSignal) -> Self {
        self.quit = Some(quit);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Picks the mode to apply and whether it is full-screen.
    ///
    /// A full-screen request only succeeds on an exact match of the desktop
    /// mode; otherwise the daemon falls back to a window of the requested size.
    fn negotiate_display_mode(&self) -> (DisplayMode, bool) {
        let windowed = DisplayMode::windowed(self.config.width, self.config.height);
        if !self.config.fullscreen {
            return (windowed, false);
        }

        let desktop = self.display.desktop_mode();
        let available = self.display.available_modes();
        match self.display.select_display_mode(&available, &desktop) {
            Some(mode) => (mode, true),
            None => {
                log::warn!(
                    "RenderDaemon: no full-screen mode matches the desktop ({desktop}). Using a {}x{} window.",
                    self.config.width,
                    self.config.height
                );
                (windowed, false)
            }
        }
    }
}

impl Daemon for RenderDaemon {
    fn name(&self) -> &str {
        "RenderDaemon"
    }

    fn tick_rate(&self) -> f64 {
        f64::from(self.config.frame_rate)
    }

    fn init(&mut self, context: &DaemonContext) -> Result<(), DaemonError> {
        let surface = Arc::clone(&self.surface);
        let polls = context.wait_until(|| surface.is_ready(), self.config.surface_poll_interval)?;
        log::info!("RenderDaemon: surface ready after {polls} poll(s).");

        self.surface.set_title(&self.config.title);

        let (mode, fullscreen) = self.negotiate_display_mode();
        if !self.display.apply_display_mode(mode, fullscreen) {
            return Err(DaemonError::init(format!(
                "display mode {mode} (fullscreen={fullscreen}) was rejected"
            )));
        }

        let mut graphics = self.graphics.create_context(self.surface.as_ref(), mode)?;
        let setup = self.config.graphics_setup(mode.extent());
        if let Err(e) = graphics.apply_setup(&setup) {
            graphics.destroy();
            return Err(e);
        }

        log::info!("RenderDaemon: graphics ready on {mode} (fullscreen={fullscreen}).");
        self.context = Some(graphics);
        Ok(())
    }

    fn execute(&mut self, _context: &DaemonContext) -> Result<(), DaemonError> {
        if self.surface.close_requested() {
            if let Some(quit) = &self.quit {
                quit.request();
            }
        }

        let Some(graphics) = self.context.as_mut() else {
            return Err(DaemonError::execution("no graphics context"));
        };

        graphics.sync_frame(self.config.frame_rate);
        graphics.clear();
        self.renderer.render();
        graphics.present()?;
        self.frames += 1;
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut graphics) = self.context.take() {
            graphics.destroy();
            log::info!(
                "RenderDaemon: graphics context destroyed after {} frame(s).",
                self.frames
            );
        }
    }
}
