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

use metronome_core::math::{Extent2D, LinearRgba};
use metronome_core::platform::{GraphicsFeatures, GraphicsSetup, Projection};
use std::time::Duration;

/// Frames per second the render daemon targets by default.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// How often the render daemon checks whether the surface became displayable.
pub const DEFAULT_SURFACE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration of a [`RenderDaemon`](super::RenderDaemon).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Title applied to the surface once it is ready.
    pub title: String,
    /// Requested width of the display mode, in pixels.
    pub width: u32,
    /// Requested height of the display mode, in pixels.
    pub height: u32,
    /// Whether to switch to an exclusive full-screen mode.
    pub fullscreen: bool,
    /// Target frames per second. Also the daemon's tick rate.
    pub frame_rate: u32,
    /// Delay between two surface readiness checks.
    pub surface_poll_interval: Duration,
    /// Color the frame buffer is cleared to.
    pub clear_color: LinearRgba,
    /// Vertical field of view of the perspective projection, in degrees.
    pub fov_y_degrees: f32,
    /// Near clipping plane.
    pub near_plane: f32,
    /// Far clipping plane.
    pub far_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Game".to_string(),
            width: 640,
            height: 400,
            fullscreen: false,
            frame_rate: DEFAULT_FRAME_RATE,
            surface_poll_interval: DEFAULT_SURFACE_POLL_INTERVAL,
            clear_color: LinearRgba::BLACK,
            fov_y_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 25.0,
        }
    }
}

impl RenderConfig {
    /// The one-time graphics state for a viewport of the given size.
    pub fn graphics_setup(&self, viewport: Extent2D) -> GraphicsSetup {
        GraphicsSetup {
            viewport,
            clear_color: self.clear_color,
            projection: Projection::Perspective {
                fov_y_degrees: self.fov_y_degrees,
                aspect: viewport.aspect_ratio(),
                near: self.near_plane,
                far: self.far_plane,
            },
            features: GraphicsFeatures::STANDARD,
        }
    }
}
