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

//! Graphics context lifecycle and the per-frame render callback.

use super::display::DisplayMode;
use super::surface::OutputSurface;
use crate::error::DaemonError;
use crate::math::{Extent2D, LinearRgba};
use std::ops::BitOr;

/// Fixed-function state toggled on during one-time graphics setup.
///
/// Multiple features can be combined using bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GraphicsFeatures {
    bits: u32,
}

impl GraphicsFeatures {
    /// No features.
    pub const NONE: Self = Self { bits: 0 };
    /// Depth testing.
    pub const DEPTH_TEST: Self = Self { bits: 1 << 0 };
    /// Source-alpha blending.
    pub const BLEND: Self = Self { bits: 1 << 1 };
    /// Anti-aliased lines.
    pub const LINE_SMOOTH: Self = Self { bits: 1 << 2 };
    /// Back-face culling.
    pub const CULL_BACK: Self = Self { bits: 1 << 3 };
    /// Everything the render daemon enables by default.
    pub const STANDARD: Self = Self {
        bits: Self::DEPTH_TEST.bits | Self::BLEND.bits | Self::LINE_SMOOTH.bits | Self::CULL_BACK.bits,
    };

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns `true` if every feature in `other` is enabled in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }
}

impl BitOr for GraphicsFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

/// The projection loaded during setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// A perspective projection.
    Perspective {
        /// Vertical field of view, in degrees.
        fov_y_degrees: f32,
        /// Width over height of the viewport.
        aspect: f32,
        /// Distance to the near clipping plane.
        near: f32,
        /// Distance to the far clipping plane.
        far: f32,
    },
    /// An orthographic projection covering the viewport in pixels.
    Orthographic,
}

/// Everything applied once to a freshly created graphics context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsSetup {
    /// Viewport covering the negotiated display mode.
    pub viewport: Extent2D,
    /// Color the frame buffer is cleared to.
    pub clear_color: LinearRgba,
    /// Projection loaded before the first frame.
    pub projection: Projection,
    /// Fixed-function state to enable.
    pub features: GraphicsFeatures,
}

/// A live graphics context, bound to the thread that created it.
///
/// All calls happen on the render daemon's thread, which is also the thread
/// that created the context.
pub trait GraphicsContext: Send {
    /// Applies the one-time state setup.
    fn apply_setup(&mut self, setup: &GraphicsSetup) -> Result<(), DaemonError>;

    /// Waits on the platform's vertical sync / frame limiter for `frame_rate`.
    fn sync_frame(&mut self, frame_rate: u32);

    /// Clears the color and depth buffers.
    fn clear(&mut self);

    /// Presents (swaps) the back buffer.
    fn present(&mut self) -> Result<(), DaemonError>;

    /// Releases every resource held by the context.
    fn destroy(&mut self);
}

/// Creates graphics contexts attached to an output surface.
pub trait GraphicsBackend: Send {
    /// Attaches to `surface` and creates a context for `mode`.
    fn create_context(
        &mut self,
        surface: &dyn OutputSurface,
        mode: DisplayMode,
    ) -> Result<Box<dyn GraphicsContext>, DaemonError>;
}

/// The application's per-frame draw callback.
///
/// Runs on the pacing-critical path once per render tick, between clearing
/// and presenting the frame. It must not block on unrelated I/O and must not
/// create or destroy the output surface.
pub trait FrameRenderer: Send {
    /// Draws one frame.
    fn render(&mut self);
}

impl<F> FrameRenderer for F
where
    F: FnMut() + Send,
{
    fn render(&mut self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_features() {
        let features = GraphicsFeatures::STANDARD;
        assert!(features.contains(GraphicsFeatures::DEPTH_TEST | GraphicsFeatures::BLEND));
        assert!(features.contains(GraphicsFeatures::CULL_BACK));
        assert!(!GraphicsFeatures::NONE.contains(GraphicsFeatures::BLEND));
    }

    #[test]
    fn test_closure_is_a_frame_renderer() {
        let mut frames = 0;
        {
            let mut renderer = || frames += 1;
            FrameRenderer::render(&mut renderer);
            FrameRenderer::render(&mut renderer);
        }
        assert_eq!(frames, 2);
    }
}
