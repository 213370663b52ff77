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

//! Display mode description and negotiation.

use crate::math::Extent2D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolution, refresh rate and color depth the display can be driven at.
///
/// A `refresh_rate` or `bits_per_pixel` of zero means "unspecified" and matches
/// any value during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayMode {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Refresh rate in Hz, or 0 for any.
    pub refresh_rate: u32,
    /// Color depth, or 0 for any.
    pub bits_per_pixel: u32,
}

impl DisplayMode {
    /// A fully specified mode.
    pub const fn new(width: u32, height: u32, refresh_rate: u32, bits_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            refresh_rate,
            bits_per_pixel,
        }
    }

    /// A windowed mode: only the size matters.
    pub const fn windowed(width: u32, height: u32) -> Self {
        Self::new(width, height, 0, 0)
    }

    /// The size of this mode.
    pub fn extent(&self) -> Extent2D {
        Extent2D::new(self.width, self.height)
    }

    /// Returns `true` if `self` satisfies every specified field of `desired`.
    pub fn satisfies(&self, desired: &DisplayMode) -> bool {
        self.width == desired.width
            && self.height == desired.height
            && (desired.refresh_rate == 0 || self.refresh_rate == desired.refresh_rate)
            && (desired.bits_per_pixel == 0 || self.bits_per_pixel == desired.bits_per_pixel)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {}Hz, {}bpp",
            self.width, self.height, self.refresh_rate, self.bits_per_pixel
        )
    }
}

/// Picks the first mode in `available` that satisfies `desired`.
pub fn select_display_mode(available: &[DisplayMode], desired: &DisplayMode) -> Option<DisplayMode> {
    let chosen = available.iter().copied().find(|mode| {
        log::trace!("Checking display mode {mode}");
        mode.satisfies(desired)
    });
    match chosen {
        Some(mode) => log::debug!("Using display mode {mode}"),
        None => log::debug!("No display mode satisfies {desired}"),
    }
    chosen
}

/// Display-mode enumeration and switching, owned by the windowing system.
pub trait DisplayBackend: Send {
    /// The mode the desktop is currently using.
    fn desktop_mode(&self) -> DisplayMode;

    /// Every mode the display supports.
    fn available_modes(&self) -> Vec<DisplayMode>;

    /// Chooses a mode out of `available` for the `desired` one.
    fn select_display_mode(
        &self,
        available: &[DisplayMode],
        desired: &DisplayMode,
    ) -> Option<DisplayMode> {
        select_display_mode(available, desired)
    }

    /// Switches the display to `mode`. Returns `false` if the switch failed.
    fn apply_display_mode(&mut self, mode: DisplayMode, fullscreen: bool) -> bool;
}
