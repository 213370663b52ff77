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

//! An off-screen `OutputSurface`.

use metronome_core::math::Extent2D;
use metronome_core::platform::OutputSurface;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A surface with no window behind it.
///
/// It reports itself displayable once a configurable delay has elapsed since it
/// was built, which mimics a window that the host has created but the window
/// system has not mapped yet.
#[derive(Debug)]
pub struct HeadlessSurface {
    created_at: Instant,
    ready_after: Duration,
    extent: Extent2D,
    title: Mutex<String>,
    close_requested: AtomicBool,
}

impl HeadlessSurface {
    /// The title currently applied to the surface.
    pub fn title(&self) -> String {
        match self.title.lock() {
            Ok(title) => title.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Simulates the user closing the window.
    pub fn request_close(&self) {
        if !self.close_requested.swap(true, Ordering::AcqRel) {
            log::info!("Headless surface: close requested.");
        }
    }
}

impl OutputSurface for HeadlessSurface {
    fn is_ready(&self) -> bool {
        self.created_at.elapsed() >= self.ready_after
    }

    fn set_title(&self, title: &str) {
        log::debug!("Headless surface: title set to '{title}'.");
        match self.title.lock() {
            Ok(mut current) => *current = title.to_string(),
            Err(poisoned) => *poisoned.into_inner() = title.to_string(),
        }
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn close_requested(&self) -> bool {
        self.close_requested.load(Ordering::Acquire)
    }
}

/// A builder for creating `HeadlessSurface` instances.
#[derive(Debug, Clone)]
pub struct HeadlessSurfaceBuilder {
    title: String,
    width: u32,
    height: u32,
    ready_after: Duration,
}

impl HeadlessSurfaceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            width: 640,
            height: 400,
            ready_after: Duration::ZERO,
        }
    }

    /// Sets the initial title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the surface size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Delays readiness by `delay` after `build`.
    pub fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_after = delay;
        self
    }

    /// Builds the surface. Its readiness delay starts counting now.
    pub fn build(self) -> HeadlessSurface {
        log::info!(
            "Building headless surface of size {}x{} (ready after {:?}).",
            self.width,
            self.height,
            self.ready_after
        );
        HeadlessSurface {
            created_at: Instant::now(),
            ready_after: self.ready_after,
            extent: Extent2D::new(self.width, self.height),
            title: Mutex::new(self.title),
            close_requested: AtomicBool::new(false),
        }
    }
}

impl Default for HeadlessSurfaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_becomes_ready_after_delay() {
        let surface = HeadlessSurfaceBuilder::new()
            .ready_after(Duration::from_millis(30))
            .build();
        assert!(!surface.is_ready());
        thread::sleep(Duration::from_millis(40));
        assert!(surface.is_ready());
    }

    #[test]
    fn test_title_and_close() {
        let surface = HeadlessSurfaceBuilder::new()
            .with_title("untitled")
            .with_dimensions(800, 600)
            .build();
        assert_eq!(surface.title(), "untitled");
        assert_eq!(surface.extent(), Extent2D::new(800, 600));

        surface.set_title("Game");
        assert_eq!(surface.title(), "Game");

        assert!(!surface.close_requested());
        surface.request_close();
        assert!(surface.close_requested());
    }
}
