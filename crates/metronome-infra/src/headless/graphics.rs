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

//! A graphics backend that draws nothing and records everything.

use metronome_core::platform::{
    DisplayMode, GraphicsBackend, GraphicsContext, GraphicsSetup, OutputSurface,
};
use metronome_core::DaemonError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// What the headless display and graphics backends observed.
///
/// Shared between the backends (which move into the render daemon) and
/// whoever wants to inspect them afterwards.
#[derive(Debug, Default)]
pub struct HeadlessStats {
    applied_mode: Mutex<Option<(DisplayMode, bool)>>,
    setup: Mutex<Option<GraphicsSetup>>,
    context_thread: Mutex<Option<ThreadId>>,
    contexts_created: AtomicU64,
    frames_presented: AtomicU64,
    destroyed: AtomicBool,
}

impl HeadlessStats {
    /// The last display mode applied, and whether it was full-screen.
    pub fn applied_mode(&self) -> Option<(DisplayMode, bool)> {
        lock_copy(&self.applied_mode)
    }

    /// The setup applied to the context, if any.
    pub fn setup(&self) -> Option<GraphicsSetup> {
        lock_copy(&self.setup)
    }

    /// The thread the context was created on.
    pub fn context_thread(&self) -> Option<ThreadId> {
        lock_copy(&self.context_thread)
    }

    /// Number of contexts created so far.
    pub fn contexts_created(&self) -> u64 {
        self.contexts_created.load(Ordering::Relaxed)
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented.load(Ordering::Relaxed)
    }

    /// Whether the context has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub(crate) fn record_mode(&self, mode: DisplayMode, fullscreen: bool) {
        store(&self.applied_mode, (mode, fullscreen));
    }
}

fn lock_copy<T: Copy>(slot: &Mutex<Option<T>>) -> Option<T> {
    match slot.lock() {
        Ok(value) => *value,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn store<T>(slot: &Mutex<Option<T>>, value: T) {
    match slot.lock() {
        Ok(mut current) => *current = Some(value),
        Err(poisoned) => *poisoned.into_inner() = Some(value),
    }
}

/// Creates [`HeadlessContext`]s.
#[derive(Debug)]
pub struct HeadlessGraphics {
    stats: Arc<HeadlessStats>,
}

impl HeadlessGraphics {
    /// Creates a backend reporting into `stats`.
    pub fn new(stats: Arc<HeadlessStats>) -> Self {
        Self { stats }
    }
}

impl GraphicsBackend for HeadlessGraphics {
    fn create_context(
        &mut self,
        surface: &dyn OutputSurface,
        mode: DisplayMode,
    ) -> Result<Box<dyn GraphicsContext>, DaemonError> {
        if !surface.is_ready() {
            return Err(DaemonError::init("surface is not displayable"));
        }
        store(&self.stats.context_thread, thread::current().id());
        self.stats.contexts_created.fetch_add(1, Ordering::Relaxed);
        log::info!("Headless graphics context created for {mode}.");
        Ok(Box::new(HeadlessContext {
            stats: Arc::clone(&self.stats),
        }))
    }
}

/// A context with no GPU behind it.
#[derive(Debug)]
pub struct HeadlessContext {
    stats: Arc<HeadlessStats>,
}

impl GraphicsContext for HeadlessContext {
    fn apply_setup(&mut self, setup: &GraphicsSetup) -> Result<(), DaemonError> {
        log::debug!("Headless context: setup {setup:?}");
        store(&self.stats.setup, *setup);
        Ok(())
    }

    // The worker's pacer already holds the frame rate.
    fn sync_frame(&mut self, _frame_rate: u32) {}

    fn clear(&mut self) {}

    fn present(&mut self) -> Result<(), DaemonError> {
        if self.stats.is_destroyed() {
            return Err(DaemonError::execution("context was destroyed"));
        }
        self.stats.frames_presented.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn destroy(&mut self) {
        self.stats.destroyed.store(true, Ordering::Release);
        log::info!("Headless graphics context destroyed.");
    }
}
