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

//! The capability interface for background daemons.

use crate::error::{DaemonError, PacerError};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A unit of background work driven by a managed, paced loop.
///
/// A daemon only describes *what* happens on each tick. Thread ownership, the
/// run flag, the start barrier and pacing all belong to the loop runner that
/// drives it, so render, input, and any other daemon share one lifecycle.
///
/// Every method is called on the daemon's own thread. `init` and `execute`
/// must block only for bounded periods: cancellation is cooperative, and a
/// step that never returns cannot be stopped.
pub trait Daemon: Send {
    /// Human-readable name, also used as the thread name.
    fn name(&self) -> &str;

    /// Target rate of the loop, in ticks per second.
    fn tick_rate(&self) -> f64;

    /// Called once before the first tick. May block while waiting for an
    /// external resource, as long as it keeps observing `context`.
    fn init(&mut self, _context: &DaemonContext) -> Result<(), DaemonError> {
        Ok(())
    }

    /// Performs one tick of work.
    fn execute(&mut self, context: &DaemonContext) -> Result<(), DaemonError>;

    /// Called once after the loop has exited, whether or not `init` completed.
    fn shutdown(&mut self) {}
}

/// The view a daemon gets of its own loop while it runs.
///
/// Lets a daemon notice a pending stop during long waits and ask for a new
/// pacing rate. A context lives on the daemon's thread and is never shared.
#[derive(Debug)]
pub struct DaemonContext {
    name: String,
    running: Arc<AtomicBool>,
    requested_rate: Cell<Option<f64>>,
}

impl DaemonContext {
    /// Creates a context observing the given run flag.
    pub fn new(name: impl Into<String>, running: Arc<AtomicBool>) -> Self {
        Self {
            name: name.into(),
            running,
            requested_rate: Cell::new(None),
        }
    }

    /// The name of the daemon this context belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` once the owner has asked the loop to stop.
    pub fn is_stop_requested(&self) -> bool {
        !self.running.load(Ordering::Acquire)
    }

    /// Sleeps for `duration`, unless a stop has already been requested.
    ///
    /// # Errors
    /// Returns [`DaemonError::InterruptedWait`] if the loop is stopping.
    pub fn sleep(&self, duration: Duration) -> Result<(), DaemonError> {
        if self.is_stop_requested() {
            return Err(self.interrupted());
        }
        thread::sleep(duration);
        Ok(())
    }

    /// Polls `ready` every `poll_interval` until it returns `true`.
    ///
    /// Returns how many times `ready` was evaluated. The wait gives up as soon
    /// as a stop is requested, so shutdown is never held hostage by a resource
    /// that never appears.
    pub fn wait_until<F>(&self, mut ready: F, poll_interval: Duration) -> Result<u32, DaemonError>
    where
        F: FnMut() -> bool,
    {
        let mut polls = 0u32;
        loop {
            if self.is_stop_requested() {
                return Err(self.interrupted());
            }
            polls += 1;
            if ready() {
                return Ok(polls);
            }
            log::debug!("{}: resource not ready after {} poll(s)", self.name, polls);
            thread::sleep(poll_interval);
        }
    }

    /// Asks the loop to pace at `rate` from the next tick on.
    ///
    /// # Errors
    /// Returns [`PacerError::InvalidRate`] immediately for a non-positive rate;
    /// nothing is queued in that case.
    pub fn request_tick_rate(&self, rate: f64) -> Result<(), PacerError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PacerError::InvalidRate(rate));
        }
        self.requested_rate.set(Some(rate));
        Ok(())
    }

    /// Takes the pending rate request, if any. Called by the loop runner.
    pub fn take_requested_rate(&self) -> Option<f64> {
        self.requested_rate.take()
    }

    fn interrupted(&self) -> DaemonError {
        DaemonError::InterruptedWait(format!("{} was asked to stop", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn context(running: bool) -> (DaemonContext, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(running));
        (DaemonContext::new("TestDaemon", Arc::clone(&flag)), flag)
    }

    #[test]
    fn test_wait_until_counts_polls() {
        let (ctx, _flag) = context(true);
        let mut calls = 0;
        let polls = ctx
            .wait_until(
                || {
                    calls += 1;
                    calls == 3
                },
                Duration::from_millis(1),
            )
            .unwrap();
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_wait_until_aborts_on_stop() {
        let (ctx, flag) = context(true);
        let stopper = {
            let flag = Arc::clone(&flag);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                flag.store(false, Ordering::Release);
            })
        };

        let start = Instant::now();
        let result = ctx.wait_until(|| false, Duration::from_millis(5));
        stopper.join().unwrap();

        assert!(result.unwrap_err().is_interrupted());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_sleep_refuses_when_stopping() {
        let (ctx, _flag) = context(false);
        assert!(ctx.is_stop_requested());
        assert!(ctx.sleep(Duration::from_secs(10)).is_err());
    }

    #[test]
    fn test_rate_request_is_validated() {
        let (ctx, _flag) = context(true);
        assert_eq!(
            ctx.request_tick_rate(0.0),
            Err(PacerError::InvalidRate(0.0))
        );
        assert_eq!(ctx.take_requested_rate(), None);

        ctx.request_tick_rate(15.0).unwrap();
        assert_eq!(ctx.take_requested_rate(), Some(15.0));
        assert_eq!(ctx.take_requested_rate(), None);
    }
}
