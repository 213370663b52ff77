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

//! Fixed-rate loop pacing.

use crate::error::PacerError;
use std::thread;
use std::time::{Duration, Instant};

/// Length of one measurement window for the actual-rate estimate.
const MEASUREMENT_WINDOW: Duration = Duration::from_secs(1);

/// Below this much remaining wait the pacer yields instead of sleeping,
/// since `thread::sleep` routinely overshoots by about a millisecond.
const SPIN_THRESHOLD: Duration = Duration::from_millis(1);

/// Paces a loop body to a target number of ticks per second and measures the
/// rate actually achieved.
///
/// A pacer is owned and mutated by exactly one loop. Call [`tick`](Self::tick)
/// once per iteration, after that iteration's work is done: it blocks for
/// whatever is left of the tick interval, then folds the iteration into the
/// rolling one-second measurement.
#[derive(Debug, Clone)]
pub struct TickPacer {
    target_rate: f64,
    interval: Duration,
    last_tick: Option<Instant>,
    window_elapsed: Duration,
    window_ticks: u64,
    actual_rate: f64,
    total_ticks: u64,
    run_time: Duration,
    behind_schedule: bool,
}

impl TickPacer {
    /// Creates a pacer targeting `rate` ticks per second.
    ///
    /// # Errors
    /// Returns [`PacerError::InvalidRate`] if `rate` is not a finite number
    /// greater than zero.
    pub fn new(rate: f64) -> Result<Self, PacerError> {
        let interval = interval_for(rate)?;
        Ok(Self {
            target_rate: rate,
            interval,
            last_tick: None,
            window_elapsed: Duration::ZERO,
            window_ticks: 0,
            actual_rate: 0.0,
            total_ticks: 0,
            run_time: Duration::ZERO,
            behind_schedule: false,
        })
    }

    /// Changes the target rate and recomputes the per-tick interval.
    ///
    /// On error the previous rate stays in effect.
    pub fn set_target_rate(&mut self, rate: f64) -> Result<(), PacerError> {
        self.interval = interval_for(rate)?;
        self.target_rate = rate;
        Ok(())
    }

    /// Sets a new target rate, then paces the current tick against it.
    pub fn sync_at(&mut self, rate: f64) -> Result<(), PacerError> {
        self.set_target_rate(rate)?;
        self.tick();
        Ok(())
    }

    /// Forgets the last tick timestamp so the next tick starts a fresh interval.
    ///
    /// Used after a long blocking setup step so that the setup time is not
    /// counted against the first measurement window.
    pub fn restart_clock(&mut self) {
        self.last_tick = None;
        self.window_elapsed = Duration::ZERO;
        self.window_ticks = 0;
    }

    /// Blocks until one tick interval has passed since the previous tick, then
    /// updates the throughput measurement.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let last = *self.last_tick.get_or_insert(now);
        let deadline = last + self.interval;

        if now < deadline {
            wait_until(deadline);
        } else if now > deadline {
            self.behind_schedule = true;
            log::trace!(
                "TickPacer: tick overran its {:?} interval by {:?}",
                self.interval,
                now - deadline
            );
        }

        let finished = Instant::now();
        let elapsed = finished.saturating_duration_since(last);
        self.last_tick = Some(finished);
        self.record(elapsed);
        self.behind_schedule = false;
    }

    fn record(&mut self, elapsed: Duration) {
        self.total_ticks += 1;
        self.run_time += elapsed;
        self.window_ticks += 1;
        self.window_elapsed += elapsed;

        if self.window_elapsed >= MEASUREMENT_WINDOW {
            self.actual_rate = self.window_ticks as f64 / self.window_elapsed.as_secs_f64();
            self.window_elapsed = Duration::ZERO;
            self.window_ticks = 0;
        }
    }

    /// The configured rate in ticks per second.
    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    /// The time budget of one tick (`1 / target_rate`).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The rate measured over the last complete one-second window.
    ///
    /// Zero until the first window completes.
    pub fn actual_rate(&self) -> f64 {
        self.actual_rate
    }

    /// Number of ticks paced since creation.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Total time covered by the paced ticks.
    pub fn run_time(&self) -> Duration {
        self.run_time
    }

    /// Diagnostic only: set while a tick that overran its interval is being
    /// accounted for, and cleared before [`tick`](Self::tick) returns. Callers
    /// will almost never observe `true` and must not treat this as a backlog
    /// indicator.
    pub fn is_behind_schedule(&self) -> bool {
        self.behind_schedule
    }
}

fn interval_for(rate: f64) -> Result<Duration, PacerError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(PacerError::InvalidRate(rate));
    }
    Duration::try_from_secs_f64(1.0 / rate).map_err(|_| PacerError::InvalidRate(rate))
}

fn wait_until(deadline: Instant) {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        let remaining = deadline - now;
        if remaining > SPIN_THRESHOLD {
            thread::sleep(remaining - SPIN_THRESHOLD);
        } else {
            thread::yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_reciprocal_of_rate() {
        let pacer = TickPacer::new(50.0).unwrap();
        assert!((pacer.interval().as_secs_f64() - 0.02).abs() < 1e-9);
        assert_eq!(pacer.target_rate(), 50.0);
    }

    #[test]
    fn test_invalid_rates_are_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TickPacer::new(rate),
                Err(PacerError::InvalidRate(_))
            ));
        }
    }

    #[test]
    fn test_failed_rate_change_keeps_previous_rate() {
        let mut pacer = TickPacer::new(30.0).unwrap();
        let before = pacer.interval();

        assert_eq!(
            pacer.set_target_rate(-5.0),
            Err(PacerError::InvalidRate(-5.0))
        );
        assert_eq!(pacer.target_rate(), 30.0);
        assert_eq!(pacer.interval(), before);
    }

    #[test]
    fn test_rate_change_recomputes_interval() {
        let mut pacer = TickPacer::new(30.0).unwrap();
        pacer.set_target_rate(200.0).unwrap();
        assert!((pacer.interval().as_secs_f64() - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_tick_waits_for_interval() {
        let mut pacer = TickPacer::new(100.0).unwrap();
        pacer.tick();
        let start = Instant::now();
        for _ in 0..5 {
            pacer.tick();
        }
        assert!(start.elapsed() >= Duration::from_millis(45));
        assert_eq!(pacer.total_ticks(), 6);
    }

    #[test]
    fn test_actual_rate_zero_before_first_window() {
        let mut pacer = TickPacer::new(100.0).unwrap();
        pacer.tick();
        assert_eq!(pacer.actual_rate(), 0.0);
        assert!(!pacer.is_behind_schedule());
    }

    #[test]
    fn test_measured_rate_tracks_target() {
        let mut pacer = TickPacer::new(100.0).unwrap();
        for _ in 0..130 {
            pacer.tick();
        }
        let measured = pacer.actual_rate();
        assert!(
            (90.0..=110.0).contains(&measured),
            "measured rate {measured} outside tolerance"
        );
        assert!(pacer.run_time() >= Duration::from_secs(1));
    }

    #[test]
    fn test_overrunning_tick_does_not_sleep() {
        let mut pacer = TickPacer::new(1000.0).unwrap();
        pacer.tick();
        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        pacer.tick();
        assert!(start.elapsed() < Duration::from_millis(5));
        assert!(!pacer.is_behind_schedule());
    }

    #[test]
    fn test_sync_at_applies_new_rate() {
        let mut pacer = TickPacer::new(10.0).unwrap();
        pacer.sync_at(500.0).unwrap();
        assert_eq!(pacer.target_rate(), 500.0);
        assert!(pacer.sync_at(0.0).is_err());
        assert_eq!(pacer.target_rate(), 500.0);
    }

    #[test]
    fn test_restart_clock_resets_window() {
        let mut pacer = TickPacer::new(200.0).unwrap();
        pacer.tick();
        pacer.tick();
        pacer.restart_clock();
        let start = Instant::now();
        pacer.tick();
        // A fresh clock paces a full interval from now.
        assert!(start.elapsed() >= Duration::from_millis(4));
        assert_eq!(pacer.total_ticks(), 3);
    }
}
