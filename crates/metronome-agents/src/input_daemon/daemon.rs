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

use crossbeam_channel::{Receiver, Sender, TrySendError};
use metronome_core::platform::{InputDevice, InputSnapshot};
use metronome_core::{Daemon, DaemonContext, DaemonError, QuitSignal};

/// Polls per second the input daemon targets by default.
pub const DEFAULT_INPUT_RATE: f64 = 30.0;

/// Snapshots buffered for the consumer before new ones are dropped.
pub const SNAPSHOT_QUEUE_CAPACITY: usize = 64;

/// The daemon that samples the input devices.
///
/// Every tick polls the device once and offers the snapshot to a bounded
/// channel. A slow consumer never stalls the poller: snapshots that do not fit
/// are dropped.
pub struct InputDaemon {
    device: Box<dyn InputDevice>,
    tick_rate: f64,
    snapshots: Sender<InputSnapshot>,
    quit: Option<QuitSignal>,
    acquired: bool,
    dropped: u64,
}

impl InputDaemon {
    /// Creates the daemon and the receiver its snapshots are published on.
    pub fn new(device: Box<dyn InputDevice>) -> (Self, Receiver<InputSnapshot>) {
        let (snapshots, receiver) = crossbeam_channel::bounded(SNAPSHOT_QUEUE_CAPACITY);
        let daemon = Self {
            device,
            tick_rate: DEFAULT_INPUT_RATE,
            snapshots,
            quit: None,
            acquired: false,
            dropped: 0,
        };
        (daemon, receiver)
    }

    /// Overrides the polling rate.
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Fires `quit` when a snapshot carries a quit request.
    pub fn with_quit_signal(mut self, quit: QuitSignal) -> Self {
        self.quit = Some(quit);
        self
    }
}

impl Daemon for InputDaemon {
    fn name(&self) -> &str {
        "InputDaemon"
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    fn init(&mut self, _context: &DaemonContext) -> Result<(), DaemonError> {
        self.device.acquire().map_err(|e| match e {
            DaemonError::InitializationFailure(_) => e,
            other => DaemonError::init(format!(
                "could not acquire '{}': {other}",
                self.device.name()
            )),
        })?;
        self.acquired = true;
        log::info!("InputDaemon: acquired '{}'.", self.device.name());
        Ok(())
    }

    fn execute(&mut self, _context: &DaemonContext) -> Result<(), DaemonError> {
        let snapshot = self.device.poll();

        if snapshot.quit_requested {
            if let Some(quit) = &self.quit {
                quit.request();
            }
        }

        match self.snapshots.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(snapshot)) => {
                self.dropped += 1;
                log::trace!(
                    "InputDaemon: queue full, dropped snapshot #{}.",
                    snapshot.sequence
                );
            }
            // Nobody is listening; polling still feeds the quit signal.
            Err(TrySendError::Disconnected(_)) => {}
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.acquired {
            self.device.release();
            self.acquired = false;
            log::info!(
                "InputDaemon: released '{}' ({} snapshot(s) dropped).",
                self.device.name(),
                self.dropped
            );
        }
    }
}
