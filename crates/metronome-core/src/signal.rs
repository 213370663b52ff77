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

//! Application-wide quit requests.
//!
//! Whoever owns the workers holds the [`QuitListener`]; anything that may want
//! to end the application (a closed window, a quit key) is handed a cloned
//! [`QuitSignal`] at construction time.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::time::Duration;

/// Creates a connected quit signal / listener pair.
pub fn quit_channel() -> (QuitSignal, QuitListener) {
    // One slot is enough: a quit is a level, not a queue of events.
    let (tx, rx) = crossbeam_channel::bounded(1);
    (QuitSignal { tx }, QuitListener { rx })
}

/// The sending half: requests that the application shut down.
#[derive(Debug, Clone)]
pub struct QuitSignal {
    tx: Sender<()>,
}

impl QuitSignal {
    /// Requests a quit. Repeated requests collapse into one.
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) => log::info!("Quit requested."),
            Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                log::debug!("Quit requested after the listener was dropped.");
            }
        }
    }
}

/// The receiving half, held by the owner of the workers.
#[derive(Debug)]
pub struct QuitListener {
    rx: Receiver<()>,
}

impl QuitListener {
    /// Blocks until a quit is requested or `timeout` elapses.
    ///
    /// Returns `true` if a quit was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Returns `true` if a quit has been requested, without blocking.
    pub fn try_take(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}
