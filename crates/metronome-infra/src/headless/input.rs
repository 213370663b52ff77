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

//! A scripted input device.

use metronome_core::platform::{InputDevice, InputSnapshot};
use metronome_core::DaemonError;

/// An input device with nothing plugged in.
///
/// Every poll yields an empty snapshot with an increasing sequence number. It
/// can be told to report a quit request after a number of polls, or to refuse
/// acquisition altogether.
#[derive(Debug, Default)]
pub struct HeadlessInput {
    sequence: u64,
    quit_after: Option<u64>,
    unavailable: bool,
    acquired: bool,
}

impl HeadlessInput {
    /// Creates a device that never asks to quit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a quit request from the `polls`-th poll on.
    pub fn with_quit_after(mut self, polls: u64) -> Self {
        self.quit_after = Some(polls);
        self
    }

    /// Creates a device whose acquisition always fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Whether the device is currently acquired.
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl InputDevice for HeadlessInput {
    fn name(&self) -> &str {
        "headless input"
    }

    fn acquire(&mut self) -> Result<(), DaemonError> {
        if self.unavailable {
            return Err(DaemonError::init("headless input is unavailable"));
        }
        self.acquired = true;
        Ok(())
    }

    fn poll(&mut self) -> InputSnapshot {
        self.sequence += 1;
        InputSnapshot {
            sequence: self.sequence,
            quit_requested: self.quit_after.is_some_and(|n| self.sequence >= n),
            ..InputSnapshot::default()
        }
    }

    fn release(&mut self) {
        self.acquired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_and_quit() {
        let mut input = HeadlessInput::new().with_quit_after(3);
        input.acquire().unwrap();
        assert!(input.is_acquired());

        let polls: Vec<_> = (0..4).map(|_| input.poll()).collect();
        assert_eq!(
            polls.iter().map(|s| s.sequence).collect::<Vec<_>>(),
            [1, 2, 3, 4]
        );
        assert_eq!(
            polls.iter().map(|s| s.quit_requested).collect::<Vec<_>>(),
            [false, false, true, true]
        );

        input.release();
        assert!(!input.is_acquired());
    }

    #[test]
    fn test_unavailable_device() {
        let mut input = HeadlessInput::unavailable();
        assert!(matches!(
            input.acquire(),
            Err(DaemonError::InitializationFailure(_))
        ));
    }
}
