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

use crate::error::DaemonError;

/// The state of the input devices at one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Monotonic poll counter assigned by the device.
    pub sequence: u64,
    /// Platform key codes held down at poll time.
    pub pressed_keys: Vec<u32>,
    /// Cursor position in surface coordinates.
    pub cursor_position: (f64, f64),
    /// Bit mask of pressed mouse buttons.
    pub mouse_buttons: u8,
    /// Set when the user asked to quit (e.g. a quit key binding).
    pub quit_requested: bool,
}

/// A keyboard/mouse source polled by the input daemon.
pub trait InputDevice: Send {
    /// Human-readable device name.
    fn name(&self) -> &str;

    /// Acquires the device handles. Called once, on the input daemon's thread.
    fn acquire(&mut self) -> Result<(), DaemonError>;

    /// Reads the current device state.
    fn poll(&mut self) -> InputSnapshot;

    /// Releases the device handles.
    fn release(&mut self) {}
}
