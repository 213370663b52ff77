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

//! The concrete daemons of a Metronome application.
//!
//! Each daemon implements [`metronome_core::Daemon`] and is driven by a
//! `metronome_control::Worker`. They only talk to the platform through the
//! collaborator traits of `metronome_core::platform`, so any backend (a real
//! window system or the headless one in `metronome-infra`) can be plugged in.

#![warn(missing_docs)]

pub mod input_daemon;
pub mod render_daemon;

pub use input_daemon::InputDaemon;
pub use render_daemon::{RenderConfig, RenderDaemon};
