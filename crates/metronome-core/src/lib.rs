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

//! # Metronome Core
//!
//! Foundational crate containing the pacing primitive, the daemon capability
//! contract, and the narrow interfaces through which daemons reach the
//! collaborators they do not own (surfaces, displays, graphics contexts, input
//! devices).

#![warn(missing_docs)]

pub mod daemon;
pub mod error;
pub mod math;
pub mod platform;
pub mod signal;
pub mod timing;

pub use daemon::{Daemon, DaemonContext};
pub use error::{DaemonError, PacerError};
pub use signal::{quit_channel, QuitListener, QuitSignal};
pub use timing::TickPacer;
