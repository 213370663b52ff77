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

//! The render daemon: waits for the output surface, sets up graphics on its
//! own thread, then draws one frame per tick.
//!
//! The graphics context is thread-affine. It is created during `init`, used by
//! every `execute` and destroyed in `shutdown`, all on the worker's thread.

mod config;
mod daemon;

pub use config::*;
pub use daemon::*;
