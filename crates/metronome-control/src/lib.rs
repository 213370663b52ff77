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

//! # Metronome Control
//!
//! The lifecycle layer: a [`Worker`] drives one daemon on its own paced
//! thread, and the [`Orchestrator`] starts, stops and joins a set of workers
//! as a group while containing failures per worker.

#![warn(missing_docs)]

pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod worker;

pub use error::{OrchestratorError, WorkerError, WorkerFailure};
pub use orchestrator::{Orchestrator, OrchestratorConfig, ShutdownReport, StartReport};
pub use registry::{WorkerEntry, WorkerId, WorkerOptions, WorkerRegistry};
pub use worker::{Worker, WorkerMonitor, WorkerState};
