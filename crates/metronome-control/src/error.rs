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

//! Errors of the worker lifecycle API and the failures workers record.

use crate::registry::WorkerId;
use metronome_core::{DaemonError, PacerError};
use std::time::Duration;
use thiserror::Error;

/// An error returned by a [`Worker`](crate::Worker) lifecycle call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    /// The daemon asked for a non-positive tick rate.
    #[error("worker '{name}' has an invalid tick rate: {source}")]
    InvalidRate {
        /// Worker name.
        name: String,
        /// The rejected rate.
        #[source]
        source: PacerError,
    },

    /// The worker's thread did not exit in time.
    #[error("worker '{name}' did not exit within {timeout:?}")]
    JoinTimeout {
        /// Worker name.
        name: String,
        /// How long the caller waited.
        timeout: Duration,
    },

    /// A blocking wait on the worker could not be completed.
    #[error("wait on worker '{name}' was interrupted: {reason}")]
    InterruptedWait {
        /// Worker name.
        name: String,
        /// What interrupted the wait.
        reason: String,
    },

    /// The worker already ran to completion; a fresh instance is required.
    #[error("worker '{name}' has already run and cannot be restarted")]
    NotRestartable {
        /// Worker name.
        name: String,
    },

    /// The operating system refused to create the worker's thread.
    #[error("failed to spawn thread for worker '{name}': {reason}")]
    Spawn {
        /// Worker name.
        name: String,
        /// The OS error message.
        reason: String,
    },
}

/// Why a worker's loop ended abnormally.
///
/// Recorded by the worker's own thread and read by its owner. A worker with a
/// recorded failure never reports itself as running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerFailure {
    /// `init` returned an error; the loop was never entered.
    #[error("initialization failed: {0}")]
    Initialization(DaemonError),

    /// `execute` returned an error; the loop stopped after that tick.
    #[error("execution failed: {0}")]
    Execution(DaemonError),

    /// `init`, `execute` or `shutdown` panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// An error surfaced by the [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    /// A worker the application cannot run without has failed.
    #[error("mandatory worker {id} ('{name}') failed: {failure}")]
    MandatoryWorkerFailed {
        /// Registry id of the worker.
        id: WorkerId,
        /// Worker name.
        name: String,
        /// What went wrong.
        failure: WorkerFailure,
    },
}
