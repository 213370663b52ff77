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

//! Error types shared by the pacer and every daemon implementation.

use thiserror::Error;

/// An error raised while configuring a [`TickPacer`](crate::TickPacer).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PacerError {
    /// The requested rate was zero, negative, or not a finite number.
    #[error("invalid tick rate {0}: rate must be finite and greater than zero")]
    InvalidRate(f64),
}

/// An error raised by a daemon's `init` or `execute` step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DaemonError {
    /// The one-time initialization step could not complete.
    #[error("initialization failed: {0}")]
    InitializationFailure(String),

    /// A blocking wait was abandoned before its condition was met.
    #[error("wait interrupted: {0}")]
    InterruptedWait(String),

    /// A single unit of work failed.
    #[error("execution failed: {0}")]
    ExecutionFailure(String),

    /// The daemon asked for an invalid pacing rate.
    #[error(transparent)]
    Pacer(#[from] PacerError),
}

impl DaemonError {
    /// Shorthand for [`DaemonError::InitializationFailure`].
    pub fn init(reason: impl Into<String>) -> Self {
        DaemonError::InitializationFailure(reason.into())
    }

    /// Shorthand for [`DaemonError::ExecutionFailure`].
    pub fn execution(reason: impl Into<String>) -> Self {
        DaemonError::ExecutionFailure(reason.into())
    }

    /// Returns `true` if this error only reports an abandoned wait.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, DaemonError::InterruptedWait(_))
    }
}
