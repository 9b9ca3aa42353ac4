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

//! Error types shared by every monitor and sampler.

use crate::state::MonitorState;
use thiserror::Error;

/// A specialized `Result` type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// An error that can occur while reading a metric source or driving a monitor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// The underlying metric source cannot be read (no GPU, restricted CPU
    /// statistics, clock failure).
    #[error("Monitor unavailable: {0}")]
    MonitorUnavailable(String),
    /// A lifecycle operation was attempted from a state that does not allow it.
    #[error("Invalid monitor state: cannot {operation} while {state}")]
    InvalidMonitorState {
        /// The operation that was attempted (e.g. "start", "stop").
        operation: &'static str,
        /// The state the monitor was in at the time.
        state: MonitorState,
    },
    /// A summary window could not be computed over a usage log.
    #[error("Invalid summary window: {0}")]
    InvalidWindow(String),
    /// A background sampler stopped abnormally.
    #[error("Sampler failed: {0}")]
    SamplerFailed(String),
}

impl MonitorError {
    /// Shorthand for building a [`MonitorError::MonitorUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        MonitorError::MonitorUnavailable(reason.into())
    }

    /// Returns `true` if the error reports a missing or unreadable metric source.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, MonitorError::MonitorUnavailable(_))
    }
}
