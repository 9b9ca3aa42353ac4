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

//! The lifecycle shared by monitors and samplers.

use std::fmt::{Display, Formatter};

/// Lifecycle state of a monitor or sampler.
///
/// `Created -> Active -> Reported`. Only an explicit reset moves an instance
/// back to `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonitorState {
    /// Constructed, not yet entered.
    #[default]
    Created,
    /// Entered; the start reading has been taken.
    Active,
    /// Exited; the elapsed value is available.
    Reported,
}

impl MonitorState {
    /// Returns `true` if `start` is allowed from this state.
    pub fn can_start(self) -> bool {
        self == MonitorState::Created
    }

    /// Returns `true` if `stop` is allowed from this state.
    pub fn can_stop(self) -> bool {
        self == MonitorState::Active
    }
}

impl Display for MonitorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MonitorState::Created => "created",
            MonitorState::Active => "active",
            MonitorState::Reported => "reported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_created_can_start_and_only_active_can_stop() {
        assert!(MonitorState::Created.can_start());
        assert!(!MonitorState::Active.can_start());
        assert!(!MonitorState::Reported.can_start());

        assert!(!MonitorState::Created.can_stop());
        assert!(MonitorState::Active.can_stop());
        assert!(!MonitorState::Reported.can_stop());
    }

    #[test]
    fn default_state_is_created() {
        assert_eq!(MonitorState::default(), MonitorState::Created);
    }
}
