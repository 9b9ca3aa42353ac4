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

//! Exit reports and the sinks that receive them.

pub mod sinks;

use std::fmt::{Debug, Display, Formatter};
use usage_core::MetricKind;

/// How the monitored scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// The block ran to completion.
    Completed,
    /// The block unwound or returned an error.
    Aborted,
}

/// What a monitor emits once on exit.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReport {
    /// The kind of monitor that produced the report.
    pub kind: MetricKind,
    /// The monitor's label.
    pub label: String,
    /// How the scope ended.
    pub outcome: ScopeOutcome,
    /// The elapsed value as a single number.
    pub value: f64,
    /// The elapsed value as displayed.
    pub text: String,
}

/// Renders the stdout line: `"{label}: {elapsed}"`, prefixed with
/// `"(ended abruptly) "` when the scope was aborted.
impl Display for MonitorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.outcome == ScopeOutcome::Aborted {
            f.write_str("(ended abruptly) ")?;
        }
        write!(f, "{}: {}", self.label, self.text)
    }
}

/// Trait for destinations of monitor reports.
pub trait ReportSink: Send + Sync + Debug + 'static {
    /// Delivers one report.
    fn emit(&self, report: &MonitorReport);
}
