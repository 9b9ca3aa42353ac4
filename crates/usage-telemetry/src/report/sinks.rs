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

//! Built-in report sinks.

use crate::report::{MonitorReport, ReportSink};
use std::sync::{Arc, Mutex, PoisonError};
use usage_core::ReportTarget;

/// Prints each report as one line on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&self, report: &MonitorReport) {
        println!("{report}");
    }
}

/// Forwards each report to the `log` facade at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, report: &MonitorReport) {
        log::info!(target: "usage_monitor", "{report}");
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl ReportSink for SilentSink {
    fn emit(&self, _report: &MonitorReport) {}
}

/// Keeps every report in memory, in emission order.
///
/// Thread-safe; clone the surrounding `Arc` to share one sink between monitors.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<MonitorReport>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every report received so far.
    pub fn reports(&self) -> Vec<MonitorReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every report rendered as its stdout line.
    pub fn lines(&self) -> Vec<String> {
        self.reports().iter().map(ToString::to_string).collect()
    }

    /// Number of reports received.
    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no report has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored report.
    pub fn clear(&self) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: &MonitorReport) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
    }
}

/// Builds the sink matching a configured [`ReportTarget`].
pub fn sink_for(target: ReportTarget) -> Arc<dyn ReportSink> {
    match target {
        ReportTarget::Stdout => Arc::new(StdoutSink),
        ReportTarget::Log => Arc::new(LogSink),
        ReportTarget::Silent => Arc::new(SilentSink),
    }
}
