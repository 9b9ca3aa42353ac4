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

//! Provides RAII-based monitors that read a metric source on entry and exit.
//!
//! Every variant (runtime, CPU, GPU) is a [`Monitor`] over a different
//! [`MetricSource`]. The monitor owns the lifecycle:
//!
//! ```text
//! Created --start/enter--> Active --stop/exit--> Reported
//!    ^                                              |
//!    +-------------------- reset -------------------+
//! ```
//!
//! Entering an `Active` or `Reported` monitor fails with
//! `MonitorError::InvalidMonitorState`; call [`Monitor::reset`] to reuse one.

pub mod cpu;
pub mod gpu;
pub mod runtime;

use crate::report::sinks::{sink_for, StdoutSink};
use crate::report::{MonitorReport, ReportSink, ScopeOutcome};
use std::fmt;
use std::sync::Arc;
use usage_core::{
    Measurement, MetricKind, MetricSource, MonitorError, MonitorResult, MonitorState,
    ReportTarget,
};

/// A scoped monitor over a metric source.
///
/// The source is read exactly once on entry and once on exit. The exit value
/// is stored on the monitor and emitted to its [`ReportSink`] as
/// `"{label}: {elapsed}"`. An empty label suppresses the report but the value
/// is still stored.
pub struct Monitor<S: MetricSource> {
    label: String,
    source: S,
    sink: Arc<dyn ReportSink>,
    state: MonitorState,
    start_value: Option<S::Reading>,
    elapsed: Option<S::Value>,
}

impl<S: MetricSource> Monitor<S> {
    /// Creates a monitor over `source`, reporting to standard output.
    pub fn with_source(label: impl Into<String>, source: S) -> Self {
        Self {
            label: label.into(),
            source,
            sink: Arc::new(StdoutSink),
            state: MonitorState::Created,
            start_value: None,
            elapsed: None,
        }
    }

    /// Replaces the sink exit reports are sent to.
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the sink with the one matching `target`.
    pub fn with_target(self, target: ReportTarget) -> Self {
        self.with_sink(sink_for(target))
    }

    /// The label used in reports.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The kind of resource measured.
    pub fn kind(&self) -> MetricKind {
        self.source.kind()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// The metric source this monitor reads.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The reading taken on entry; `None` before entry and after a reset.
    /// Kept as the historical entry value after exit.
    pub fn start_value(&self) -> Option<S::Reading> {
        self.start_value.clone()
    }

    /// The value computed on exit; `None` until the scope has been exited.
    pub fn elapsed(&self) -> Option<S::Value> {
        self.elapsed.clone()
    }

    /// Takes the entry reading and moves to `Active`.
    ///
    /// Fails with `InvalidMonitorState` unless the monitor is `Created`, and
    /// with `MonitorUnavailable` if the source cannot be read (the monitor then
    /// stays `Created`).
    pub fn start(&mut self) -> MonitorResult<()> {
        if !self.state.can_start() {
            return Err(MonitorError::InvalidMonitorState {
                operation: "start",
                state: self.state,
            });
        }

        let reading = self.source.read()?;
        log::trace!("{} monitor '{}' started", self.kind(), self.label);
        self.start_value = Some(reading);
        self.elapsed = None;
        self.state = MonitorState::Active;
        Ok(())
    }

    /// Takes the exit reading, stores and reports the elapsed value, and moves
    /// to `Reported`.
    pub fn stop(&mut self) -> MonitorResult<S::Value> {
        self.exit(ScopeOutcome::Completed)
    }

    /// Returns the monitor to `Created`, clearing the entry reading and the
    /// elapsed value.
    pub fn reset(&mut self) {
        log::trace!("{} monitor '{}' reset", self.kind(), self.label);
        self.state = MonitorState::Created;
        self.start_value = None;
        self.elapsed = None;
    }

    /// Starts the monitor and returns a guard that stops it when dropped.
    pub fn enter(&mut self) -> MonitorResult<MonitorGuard<'_, S>> {
        self.start()?;
        Ok(MonitorGuard {
            monitor: Some(self),
        })
    }

    /// Runs `block` inside the monitor and returns its result.
    ///
    /// If `block` panics, the report is emitted in its abrupt form while the
    /// panic unwinds.
    pub fn measure<T>(&mut self, block: impl FnOnce() -> T) -> MonitorResult<T> {
        let guard = self.enter()?;
        let output = block();
        guard.finish()?;
        Ok(output)
    }

    /// Runs a fallible `block` inside the monitor.
    ///
    /// An `Err` from the block is reported in the abrupt form and returned
    /// unchanged; monitor failures are converted into `E`.
    pub fn try_measure<T, E>(&mut self, block: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<MonitorError>,
    {
        let guard = self.enter()?;
        match block() {
            Ok(output) => {
                guard.finish()?;
                Ok(output)
            }
            Err(err) => {
                if let Err(monitor_err) = guard.abort() {
                    log::warn!("Failed to stop monitor after block error: {monitor_err}");
                }
                Err(err)
            }
        }
    }

    fn exit(&mut self, outcome: ScopeOutcome) -> MonitorResult<S::Value> {
        if !self.state.can_stop() {
            return Err(MonitorError::InvalidMonitorState {
                operation: "stop",
                state: self.state,
            });
        }
        let Some(start) = self.start_value.as_ref() else {
            return Err(MonitorError::InvalidMonitorState {
                operation: "stop",
                state: self.state,
            });
        };

        // A failed exit read leaves the monitor Active and emits nothing.
        let end = self.source.read()?;
        let value = self.source.measure(start, end);

        self.elapsed = Some(value.clone());
        self.state = MonitorState::Reported;
        self.report(outcome, &value);
        Ok(value)
    }

    fn report(&self, outcome: ScopeOutcome, value: &S::Value) {
        if self.label.is_empty() {
            log::debug!("{} monitor finished unlabeled: {value}", self.kind());
            return;
        }
        self.sink.emit(&MonitorReport {
            kind: self.kind(),
            label: self.label.clone(),
            outcome,
            value: value.scalar(),
            text: value.to_string(),
        });
    }
}

impl<S: MetricSource> fmt::Debug for Monitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("label", &self.label)
            .field("source", &self.source)
            .field("state", &self.state)
            .field("start_value", &self.start_value)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

/// Keeps a monitor `Active` for the lifetime of a scope.
///
/// Dropping the guard stops the monitor; if the thread is panicking, the
/// report takes its abrupt form. Drop cannot return errors, so an exit failure
/// there is logged; call [`MonitorGuard::finish`] to observe it instead.
pub struct MonitorGuard<'a, S: MetricSource> {
    monitor: Option<&'a mut Monitor<S>>,
}

impl<'a, S: MetricSource> MonitorGuard<'a, S> {
    /// The guarded monitor's label.
    pub fn label(&self) -> &str {
        self.monitor.as_ref().map_or("", |m| m.label())
    }

    /// The entry reading of the guarded monitor.
    pub fn start_value(&self) -> Option<S::Reading> {
        self.monitor.as_ref().and_then(|m| m.start_value())
    }

    /// Stops the monitor and returns the elapsed value.
    pub fn finish(mut self) -> MonitorResult<S::Value> {
        self.close(ScopeOutcome::Completed)
    }

    /// Stops the monitor, reporting the scope as ended abruptly.
    pub fn abort(mut self) -> MonitorResult<S::Value> {
        self.close(ScopeOutcome::Aborted)
    }

    fn close(&mut self, outcome: ScopeOutcome) -> MonitorResult<S::Value> {
        match self.monitor.take() {
            Some(monitor) => monitor.exit(outcome),
            None => Err(MonitorError::InvalidMonitorState {
                operation: "stop",
                state: MonitorState::Reported,
            }),
        }
    }
}

impl<'a, S: MetricSource> fmt::Debug for MonitorGuard<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorGuard")
            .field("label", &self.label())
            .field("open", &self.monitor.is_some())
            .finish()
    }
}

impl<'a, S: MetricSource> Drop for MonitorGuard<'a, S> {
    fn drop(&mut self) {
        if self.monitor.is_none() {
            return;
        }
        let outcome = if std::thread::panicking() {
            ScopeOutcome::Aborted
        } else {
            ScopeOutcome::Completed
        };
        if let Err(e) = self.close(outcome) {
            log::warn!("[MonitorGuard] Failed to stop monitor: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::runtime::{Runtime, RuntimeSource};
    use crate::report::sinks::MemorySink;
    use std::time::Duration;
    use usage_core::telemetry::scripted::ScriptedClock;

    fn scripted(label: &str, ticks_ms: &[u64]) -> (Runtime<ScriptedClock>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let clock = ScriptedClock::new(ticks_ms.iter().map(|ms| Duration::from_millis(*ms)));
        let monitor = Monitor::with_source(label, RuntimeSource::new(clock)).with_sink(sink.clone());
        (monitor, sink)
    }

    #[test]
    fn lifecycle_moves_through_every_state() {
        let (mut monitor, sink) = scripted("op", &[100, 350]);
        assert_eq!(monitor.state(), MonitorState::Created);
        assert!(monitor.start_value().is_none());
        assert!(monitor.elapsed().is_none());

        monitor.start().unwrap();
        assert_eq!(monitor.state(), MonitorState::Active);
        assert_eq!(monitor.start_value(), Some(Duration::from_millis(100)));
        assert!(monitor.elapsed().is_none());

        let elapsed = monitor.stop().unwrap();
        assert_eq!(monitor.state(), MonitorState::Reported);
        assert_eq!(elapsed, 0.25);
        assert_eq!(monitor.elapsed(), Some(0.25));
        // The entry reading is kept as history.
        assert_eq!(monitor.start_value(), Some(Duration::from_millis(100)));
        assert_eq!(sink.lines(), vec!["op: 0.25"]);
    }

    #[test]
    fn starting_twice_is_invalid() {
        let (mut monitor, _sink) = scripted("op", &[0, 10]);
        monitor.start().unwrap();
        assert_eq!(
            monitor.start(),
            Err(MonitorError::InvalidMonitorState {
                operation: "start",
                state: MonitorState::Active,
            })
        );
    }

    #[test]
    fn stop_before_start_is_invalid() {
        let (mut monitor, sink) = scripted("op", &[0]);
        let err = monitor.stop().unwrap_err();
        assert_eq!(
            err,
            MonitorError::InvalidMonitorState {
                operation: "stop",
                state: MonitorState::Created,
            }
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn reset_allows_reuse() {
        let (mut monitor, sink) = scripted("op", &[0, 100, 1000, 1500]);
        monitor.measure(|| ()).unwrap();
        assert!(monitor.enter().is_err());

        monitor.reset();
        assert_eq!(monitor.state(), MonitorState::Created);
        assert!(monitor.start_value().is_none());
        assert!(monitor.elapsed().is_none());

        monitor.measure(|| ()).unwrap();
        assert_eq!(monitor.elapsed(), Some(0.5));
        assert_eq!(sink.lines(), vec!["op: 0.1", "op: 0.5"]);
    }

    #[test]
    fn failed_entry_read_keeps_created() {
        let sink = Arc::new(MemorySink::new());
        let mut monitor = Monitor::with_source(
            "op",
            RuntimeSource::new(ScriptedClock::unavailable("clock offline")),
        )
        .with_sink(sink.clone());

        let err = monitor.enter().unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(monitor.state(), MonitorState::Created);
        assert!(sink.is_empty());
    }

    #[test]
    fn failed_exit_read_reports_nothing() {
        let sink = Arc::new(MemorySink::new());
        let clock = ScriptedClock::new([Duration::ZERO]).fail_after(1);
        let mut monitor =
            Monitor::with_source("op", RuntimeSource::new(clock)).with_sink(sink.clone());

        let guard = monitor.enter().unwrap();
        assert!(guard.finish().unwrap_err().is_unavailable());

        assert_eq!(monitor.state(), MonitorState::Active);
        assert!(monitor.elapsed().is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn dropping_the_guard_reports() {
        let (mut monitor, sink) = scripted("scope", &[0, 40]);
        {
            let guard = monitor.enter().unwrap();
            assert_eq!(guard.label(), "scope");
            assert_eq!(guard.start_value(), Some(Duration::ZERO));
        }
        assert_eq!(monitor.state(), MonitorState::Reported);
        assert_eq!(sink.lines(), vec!["scope: 0.04"]);
    }

    #[test]
    fn aborted_guard_reports_abruptly() {
        let (mut monitor, sink) = scripted("op", &[0, 20]);
        let guard = monitor.enter().unwrap();
        guard.abort().unwrap();
        assert_eq!(sink.lines(), vec!["(ended abruptly) op: 0.02"]);
    }

    #[test]
    fn try_measure_passes_block_errors_through() {
        #[derive(Debug, PartialEq)]
        enum JobError {
            Failed,
            Monitor(MonitorError),
        }
        impl From<MonitorError> for JobError {
            fn from(e: MonitorError) -> Self {
                JobError::Monitor(e)
            }
        }

        let (mut monitor, sink) = scripted("job", &[0, 30]);
        let result: Result<(), JobError> = monitor.try_measure(|| Err(JobError::Failed));

        assert_eq!(result, Err(JobError::Failed));
        assert_eq!(monitor.state(), MonitorState::Reported);
        assert_eq!(sink.lines(), vec!["(ended abruptly) job: 0.03"]);

        let again: Result<(), JobError> = monitor.try_measure(|| Ok(()));
        assert!(matches!(
            again,
            Err(JobError::Monitor(MonitorError::InvalidMonitorState { .. }))
        ));
    }

    #[test]
    fn empty_label_stores_without_reporting() {
        let (mut monitor, sink) = scripted("", &[0, 70]);
        monitor.measure(|| ()).unwrap();
        assert_eq!(monitor.elapsed(), Some(0.07));
        assert!(sink.is_empty());
    }
}
