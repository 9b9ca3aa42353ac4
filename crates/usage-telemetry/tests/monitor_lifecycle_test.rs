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

use approx::assert_relative_eq;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use usage_core::telemetry::scripted::{ScriptedClock, ScriptedCpuProvider};
use usage_core::{MonitorError, MonitorState};
use usage_telemetry::{CpuMonitor, MemorySink, Monitor, ScopeOutcome};

fn ms(ticks: &[u64]) -> Vec<Duration> {
    ticks.iter().copied().map(Duration::from_millis).collect()
}

#[test]
fn test_monitors_with_the_same_label_are_independent() {
    // --- 1. ARRANGE ---
    let sink = Arc::new(MemorySink::new());
    let mut outer = Monitor::with_clock("step", ScriptedClock::new(ms(&[0, 1_000])))
        .with_sink(sink.clone());
    let mut inner = Monitor::with_clock("step", ScriptedClock::new(ms(&[200, 450])))
        .with_sink(sink.clone());

    // --- 2. ACT ---
    // Nest the two scopes; the inner one closes first.
    {
        let _outer_guard = outer.enter().unwrap();
        inner.measure(|| ()).unwrap();
    }

    // --- 3. ASSERT ---
    assert_relative_eq!(inner.elapsed().unwrap(), 0.25);
    assert_relative_eq!(outer.elapsed().unwrap(), 1.0);
    assert_eq!(sink.lines(), vec!["step: 0.25", "step: 1"]);
}

#[test]
fn test_entering_an_active_monitor_fails() {
    // --- 1. ARRANGE ---
    let clock = ScriptedClock::new(ms(&[0, 10, 20]));
    let reads = clock.reads();
    let mut monitor = Monitor::with_clock("once", clock).with_sink(Arc::new(MemorySink::new()));

    // --- 2. ACT ---
    monitor.start().unwrap();
    let second = monitor.enter().unwrap_err();

    // --- 3. ASSERT ---
    assert_eq!(
        second,
        MonitorError::InvalidMonitorState {
            operation: "start",
            state: MonitorState::Active,
        }
    );
    // The rejected entry took no reading.
    assert_eq!(reads.get(), 1);
    monitor.stop().unwrap();
    assert_eq!(monitor.state(), MonitorState::Reported);
}

#[test]
fn test_reused_monitor_must_be_reset() {
    // --- 1. ARRANGE ---
    let sink = Arc::new(MemorySink::new());
    let mut monitor = Monitor::with_clock("loop", ScriptedClock::new(ms(&[0, 100, 500, 800])))
        .with_sink(sink.clone());

    // --- 2. ACT ---
    monitor.measure(|| ()).unwrap();
    let without_reset = monitor.measure(|| ());
    monitor.reset();
    monitor.measure(|| ()).unwrap();

    // --- 3. ASSERT ---
    assert!(matches!(
        without_reset,
        Err(MonitorError::InvalidMonitorState { .. })
    ));
    assert_eq!(sink.lines(), vec!["loop: 0.1", "loop: 0.3"]);
}

#[test]
fn test_panic_inside_measure_reports_abrupt_end() {
    // --- 1. ARRANGE ---
    let sink = Arc::new(MemorySink::new());
    let mut monitor = Monitor::with_clock("crashy", ScriptedClock::new(ms(&[100, 350])))
        .with_sink(sink.clone());

    // --- 2. ACT ---
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = monitor.measure(|| panic!("simulated failure"));
    }));

    // --- 3. ASSERT ---
    assert!(result.is_err(), "the panic must propagate to the caller");
    assert_eq!(monitor.state(), MonitorState::Reported);
    assert_relative_eq!(monitor.elapsed().unwrap(), 0.25);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, ScopeOutcome::Aborted);
    assert_eq!(sink.lines(), vec!["(ended abruptly) crashy: 0.25"]);
}

#[test]
fn test_failing_exit_read_leaves_monitor_active() {
    // --- 1. ARRANGE ---
    let sink = Arc::new(MemorySink::new());
    let provider = ScriptedCpuProvider::constant(&[40.0]).fail_after(1);
    let mut monitor = CpuMonitor::with_provider("cpu", provider).with_sink(sink.clone());

    // --- 2. ACT ---
    let err = monitor.measure(|| ()).unwrap_err();

    // --- 3. ASSERT ---
    assert!(err.is_unavailable());
    assert_eq!(monitor.state(), MonitorState::Active);
    assert!(monitor.elapsed().is_none());
    assert!(sink.is_empty(), "no report without an exit reading");
}

#[test]
fn test_unlabeled_monitor_stores_value_silently() {
    // --- 1. ARRANGE ---
    let sink = Arc::new(MemorySink::new());
    let mut monitor =
        Monitor::with_clock("", ScriptedClock::new(ms(&[0, 40]))).with_sink(sink.clone());

    // --- 2. ACT ---
    let output = monitor.measure(|| "done").unwrap();

    // --- 3. ASSERT ---
    assert_eq!(output, "done");
    assert_relative_eq!(monitor.elapsed().unwrap(), 0.04);
    assert!(sink.is_empty());
}
