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

//! Wall-clock runtime monitoring.

use crate::monitor::Monitor;
use std::time::Duration;
use usage_core::{Clock, MetricKind, MetricSource, MonitorResult, MonotonicClock};

/// Label used by [`Runtime::default`].
pub const DEFAULT_RUNTIME_LABEL: &str = "Time elapsed";

/// A metric source that reads a clock. The value is `exit - entry` in seconds.
#[derive(Debug)]
pub struct RuntimeSource<C: Clock = MonotonicClock> {
    clock: C,
}

impl<C: Clock> RuntimeSource<C> {
    /// Creates a source over `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> MetricSource for RuntimeSource<C> {
    type Reading = Duration;
    type Value = f64;

    fn kind(&self) -> MetricKind {
        MetricKind::Runtime
    }

    fn read(&mut self) -> MonitorResult<Duration> {
        self.clock.now()
    }

    fn measure(&self, start: &Duration, end: Duration) -> f64 {
        end.saturating_sub(*start).as_secs_f64()
    }
}

/// Measures the wall-clock runtime of a block, in seconds.
///
/// ```no_run
/// use usage_telemetry::Runtime;
///
/// let mut timer = Runtime::new("op");
/// timer.measure(|| std::thread::sleep(std::time::Duration::from_millis(100)))?;
/// // prints "op: 0.100..."
/// assert!(timer.elapsed().unwrap() >= 0.1);
/// # Ok::<(), usage_core::MonitorError>(())
/// ```
pub type Runtime<C = MonotonicClock> = Monitor<RuntimeSource<C>>;

impl Monitor<RuntimeSource<MonotonicClock>> {
    /// Creates a runtime monitor over the monotonic clock.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_source(label, RuntimeSource::new(MonotonicClock::new()))
    }
}

impl<C: Clock> Monitor<RuntimeSource<C>> {
    /// Creates a runtime monitor over a caller-supplied clock.
    pub fn with_clock(label: impl Into<String>, clock: C) -> Self {
        Self::with_source(label, RuntimeSource::new(clock))
    }
}

impl Default for Monitor<RuntimeSource<MonotonicClock>> {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_LABEL)
    }
}
