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

//! The metric-source contract every monitor variant is built on.

use crate::error::MonitorResult;
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

/// A numeric measurement that can be reported and logged.
pub trait Measurement: Clone + Debug + Send + 'static {
    /// A single number summarizing the measurement.
    fn scalar(&self) -> f64;

    /// The measurement split into channels (one per core, one per device, ...).
    /// Defaults to a single channel holding [`Measurement::scalar`].
    fn channels(&self) -> Vec<f64> {
        vec![self.scalar()]
    }
}

impl Measurement for f64 {
    fn scalar(&self) -> f64 {
        *self
    }
}

impl Measurement for Duration {
    fn scalar(&self) -> f64 {
        self.as_secs_f64()
    }
}

/// The kind of resource a source measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Wall-clock runtime.
    Runtime,
    /// CPU utilization.
    Cpu,
    /// GPU utilization.
    Gpu,
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricKind::Runtime => "runtime",
            MetricKind::Cpu => "cpu",
            MetricKind::Gpu => "gpu",
        };
        f.write_str(name)
    }
}

/// The core trait for a metric source.
///
/// A source is read once when a monitor is entered and once when it exits; the
/// two readings are then folded into the value the monitor reports. Sources are
/// read-only with respect to the host.
pub trait MetricSource: Send + Debug + 'static {
    /// What a single read returns.
    type Reading: Measurement;
    /// What a monitor reports on exit.
    type Value: Measurement + Display;

    /// Returns the kind of resource this source measures.
    fn kind(&self) -> MetricKind;

    /// Takes one reading from the underlying provider.
    fn read(&mut self) -> MonitorResult<Self::Reading>;

    /// Folds the entry and exit readings into the reported value.
    fn measure(&self, start: &Self::Reading, end: Self::Reading) -> Self::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_measurements_have_one_channel() {
        assert_eq!(2.5f64.channels(), vec![2.5]);
        assert_eq!(Duration::from_millis(1500).scalar(), 1.5);
    }

    #[test]
    fn metric_kind_display() {
        assert_eq!(MetricKind::Runtime.to_string(), "runtime");
        assert_eq!(MetricKind::Cpu.to_string(), "cpu");
        assert_eq!(MetricKind::Gpu.to_string(), "gpu");
    }
}
