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

//! CPU utilization monitoring.

use crate::monitor::Monitor;
use usage_core::{CpuSample, CpuStatsProvider, MetricKind, MetricSource, MonitorResult};

/// Default label for CPU monitors.
pub const DEFAULT_CPU_LABEL: &str = "CPU usage";

/// A metric source over a [`CpuStatsProvider`].
///
/// Providers report utilization averaged since their previous sample, so the
/// entry read primes the baseline and the exit read covers exactly the
/// monitored scope. The value is therefore the exit sample.
#[derive(Debug)]
pub struct CpuSource<P: CpuStatsProvider> {
    provider: P,
}

impl<P: CpuStatsProvider> CpuSource<P> {
    /// Creates a source over `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: CpuStatsProvider> MetricSource for CpuSource<P> {
    type Reading = CpuSample;
    type Value = CpuSample;

    fn kind(&self) -> MetricKind {
        MetricKind::Cpu
    }

    fn read(&mut self) -> MonitorResult<CpuSample> {
        self.provider.sample()
    }

    fn measure(&self, _start: &CpuSample, end: CpuSample) -> CpuSample {
        end
    }
}

/// Measures mean CPU utilization, total and per core, across a block.
pub type CpuMonitor<P> = Monitor<CpuSource<P>>;

impl<P: CpuStatsProvider> Monitor<CpuSource<P>> {
    /// Creates a CPU monitor over `provider`.
    pub fn with_provider(label: impl Into<String>, provider: P) -> Self {
        Self::with_source(label, CpuSource::new(provider))
    }
}
