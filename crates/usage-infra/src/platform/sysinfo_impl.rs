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

//! sysinfo-based implementation of the CpuStatsProvider trait.

use std::fmt;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use usage_core::telemetry::{CpuSample, CpuStatsProvider};
use usage_core::{MonitorError, MonitorResult};

/// A CPU provider that uses the `sysinfo` crate.
///
/// sysinfo computes usage from the counters captured by the previous refresh,
/// so each sample covers the interval since the previous one. Intervals shorter
/// than `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` give coarse values.
///
/// Construction only lists the CPUs; usage counters are read by [`sample`]
/// alone, so a monitor lifecycle queries them exactly twice.
///
/// [`sample`]: CpuStatsProvider::sample
pub struct SysinfoCpuProvider {
    system: System,
    refreshes: usize,
}

impl SysinfoCpuProvider {
    /// Creates a provider over the host's logical cores.
    ///
    /// Fails with `MonitorUnavailable` if sysinfo does not support the host or
    /// the host exposes no CPUs (e.g. a restricted sandbox).
    pub fn new() -> MonitorResult<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MonitorError::unavailable(
                "CPU statistics are not supported on this host",
            ));
        }

        let system = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
        );
        if system.cpus().is_empty() {
            return Err(MonitorError::unavailable("host exposes no CPU statistics"));
        }

        log::debug!("SysinfoCpuProvider ready with {} logical cores", system.cpus().len());
        Ok(Self {
            system,
            refreshes: 0,
        })
    }

    /// Number of logical cores the host reports.
    pub fn core_count(&self) -> usize {
        self.system.cpus().len()
    }

    /// Number of times the usage counters have been read from the host.
    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl CpuStatsProvider for SysinfoCpuProvider {
    fn sample(&mut self) -> MonitorResult<CpuSample> {
        self.system.refresh_cpu_usage();
        self.refreshes += 1;

        let per_core: Vec<f64> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| sanitize(cpu.cpu_usage()))
            .collect();
        if per_core.is_empty() {
            return Err(MonitorError::unavailable("host stopped exposing CPU statistics"));
        }

        Ok(CpuSample {
            total_percent: sanitize(self.system.global_cpu_usage()),
            per_core,
        })
    }
}

impl fmt::Debug for SysinfoCpuProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SysinfoCpuProvider")
            .field("cores", &self.core_count())
            .field("refreshes", &self.refreshes)
            .finish()
    }
}

// sysinfo can report NaN before it has two refreshes to compare.
fn sanitize(percent: f32) -> f64 {
    if percent.is_finite() {
        f64::from(percent).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
