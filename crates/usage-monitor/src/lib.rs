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

//! The public-facing API for usage monitoring.
//!
//! Wires the host-backed providers from `usage-infra` into the monitors and
//! samplers from `usage-telemetry`. Most programs only need the [`prelude`].
//!
//! ```no_run
//! use usage_monitor::prelude::*;
//!
//! let mut runtime = Runtime::new("Sorting");
//! let sorted = runtime.measure(|| {
//!     let mut v: Vec<u32> = (0..100_000).rev().collect();
//!     v.sort();
//!     v
//! })?;
//! assert_eq!(sorted[0], 0);
//!
//! match cpu_monitor(DEFAULT_CPU_LABEL) {
//!     Ok(mut cpu) => {
//!         cpu.measure(|| std::thread::sleep(std::time::Duration::from_millis(50)))?;
//!     }
//!     Err(e) if e.is_unavailable() => eprintln!("skipping CPU: {e}"),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), MonitorError>(())
//! ```

pub use usage_core;
pub use usage_infra;
pub use usage_telemetry;

use usage_core::{GpuDevice, MonitorResult, MonitorSettings, SamplerSettings};
use usage_infra::{default_gpu_provider, DefaultGpuProvider, SysinfoCpuProvider};
use usage_telemetry::{
    CpuMonitor, CpuSource, GpuMonitor, GpuSource, Runtime, UsageSampler, DEFAULT_CPU_LABEL,
    DEFAULT_GPU_LABEL,
};

pub mod prelude {
    pub use crate::{
        cpu_monitor, cpu_monitor_with, cpu_sampler, gpu_monitor, gpu_monitor_with, gpu_sampler,
        runtime_with, CpuUsageSampler, GpuUsageSampler, HostCpuMonitor, HostGpuMonitor,
    };
    pub use usage_core::{
        CpuSample, GpuDevice, GpuSample, GpuSnapshot, MetricKind, MonitorError, MonitorResult,
        MonitorSettings, MonitorState, ReportTarget, SamplerSettings,
    };
    pub use usage_telemetry::{
        BufferTime, MemorySink, Monitor, MonitorGuard, MonitorReport, ReportSink, Runtime,
        ScopeOutcome, UsageLog, UsageSampler, UsageSummary, DEFAULT_CPU_LABEL,
        DEFAULT_GPU_LABEL, DEFAULT_RUNTIME_LABEL,
    };
}

/// A CPU monitor over the host's `sysinfo` statistics.
pub type HostCpuMonitor = CpuMonitor<SysinfoCpuProvider>;

/// A GPU monitor over the default GPU provider.
pub type HostGpuMonitor = GpuMonitor<DefaultGpuProvider>;

/// A sampler polling the host's CPU utilization.
pub type CpuUsageSampler = UsageSampler<CpuSource<SysinfoCpuProvider>>;

/// A sampler polling the default GPU provider.
pub type GpuUsageSampler = UsageSampler<GpuSource<DefaultGpuProvider>>;

/// Creates a CPU monitor reading the host.
///
/// Fails with `MonitorUnavailable` if the host exposes no CPU statistics.
pub fn cpu_monitor(label: impl Into<String>) -> MonitorResult<HostCpuMonitor> {
    Ok(CpuMonitor::with_provider(label, SysinfoCpuProvider::new()?))
}

/// Creates a GPU monitor for `device`.
///
/// Fails with `MonitorUnavailable` if the GPU provider cannot be initialized.
/// A missing device is only detected on entry.
pub fn gpu_monitor(label: impl Into<String>, device: GpuDevice) -> MonitorResult<HostGpuMonitor> {
    Ok(GpuMonitor::with_provider(label, default_gpu_provider()?, device))
}

/// Creates a runtime monitor reporting to the configured target.
pub fn runtime_with(label: impl Into<String>, settings: &MonitorSettings) -> Runtime {
    Runtime::new(label).with_target(settings.report)
}

/// Creates a CPU monitor reporting to the configured target.
pub fn cpu_monitor_with(settings: &MonitorSettings) -> MonitorResult<HostCpuMonitor> {
    Ok(cpu_monitor(DEFAULT_CPU_LABEL)?.with_target(settings.report))
}

/// Creates a GPU monitor for the configured device and target.
pub fn gpu_monitor_with(settings: &MonitorSettings) -> MonitorResult<HostGpuMonitor> {
    Ok(gpu_monitor(DEFAULT_GPU_LABEL, settings.gpu_device)?.with_target(settings.report))
}

/// Creates a sampler polling the host's CPU utilization.
pub fn cpu_sampler(settings: &SamplerSettings) -> MonitorResult<CpuUsageSampler> {
    let source = CpuSource::new(SysinfoCpuProvider::new()?);
    log::debug!("CPU sampler created (delay {:?})", settings.delay());
    Ok(UsageSampler::from_settings(source, settings))
}

/// Creates a sampler polling `device` on the default GPU provider.
pub fn gpu_sampler(
    settings: &SamplerSettings,
    device: GpuDevice,
) -> MonitorResult<GpuUsageSampler> {
    let source = GpuSource::new(default_gpu_provider()?, device);
    log::debug!("GPU sampler created for {device} (delay {:?})", settings.delay());
    Ok(UsageSampler::from_settings(source, settings))
}
