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

//! Settings for monitors and background samplers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Which GPU(s) a GPU source samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpuDevice {
    /// A single device, by provider index.
    Index(u32),
    /// Every device the provider reports.
    All,
}

impl Default for GpuDevice {
    fn default() -> Self {
        GpuDevice::Index(0)
    }
}

impl Display for GpuDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuDevice::Index(index) => write!(f, "gpu{index}"),
            GpuDevice::All => f.write_str("all gpus"),
        }
    }
}

/// Where a monitor sends its exit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportTarget {
    /// One line on standard output.
    #[default]
    Stdout,
    /// One `info` record through the `log` facade.
    Log,
    /// No report; the value is only stored on the monitor.
    Silent,
}

/// Settings for a background usage sampler.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Time between two readings, in milliseconds.
    pub delay_ms: u64,
    /// Idle padding at the start and end of a run that summaries exclude, in milliseconds.
    pub buffer_ms: u64,
}

impl SamplerSettings {
    /// The delay between readings as a `Duration`.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The summary buffer as a `Duration`.
    pub fn buffer(&self) -> Duration {
        Duration::from_millis(self.buffer_ms)
    }
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            delay_ms: 100,
            buffer_ms: 0,
        }
    }
}

/// A collection of settings used when wiring monitors with default providers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Where exit reports go.
    pub report: ReportTarget,
    /// Which GPU(s) GPU monitors and samplers read.
    pub gpu_device: GpuDevice,
    /// Background sampler timing.
    pub sampler: SamplerSettings,
}
