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

//! Reading types produced by CPU and GPU providers.

use crate::telemetry::source::Measurement;
use std::fmt::{Display, Formatter};

/// CPU utilization over one sampling interval, in percent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CpuSample {
    /// Utilization averaged over all logical cores (0-100).
    pub total_percent: f64,
    /// Utilization of each logical core (0-100), in core order.
    pub per_core: Vec<f64>,
}

impl CpuSample {
    /// Builds a sample from per-core values, averaging them for the total.
    pub fn from_per_core(per_core: Vec<f64>) -> Self {
        let total_percent = if per_core.is_empty() {
            0.0
        } else {
            per_core.iter().sum::<f64>() / per_core.len() as f64
        };
        Self {
            total_percent,
            per_core,
        }
    }

    /// Number of logical cores in the sample.
    pub fn core_count(&self) -> usize {
        self.per_core.len()
    }
}

impl Measurement for CpuSample {
    fn scalar(&self) -> f64 {
        self.total_percent
    }

    fn channels(&self) -> Vec<f64> {
        self.per_core.clone()
    }
}

impl Display for CpuSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.total_percent)
    }
}

/// Utilization of a single GPU.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpuSample {
    /// Provider index of the device.
    pub index: u32,
    /// Compute utilization (0-100).
    pub utilization_percent: f64,
    /// Memory utilization (0-100), if the provider reports it.
    pub memory_percent: Option<f64>,
}

impl Display for GpuSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "gpu{} {:.2}%", self.index, self.utilization_percent)?;
        if let Some(memory) = self.memory_percent {
            write!(f, " (mem {memory:.2}%)")?;
        }
        Ok(())
    }
}

/// Utilization of one or more GPUs read at the same moment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpuSnapshot {
    /// One entry per sampled device, in index order.
    pub devices: Vec<GpuSample>,
}

impl GpuSnapshot {
    /// Looks up a device by provider index.
    pub fn device(&self, index: u32) -> Option<&GpuSample> {
        self.devices.iter().find(|d| d.index == index)
    }

    /// Mean compute utilization across the sampled devices.
    pub fn mean_utilization(&self) -> f64 {
        if self.devices.is_empty() {
            return 0.0;
        }
        self.devices
            .iter()
            .map(|d| d.utilization_percent)
            .sum::<f64>()
            / self.devices.len() as f64
    }
}

impl Measurement for GpuSnapshot {
    fn scalar(&self) -> f64 {
        self.mean_utilization()
    }

    fn channels(&self) -> Vec<f64> {
        self.devices.iter().map(|d| d.utilization_percent).collect()
    }
}

impl Display for GpuSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.devices.is_empty() {
            return f.write_str("no devices");
        }
        for (i, device) in self.devices.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{device}")?;
        }
        Ok(())
    }
}
