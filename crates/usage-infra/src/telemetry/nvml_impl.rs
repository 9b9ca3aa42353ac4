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

//! NVML-based implementation of the GpuStatsProvider trait.

use nvml_wrapper::Nvml;
use std::fmt;
use usage_core::telemetry::{GpuSample, GpuStatsProvider};
use usage_core::{MonitorError, MonitorResult};

/// A GPU provider backed by the NVIDIA Management Library.
///
/// Only read-only queries are issued: device count, utilization rates and
/// memory occupancy.
pub struct NvmlGpuProvider {
    nvml: Nvml,
}

impl NvmlGpuProvider {
    /// Loads NVML. Fails with `MonitorUnavailable` when the driver library is
    /// missing or cannot be initialized.
    pub fn new() -> MonitorResult<Self> {
        let nvml = Nvml::init()
            .map_err(|e| MonitorError::unavailable(format!("NVML initialization failed: {e}")))?;
        log::debug!("NVML initialized");
        Ok(Self { nvml })
    }
}

impl GpuStatsProvider for NvmlGpuProvider {
    fn device_count(&mut self) -> MonitorResult<u32> {
        self.nvml
            .device_count()
            .map_err(|e| MonitorError::unavailable(format!("NVML device count failed: {e}")))
    }

    fn sample_device(&mut self, index: u32) -> MonitorResult<GpuSample> {
        let device = self.nvml.device_by_index(index).map_err(|e| {
            MonitorError::unavailable(format!("NVML device {index} unavailable: {e}"))
        })?;
        let rates = device.utilization_rates().map_err(|e| {
            MonitorError::unavailable(format!("NVML utilization query failed on gpu{index}: {e}"))
        })?;

        // Memory occupancy is optional; some boards refuse the query.
        let memory_percent = match device.memory_info() {
            Ok(info) if info.total > 0 => Some(info.used as f64 / info.total as f64 * 100.0),
            Ok(_) => None,
            Err(e) => {
                log::trace!("NVML memory query failed on gpu{index}: {e}");
                None
            }
        };

        Ok(GpuSample {
            index,
            utilization_percent: f64::from(rates.gpu),
            memory_percent,
        })
    }
}

impl fmt::Debug for NvmlGpuProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NvmlGpuProvider").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nvml_provider_initializes_or_reports_unavailable() {
        // GPU-less CI hosts must get an error value, never a panic.
        match NvmlGpuProvider::new() {
            Ok(mut provider) => {
                let count = provider.device_count();
                assert!(count.is_ok() || count.unwrap_err().is_unavailable());
            }
            Err(err) => assert!(err.is_unavailable()),
        }
    }
}
