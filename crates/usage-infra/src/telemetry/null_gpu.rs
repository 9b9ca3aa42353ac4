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

//! A GPU provider for hosts or builds without GPU statistics.

use usage_core::telemetry::{GpuSample, GpuStatsProvider};
use usage_core::{MonitorError, MonitorResult};

/// A GPU provider for hosts without GPU statistics. Every read fails with
/// `MonitorUnavailable` carrying the configured reason.
#[derive(Debug, Clone)]
pub struct NullGpuProvider {
    reason: String,
}

impl NullGpuProvider {
    /// Creates a provider that reports `reason` on every read.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl GpuStatsProvider for NullGpuProvider {
    fn device_count(&mut self) -> MonitorResult<u32> {
        Err(MonitorError::unavailable(self.reason.clone()))
    }

    fn sample_device(&mut self, _index: u32) -> MonitorResult<GpuSample> {
        Err(MonitorError::unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_core::GpuDevice;

    #[test]
    fn every_read_is_unavailable() {
        let mut provider = NullGpuProvider::new("no driver");
        assert_eq!(
            provider.device_count(),
            Err(MonitorError::unavailable("no driver"))
        );
        assert!(provider.sample_device(0).unwrap_err().is_unavailable());
        assert!(provider.snapshot(GpuDevice::All).unwrap_err().is_unavailable());
    }
}
