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

//! Provider traits through which clocks and host statistics are injected.
//!
//! Monitors never reach for a process-wide singleton; they own a provider
//! value, so tests can hand them a scripted one instead.

use crate::error::{MonitorError, MonitorResult};
use crate::settings::GpuDevice;
use crate::telemetry::readings::{CpuSample, GpuSample, GpuSnapshot};
use crate::utils::timer::Stopwatch;
use std::fmt::Debug;
use std::time::Duration;

/// A source of monotonic timestamps.
pub trait Clock: Send + Debug + 'static {
    /// The current time as an offset from an arbitrary, fixed origin.
    fn now(&mut self) -> MonitorResult<Duration>;
}

/// The default clock, backed by `Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Stopwatch,
}

impl MonotonicClock {
    /// Creates a clock whose origin is the moment of creation.
    pub fn new() -> Self {
        Self {
            origin: Stopwatch::new(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> MonitorResult<Duration> {
        self.origin
            .elapsed()
            .ok_or_else(|| MonitorError::unavailable("monotonic clock was never started"))
    }
}

/// A provider of host CPU utilization.
pub trait CpuStatsProvider: Send + Debug + 'static {
    /// Returns CPU utilization averaged over the time since the previous call.
    ///
    /// The first call only establishes a baseline; its values may be zero.
    fn sample(&mut self) -> MonitorResult<CpuSample>;
}

/// A provider of GPU utilization.
pub trait GpuStatsProvider: Send + Debug + 'static {
    /// Number of devices the provider can see.
    fn device_count(&mut self) -> MonitorResult<u32>;

    /// Reads one device.
    fn sample_device(&mut self, index: u32) -> MonitorResult<GpuSample>;

    /// Reads the device(s) selected by `device`.
    ///
    /// Fails with `MonitorUnavailable` if no device is present or a selected
    /// index is out of range.
    fn snapshot(&mut self, device: GpuDevice) -> MonitorResult<GpuSnapshot> {
        let count = self.device_count()?;
        if count == 0 {
            return Err(MonitorError::unavailable("no GPU devices detected"));
        }
        log::trace!("Sampling {device} out of {count} GPU device(s)");

        let devices = match device {
            GpuDevice::Index(index) if index >= count => {
                return Err(MonitorError::unavailable(format!(
                    "GPU device {index} not present ({count} detected)"
                )));
            }
            GpuDevice::Index(index) => vec![self.sample_device(index)?],
            GpuDevice::All => (0..count)
                .map(|index| self.sample_device(index))
                .collect::<MonitorResult<Vec<_>>>()?,
        };

        Ok(GpuSnapshot { devices })
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&mut self) -> MonitorResult<Duration> {
        (**self).now()
    }
}

impl<P: CpuStatsProvider + ?Sized> CpuStatsProvider for Box<P> {
    fn sample(&mut self) -> MonitorResult<CpuSample> {
        (**self).sample()
    }
}

impl<P: GpuStatsProvider + ?Sized> GpuStatsProvider for Box<P> {
    fn device_count(&mut self) -> MonitorResult<u32> {
        (**self).device_count()
    }

    fn sample_device(&mut self, index: u32) -> MonitorResult<GpuSample> {
        (**self).sample_device(index)
    }

    fn snapshot(&mut self, device: GpuDevice) -> MonitorResult<GpuSnapshot> {
        (**self).snapshot(device)
    }
}
