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

//! GPU utilization monitoring.

use crate::monitor::Monitor;
use usage_core::{
    GpuDevice, GpuSnapshot, GpuStatsProvider, MetricKind, MetricSource, MonitorResult,
};

/// Default label for GPU monitors.
pub const DEFAULT_GPU_LABEL: &str = "GPU usage";

/// A metric source over a [`GpuStatsProvider`], restricted to one device or
/// to all of them.
///
/// Like [`CpuSource`](crate::CpuSource), the value is the exit snapshot.
#[derive(Debug)]
pub struct GpuSource<P: GpuStatsProvider> {
    provider: P,
    device: GpuDevice,
}

impl<P: GpuStatsProvider> GpuSource<P> {
    /// Creates a source reading `device` from `provider`.
    pub fn new(provider: P, device: GpuDevice) -> Self {
        Self { provider, device }
    }

    /// The device selection.
    pub fn device(&self) -> GpuDevice {
        self.device
    }
}

impl<P: GpuStatsProvider> MetricSource for GpuSource<P> {
    type Reading = GpuSnapshot;
    type Value = GpuSnapshot;

    fn kind(&self) -> MetricKind {
        MetricKind::Gpu
    }

    fn read(&mut self) -> MonitorResult<GpuSnapshot> {
        self.provider.snapshot(self.device)
    }

    fn measure(&self, _start: &GpuSnapshot, end: GpuSnapshot) -> GpuSnapshot {
        end
    }
}

/// Measures GPU (and memory) utilization across a block.
pub type GpuMonitor<P> = Monitor<GpuSource<P>>;

impl<P: GpuStatsProvider> Monitor<GpuSource<P>> {
    /// Creates a GPU monitor reading `device` from `provider`.
    pub fn with_provider(label: impl Into<String>, provider: P, device: GpuDevice) -> Self {
        Self::with_source(label, GpuSource::new(provider, device))
    }

    /// The device selection.
    pub fn device(&self) -> GpuDevice {
        self.source().device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sinks::MemorySink;
    use std::sync::Arc;
    use usage_core::telemetry::scripted::ScriptedGpuProvider;
    use usage_core::MonitorState;

    #[test]
    fn single_device_reports_exit_frame() {
        let provider = ScriptedGpuProvider::from_frames(vec![vec![5.0, 9.0], vec![80.0, 20.0]]);
        let reads = provider.reads();
        let sink = Arc::new(MemorySink::new());
        let mut monitor = GpuMonitor::with_provider("render", provider, GpuDevice::default())
            .with_sink(sink.clone());

        monitor.measure(|| ()).unwrap();

        let elapsed = monitor.elapsed().unwrap();
        assert_eq!(elapsed.devices.len(), 1);
        assert_eq!(elapsed.devices[0].utilization_percent, 80.0);
        assert_eq!(reads.get(), 2);
        assert_eq!(sink.lines(), vec!["render: gpu0 80.00%"]);
    }

    #[test]
    fn elapsed_is_only_set_after_exit() {
        let provider = ScriptedGpuProvider::from_frames(vec![vec![15.0], vec![65.0]]);
        let mut monitor = GpuMonitor::with_provider("phases", provider, GpuDevice::default())
            .with_sink(Arc::new(MemorySink::new()));
        assert_eq!(monitor.state(), MonitorState::Created);
        assert!(monitor.elapsed().is_none());

        monitor.start().unwrap();
        assert_eq!(monitor.state(), MonitorState::Active);
        assert!(monitor.elapsed().is_none());
        assert_eq!(monitor.start_value().unwrap().devices[0].utilization_percent, 15.0);

        let stopped = monitor.stop().unwrap();
        assert_eq!(monitor.state(), MonitorState::Reported);
        assert_eq!(monitor.elapsed(), Some(stopped));
        assert_eq!(monitor.elapsed().unwrap().devices[0].utilization_percent, 65.0);
    }

    #[test]
    fn all_devices_are_aggregated() {
        let provider = ScriptedGpuProvider::with_utilization(&[30.0, 50.0]);
        let mut monitor = GpuMonitor::with_provider("train", provider, GpuDevice::All)
            .with_sink(Arc::new(MemorySink::new()));

        monitor.measure(|| ()).unwrap();

        let elapsed = monitor.elapsed().unwrap();
        assert_eq!(elapsed.devices.len(), 2);
        assert_eq!(elapsed.mean_utilization(), 40.0);
        assert_eq!(monitor.device(), GpuDevice::All);
    }

    #[test]
    fn host_without_gpu_is_unavailable_not_a_crash() {
        let sink = Arc::new(MemorySink::new());
        let mut monitor = GpuMonitor::with_provider(
            DEFAULT_GPU_LABEL,
            ScriptedGpuProvider::with_utilization(&[]),
            GpuDevice::default(),
        )
        .with_sink(sink.clone());

        let err = monitor.measure(|| ()).unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(monitor.state(), MonitorState::Created);
        assert!(monitor.elapsed().is_none());
        assert!(sink.is_empty());
    }
}
