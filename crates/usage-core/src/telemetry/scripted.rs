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

//! Deterministic providers that replay scripted values.
//!
//! Each scripted provider hands out its values in order and repeats the last one
//! once the script runs out. Every provider exposes a [`ReadCounter`] that stays
//! valid after the provider has been moved into a monitor.

use crate::error::{MonitorError, MonitorResult};
use crate::telemetry::providers::{Clock, CpuStatsProvider, GpuStatsProvider};
use crate::telemetry::readings::{CpuSample, GpuSample};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A shared count of reads taken from a scripted provider.
#[derive(Debug, Clone, Default)]
pub struct ReadCounter(Arc<AtomicUsize>);

impl ReadCounter {
    /// Number of reads so far, successful or not.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<T>,
    last: Option<T>,
    successes_left: Option<usize>,
    unavailable: Option<String>,
    reads: ReadCounter,
}

impl<T: Clone> Script<T> {
    fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            queue: values.into_iter().collect(),
            last: None,
            successes_left: None,
            unavailable: None,
            reads: ReadCounter::default(),
        }
    }

    fn unavailable(reason: String) -> Self {
        let mut script = Self::new(Vec::new());
        script.unavailable = Some(reason);
        script
    }

    fn next(&mut self, what: &str) -> MonitorResult<T> {
        self.reads.bump();

        if let Some(reason) = &self.unavailable {
            log::trace!("Scripted {what} read refused: {reason}");
            return Err(MonitorError::unavailable(reason.clone()));
        }
        match self.successes_left {
            Some(0) => {
                log::debug!(
                    "Scripted {what} stopped responding after {} reads",
                    self.reads.get() - 1
                );
                return Err(MonitorError::unavailable(format!(
                    "scripted {what} stopped responding"
                )));
            }
            Some(ref mut left) => *left -= 1,
            None => {}
        }

        if let Some(value) = self.queue.pop_front() {
            self.last = Some(value);
        }
        self.last
            .clone()
            .ok_or_else(|| MonitorError::unavailable(format!("scripted {what} has no values")))
    }
}

/// A clock that replays scripted timestamps.
#[derive(Debug)]
pub struct ScriptedClock {
    script: Script<Duration>,
}

impl ScriptedClock {
    /// Creates a clock that returns `ticks` in order.
    pub fn new(ticks: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            script: Script::new(ticks),
        }
    }

    /// Creates a clock whose every read fails with `MonitorUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            script: Script::unavailable(reason.into()),
        }
    }

    /// Fails every read after the first `reads` successful ones.
    pub fn fail_after(mut self, reads: usize) -> Self {
        self.script.successes_left = Some(reads);
        self
    }

    /// A handle counting reads of this clock.
    pub fn reads(&self) -> ReadCounter {
        self.script.reads.clone()
    }
}

impl Clock for ScriptedClock {
    fn now(&mut self) -> MonitorResult<Duration> {
        self.script.next("clock")
    }
}

/// A CPU provider that replays scripted samples.
#[derive(Debug)]
pub struct ScriptedCpuProvider {
    script: Script<CpuSample>,
}

impl ScriptedCpuProvider {
    /// Creates a provider that returns `samples` in order.
    pub fn new(samples: impl IntoIterator<Item = CpuSample>) -> Self {
        Self {
            script: Script::new(samples),
        }
    }

    /// Creates a provider that always returns the same per-core utilization.
    pub fn constant(per_core: &[f64]) -> Self {
        Self::new([CpuSample::from_per_core(per_core.to_vec())])
    }

    /// Creates a provider whose every read fails with `MonitorUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            script: Script::unavailable(reason.into()),
        }
    }

    /// Fails every read after the first `reads` successful ones.
    pub fn fail_after(mut self, reads: usize) -> Self {
        self.script.successes_left = Some(reads);
        self
    }

    /// A handle counting reads of this provider.
    pub fn reads(&self) -> ReadCounter {
        self.script.reads.clone()
    }
}

impl CpuStatsProvider for ScriptedCpuProvider {
    fn sample(&mut self) -> MonitorResult<CpuSample> {
        self.script.next("CPU provider")
    }
}

/// A GPU provider that replays scripted frames.
///
/// Each call to [`GpuStatsProvider::device_count`] advances to the next frame;
/// [`GpuStatsProvider::sample_device`] reads from the current frame.
#[derive(Debug)]
pub struct ScriptedGpuProvider {
    script: Script<Vec<GpuSample>>,
    current: Vec<GpuSample>,
}

impl ScriptedGpuProvider {
    /// Creates a provider from frames of per-device compute utilization.
    pub fn from_frames(frames: Vec<Vec<f64>>) -> Self {
        let frames = frames.into_iter().map(|frame| {
            frame
                .into_iter()
                .enumerate()
                .map(|(index, utilization)| GpuSample {
                    index: index as u32,
                    utilization_percent: utilization,
                    memory_percent: None,
                })
                .collect::<Vec<_>>()
        });
        Self {
            script: Script::new(frames),
            current: Vec::new(),
        }
    }

    /// Creates a provider with a single, constant frame.
    pub fn with_utilization(per_device: &[f64]) -> Self {
        Self::from_frames(vec![per_device.to_vec()])
    }

    /// Creates a provider whose every read fails with `MonitorUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            script: Script::unavailable(reason.into()),
            current: Vec::new(),
        }
    }

    /// Fails every frame after the first `reads` successful ones.
    pub fn fail_after(mut self, reads: usize) -> Self {
        self.script.successes_left = Some(reads);
        self
    }

    /// A handle counting frames read from this provider.
    pub fn reads(&self) -> ReadCounter {
        self.script.reads.clone()
    }
}

impl GpuStatsProvider for ScriptedGpuProvider {
    fn device_count(&mut self) -> MonitorResult<u32> {
        self.current = self.script.next("GPU provider")?;
        Ok(self.current.len() as u32)
    }

    fn sample_device(&mut self, index: u32) -> MonitorResult<GpuSample> {
        self.current
            .get(index as usize)
            .cloned()
            .ok_or_else(|| MonitorError::unavailable(format!("GPU device {index} not present")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_replays_then_repeats_last_tick() {
        let mut clock = ScriptedClock::new([Duration::from_secs(1), Duration::from_secs(3)]);
        let reads = clock.reads();

        assert_eq!(clock.now().unwrap(), Duration::from_secs(1));
        assert_eq!(clock.now().unwrap(), Duration::from_secs(3));
        assert_eq!(clock.now().unwrap(), Duration::from_secs(3));
        assert_eq!(reads.get(), 3);
    }

    #[test]
    fn empty_script_is_unavailable() {
        let mut clock = ScriptedClock::new([]);
        assert!(clock.now().unwrap_err().is_unavailable());
    }

    #[test]
    fn fail_after_cuts_the_script() {
        let mut cpu = ScriptedCpuProvider::constant(&[50.0]).fail_after(1);
        assert!(cpu.sample().is_ok());
        let err = cpu.sample().unwrap_err();
        assert!(err.to_string().contains("stopped responding"));
        assert_eq!(cpu.reads().get(), 2);
    }

    #[test]
    fn unavailable_provider_counts_failed_reads() {
        let mut gpu = ScriptedGpuProvider::unavailable("driver missing");
        let reads = gpu.reads();
        let err = gpu.device_count().unwrap_err();
        assert_eq!(err, MonitorError::unavailable("driver missing"));
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn gpu_frames_advance_on_device_count() {
        let mut gpu = ScriptedGpuProvider::from_frames(vec![vec![5.0], vec![95.0]]);
        assert_eq!(gpu.device_count().unwrap(), 1);
        assert_eq!(gpu.sample_device(0).unwrap().utilization_percent, 5.0);
        assert_eq!(gpu.device_count().unwrap(), 1);
        assert_eq!(gpu.sample_device(0).unwrap().utilization_percent, 95.0);
        assert!(gpu.sample_device(1).is_err());
    }
}
