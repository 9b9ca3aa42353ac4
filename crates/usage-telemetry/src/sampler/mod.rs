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

//! Background samplers that poll a metric source on a fixed delay.
//!
//! Unlike a [`Monitor`](crate::Monitor), which reads its source twice, a
//! sampler moves its source onto a worker thread and reads it every `delay`
//! until stopped, recording a [`UsageLog`]. The source comes back when the
//! worker is joined.

pub mod log;

use self::log::UsageLog;
use flume::{Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use usage_core::{
    Measurement, MetricSource, MonitorError, MonitorResult, MonitorState, SamplerSettings,
    Stopwatch,
};

struct Worker<S> {
    stop_tx: Sender<()>,
    handle: JoinHandle<WorkerOutput<S>>,
}

struct WorkerOutput<S> {
    source: S,
    log: UsageLog,
    error: Option<MonitorError>,
}

/// Polls a metric source from a worker thread.
///
/// Shares the monitor lifecycle: `start` from `Created`, `stop` from `Active`,
/// `reset` to sample again.
pub struct UsageSampler<S: MetricSource> {
    source: Option<S>,
    delay: Duration,
    state: MonitorState,
    worker: Option<Worker<S>>,
    log: Option<UsageLog>,
}

impl<S: MetricSource> UsageSampler<S> {
    /// Creates a sampler reading `source` every `delay`.
    pub fn new(source: S, delay: Duration) -> Self {
        Self {
            source: Some(source),
            delay,
            state: MonitorState::Created,
            worker: None,
            log: None,
        }
    }

    /// Creates a sampler using the configured delay.
    pub fn from_settings(source: S, settings: &SamplerSettings) -> Self {
        Self::new(source, settings.delay())
    }

    /// Time between two readings.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Returns `true` while the worker thread is sampling.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// The source, unless it is currently owned by the worker.
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// The log of the last completed run.
    pub fn log(&self) -> Option<&UsageLog> {
        self.log.as_ref()
    }

    /// Takes a baseline reading and starts the worker thread.
    ///
    /// Fails with `InvalidMonitorState` unless the sampler is `Created`, and
    /// with the source's error if the baseline reading fails.
    pub fn start(&mut self) -> MonitorResult<()> {
        if !self.state.can_start() {
            return Err(MonitorError::InvalidMonitorState {
                operation: "start",
                state: self.state,
            });
        }
        let Some(mut source) = self.source.take() else {
            return Err(MonitorError::SamplerFailed(
                "metric source was lost by a previous run".to_string(),
            ));
        };

        // The baseline primes interval-based providers; its value is discarded.
        if let Err(e) = source.read() {
            self.source = Some(source);
            return Err(e);
        }

        let (stop_tx, stop_rx) = flume::bounded(1);
        let delay = self.delay;
        let handle = thread::Builder::new()
            .name(format!("{}-sampler", source.kind()))
            .spawn(move || run_worker(source, delay, stop_rx))
            .map_err(|e| MonitorError::SamplerFailed(format!("could not spawn worker: {e}")))?;

        ::log::debug!("Usage sampler started (delay {:?})", self.delay);
        self.worker = Some(Worker { stop_tx, handle });
        self.log = None;
        self.state = MonitorState::Active;
        Ok(())
    }

    /// Stops the worker, waits for it, and returns the collected log.
    ///
    /// If the source failed mid-run, the partial log is still stored (see
    /// [`UsageSampler::log`]) and `SamplerFailed` is returned.
    pub fn stop(&mut self) -> MonitorResult<&UsageLog> {
        if !self.state.can_stop() {
            return Err(MonitorError::InvalidMonitorState {
                operation: "stop",
                state: self.state,
            });
        }
        let Some(worker) = self.worker.take() else {
            return Err(MonitorError::InvalidMonitorState {
                operation: "stop",
                state: self.state,
            });
        };

        // The worker may already have exited after a source error.
        let _ = worker.stop_tx.send(());
        self.state = MonitorState::Reported;
        let output = worker
            .handle
            .join()
            .map_err(|_| MonitorError::SamplerFailed("worker thread panicked".to_string()))?;

        ::log::debug!("Usage sampler stopped after {} samples", output.log.len());
        self.source = Some(output.source);
        let samples = output.log.len();
        let log = self.log.insert(output.log);
        if let Some(e) = output.error {
            return Err(MonitorError::SamplerFailed(format!(
                "source failed after {samples} samples: {e}"
            )));
        }
        Ok(log)
    }

    /// Clears the last log and returns to `Created`.
    ///
    /// Fails with `InvalidMonitorState` while sampling.
    pub fn reset(&mut self) -> MonitorResult<()> {
        if self.state == MonitorState::Active {
            return Err(MonitorError::InvalidMonitorState {
                operation: "reset",
                state: self.state,
            });
        }
        self.log = None;
        self.state = MonitorState::Created;
        Ok(())
    }

    /// Starts sampling and returns a guard that stops it when dropped.
    pub fn enter(&mut self) -> MonitorResult<SamplerGuard<'_, S>> {
        self.start()?;
        Ok(SamplerGuard {
            sampler: Some(self),
        })
    }
}

fn run_worker<S: MetricSource>(
    mut source: S,
    delay: Duration,
    stop_rx: Receiver<()>,
) -> WorkerOutput<S> {
    let clock = Stopwatch::new();
    let mut log = UsageLog::new(source.kind());
    let mut error = None;

    loop {
        // Waiting on the channel doubles as the inter-sample sleep.
        match stop_rx.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        match source.read() {
            Ok(reading) => {
                log.push(clock.elapsed_secs_f64().unwrap_or_default(), reading.channels())
            }
            Err(e) => {
                ::log::warn!("Usage sampler stopping early: {e}");
                error = Some(e);
                break;
            }
        }
    }

    WorkerOutput { source, log, error }
}

impl<S: MetricSource> Drop for UsageSampler<S> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if worker.handle.join().is_err() {
                ::log::warn!("Usage sampler worker panicked during shutdown");
            }
        }
    }
}

impl<S: MetricSource> fmt::Debug for UsageSampler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageSampler")
            .field("delay", &self.delay)
            .field("state", &self.state)
            .field("running", &self.is_running())
            .field("logged", &self.log.as_ref().map(UsageLog::len))
            .finish()
    }
}

/// Keeps a sampler running for the lifetime of a scope.
pub struct SamplerGuard<'a, S: MetricSource> {
    sampler: Option<&'a mut UsageSampler<S>>,
}

impl<'a, S: MetricSource> SamplerGuard<'a, S> {
    /// Stops the sampler and returns the collected log.
    pub fn finish(mut self) -> MonitorResult<&'a UsageLog> {
        match self.sampler.take() {
            Some(sampler) => sampler.stop(),
            None => Err(MonitorError::InvalidMonitorState {
                operation: "stop",
                state: MonitorState::Reported,
            }),
        }
    }
}

impl<'a, S: MetricSource> fmt::Debug for SamplerGuard<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerGuard")
            .field("open", &self.sampler.is_some())
            .finish()
    }
}

impl<'a, S: MetricSource> Drop for SamplerGuard<'a, S> {
    fn drop(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            if let Err(e) = sampler.stop() {
                ::log::warn!("[SamplerGuard] Failed to stop sampler: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::cpu::CpuSource;
    use crate::monitor::gpu::GpuSource;
    use usage_core::telemetry::scripted::{ScriptedCpuProvider, ScriptedGpuProvider};
    use usage_core::{GpuDevice, MetricKind};

    const DELAY: Duration = Duration::from_millis(10);

    #[test]
    fn collects_samples_until_stopped() {
        let provider = ScriptedCpuProvider::constant(&[25.0, 75.0]);
        let reads = provider.reads();
        let mut sampler = UsageSampler::new(CpuSource::new(provider), DELAY);

        sampler.start().unwrap();
        assert!(sampler.is_running());
        assert!(sampler.source().is_none());
        thread::sleep(Duration::from_millis(80));
        let log = sampler.stop().unwrap().clone();

        assert!(!log.is_empty(), "expected at least one sample");
        assert_eq!(log.kind(), MetricKind::Cpu);
        assert_eq!(log.channel_count(), 2);
        assert!(log.samples().iter().all(|row| row == &vec![25.0, 75.0]));
        assert!(log.times().windows(2).all(|w| w[0] <= w[1]));
        // Baseline plus one read per logged row.
        assert_eq!(reads.get(), log.len() + 1);

        assert_eq!(sampler.state(), MonitorState::Reported);
        assert!(!sampler.is_running());
        assert!(sampler.source().is_some());
        assert_eq!(sampler.log(), Some(&log));
    }

    #[test]
    fn cannot_start_twice() {
        let mut sampler =
            UsageSampler::new(CpuSource::new(ScriptedCpuProvider::constant(&[1.0])), DELAY);
        sampler.start().unwrap();
        assert!(matches!(
            sampler.start(),
            Err(MonitorError::InvalidMonitorState { operation: "start", .. })
        ));
        assert!(matches!(
            sampler.reset(),
            Err(MonitorError::InvalidMonitorState { operation: "reset", .. })
        ));
        sampler.stop().unwrap();

        assert!(sampler.start().is_err());
        sampler.reset().unwrap();
        assert!(sampler.log().is_none());
        sampler.start().unwrap();
        sampler.stop().unwrap();
    }

    #[test]
    fn stop_without_start_is_invalid() {
        let mut sampler =
            UsageSampler::new(CpuSource::new(ScriptedCpuProvider::constant(&[1.0])), DELAY);
        assert!(matches!(
            sampler.stop(),
            Err(MonitorError::InvalidMonitorState { operation: "stop", .. })
        ));
    }

    #[test]
    fn unavailable_source_fails_on_start() {
        let mut sampler = UsageSampler::new(
            GpuSource::new(ScriptedGpuProvider::with_utilization(&[]), GpuDevice::All),
            DELAY,
        );
        assert!(sampler.start().unwrap_err().is_unavailable());
        assert_eq!(sampler.state(), MonitorState::Created);
        assert!(sampler.source().is_some());
    }

    #[test]
    fn source_failure_mid_run_keeps_partial_log() {
        // Baseline plus two rows, then the provider goes away.
        let provider = ScriptedCpuProvider::constant(&[10.0]).fail_after(3);
        let mut sampler = UsageSampler::new(CpuSource::new(provider), DELAY);

        sampler.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        let err = sampler.stop().unwrap_err();

        assert!(matches!(err, MonitorError::SamplerFailed(_)));
        assert_eq!(sampler.log().map(UsageLog::len), Some(2));
    }

    #[test]
    fn guard_stops_on_drop() {
        let mut sampler =
            UsageSampler::new(CpuSource::new(ScriptedCpuProvider::constant(&[5.0])), DELAY);
        {
            let _guard = sampler.enter().unwrap();
            thread::sleep(Duration::from_millis(30));
        }
        assert_eq!(sampler.state(), MonitorState::Reported);
        assert!(sampler.log().is_some());
    }

    #[test]
    fn guard_finish_returns_log() {
        let mut sampler = UsageSampler::from_settings(
            CpuSource::new(ScriptedCpuProvider::constant(&[5.0])),
            &SamplerSettings {
                delay_ms: 5,
                buffer_ms: 0,
            },
        );
        assert_eq!(sampler.delay(), Duration::from_millis(5));

        let guard = sampler.enter().unwrap();
        thread::sleep(Duration::from_millis(30));
        let log = guard.finish().unwrap();
        assert!(!log.is_empty());
    }
}
