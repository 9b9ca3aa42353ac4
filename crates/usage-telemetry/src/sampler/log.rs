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

//! Timestamped usage logs and their windowed summaries.

use std::fmt::{Display, Formatter};
use std::time::Duration;
use usage_core::{MetricKind, MonitorError, MonitorResult};

/// Readings collected by a sampler, one row per sample.
///
/// `times[i]` is the offset in seconds from the sampler's start at which
/// `samples[i]` was read. Each row holds one value per channel (core, device).
#[derive(Debug, Clone, PartialEq)]
pub struct UsageLog {
    kind: MetricKind,
    times: Vec<f64>,
    samples: Vec<Vec<f64>>,
}

impl UsageLog {
    /// Creates an empty log for readings of `kind`.
    pub fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            times: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Appends one row read at `time` seconds.
    pub fn push(&mut self, time: f64, channels: Vec<f64>) {
        self.times.push(time);
        self.samples.push(channels);
    }

    /// The kind of readings logged.
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Sample times, in seconds from the sampler's start.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample rows, aligned with [`UsageLog::times`].
    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Widest row in the log.
    pub fn channel_count(&self) -> usize {
        self.samples.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Time of the last sample.
    pub fn duration(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Indices of the rows strictly inside `(buffer, duration - buffer)`.
    ///
    /// Fails with `InvalidWindow` if the log is empty or if twice the buffer
    /// exceeds the logged duration.
    pub fn window(&self, buffer: Duration) -> MonitorResult<Vec<usize>> {
        let Some(last) = self.duration() else {
            return Err(MonitorError::InvalidWindow("usage log is empty".to_string()));
        };
        let buffer = buffer.as_secs_f64();
        if 2.0 * buffer > last {
            return Err(MonitorError::InvalidWindow(format!(
                "buffer time of {} too long for elapsed time of {last}",
                2.0 * buffer
            )));
        }

        Ok(self
            .times
            .iter()
            .enumerate()
            .filter(|&(_, &t)| buffer < t && t < last - buffer)
            .map(|(i, _)| i)
            .collect())
    }

    /// Averages the rows inside the buffered window.
    pub fn summary(&self, buffer: Duration) -> MonitorResult<UsageSummary> {
        let rows = self.window(buffer)?;
        if rows.is_empty() {
            return Err(MonitorError::InvalidWindow(format!(
                "no samples between {:.3}s and {:.3}s",
                buffer.as_secs_f64(),
                self.duration().unwrap_or_default() - buffer.as_secs_f64()
            )));
        }

        let stacked_mean = rows
            .iter()
            .map(|&i| self.samples[i].iter().sum::<f64>())
            .sum::<f64>()
            / rows.len() as f64;

        let channel_means = (0..self.channel_count())
            .map(|channel| {
                let values: Vec<f64> = rows
                    .iter()
                    .filter_map(|&i| self.samples[i].get(channel).copied())
                    .collect();
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            })
            .collect();

        Ok(UsageSummary {
            kind: self.kind,
            window_start: self.times[rows[0]],
            window_end: self.times[rows[rows.len() - 1]],
            samples: rows.len(),
            stacked_mean,
            channel_means,
        })
    }
}

/// Averages of a usage log over a buffered window.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    /// The kind of readings summarized.
    pub kind: MetricKind,
    /// Time of the first row inside the window.
    pub window_start: f64,
    /// Time of the last row inside the window.
    pub window_end: f64,
    /// Number of rows inside the window.
    pub samples: usize,
    /// Mean over the window of the per-row sum of all channels (for CPU, the
    /// stacked utilization of every core).
    pub stacked_mean: f64,
    /// Mean over the window of each channel.
    pub channel_means: Vec<f64>,
}

impl Display for UsageSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self.kind {
            MetricKind::Runtime => "Runtime",
            MetricKind::Cpu => "CPU",
            MetricKind::Gpu => "GPU",
        };
        writeln!(
            f,
            "Total {name} usage (avg: {:.2}) over {} samples [{:.2}s, {:.2}s]",
            self.stacked_mean, self.samples, self.window_start, self.window_end
        )?;
        for (i, mean) in self.channel_means.iter().enumerate() {
            writeln!(f, "  {name} {i} (avg: {mean:.2})")?;
        }
        Ok(())
    }
}
