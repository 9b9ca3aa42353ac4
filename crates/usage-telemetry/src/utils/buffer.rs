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

//! Idle padding around a block of work.

use std::thread;
use std::time::Duration;
use usage_core::SamplerSettings;

/// Sleeps for a fixed buffer time when a scope is entered and again when it
/// exits, so a sampler records idle time on both sides of the work.
///
/// Pair it with [`UsageLog::summary`](crate::UsageLog::summary) using the same
/// buffer to exclude the padding from averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTime {
    buffer: Duration,
}

impl BufferTime {
    /// Creates a buffer of `buffer` on each side.
    pub fn new(buffer: Duration) -> Self {
        Self { buffer }
    }

    /// Uses the buffer configured for a sampler.
    pub fn from_settings(settings: &SamplerSettings) -> Self {
        Self::new(settings.buffer())
    }

    /// The buffer applied on each side.
    pub fn buffer_time(&self) -> Duration {
        self.buffer
    }

    /// Sleeps for the buffer and returns a guard that sleeps again on drop.
    pub fn enter(&self) -> BufferGuard {
        thread::sleep(self.buffer);
        BufferGuard {
            buffer: self.buffer,
        }
    }

    /// Runs `block` between two buffer sleeps.
    pub fn wrap<T>(&self, block: impl FnOnce() -> T) -> T {
        let _guard = self.enter();
        block()
    }
}

/// Sleeps for the buffer time when dropped.
#[derive(Debug)]
#[must_use = "the exit buffer is applied when the guard is dropped"]
pub struct BufferGuard {
    buffer: Duration,
}

impl Drop for BufferGuard {
    fn drop(&mut self) {
        thread::sleep(self.buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_core::Stopwatch;

    #[test]
    fn sleeps_on_entry_and_exit() {
        let buffer = BufferTime::new(Duration::from_millis(30));
        let watch = Stopwatch::new();

        let entered_after = {
            let _guard = buffer.enter();
            watch.elapsed().unwrap()
        };
        let total = watch.elapsed().unwrap();

        assert!(entered_after >= Duration::from_millis(30));
        assert!(total >= Duration::from_millis(60));
    }

    #[test]
    fn wrap_returns_block_output() {
        let buffer = BufferTime::new(Duration::ZERO);
        assert_eq!(buffer.wrap(|| 7), 7);
        assert_eq!(buffer.buffer_time(), Duration::ZERO);
    }

    #[test]
    fn from_settings_uses_sampler_buffer() {
        let settings = SamplerSettings {
            delay_ms: 10,
            buffer_ms: 250,
        };
        assert_eq!(
            BufferTime::from_settings(&settings).buffer_time(),
            Duration::from_millis(250)
        );
    }
}
