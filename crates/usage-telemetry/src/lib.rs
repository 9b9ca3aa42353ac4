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

//! Scoped monitors and background samplers built on the `usage-core` contracts.
//!
//! - [`monitor`]: the `Created -> Active -> Reported` state machine shared by the
//!   runtime, CPU and GPU monitors, and the RAII guard that closes it.
//! - [`report`]: what a monitor emits on exit and where it goes.
//! - [`sampler`]: worker threads that poll a source on a fixed delay.
//! - [`utils`]: the buffer-time guard.

pub mod monitor;
pub mod report;
pub mod sampler;
pub mod utils;

pub use monitor::cpu::{CpuMonitor, CpuSource, DEFAULT_CPU_LABEL};
pub use monitor::gpu::{GpuMonitor, GpuSource, DEFAULT_GPU_LABEL};
pub use monitor::runtime::{Runtime, RuntimeSource, DEFAULT_RUNTIME_LABEL};
pub use monitor::{Monitor, MonitorGuard};
pub use report::sinks::{sink_for, LogSink, MemorySink, SilentSink, StdoutSink};
pub use report::{MonitorReport, ReportSink, ScopeOutcome};
pub use sampler::log::{UsageLog, UsageSummary};
pub use sampler::{SamplerGuard, UsageSampler};
pub use utils::buffer::{BufferGuard, BufferTime};
