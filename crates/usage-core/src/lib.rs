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

//! # Usage Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by every usage monitor.
//!
//! This crate defines the abstract "what" of monitoring: what a metric source is,
//! what a reading looks like, and which lifecycle states a monitor moves through.
//! `usage-infra` provides concrete sources backed by the host, and
//! `usage-telemetry` builds the scoped monitors on top of these contracts.

#![warn(missing_docs)]

pub mod error;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{MonitorError, MonitorResult};
pub use settings::{GpuDevice, MonitorSettings, ReportTarget, SamplerSettings};
pub use state::MonitorState;
pub use telemetry::{
    Clock, CpuSample, CpuStatsProvider, GpuSample, GpuSnapshot, GpuStatsProvider, Measurement,
    MetricKind, MetricSource, MonotonicClock,
};
pub use utils::timer::Stopwatch;
