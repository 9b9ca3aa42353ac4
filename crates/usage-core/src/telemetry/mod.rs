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

//! Provides the foundational traits and data structures for usage telemetry.
//!
//! This module defines the "common language" of monitoring: metric sources that
//! produce readings, the provider traits through which host statistics are
//! injected, and the reading types themselves. Concrete host-backed providers
//! live in `usage-infra`; scripted providers in [`scripted`] give deterministic
//! values for tests and dry runs.

pub mod providers;
pub mod readings;
pub mod scripted;
pub mod source;

pub use self::providers::{Clock, CpuStatsProvider, GpuStatsProvider, MonotonicClock};
pub use self::readings::{CpuSample, GpuSample, GpuSnapshot};
pub use self::source::{Measurement, MetricKind, MetricSource};
