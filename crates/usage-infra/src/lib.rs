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

//! Concrete implementations of the provider traits defined in `usage-core`.
//!
//! CPU statistics come from `sysinfo`. GPU statistics come from NVML when the
//! `nvml` feature is enabled; otherwise every GPU read reports
//! `MonitorUnavailable`.

pub mod platform;
pub mod telemetry;

pub use platform::sysinfo_impl::SysinfoCpuProvider;
#[cfg(feature = "nvml")]
pub use telemetry::nvml_impl::NvmlGpuProvider;
pub use telemetry::null_gpu::NullGpuProvider;
pub use telemetry::{default_gpu_provider, DefaultGpuProvider};
