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

//! GPU statistics providers.

pub mod null_gpu;
#[cfg(feature = "nvml")]
pub mod nvml_impl;

use usage_core::MonitorResult;

/// The GPU provider used when none is supplied explicitly.
#[cfg(feature = "nvml")]
pub type DefaultGpuProvider = nvml_impl::NvmlGpuProvider;

/// The GPU provider used when none is supplied explicitly.
#[cfg(not(feature = "nvml"))]
pub type DefaultGpuProvider = null_gpu::NullGpuProvider;

/// Connects to the default GPU provider.
///
/// With the `nvml` feature this fails with `MonitorUnavailable` when the NVIDIA
/// driver cannot be loaded. Without it, construction succeeds and every read
/// reports `MonitorUnavailable`.
pub fn default_gpu_provider() -> MonitorResult<DefaultGpuProvider> {
    #[cfg(feature = "nvml")]
    {
        nvml_impl::NvmlGpuProvider::new()
    }
    #[cfg(not(feature = "nvml"))]
    {
        Ok(null_gpu::NullGpuProvider::new(
            "built without GPU support (enable the `nvml` feature)",
        ))
    }
}
