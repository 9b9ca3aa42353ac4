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

// Usage Monitor Sandbox
// Runs every monitor against the host and prints what it measured.

use anyhow::Result;
use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};
use usage_monitor::prelude::*;

/// Keeps every logical core busy for `duration`.
fn burn_cpu(duration: Duration) {
    let workers = thread::available_parallelism().map_or(1, |n| n.get());
    thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                let deadline = Instant::now() + duration;
                let mut acc = 0u64;
                while Instant::now() < deadline {
                    acc = black_box(acc.wrapping_mul(6364136223846793005).wrapping_add(1));
                }
            });
        }
    });
}

fn run_runtime_demo() -> Result<()> {
    let mut total = Runtime::new("Three iterations");
    {
        let _scope = total.enter()?;
        for i in 0..3 {
            let mut step = Runtime::new(format!("Iteration {i}"));
            step.measure(|| thread::sleep(Duration::from_millis(50)))?;
        }
    }
    log::info!("Runtime total stored as {:?}", total.elapsed());
    Ok(())
}

fn run_cpu_demo() -> Result<()> {
    let mut cpu = match cpu_monitor(DEFAULT_CPU_LABEL) {
        Ok(cpu) => cpu,
        Err(e) if e.is_unavailable() => {
            log::warn!("Skipping CPU monitor: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    cpu.measure(|| burn_cpu(Duration::from_millis(300)))?;
    if let Some(sample) = cpu.elapsed() {
        for (core, usage) in sample.per_core.iter().enumerate() {
            log::debug!("  core {core}: {usage:.2}%");
        }
    }
    Ok(())
}

fn run_gpu_demo() -> Result<()> {
    let mut gpu = match gpu_monitor(DEFAULT_GPU_LABEL, GpuDevice::All) {
        Ok(gpu) => gpu,
        Err(e) if e.is_unavailable() => {
            log::warn!("Skipping GPU monitor: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match gpu.measure(|| thread::sleep(Duration::from_millis(200))) {
        Ok(()) => Ok(()),
        Err(e) if e.is_unavailable() => {
            log::warn!("GPU monitor could not read the device: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn run_sampler_demo() -> Result<()> {
    let settings = SamplerSettings {
        delay_ms: 50,
        buffer_ms: 250,
    };
    let mut sampler = match cpu_sampler(&settings) {
        Ok(sampler) => sampler,
        Err(e) if e.is_unavailable() => {
            log::warn!("Skipping CPU sampler: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let buffer = BufferTime::from_settings(&settings);
    let usage = {
        let guard = sampler.enter()?;
        buffer.wrap(|| burn_cpu(Duration::from_millis(500)));
        guard.finish()?
    };
    log::info!(
        "CPU sampler logged {} samples over {:.2}s",
        usage.len(),
        usage.duration().unwrap_or_default()
    );
    print!("{}", usage.summary(buffer.buffer_time())?);
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    run_runtime_demo()?;
    run_cpu_demo()?;
    run_gpu_demo()?;
    run_sampler_demo()?;
    Ok(())
}
