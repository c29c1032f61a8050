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

//! Benchmark procedures run inside the cooperative script.

use crate::app::{DofApp, VrsMode};
use baton_bench::{compare_images, AutoBench, BenchConfig, ImageComparison, SharedHost, Stability};
use baton_core::FrameStats;
use baton_script::ScriptInterface;
use clap::ValueEnum;
use serde::Serialize;

/// Which procedures a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Procedure {
    Perf,
    Quality,
    All,
}

#[derive(Debug, Serialize)]
struct PerfResult {
    mode: VrsMode,
    stats: FrameStats,
    average_fps: f32,
}

#[derive(Debug, Serialize)]
struct QualityResult {
    mode: VrsMode,
    comparison: ImageComparison,
}

/// Script body: runs the selected procedures back to back.
pub fn run(
    procedure: Procedure,
    script: &ScriptInterface,
    host: SharedHost<DofApp>,
    config: BenchConfig,
) {
    let completed = match procedure {
        Procedure::Perf => perf_test(script, host, config),
        Procedure::Quality => quality_test(script, host, config),
        Procedure::All => {
            perf_test(script, host.clone(), config.clone())
                && quality_test(script, host, config)
        }
    };
    if completed {
        log::info!("Procedure {:?} completed", procedure);
    } else {
        log::warn!("Procedure {:?} stopped", procedure);
    }
}

/// Measures the frame time of every VRS mode.
///
/// Returns false if the run was stopped.
pub fn perf_test(script: &ScriptInterface, host: SharedHost<DofApp>, config: BenchConfig) -> bool {
    let mut bench = AutoBench::new(script, host, "vrs_dof_perf", config);
    bench.report_add_text(format!(
        "VRS performance, {} measured frames per mode",
        bench.config().measure_frames
    ));
    bench.report_add_row_values(["mode", "avg_ms", "min_ms", "max_ms", "frames"]);

    let mut results = Vec::new();
    for (i, mode) in VrsMode::ALL.into_iter().enumerate() {
        bench.set_ui_status_info(format!(
            "{}: waiting for stable ({}/{})",
            mode,
            i + 1,
            VrsMode::ALL.len()
        ));
        match bench.set_and_wait_until_stable(|app| app.settings_mut().vrs.mode = mode) {
            Stability::Stable { .. } => {}
            Stability::Stopped => return false,
            Stability::TimedOut => {
                bench.report_add_text(format!("{}: never stabilized, skipped", mode));
                continue;
            }
        }

        bench.set_ui_status_info(format!("{}: measuring", mode));
        let Some(stats) = bench.measure_frames() else {
            return false;
        };
        log::info!(
            "{}: {:.3} ms avg ({:.1} fps)",
            mode,
            stats.average_ms(),
            stats.average_fps()
        );
        bench.report_add_row_values([
            mode.to_string(),
            format!("{:.3}", stats.average_ms()),
            format!("{:.3}", stats.min_ms),
            format!("{:.3}", stats.max_ms),
            stats.count.to_string(),
        ]);
        results.push(PerfResult {
            mode,
            average_fps: stats.average_fps(),
            stats,
        });
    }

    if let Err(e) = bench.report_mut().set_summary("perf", &results) {
        log::error!("Failed to record perf summary: {}", e);
    }
    !bench.should_stop()
}

/// Compares a capture of every coarse VRS mode against a full-rate reference.
///
/// Returns false if the run was stopped.
pub fn quality_test(script: &ScriptInterface, host: SharedHost<DofApp>, config: BenchConfig) -> bool {
    let mut bench = AutoBench::new(script, host, "vrs_dof_quality", config);

    bench.set_ui_status_info("reference: waiting for stable");
    match bench.set_and_wait_until_stable(|app| app.settings_mut().vrs.mode = VrsMode::Off) {
        Stability::Stable { .. } => {}
        Stability::Stopped => return false,
        Stability::TimedOut => {
            bench.report_add_text("reference never stabilized, no comparison possible");
            return true;
        }
    }
    let Some(reference) = bench.capture_frame("reference") else {
        bench.report_add_text("no reference frame available");
        return true;
    };

    bench.report_add_row_values(["mode", "mse", "psnr", "max_abs_diff"]);
    let modes: Vec<VrsMode> = VrsMode::ALL
        .into_iter()
        .filter(|mode| *mode != VrsMode::Off)
        .collect();

    let mut results = Vec::new();
    for (i, &mode) in modes.iter().enumerate() {
        bench.set_ui_status_info(format!("{}: waiting for stable", mode));
        bench.set_ui_progress(Some(i as f32 / modes.len() as f32));
        match bench.set_and_wait_until_stable(|app| app.settings_mut().vrs.mode = mode) {
            Stability::Stable { .. } => {}
            Stability::Stopped => return false,
            Stability::TimedOut => {
                bench.report_add_text(format!("{}: never stabilized, skipped", mode));
                continue;
            }
        }

        let Some(capture) = bench.capture_frame(&mode.to_string()) else {
            continue;
        };
        match compare_images(&reference, &capture) {
            Ok(comparison) => {
                log::info!("{}: mse {:.6}, psnr {:.2} dB", mode, comparison.mse, comparison.psnr);
                bench.report_add_row_values([
                    mode.to_string(),
                    format!("{:.6}", comparison.mse),
                    format!("{:.2}", comparison.psnr),
                    comparison.max_abs_diff.to_string(),
                ]);
                results.push(QualityResult { mode, comparison });
            }
            Err(e) => {
                log::error!("{}: comparison failed: {}", mode, e);
                bench.report_add_text(format!("{}: comparison failed: {}", mode, e));
            }
        }
    }
    bench.set_ui_progress(None);

    if let Err(e) = bench.report_mut().set_summary("quality", &results) {
        log::error!("Failed to record quality summary: {}", e);
    }
    !bench.should_stop()
}
