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

//! Scoped benchmark guard that restores the host on every exit path.

use crate::config::BenchConfig;
use crate::host::{BenchHost, FrameCapture, SharedHost};
use crate::report::{sanitize_file_name, BenchReport};
use crate::stability::{wait_until_stable, Stability};
use crate::timing::{measure_frames, MeasureOptions};
use baton_core::FrameStats;
use baton_script::{ScriptInterface, ScriptUi};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// What the status panel shows. Written by the script, read by the driver's
/// UI phase.
#[derive(Debug)]
struct StatusPanel {
    name: String,
    status: String,
    progress: Option<f32>,
}

/// RAII guard for a benchmark procedure running inside a cooperative script.
///
/// Construction:
/// 1. snapshots the host settings,
/// 2. applies the host's deterministic configuration (if configured),
/// 3. installs a status panel with a `Stop` button as the script's UI callback.
///
/// Drop, including early returns after a failed yield and unwinding:
/// 1. restores the snapshot,
/// 2. removes the UI callback,
/// 3. flushes buffered report rows,
/// 4. writes the report, unless the run was stopped or panicked.
///
/// Never hold the host lock across a yield: the driver needs it to render
/// the next frame.
pub struct AutoBench<'s, H: BenchHost> {
    script: &'s ScriptInterface,
    host: SharedHost<H>,
    config: BenchConfig,
    name: String,
    snapshot: Option<H::Snapshot>,
    panel: Arc<Mutex<StatusPanel>>,
    stop_pressed: Arc<AtomicBool>,
    report: BenchReport,
    report_dir: PathBuf,
}

impl<'s, H: BenchHost> AutoBench<'s, H> {
    /// Takes over the host for the lifetime of the returned guard.
    pub fn new(
        script: &'s ScriptInterface,
        host: SharedHost<H>,
        name: impl Into<String>,
        config: BenchConfig,
    ) -> Self {
        let name = name.into();

        let snapshot = host.with(|h| {
            let snapshot = h.snapshot();
            if config.ensure_determinism {
                h.apply_deterministic();
            }
            snapshot
        });

        let panel = Arc::new(Mutex::new(StatusPanel {
            name: name.clone(),
            status: String::new(),
            progress: None,
        }));
        let stop_pressed = Arc::new(AtomicBool::new(false));
        {
            let panel = Arc::clone(&panel);
            let stop_pressed = Arc::clone(&stop_pressed);
            script.set_ui_callback(move |ui: &mut dyn ScriptUi| {
                draw_status_panel(ui, &panel, &stop_pressed)
            });
        }

        let report_dir = config.report_root.join(format!(
            "{}_{}_run{}",
            sanitize_file_name(&name),
            unix_timestamp(),
            script.run_id()
        ));

        log::info!("AutoBench '{}' started (run #{})", name, script.run_id());

        Self {
            script,
            host,
            report: BenchReport::new(name.clone()),
            config,
            name,
            snapshot: Some(snapshot),
            panel,
            stop_pressed,
            report_dir,
        }
    }

    /// The benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The script this benchmark runs in.
    pub fn script(&self) -> &'s ScriptInterface {
        self.script
    }

    /// The host under test.
    pub fn host(&self) -> &SharedHost<H> {
        &self.host
    }

    /// The configuration this run uses.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Buffers one report row.
    pub fn report_add_row_values<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.report.add_row_values(values);
    }

    /// Appends free text to the report.
    pub fn report_add_text(&mut self, text: impl AsRef<str>) {
        self.report.add_text(text);
    }

    /// Direct access to the report, for summaries and attachments.
    pub fn report_mut(&mut self) -> &mut BenchReport {
        &mut self.report
    }

    /// Directory the report is written to when the run completes.
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Sets the status line shown in the UI panel.
    pub fn set_ui_status_info(&self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("AutoBench '{}': {}", self.name, text);
        self.panel().status = text;
    }

    /// Sets (or hides, with `None`) the progress bar of the UI panel.
    pub fn set_ui_progress(&self, fraction: Option<f32>) {
        self.panel().progress = fraction.map(|f| f.clamp(0.0, 1.0));
    }

    /// Returns true once the user pressed `Stop` or the driver requested a stop.
    pub fn should_stop(&self) -> bool {
        self.stop_pressed.load(Ordering::Relaxed) || self.script.is_stop_requested()
    }

    /// Abandons the run as if the user had pressed `Stop`.
    pub fn request_stop(&self) {
        self.stop_pressed.store(true, Ordering::Relaxed);
    }

    /// Yields `frames` frames; false if the run should stop.
    #[must_use = "the procedure must return when the run should stop"]
    pub fn yield_frames(&self, frames: u32) -> bool {
        self.script.yield_for_frames(frames) && !self.should_stop()
    }

    /// Waits for the host's stabilization predicate to hold for
    /// `stable_frames` consecutive frames.
    pub fn wait_until_stable(&self) -> Stability {
        wait_until_stable(
            self.script,
            || self.should_stop(),
            || self.host.with(|h| h.is_stable()),
            self.config.stable_frames,
            self.config.stability_timeout_frames,
        )
    }

    /// Changes a test parameter on the host, then waits until it is stable.
    pub fn set_and_wait_until_stable(&self, apply: impl FnOnce(&mut H)) -> Stability {
        self.host.with(apply);
        self.wait_until_stable()
    }

    /// Runs a warmup pass and a measured pass over `measure_frames` frames,
    /// positioning the host on each frame with
    /// [`BenchHost::set_playback_frame`] and sampling its frame time.
    /// Returns `None` if stopped.
    pub fn measure_frames(&self) -> Option<FrameStats> {
        let options = MeasureOptions {
            frames: self.config.measure_frames,
            warmup_stride: self.config.warmup_stride,
        };
        let stats = measure_frames(
            self.script,
            options,
            || self.should_stop(),
            |frame| self.host.with(|h| h.set_playback_frame(frame)),
            || self.host.with(|h| h.frame_time_ms()),
            |fraction| self.set_ui_progress(Some(fraction)),
        );
        self.set_ui_progress(None);
        stats
    }

    fn panel(&self) -> std::sync::MutexGuard<'_, StatusPanel> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<'s, H: BenchHost + FrameCapture> AutoBench<'s, H> {
    /// Reads back the host's last frame. When `save_captures` is enabled the
    /// capture is also attached to the report under `name`.
    pub fn capture_frame(&mut self, name: &str) -> Option<RgbaImage> {
        let image = self.host.with(|h| h.capture_frame());
        match &image {
            Some(image) if self.config.save_captures => {
                self.report.attach_image(name, image.clone());
            }
            Some(_) => {}
            None => log::warn!("AutoBench '{}': no frame to capture for '{}'", self.name, name),
        }
        image
    }
}

impl<'s, H: BenchHost> Drop for AutoBench<'s, H> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.host.with(|h| h.restore(snapshot));
        }
        self.script.clear_ui_callback();
        self.report.flush_rows();

        if std::thread::panicking() || self.should_stop() {
            log::warn!("AutoBench '{}': script stopped, no report written", self.name);
            return;
        }
        if !self.config.write_report {
            log::info!("AutoBench '{}' finished (report disabled)", self.name);
            return;
        }

        match self.report.write(&self.report_dir) {
            Ok(path) => log::info!(
                "AutoBench '{}' finished, report written to '{}'",
                self.name,
                path.display()
            ),
            Err(e) => log::error!("AutoBench '{}': failed to write report: {}", self.name, e),
        }
    }
}

fn draw_status_panel(ui: &mut dyn ScriptUi, panel: &Mutex<StatusPanel>, stop_pressed: &AtomicBool) {
    {
        let panel = panel.lock().unwrap_or_else(PoisonError::into_inner);
        ui.label(&format!("Script running: {}", panel.name));
        if !panel.status.is_empty() {
            ui.label(&format!("Status: {}", panel.status));
        }
        if let Some(fraction) = panel.progress {
            ui.progress(fraction, None);
        }
    }
    ui.separator();

    if stop_pressed.load(Ordering::Relaxed) {
        ui.label("Stopping...");
    } else if ui.button("Stop") {
        log::info!("Stop requested from the UI");
        stop_pressed.store(true, Ordering::Relaxed);
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
