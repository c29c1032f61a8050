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

//! Simulated depth-of-field renderer with variable rate shading.
//!
//! There is no GPU behind it. Frame time is a deterministic function of how
//! many pixels are shaded, plus a bounded pseudo-random jitter. Every change
//! to a render-relevant setting triggers a few frames of "shader compilation"
//! during which the renderer reports itself unstable and frames are slow.

use baton_bench::{BenchHost, FrameCapture};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frames spent recompiling after a render setting changed.
const COMPILE_FRAMES: u32 = 6;
/// Unstable for one frame every this many frames (streaming hiccup).
const FLICKER_PERIOD: u64 = 97;
const BASE_FRAME_MS: f32 = 6.0;
const SHADING_FRAME_MS: f32 = 12.0;
const COMPILE_PENALTY_MS: f32 = 25.0;
const JITTER_MS: f32 = 0.4;
const EXPOSURE_ADAPTATION_RATE: f32 = 2.0;
/// Animation time between two frames of a benchmark sequence.
const PLAYBACK_STEP_SECONDS: f32 = 1.0 / 60.0;

/// How the shading rate is chosen across the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VrsMode {
    /// Every pixel shaded.
    Off,
    /// One shade per 1x2 block.
    Rate1x2,
    /// One shade per 2x2 block.
    Rate2x2,
    /// One shade per 4x4 block.
    Rate4x4,
    /// 4x4 where the circle of confusion exceeds the threshold, full rate
    /// elsewhere.
    DofDriven,
}

impl VrsMode {
    /// Every mode, full rate first.
    pub const ALL: [VrsMode; 5] = [
        VrsMode::Off,
        VrsMode::Rate1x2,
        VrsMode::Rate2x2,
        VrsMode::Rate4x4,
        VrsMode::DofDriven,
    ];

    /// Shading block size for pixels the mode coarsens.
    pub fn block_size(self) -> (u32, u32) {
        match self {
            VrsMode::Off => (1, 1),
            VrsMode::Rate1x2 => (1, 2),
            VrsMode::Rate2x2 => (2, 2),
            VrsMode::Rate4x4 | VrsMode::DofDriven => (4, 4),
        }
    }

    /// Fraction of the full-rate shading work the mode performs.
    pub fn shading_cost(self, coc_threshold: f32) -> f32 {
        match self {
            VrsMode::DofDriven => {
                // The circle of confusion grows linearly from the focus band
                // to the frame edges, so `1 - threshold` of the rows are coarse.
                let coarse = (1.0 - coc_threshold.clamp(0.0, 1.0)).max(0.0);
                (1.0 - coarse) + coarse / 16.0
            }
            mode => {
                let (w, h) = mode.block_size();
                1.0 / (w * h) as f32
            }
        }
    }
}

impl fmt::Display for VrsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VrsMode::Off => "off",
            VrsMode::Rate1x2 => "1x2",
            VrsMode::Rate2x2 => "2x2",
            VrsMode::Rate4x4 => "4x4",
            VrsMode::DofDriven => "dof",
        };
        f.write_str(name)
    }
}

/// Camera state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    /// When set, exposure drifts toward the scene's target exposure.
    pub auto_exposure: bool,
    pub exposure: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            auto_exposure: true,
            exposure: 0.6,
        }
    }
}

/// Variable rate shading state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VrsSettings {
    pub mode: VrsMode,
    /// Circle of confusion above which [`VrsMode::DofDriven`] coarsens, in `[0, 1]`.
    pub coc_threshold: f32,
}

impl Default for VrsSettings {
    fn default() -> Self {
        Self {
            mode: VrsMode::Off,
            coc_threshold: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugSettings {
    pub wireframe: bool,
    pub freeze_animation: bool,
}

/// Everything a benchmark may change, including the animation playback cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DofSettings {
    pub camera: CameraSettings,
    pub vrs: VrsSettings,
    pub debug: DebugSettings,
    /// Animation time in seconds.
    pub playback_time: f32,
}

impl DofSettings {
    /// The part of the settings that requires recompiling shaders when changed.
    fn pipeline_key(&self) -> (VrsMode, u32, bool, u32) {
        (
            self.vrs.mode,
            self.vrs.coc_threshold.to_bits(),
            self.debug.wireframe,
            self.camera.fov_degrees.to_bits(),
        )
    }
}

/// The simulated application.
#[derive(Debug)]
pub struct DofApp {
    settings: DofSettings,
    compiled_key: (VrsMode, u32, bool, u32),
    compile_frames_left: u32,
    frame: u64,
    last_frame_ms: f32,
    width: u32,
    height: u32,
    rng: u64,
}

impl DofApp {
    pub fn new(width: u32, height: u32) -> Self {
        let settings = DofSettings::default();
        Self {
            compiled_key: settings.pipeline_key(),
            settings,
            compile_frames_left: COMPILE_FRAMES,
            frame: 0,
            last_frame_ms: 0.0,
            width: width.max(1),
            height: height.max(1),
            rng: 0x9E37_79B9_7F4A_7C15,
        }
    }

    pub fn settings(&self) -> &DofSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DofSettings {
        &mut self.settings
    }

    /// Frames rendered so far.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Simulates one frame.
    pub fn update(&mut self, delta_time: f32) {
        self.frame += 1;

        let key = self.settings.pipeline_key();
        if key != self.compiled_key {
            log::debug!("Pipeline changed ({}), recompiling", self.settings.vrs.mode);
            self.compiled_key = key;
            self.compile_frames_left = COMPILE_FRAMES;
        } else {
            self.compile_frames_left = self.compile_frames_left.saturating_sub(1);
        }

        if !self.settings.debug.freeze_animation {
            self.settings.playback_time += delta_time;
        }

        let camera = &mut self.settings.camera;
        if camera.auto_exposure {
            let target = target_exposure(self.settings.playback_time);
            let step = (EXPOSURE_ADAPTATION_RATE * delta_time).clamp(0.0, 1.0);
            camera.exposure += (target - camera.exposure) * step;
        }

        self.last_frame_ms = self.simulated_frame_ms();
    }

    fn simulated_frame_ms(&mut self) -> f32 {
        let vrs = self.settings.vrs;
        let shading = vrs.mode.shading_cost(vrs.coc_threshold)
            * scene_complexity(self.settings.playback_time);
        let mut ms = BASE_FRAME_MS + SHADING_FRAME_MS * shading;
        if self.settings.debug.wireframe {
            ms += 2.0;
        }
        if self.compile_frames_left > 0 {
            ms += COMPILE_PENALTY_MS;
        }
        ms + JITTER_MS * (2.0 * self.next_unit() - 1.0)
    }

    /// xorshift64, mapped to `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 7;
        self.rng ^= self.rng << 17;
        (self.rng >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Renders the current settings into an image.
    pub fn render(&self) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        let vrs = self.settings.vrs;
        let exposure = self.settings.camera.exposure;
        let t = self.settings.playback_time;

        RgbaImage::from_fn(width, height, |x, y| {
            let (bw, bh) = match vrs.mode {
                VrsMode::DofDriven if circle_of_confusion(y, height) <= vrs.coc_threshold => (1, 1),
                mode => mode.block_size(),
            };
            let (sx, sy) = (x - x % bw, y - y % bh);
            shade(sx, sy, width, height, t, exposure)
        })
    }
}

/// Normalized blur of a row: zero in the focus band at the frame center,
/// one at the top and bottom edges.
fn circle_of_confusion(y: u32, height: u32) -> f32 {
    let v = (y as f32 + 0.5) / height as f32;
    ((v - 0.5).abs() * 2.0).min(1.0)
}

/// Relative shading load of the animated scene, 1 at the start of playback.
fn scene_complexity(playback_time: f32) -> f32 {
    1.0 + 0.2 * (playback_time * 0.8).sin()
}

fn target_exposure(playback_time: f32) -> f32 {
    1.0 + 0.25 * (playback_time * 0.5).sin()
}

fn shade(x: u32, y: u32, width: u32, height: u32, t: f32, exposure: f32) -> Rgba<u8> {
    let u = x as f32 / width as f32;
    let v = y as f32 / height as f32;
    let pattern = 0.5 + 0.5 * ((x + y) as f32 * 0.7 + t).sin();
    let channels = [u, v, pattern].map(|c| ((c * exposure).clamp(0.0, 1.0) * 255.0).round() as u8);
    Rgba([channels[0], channels[1], channels[2], 255])
}

impl BenchHost for DofApp {
    type Snapshot = DofSettings;

    fn snapshot(&self) -> DofSettings {
        self.settings
    }

    fn restore(&mut self, snapshot: DofSettings) {
        log::debug!("Restoring settings (vrs mode {})", snapshot.vrs.mode);
        self.settings = snapshot;
    }

    fn apply_deterministic(&mut self) {
        let settings = &mut self.settings;
        settings.camera.auto_exposure = false;
        settings.camera.exposure = 1.0;
        settings.camera.fov_degrees = 60.0;
        settings.debug.wireframe = false;
        settings.debug.freeze_animation = true;
        settings.playback_time = 0.0;
    }

    fn is_stable(&self) -> bool {
        let compiled = self.compile_frames_left == 0;
        let streaming_hiccup = self.frame % FLICKER_PERIOD == 0;
        let camera = &self.settings.camera;
        let exposure_settled = !camera.auto_exposure
            || (camera.exposure - target_exposure(self.settings.playback_time)).abs() < 0.01;
        compiled && !streaming_hiccup && exposure_settled
    }

    fn frame_time_ms(&self) -> f32 {
        self.last_frame_ms
    }

    fn set_playback_frame(&mut self, frame: u32) {
        self.settings.playback_time = frame as f32 * PLAYBACK_STEP_SECONDS;
    }
}

impl FrameCapture for DofApp {
    fn capture_frame(&mut self) -> Option<RgbaImage> {
        if self.frame == 0 {
            return None;
        }
        Some(self.render())
    }
}
