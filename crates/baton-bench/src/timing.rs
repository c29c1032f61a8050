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

//! Frame-time measurement with a discarded warmup pass.

use baton_core::FrameStats;
use baton_script::ScriptInterface;
use serde::{Deserialize, Serialize};

/// Shape of a timing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureOptions {
    /// Frames sampled by the measured pass.
    pub frames: u32,
    /// Frame index step of the warmup pass. The warmup walks the same frame
    /// range as the measured pass but resumes only `ceil(frames / stride)`
    /// times.
    pub warmup_stride: u32,
}

impl MeasureOptions {
    /// Resumptions spent in the warmup pass.
    pub fn warmup_frames(&self) -> u32 {
        self.frames.div_ceil(self.warmup_stride.max(1))
    }
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            frames: 240,
            warmup_stride: 4,
        }
    }
}

/// Runs the frame loop twice: a warmup pass whose timings are thrown away
/// (cold caches, first-use shader compilation) and a measured pass that feeds
/// `sample()` into [`FrameStats`] once per frame.
///
/// Before each yield `position(frame)` moves the content to the frame about
/// to be rendered. The warmup visits `0, stride, 2 * stride, ..` below
/// `frames`, the measured pass visits every frame of `0..frames`.
///
/// `progress` receives the overall fraction across both passes. Returns
/// `None` as soon as a stop is observed.
pub fn measure_frames(
    script: &ScriptInterface,
    options: MeasureOptions,
    should_stop: impl Fn() -> bool,
    mut position: impl FnMut(u32),
    mut sample: impl FnMut() -> f32,
    mut progress: impl FnMut(f32),
) -> Option<FrameStats> {
    let stride = options.warmup_stride.max(1);
    let total = (options.warmup_frames() + options.frames).max(1) as f32;
    let mut done: u32 = 0;

    let mut frame: u32 = 0;
    while frame < options.frames {
        position(frame);
        if !script.yield_for_frames(1) || should_stop() {
            return None;
        }
        frame = frame.saturating_add(stride);
        done += 1;
        progress(done as f32 / total);
    }
    log::trace!("Warmup pass done after {} frames", done);

    let mut stats = FrameStats::new();
    for frame in 0..options.frames {
        position(frame);
        if !script.yield_for_frames(1) || should_stop() {
            return None;
        }
        stats.push(sample());
        done += 1;
        progress(done as f32 / total);
    }

    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_frames_rounds_up() {
        let options = MeasureOptions {
            frames: 10,
            warmup_stride: 4,
        };
        assert_eq!(options.warmup_frames(), 3);
    }

    #[test]
    fn test_zero_stride_behaves_like_one() {
        let options = MeasureOptions {
            frames: 5,
            warmup_stride: 0,
        };
        assert_eq!(options.warmup_frames(), 5);
    }
}
