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

//! Image difference metrics for quality comparisons.

use crate::error::{BenchError, BenchResult};
use image::RgbaImage;
use serde::Serialize;

/// Difference between a reference capture and a test capture.
///
/// Computed over the RGB channels normalized to `[0, 1]`; alpha is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageComparison {
    /// Mean squared error.
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB. Infinite for identical images
    /// (serialized as `null`).
    pub psnr: f64,
    /// Largest per-channel difference, in 8-bit units.
    pub max_abs_diff: u8,
}

impl ImageComparison {
    /// Returns true if the images matched exactly.
    pub fn is_identical(&self) -> bool {
        self.max_abs_diff == 0
    }
}

/// Compares two captures of the same size.
pub fn compare_images(reference: &RgbaImage, test: &RgbaImage) -> BenchResult<ImageComparison> {
    if reference.dimensions() != test.dimensions() {
        return Err(BenchError::ImageSizeMismatch {
            reference: reference.dimensions(),
            test: test.dimensions(),
        });
    }

    let mut sum_sq = 0.0f64;
    let mut max_abs_diff = 0u8;
    let mut samples = 0u64;
    for (a, b) in reference.pixels().zip(test.pixels()) {
        for channel in 0..3 {
            let diff = a.0[channel].abs_diff(b.0[channel]);
            max_abs_diff = max_abs_diff.max(diff);
            let normalized = diff as f64 / 255.0;
            sum_sq += normalized * normalized;
            samples += 1;
        }
    }

    let mse = if samples == 0 {
        0.0
    } else {
        sum_sq / samples as f64
    };
    let psnr = if mse > 0.0 {
        10.0 * (1.0 / mse).log10()
    } else {
        f64::INFINITY
    };

    Ok(ImageComparison {
        mse,
        psnr,
        max_abs_diff,
    })
}
