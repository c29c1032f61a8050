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

//! Running statistics over per-frame samples.

use serde::{Deserialize, Serialize};

/// Accumulated statistics over a series of frame-time samples (milliseconds).
///
/// Samples are folded in as they arrive; nothing is stored per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Number of samples recorded.
    pub count: u32,
    /// Sum of all samples.
    pub total_ms: f64,
    /// Smallest sample, or `0.0` when empty.
    pub min_ms: f32,
    /// Largest sample, or `0.0` when empty.
    pub max_ms: f32,
    sum_sq: f64,
}

impl FrameStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self {
            count: 0,
            total_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Folds one sample into the statistics.
    pub fn push(&mut self, sample_ms: f32) {
        if self.count == 0 {
            self.min_ms = sample_ms;
            self.max_ms = sample_ms;
        } else {
            self.min_ms = self.min_ms.min(sample_ms);
            self.max_ms = self.max_ms.max(sample_ms);
        }
        self.count += 1;
        self.total_ms += sample_ms as f64;
        self.sum_sq += (sample_ms as f64) * (sample_ms as f64);
    }

    /// Returns true if no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean of the samples, or `0.0` when empty.
    pub fn average_ms(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.total_ms / self.count as f64) as f32
    }

    /// Population variance of the samples.
    ///
    /// High variance over a measured pass means the host was not stable while
    /// measuring.
    pub fn variance(&self) -> f32 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.total_ms / n;
        ((self.sum_sq / n) - mean * mean).max(0.0) as f32
    }

    /// Average frame rate implied by the mean frame time.
    pub fn average_fps(&self) -> f32 {
        let avg = self.average_ms();
        if avg > 0.0 {
            1000.0 / avg
        } else {
            0.0
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<f32> for FrameStats {
    fn extend<I: IntoIterator<Item = f32>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_stats() {
        let stats = FrameStats::new();
        assert!(stats.is_empty());
        assert_eq!(stats.average_ms(), 0.0);
        assert_eq!(stats.variance(), 0.0);
        assert_eq!(stats.average_fps(), 0.0);
    }

    #[test]
    fn test_min_max_average() {
        let mut stats = FrameStats::new();
        stats.extend([16.0, 12.0, 20.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min_ms, 12.0);
        assert_eq!(stats.max_ms, 20.0);
        assert_relative_eq!(stats.average_ms(), 16.0, epsilon = 1e-5);
        assert_relative_eq!(stats.average_fps(), 62.5, epsilon = 1e-3);
    }

    #[test]
    fn test_variance_of_constant_series_is_zero() {
        let mut stats = FrameStats::new();
        stats.extend(std::iter::repeat(8.0).take(10));
        assert_relative_eq!(stats.variance(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_variance() {
        let mut stats = FrameStats::new();
        stats.extend([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(stats.variance(), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_serializes_summary_fields() {
        let mut stats = FrameStats::new();
        stats.push(10.0);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["min_ms"], 10.0);
        assert_eq!(json["max_ms"], 10.0);
    }
}
