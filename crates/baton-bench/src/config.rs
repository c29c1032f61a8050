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

//! Benchmark configuration, loaded from RON.

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings shared by every procedure built on [`AutoBench`](crate::AutoBench).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Consecutive stable frames required before measuring.
    pub stable_frames: u32,
    /// Frames to wait for stability before giving up. `0` waits forever.
    pub stability_timeout_frames: u32,
    /// Frames in one timing pass.
    pub measure_frames: u32,
    /// Step of the frame index during the warmup pass. Larger values make the
    /// warmup shorter.
    pub warmup_stride: u32,
    /// Directory under which each run creates its own report directory.
    pub report_root: PathBuf,
    /// Whether a completed run writes its report.
    pub write_report: bool,
    /// Whether the host is switched to its deterministic configuration for
    /// the duration of the run.
    pub ensure_determinism: bool,
    /// Whether frame captures are saved next to the report.
    pub save_captures: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            stable_frames: 8,
            stability_timeout_frames: 600,
            measure_frames: 240,
            warmup_stride: 4,
            report_root: PathBuf::from("reports"),
            write_report: true,
            ensure_determinism: true,
            save_captures: false,
        }
    }
}

impl BenchConfig {
    /// Parses a configuration from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> BenchResult<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Loads a configuration from a RON file.
    pub fn load(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded bench configuration from '{}'", path.display());
        Ok(config)
    }
}
