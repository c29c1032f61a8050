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

//! # Baton Bench
//!
//! Building blocks for long benchmark and image-quality procedures that run
//! as cooperative scripts against a live, continuously ticking host.
//!
//! The central piece is [`AutoBench`], a guard constructed at the top of a
//! script body. It snapshots the host settings it is about to change, forces
//! a deterministic configuration, shows a status panel with a stop button and
//! collects a report. Dropping it, on any exit path, puts the host back the
//! way it was.

#![warn(missing_docs)]

pub mod auto_bench;
pub mod compare;
pub mod config;
pub mod error;
pub mod host;
pub mod report;
pub mod stability;
pub mod timing;

pub use auto_bench::AutoBench;
pub use baton_core::FrameStats;
pub use compare::{compare_images, ImageComparison};
pub use config::BenchConfig;
pub use error::{BenchError, BenchResult};
pub use host::{BenchHost, FrameCapture, SharedHost};
pub use report::BenchReport;
pub use stability::{wait_until_stable, Stability, StabilityDebounce};
pub use timing::{measure_frames, MeasureOptions};
