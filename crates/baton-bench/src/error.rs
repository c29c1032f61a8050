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

//! Error types for benchmark configuration, reports and captures.

use std::path::PathBuf;
use thiserror::Error;

/// An error raised by the benchmark tooling.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A RON configuration could not be parsed.
    #[error("invalid bench configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
    /// The report summary could not be serialized.
    #[error("failed to serialize report summary: {0}")]
    Json(#[from] serde_json::Error),
    /// Two captures being compared have different dimensions.
    #[error("image sizes differ: reference is {reference:?}, test is {test:?}")]
    ImageSizeMismatch {
        /// Width and height of the reference image.
        reference: (u32, u32),
        /// Width and height of the compared image.
        test: (u32, u32),
    },
    /// A capture could not be encoded to disk.
    #[error("failed to save image '{}': {source}", .path.display())]
    Image {
        /// Destination of the image.
        path: PathBuf,
        /// The underlying encoder error.
        #[source]
        source: image::ImageError,
    },
}

impl BenchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results carrying a [`BenchError`].
pub type BenchResult<T> = Result<T, BenchError>;
