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

//! Text/CSV report accumulated by a benchmark run.
//!
//! Rows are buffered and flushed as CSV lines into the report body; free text
//! is appended in between. When written, a run directory receives:
//!
//! | File | Content |
//! |---|---|
//! | `report.txt` | Title, text and CSV rows in insertion order |
//! | `summary.json` | Structured values attached with [`BenchReport::set_summary`] |
//! | `<name>.png` | Attached captures |

use crate::error::{BenchError, BenchResult};
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Report of one benchmark run.
#[derive(Debug, Default)]
pub struct BenchReport {
    title: String,
    body: String,
    pending_rows: Vec<Vec<String>>,
    rows_flushed: usize,
    summary: serde_json::Map<String, serde_json::Value>,
    images: Vec<(String, RgbaImage)>,
}

impl BenchReport {
    /// Creates an empty report.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// The report title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Buffers one row of values.
    pub fn add_row_values<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.pending_rows
            .push(values.into_iter().map(|v| v.to_string()).collect());
    }

    /// Appends free text. Pending rows are flushed first so the text keeps
    /// its place relative to them.
    pub fn add_text(&mut self, text: impl AsRef<str>) {
        self.flush_rows();
        self.body.push_str(text.as_ref());
        if !self.body.ends_with('\n') {
            self.body.push('\n');
        }
    }

    /// Moves buffered rows into the body as CSV lines.
    pub fn flush_rows(&mut self) {
        for row in self.pending_rows.drain(..) {
            let line = row
                .iter()
                .map(|field| csv_field(field))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(self.body, "{}", line);
            self.rows_flushed += 1;
        }
    }

    /// Number of rows added so far, flushed or not.
    pub fn row_count(&self) -> usize {
        self.rows_flushed + self.pending_rows.len()
    }

    /// The body as flushed so far.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Attaches a structured value to `summary.json`.
    pub fn set_summary<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> BenchResult<()> {
        self.summary.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Attaches a capture, saved as `<name>.png`.
    pub fn attach_image(&mut self, name: impl Into<String>, image: RgbaImage) {
        self.images.push((name.into(), image));
    }

    /// Writes the report into `dir`, creating it if needed, and returns the
    /// path of `report.txt`.
    pub fn write(&mut self, dir: &Path) -> BenchResult<PathBuf> {
        self.flush_rows();
        std::fs::create_dir_all(dir).map_err(|e| BenchError::io(dir, e))?;

        let report_path = dir.join("report.txt");
        let mut text = String::new();
        if !self.title.is_empty() {
            let _ = writeln!(text, "# {}", self.title);
            text.push('\n');
        }
        text.push_str(&self.body);
        std::fs::write(&report_path, text).map_err(|e| BenchError::io(&report_path, e))?;

        if !self.summary.is_empty() {
            let summary_path = dir.join("summary.json");
            let json = serde_json::to_string_pretty(&self.summary)?;
            std::fs::write(&summary_path, json).map_err(|e| BenchError::io(&summary_path, e))?;
        }

        for (name, image) in &self.images {
            let path = dir.join(format!("{}.png", sanitize_file_name(name)));
            image
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|source| BenchError::Image {
                    path: path.clone(),
                    source,
                })?;
        }

        log::debug!(
            "Report '{}' written: {} rows, {} images",
            self.title,
            self.rows_flushed,
            self.images.len()
        );
        Ok(report_path)
    }
}

/// Quotes a CSV field when it contains a separator, a quote or a line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Replaces characters that are awkward in file names.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
