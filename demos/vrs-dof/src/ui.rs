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

//! Console rendition of the script status panel.

use baton_script::ScriptUi;

/// Collects the widgets of one UI frame and prints the panel when it changes.
///
/// The `Stop` button is "clicked" automatically once `stop_after_frames`
/// frames have been drawn, standing in for a user pressing it.
#[derive(Debug, Default)]
pub struct ConsoleUi {
    stop_after_frames: Option<u64>,
    frame: u64,
    lines: Vec<String>,
    last_printed: Vec<String>,
}

impl ConsoleUi {
    pub fn new(stop_after_frames: Option<u64>) -> Self {
        Self {
            stop_after_frames,
            ..Default::default()
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.lines.clear();
    }

    /// Prints the panel if it differs from the last printed one. Returns the
    /// number of lines printed.
    pub fn end_frame(&mut self) -> usize {
        if self.lines.is_empty() || self.lines == self.last_printed {
            return 0;
        }
        for line in &self.lines {
            println!("  | {}", line);
        }
        self.last_printed = self.lines.clone();
        self.lines.len()
    }
}

impl ScriptUi for ConsoleUi {
    fn label(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn progress(&mut self, fraction: f32, overlay: Option<&str>) {
        // 10% steps, so the panel is not reprinted every frame.
        let steps = (fraction.clamp(0.0, 1.0) * 10.0).floor() as usize;
        let mut line = format!(
            "[{}{}] {:>3}%",
            "###".repeat(steps),
            "---".repeat(10 - steps),
            steps * 10
        );
        if let Some(overlay) = overlay {
            line.push(' ');
            line.push_str(overlay);
        }
        self.lines.push(line);
    }

    fn button(&mut self, label: &str) -> bool {
        let clicked = self
            .stop_after_frames
            .is_some_and(|limit| label == "Stop" && self.frame >= limit);
        if clicked {
            log::info!("Simulated click on '{}' at UI frame {}", label, self.frame);
        }
        self.lines.push(format!("[ {} ]", label));
        clicked
    }

    fn separator(&mut self) {
        self.lines.push("-".repeat(20));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_clicked_after_limit() {
        let mut ui = ConsoleUi::new(Some(2));
        ui.begin_frame();
        assert!(!ui.button("Stop"));
        ui.begin_frame();
        assert!(ui.button("Stop"));
        assert!(!ui.button("Other"));
    }

    #[test]
    fn test_never_clicks_without_limit() {
        let mut ui = ConsoleUi::new(None);
        for _ in 0..100 {
            ui.begin_frame();
            assert!(!ui.button("Stop"));
        }
    }

    #[test]
    fn test_unchanged_panel_is_printed_once() {
        let mut ui = ConsoleUi::new(None);
        ui.begin_frame();
        ui.label("Script running: perf");
        ui.progress(0.5, None);
        assert_eq!(ui.end_frame(), 2);

        ui.begin_frame();
        ui.label("Script running: perf");
        ui.progress(0.52, None);
        assert_eq!(ui.end_frame(), 0);
    }

    #[test]
    fn test_progress_bar_layout() {
        let mut ui = ConsoleUi::new(None);
        ui.begin_frame();
        ui.progress(1.0, Some("done"));
        assert_eq!(ui.lines[0], format!("[{}] 100% done", "#".repeat(30)));
    }
}
