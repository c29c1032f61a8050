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

//! The status surface a running script can draw on during the host's UI phase.
//!
//! The script thread never touches UI state. It installs a [`UiCallback`] and
//! the driver invokes it from [`CooperativeScript::tick_ui`](crate::CooperativeScript::tick_ui),
//! on the driver thread, while the script is parked.

use std::sync::Arc;

/// Minimal immediate-mode widgets a host exposes to script status panels.
pub trait ScriptUi {
    /// Draws a line of text.
    fn label(&mut self, text: &str);

    /// Draws a progress bar. `fraction` is in `[0, 1]`.
    fn progress(&mut self, fraction: f32, overlay: Option<&str>);

    /// Draws a button and returns true if it was clicked this frame.
    fn button(&mut self, label: &str) -> bool;

    /// Draws a visual separator. Hosts without one can ignore it.
    fn separator(&mut self) {}
}

/// A callback installed by a script and run by the driver once per UI frame.
pub type UiCallback = Arc<dyn Fn(&mut dyn ScriptUi) + Send + Sync>;
