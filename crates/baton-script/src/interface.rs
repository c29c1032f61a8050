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

//! The capability handed to a script body.

use crate::state::{Owner, Shared};
use crate::ui::{ScriptUi, UiCallback};
use baton_core::YieldBudget;
use std::sync::Arc;

/// The script body's only handle on its [`CooperativeScript`](crate::CooperativeScript).
///
/// It is passed by reference to the procedure given to
/// [`CooperativeScript::start`](crate::CooperativeScript::start) and cannot be
/// obtained any other way. Every method must be called from the script thread.
///
/// # Stop contract
///
/// Every yielding method returns `false` once the driver has requested a stop.
/// The body is expected to return as soon as it sees `false`. Nothing forces
/// it to: a body that keeps going stays alive, and keeps getting `false`, until
/// it returns on its own.
pub struct ScriptInterface {
    shared: Arc<Shared>,
    run: u64,
}

impl ScriptInterface {
    pub(crate) fn new(shared: Arc<Shared>, run: u64) -> Self {
        Self { shared, run }
    }

    /// Returns control to the driver and blocks until its next `tick`.
    ///
    /// Returns `false` if a stop was requested while suspended.
    #[must_use = "the script must return when a yield reports a stop request"]
    pub fn yield_execution(&self) -> bool {
        let guard = self.shared.lock();
        debug_assert!(
            guard.script_role.accepts_current(),
            "yield_execution called outside the script thread"
        );
        debug_assert_eq!(guard.owner, Owner::Script);
        log::trace!("Script run #{} yielding", self.run);

        let guard = self.shared.yield_to_driver(guard);
        !guard.stop_requested
    }

    /// Yields until `budget` is consumed or a stop is requested.
    ///
    /// A stop interrupts the wait immediately; the rest of the budget is not
    /// waited out.
    #[must_use = "the script must return when a yield reports a stop request"]
    pub fn yield_for(&self, budget: impl Into<YieldBudget>) -> bool {
        let mut progress = budget.into().begin();
        while !progress.is_complete() {
            if !self.yield_execution() {
                return false;
            }
            progress.record(self.delta_time());
        }
        true
    }

    /// Yields until the delivered frame deltas add up to `seconds`.
    #[must_use = "the script must return when a yield reports a stop request"]
    pub fn yield_for_seconds(&self, seconds: f32) -> bool {
        self.yield_for(YieldBudget::Seconds(seconds))
    }

    /// Yields exactly `frames` times.
    #[must_use = "the script must return when a yield reports a stop request"]
    pub fn yield_for_frames(&self, frames: u32) -> bool {
        self.yield_for(YieldBudget::Frames(frames))
    }

    /// The delta passed to the driver's latest `tick`, in seconds.
    pub fn delta_time(&self) -> f32 {
        let guard = self.shared.lock();
        debug_assert!(guard.script_role.accepts_current());
        guard.delta_time
    }

    /// Returns true once the driver has asked this run to stop.
    pub fn is_stop_requested(&self) -> bool {
        self.shared.lock().stop_requested
    }

    /// Installs the callback the driver runs during its UI phase.
    ///
    /// Replaces any previous callback. The callback runs on the driver thread.
    pub fn set_ui_callback<F>(&self, callback: F)
    where
        F: Fn(&mut dyn ScriptUi) + Send + Sync + 'static,
    {
        self.replace_ui_callback(Some(Arc::new(callback)));
    }

    /// Installs or clears (`None`) the UI callback.
    pub fn replace_ui_callback(&self, callback: Option<UiCallback>) {
        let mut guard = self.shared.lock();
        debug_assert!(guard.script_role.accepts_current());
        guard.ui_callback = callback;
    }

    /// Removes the UI callback, if any.
    pub fn clear_ui_callback(&self) {
        self.replace_ui_callback(None);
    }

    /// Number of the run this interface belongs to, starting at 1.
    pub fn run_id(&self) -> u64 {
        self.run
    }
}

impl std::fmt::Debug for ScriptInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInterface")
            .field("run", &self.run)
            .finish_non_exhaustive()
    }
}
