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

//! State shared between the driver and the script thread.
//!
//! Every field is read and written under `Shared::state`; `Shared::turn` waits
//! on that same mutex. Handing the baton over always means: flip `owner`,
//! notify, then wait until `owner` flips back.

use crate::ui::UiCallback;
use baton_core::ThreadRole;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Which side holds the right to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Owner {
    Driver,
    Script,
}

pub(crate) struct ScriptState {
    pub active: bool,
    pub stop_requested: bool,
    pub owner: Owner,
    pub delta_time: f32,
    pub ui_callback: Option<UiCallback>,
    pub script_role: ThreadRole,
    pub run: u64,
}

impl ScriptState {
    fn idle() -> Self {
        Self {
            active: false,
            stop_requested: false,
            owner: Owner::Driver,
            delta_time: 0.0,
            ui_callback: None,
            script_role: ThreadRole::unbound(),
            run: 0,
        }
    }

    /// Prepares a fresh run. The driver keeps the baton until the first tick.
    pub fn begin_run(&mut self, run: u64) {
        self.active = true;
        self.stop_requested = false;
        self.owner = Owner::Driver;
        self.delta_time = 0.0;
        self.ui_callback = None;
        self.script_role.clear();
        self.run = run;
    }

    /// Clears everything a finished or stopped run leaves behind.
    pub fn reset(&mut self) {
        let run = self.run;
        *self = Self::idle();
        self.run = run;
    }
}

pub(crate) struct Shared {
    state: Mutex<ScriptState>,
    turn: Condvar,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScriptState::idle()),
            turn: Condvar::new(),
        }
    }

    /// Locks the state. Neither side runs user code while holding the lock, so
    /// a poisoned mutex still holds consistent data.
    pub fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Driver side: gives the baton to the script and blocks until it comes back.
    pub fn run_script_slice<'a>(
        &'a self,
        mut guard: MutexGuard<'a, ScriptState>,
    ) -> MutexGuard<'a, ScriptState> {
        guard.owner = Owner::Script;
        self.turn.notify_all();
        self.turn
            .wait_while(guard, |state| state.owner == Owner::Script)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Script side: gives the baton to the driver and blocks until the next slice.
    pub fn yield_to_driver<'a>(
        &'a self,
        mut guard: MutexGuard<'a, ScriptState>,
    ) -> MutexGuard<'a, ScriptState> {
        guard.owner = Owner::Driver;
        self.turn.notify_all();
        self.wait_for_slice(guard)
    }

    /// Script side: blocks until the driver hands over the baton.
    pub fn wait_for_slice<'a>(
        &'a self,
        guard: MutexGuard<'a, ScriptState>,
    ) -> MutexGuard<'a, ScriptState> {
        self.turn
            .wait_while(guard, |state| state.owner == Owner::Driver)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Script side: ends the run and returns the baton to the driver for good.
    pub fn finish_run(&self) {
        let mut guard = self.lock();
        guard.active = false;
        guard.ui_callback = None;
        guard.script_role.clear();
        guard.owner = Owner::Driver;
        self.turn.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_begin_run_hands_nothing_over() {
        let shared = Shared::new();
        let mut guard = shared.lock();
        guard.begin_run(3);
        assert!(guard.active);
        assert_eq!(guard.owner, Owner::Driver);
        assert_eq!(guard.run, 3);
    }

    #[test]
    fn test_reset_keeps_run_counter() {
        let shared = Shared::new();
        let mut guard = shared.lock();
        guard.begin_run(7);
        guard.stop_requested = true;
        guard.delta_time = 0.5;
        guard.reset();
        assert!(!guard.active);
        assert!(!guard.stop_requested);
        assert_eq!(guard.delta_time, 0.0);
        assert_eq!(guard.run, 7);
    }

    #[test]
    fn test_slice_round_trip() {
        let shared = Arc::new(Shared::new());
        shared.lock().begin_run(1);

        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || {
            let guard = worker_shared.wait_for_slice(worker_shared.lock());
            let seen = guard.delta_time;
            drop(guard);
            worker_shared.finish_run();
            seen
        });

        let mut guard = shared.lock();
        guard.delta_time = 0.25;
        let guard = shared.run_script_slice(guard);
        assert!(!guard.active);
        assert_eq!(guard.owner, Owner::Driver);
        drop(guard);

        assert_eq!(worker.join().unwrap(), 0.25);
    }
}
