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

//! Driver side of a cooperative script.

use crate::config::ScriptConfig;
use crate::interface::ScriptInterface;
use crate::state::Shared;
use crate::ui::ScriptUi;
use baton_core::{ScriptError, ScriptResult, ThreadRole};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A script slot driven once per host frame.
///
/// States:
///
/// | State | Meaning |
/// |---|---|
/// | Inactive | No run, or the last run returned / was stopped. |
/// | Running on driver | A run exists, the script thread is parked. |
/// | Running on script | The driver is blocked inside `tick` or `stop`. |
///
/// [`start`](Self::start) moves to *running on driver* without running any
/// script code. Each [`tick`](Self::tick) runs exactly one slice: from the
/// previous yield to the next one. When the body returns (or panics) the
/// instance goes back to *inactive* and can be started again.
pub struct CooperativeScript {
    config: ScriptConfig,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    driver: ThreadRole,
    runs: u64,
}

impl CooperativeScript {
    /// Creates an inactive script slot.
    pub fn new(config: ScriptConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new()),
            handle: None,
            driver: ThreadRole::unbound(),
            runs: 0,
        }
    }

    /// Launches `procedure` on a new script thread.
    ///
    /// The thread is created parked; the procedure's first instruction runs
    /// during the next [`tick`](Self::tick). The calling thread becomes the
    /// driver for this run.
    ///
    /// # Errors
    ///
    /// * [`ScriptError::AlreadyActive`] if a run is in progress. The running
    ///   script is not affected.
    /// * [`ScriptError::Spawn`] if the thread could not be created. The slot
    ///   stays inactive.
    pub fn start<F>(&mut self, procedure: F) -> ScriptResult<()>
    where
        F: FnOnce(&ScriptInterface) + Send + 'static,
    {
        if self.is_active() {
            log::error!(
                "CooperativeScript: start called while run #{} is still active",
                self.runs
            );
            return Err(ScriptError::AlreadyActive);
        }
        self.reap_finished();

        let run = self.runs + 1;
        self.driver.bind_current();
        self.shared.lock().begin_run(run);

        let mut builder = thread::Builder::new().name(format!("{}-{}", self.config.thread_name, run));
        if let Some(stack_size) = self.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let shared = Arc::clone(&self.shared);
        match builder.spawn(move || run_worker(shared, run, procedure)) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.runs = run;
                log::info!("CooperativeScript: run #{} started", run);
                Ok(())
            }
            Err(e) => {
                self.shared.lock().reset();
                log::error!("CooperativeScript: failed to spawn script thread: {}", e);
                Err(ScriptError::Spawn(e))
            }
        }
    }

    /// Runs one slice of the active script, if any.
    ///
    /// Stores `delta_time` for the script, hands it the baton and blocks until
    /// it yields or returns. Must be called from the driver thread.
    pub fn tick(&mut self, delta_time: f32) {
        debug_assert!(
            self.driver.accepts_current(),
            "CooperativeScript::tick called outside the driver thread"
        );

        let mut guard = self.shared.lock();
        if !guard.active {
            drop(guard);
            self.reap_finished();
            return;
        }

        guard.delta_time = delta_time;
        log::trace!("CooperativeScript: slice of run #{} (dt={})", guard.run, delta_time);
        let guard = self.shared.run_script_slice(guard);
        let finished = !guard.active;
        drop(guard);

        if finished {
            self.reap_finished();
        }
    }

    /// Runs the script's UI callback, if the script is active and has one.
    ///
    /// Call it once per frame from the host's UI phase. The callback runs on
    /// this thread while the script thread is parked. Returns whether a
    /// callback ran.
    pub fn tick_ui(&self, ui: &mut dyn ScriptUi) -> bool {
        debug_assert!(self.driver.accepts_current());

        let callback = {
            let guard = self.shared.lock();
            if !guard.active {
                return false;
            }
            guard.ui_callback.clone()
        };

        match callback {
            Some(callback) => {
                callback(ui);
                true
            }
            None => false,
        }
    }

    /// Returns true from a successful [`start`](Self::start) until the run ends.
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    /// Returns a cloneable handle that answers [`is_active`](Self::is_active)
    /// from any thread.
    pub fn probe(&self) -> ScriptProbe {
        ScriptProbe {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Asks the script to stop and waits for its thread to exit.
    ///
    /// The request is cooperative: the script keeps receiving slices, each of
    /// which ends with a yield returning `false`, until it returns. A script
    /// that never yields again blocks this call forever. Does nothing if no
    /// script thread exists.
    pub fn stop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        debug_assert!(
            self.driver.accepts_current(),
            "CooperativeScript::stop called outside the driver thread"
        );

        let mut guard = self.shared.lock();
        if guard.active {
            log::info!("CooperativeScript: stopping run #{}", guard.run);
            guard.stop_requested = true;
            guard.delta_time = 0.0;

            let mut slices: u32 = 0;
            while guard.active {
                guard = self.shared.run_script_slice(guard);
                slices = slices.saturating_add(1);
                if slices == self.config.stop_warning_slice() {
                    log::warn!(
                        "CooperativeScript: run #{} ignored the stop request for {} slices",
                        guard.run,
                        slices
                    );
                }
            }
        }
        drop(guard);

        self.reap_finished();
        self.shared.lock().reset();
    }

    /// Number of runs started on this slot.
    pub fn run_count(&self) -> u64 {
        self.runs
    }

    /// The slot's configuration.
    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    /// Joins the thread of a run that already ended.
    fn reap_finished(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("CooperativeScript: script thread terminated abnormally");
            } else {
                log::info!("CooperativeScript: run #{} finished", self.runs);
            }
        }
    }
}

impl Default for CooperativeScript {
    fn default() -> Self {
        Self::new(ScriptConfig::default())
    }
}

impl Drop for CooperativeScript {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CooperativeScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooperativeScript")
            .field("config", &self.config)
            .field("active", &self.is_active())
            .field("runs", &self.runs)
            .finish()
    }
}

/// Thread-safe, read-only view of a script slot's activity.
#[derive(Clone)]
pub struct ScriptProbe {
    shared: Arc<Shared>,
}

impl ScriptProbe {
    /// Returns true while the observed slot has an active run.
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }
}

/// Body of the script thread.
fn run_worker<F>(shared: Arc<Shared>, run: u64, procedure: F)
where
    F: FnOnce(&ScriptInterface),
{
    let enter = {
        let mut guard = shared.wait_for_slice(shared.lock());
        guard.script_role.bind_current();
        !guard.stop_requested
    };

    if enter {
        let interface = ScriptInterface::new(Arc::clone(&shared), run);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| procedure(&interface)));
        if let Err(payload) = outcome {
            log::error!(
                "CooperativeScript: run #{} panicked: {}",
                run,
                panic_message(payload.as_ref())
            );
        }
    } else {
        log::info!(
            "CooperativeScript: run #{} stopped before its first slice",
            run
        );
    }

    shared.finish_run();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
