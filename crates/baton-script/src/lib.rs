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

//! # Baton Script
//!
//! A coroutine emulated with a real OS thread.
//!
//! The driver (the thread running the host's frame loop) owns a
//! [`CooperativeScript`] and calls [`CooperativeScript::tick`] once per frame.
//! The script body runs on a dedicated thread and receives a
//! [`ScriptInterface`], the only way it can hand control back. Exactly one of
//! the two sides runs at any time: the right to run is a baton passed through
//! a mutex and a condition variable.
//!
//! ```no_run
//! use baton_script::CooperativeScript;
//!
//! let mut script = CooperativeScript::default();
//! script
//!     .start(|s| {
//!         for step in 0..10 {
//!             log::info!("step {step}");
//!             if !s.yield_for_frames(30) {
//!                 return; // stop requested
//!             }
//!         }
//!     })
//!     .expect("no script running yet");
//!
//! while script.is_active() {
//!     script.tick(1.0 / 60.0);
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod interface;
pub mod script;
mod state;
pub mod ui;

pub use baton_core::{ScriptError, ScriptResult, YieldBudget};
pub use config::ScriptConfig;
pub use interface::ScriptInterface;
pub use script::{CooperativeScript, ScriptProbe};
pub use ui::{ScriptUi, UiCallback};
