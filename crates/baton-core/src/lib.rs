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

//! # Baton Core
//!
//! Foundational types for the cooperative scripting crates: logical yield
//! budgets measured in delivered frames or seconds, per-frame statistics,
//! thread-role assertions and the shared error type.
//!
//! This crate has no threading of its own.

#![warn(missing_docs)]

pub mod budget;
pub mod error;
pub mod stats;
pub mod thread_role;

pub use budget::{BudgetProgress, YieldBudget};
pub use error::{ScriptError, ScriptResult};
pub use stats::FrameStats;
pub use thread_role::ThreadRole;
