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

//! Logical wait budgets for scripts that yield across host frames.
//!
//! A budget is never measured against the wall clock. Frames count the number
//! of resumptions, seconds accumulate the deltas the driver delivered with each
//! resumption. Both are interrupted by a stop request at the caller's level.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How long a script wants to stay suspended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum YieldBudget {
    /// Resume exactly this many times.
    Frames(u32),
    /// Resume until the sum of the delivered frame deltas reaches this value.
    Seconds(f32),
}

impl YieldBudget {
    /// Starts tracking progress against this budget.
    pub fn begin(self) -> BudgetProgress {
        BudgetProgress {
            budget: self,
            frames: 0,
            elapsed: 0.0,
        }
    }
}

impl From<u32> for YieldBudget {
    fn from(frames: u32) -> Self {
        YieldBudget::Frames(frames)
    }
}

impl From<f32> for YieldBudget {
    fn from(seconds: f32) -> Self {
        YieldBudget::Seconds(seconds)
    }
}

/// Progress of a single [`YieldBudget`].
///
/// `record` is called once per resumption with the delta the driver delivered
/// for that frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetProgress {
    budget: YieldBudget,
    frames: u32,
    elapsed: f32,
}

impl BudgetProgress {
    /// Number of resumptions recorded so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Sum of the deltas recorded so far, in seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns true once the budget has been consumed.
    ///
    /// A zero frame budget and a non-positive (or NaN) duration are complete
    /// before any resumption.
    pub fn is_complete(&self) -> bool {
        match self.budget {
            YieldBudget::Frames(n) => self.frames >= n,
            YieldBudget::Seconds(s) => {
                !matches!(self.elapsed.partial_cmp(&s), Some(Ordering::Less))
            }
        }
    }

    /// Records one resumption carrying `delta_time` seconds.
    pub fn record(&mut self, delta_time: f32) {
        self.frames = self.frames.saturating_add(1);
        self.elapsed += delta_time;
    }

    /// Fraction of the budget consumed, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        let raw = match self.budget {
            YieldBudget::Frames(0) => 1.0,
            YieldBudget::Frames(n) => self.frames as f32 / n as f32,
            YieldBudget::Seconds(s) if s > 0.0 => self.elapsed / s,
            YieldBudget::Seconds(_) => 1.0,
        };
        raw.clamp(0.0, 1.0)
    }
}
