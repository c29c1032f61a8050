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

//! Waiting for the host to settle before measuring.
//!
//! Hosts report stability frame by frame and their signal flickers: a shader
//! finishing compilation can report "stable" for one frame before the next
//! asset streams in. [`StabilityDebounce`] only accepts the signal once it has
//! held for a number of consecutive frames.

use baton_script::ScriptInterface;

/// Countdown that converges after `required` consecutive stable frames.
///
/// Any unstable observation resets the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityDebounce {
    required: u32,
    remaining: u32,
}

impl StabilityDebounce {
    /// Creates a countdown. A requirement of zero is treated as one frame.
    pub fn new(required: u32) -> Self {
        let required = required.max(1);
        Self {
            required,
            remaining: required,
        }
    }

    /// Feeds one frame's stability signal and returns whether the countdown
    /// has converged.
    pub fn observe(&mut self, stable: bool) -> bool {
        if stable {
            self.remaining = self.remaining.saturating_sub(1);
        } else {
            self.remaining = self.required;
        }
        self.is_converged()
    }

    /// Returns true once enough consecutive stable frames were observed.
    pub fn is_converged(&self) -> bool {
        self.remaining == 0
    }

    /// Stable frames still needed.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consecutive stable frames required.
    pub fn required(&self) -> u32 {
        self.required
    }

    /// Starts the countdown over.
    pub fn reset(&mut self) {
        self.remaining = self.required;
    }
}

/// Outcome of a stabilization wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// The host was stable for the required number of frames.
    Stable {
        /// Frames yielded before converging.
        frames: u32,
    },
    /// A stop was requested; the caller must abandon its work.
    Stopped,
    /// The frame limit was reached before the host settled.
    TimedOut,
}

impl Stability {
    /// Returns true for [`Stability::Stable`].
    pub fn is_stable(&self) -> bool {
        matches!(self, Stability::Stable { .. })
    }
}

/// Yields one frame at a time until `is_stable` has held for `required`
/// consecutive frames.
///
/// `should_stop` is checked after every resumption alongside the script's own
/// stop signal. `max_frames == 0` waits without limit.
pub fn wait_until_stable(
    script: &ScriptInterface,
    should_stop: impl Fn() -> bool,
    mut is_stable: impl FnMut() -> bool,
    required: u32,
    max_frames: u32,
) -> Stability {
    let mut debounce = StabilityDebounce::new(required);
    let mut frames: u32 = 0;

    loop {
        if !script.yield_for_frames(1) || should_stop() {
            return Stability::Stopped;
        }
        frames += 1;

        if debounce.observe(is_stable()) {
            log::debug!("Host stable after {} frames", frames);
            return Stability::Stable { frames };
        }
        if max_frames > 0 && frames >= max_frames {
            log::warn!(
                "Host not stable after {} frames ({} stable frames still needed)",
                frames,
                debounce.remaining()
            );
            return Stability::TimedOut;
        }
    }
}
