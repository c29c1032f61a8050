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

//! Thread identity bookkeeping used to catch calls made from the wrong side
//! of a driver/script pair.

use std::thread::{self, ThreadId};

/// Remembers which OS thread plays a given role.
///
/// The checks are meant for `debug_assert!`: an unbound role accepts any
/// caller, so a role that was never recorded cannot produce false positives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadRole {
    thread: Option<ThreadId>,
}

impl ThreadRole {
    /// Creates an unbound role.
    pub const fn unbound() -> Self {
        Self { thread: None }
    }

    /// Binds the role to the calling thread.
    pub fn bind_current(&mut self) {
        self.thread = Some(thread::current().id());
    }

    /// Forgets the bound thread.
    pub fn clear(&mut self) {
        self.thread = None;
    }

    /// Returns true if the role is unbound or bound to the calling thread.
    pub fn accepts_current(&self) -> bool {
        match self.thread {
            Some(bound) => bound == thread::current().id(),
            None => true,
        }
    }
}
