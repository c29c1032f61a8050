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

//! The narrow surface a host application exposes to benchmark procedures.

use image::RgbaImage;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Host application state a benchmark can snapshot, reconfigure and observe.
///
/// Implementations are called from the script thread while the driver is
/// blocked in `tick`, never concurrently with the host's own frame.
pub trait BenchHost: Send + 'static {
    /// Value copy of every setting a benchmark may change.
    type Snapshot: Send;

    /// Copies the mutable settings.
    fn snapshot(&self) -> Self::Snapshot;

    /// Puts back settings captured by [`snapshot`](Self::snapshot).
    fn restore(&mut self, snapshot: Self::Snapshot);

    /// Switches to a configuration that makes runs comparable (fixed exposure,
    /// no wireframe, fixed field of view, frozen animation, ...).
    fn apply_deterministic(&mut self);

    /// Stabilization predicate: assets loaded, shaders compiled, shading
    /// converged.
    fn is_stable(&self) -> bool;

    /// Duration of the last rendered frame in milliseconds.
    fn frame_time_ms(&self) -> f32;

    /// Positions the content at frame `frame` of the benchmark sequence, so
    /// the warmup and measured passes render the same frames. Hosts without
    /// animated content ignore it.
    fn set_playback_frame(&mut self, _frame: u32) {}
}

/// A host that can read back its last rendered frame.
pub trait FrameCapture {
    /// Returns the last rendered frame, or `None` if nothing was rendered yet.
    fn capture_frame(&mut self) -> Option<RgbaImage>;
}

/// A host shared between the driver and the script thread.
///
/// The driver locks it for its own frame and releases it before `tick`; the
/// script locks it during its slice. Because the two never run at the same
/// time, the lock is never contended. A lock poisoned by a panicking script is
/// recovered so the state can still be restored.
pub struct SharedHost<H> {
    inner: Arc<Mutex<H>>,
}

impl<H> SharedHost<H> {
    /// Wraps a host.
    pub fn new(host: H) -> Self {
        Self {
            inner: Arc::new(Mutex::new(host)),
        }
    }

    /// Locks the host.
    pub fn lock(&self) -> MutexGuard<'_, H> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the host.
    pub fn with<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }
}

impl<H> Clone for SharedHost<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: std::fmt::Debug> std::fmt::Debug for SharedHost<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedHost").field(&*self.lock()).finish()
    }
}
