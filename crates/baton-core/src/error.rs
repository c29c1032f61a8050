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

//! Errors reported by the cooperative script driver.

use thiserror::Error;

/// An error returned when launching a script run.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A run is already in progress on this instance. Starting another one is
    /// a programming error; the running script is left untouched.
    #[error("a script is already active on this instance")]
    AlreadyActive,
    /// The operating system refused to create the script thread.
    #[error("failed to spawn the script thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Convenience alias for results carrying a [`ScriptError`].
pub type ScriptResult<T> = Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ScriptError::AlreadyActive.to_string(),
            "a script is already active on this instance"
        );

        let io = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no stack");
        let err = ScriptError::from(io);
        assert!(matches!(err, ScriptError::Spawn(_)));
        assert_eq!(err.to_string(), "failed to spawn the script thread: no stack");
    }
}
