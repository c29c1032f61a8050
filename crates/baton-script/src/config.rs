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

//! Configuration for a [`CooperativeScript`](crate::CooperativeScript).

use serde::{Deserialize, Serialize};

/// Configuration for a cooperative script slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Base name of the worker thread. The run number is appended.
    pub thread_name: String,
    /// Stack size of the worker thread in bytes. `None` uses the platform default.
    pub stack_size: Option<usize>,
    /// Number of slices `stop` hands to a script that keeps yielding after a
    /// stop request before it logs a warning about it. `0` warns on the first
    /// ignored slice, like `1`.
    pub stop_warning_ticks: u32,
}

impl ScriptConfig {
    /// Slice count at which `stop` warns about an unresponsive script.
    pub fn stop_warning_slice(&self) -> u32 {
        self.stop_warning_ticks.max(1)
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            thread_name: "baton-script".to_string(),
            stack_size: None,
            stop_warning_ticks: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: ScriptConfig = ron::from_str("(thread_name: \"bench\")").unwrap();
        assert_eq!(config.thread_name, "bench");
        assert_eq!(config.stack_size, None);
        assert_eq!(config.stop_warning_ticks, 1000);
    }

    #[test]
    fn test_zero_stop_warning_still_warns() {
        let config = ScriptConfig {
            stop_warning_ticks: 0,
            ..Default::default()
        };
        assert_eq!(config.stop_warning_slice(), 1);
        assert_eq!(ScriptConfig::default().stop_warning_slice(), 1000);
    }

    #[test]
    fn test_stack_size_round_trips_through_ron() {
        let config = ScriptConfig {
            stack_size: Some(8 * 1024 * 1024),
            ..Default::default()
        };
        let text = ron::to_string(&config).unwrap();
        let back: ScriptConfig = ron::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
