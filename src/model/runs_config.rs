//! @ai:module:intent Run detail defaults shared by every experiment
//! @ai:module:layer domain
//! @ai:module:public_api RunsConfig, RunsOverride
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Fully resolved run details
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunsConfig {
    pub invocations: u32,
    pub iterations: u32,
    pub warmup: u32,
    /// Milliseconds; shorter iterations are reported as suspicious
    pub min_iteration_time: u32,
    /// Seconds; -1 disables the limit
    pub max_invocation_time: i64,
}

/// @ai:intent Partial run details as written in a `runs` section
/// @ai:effects pure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunsOverride {
    #[serde(default)]
    pub invocations: Option<u32>,
    #[serde(default)]
    pub iterations: Option<u32>,
    #[serde(default)]
    pub warmup: Option<u32>,
    #[serde(default)]
    pub min_iteration_time: Option<u32>,
    #[serde(default)]
    pub max_invocation_time: Option<i64>,
}

impl Default for RunsConfig {
    fn default() -> Self {
        Self {
            invocations: 1,
            iterations: 1,
            warmup: 0,
            min_iteration_time: 50,
            max_invocation_time: -1,
        }
    }
}

impl RunsConfig {
    /// @ai:intent Build run details from an optional `runs` section
    /// @ai:effects pure
    pub fn from_section(section: Option<&RunsOverride>) -> Self {
        match section {
            Some(section) => Self::default().combined_with(section),
            None => Self::default(),
        }
    }

    /// @ai:intent Apply the values present in an override on top of self
    /// @ai:effects pure
    pub fn combined_with(&self, other: &RunsOverride) -> Self {
        Self {
            invocations: other.invocations.unwrap_or(self.invocations),
            iterations: other.iterations.unwrap_or(self.iterations),
            warmup: other.warmup.unwrap_or(self.warmup),
            min_iteration_time: other.min_iteration_time.unwrap_or(self.min_iteration_time),
            max_invocation_time: other.max_invocation_time.unwrap_or(self.max_invocation_time),
        }
    }
}
