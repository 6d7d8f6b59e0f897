//! @ai:module:intent Probe whether the OS lets us raise the priority of benchmark processes
//! @ai:module:layer infrastructure
//! @ai:module:public_api PriorityProbe, OsPriorityProbe
//! @ai:module:stateless true

use std::process::Command;

/// @ai:intent Capability check for setting process niceness
pub trait PriorityProbe {
    /// @ai:intent Check whether a negative nice value can be applied
    fn can_set_niceness(&self) -> bool;
}

/// @ai:intent Probes niceness by running the system `nice` command
pub struct OsPriorityProbe;

impl OsPriorityProbe {
    /// @ai:intent Create a new OS probe
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Interpret the combined output of the nice probe command
    /// @ai:effects pure
    fn output_allows_niceness(output: &str) -> bool {
        !(output.contains("cannot set niceness") || output.contains("Permission denied"))
    }
}

impl Default for OsPriorityProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityProbe for OsPriorityProbe {
    /// @ai:effects io
    fn can_set_niceness(&self) -> bool {
        let output = match Command::new("nice").args(["-n-20", "echo", "test"]).output() {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Failed to run nice: {}", e);
                return false;
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        output.status.success() && Self::output_allows_niceness(&combined)
    }
}
