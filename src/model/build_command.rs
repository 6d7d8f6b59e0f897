//! @ai:module:intent Build steps of VMs and suites, interned across experiments
//! @ai:module:layer domain
//! @ai:module:public_api BuildCommand, BuildCommandCache
//! @ai:module:stateless false

use std::collections::HashSet;
use std::sync::Arc;

/// @ai:intent Shell commands run in a location to build a VM or suite
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildCommand {
    pub commands: Vec<String>,
    pub location: Option<String>,
}

impl BuildCommand {
    pub fn new(commands: Vec<String>, location: Option<String>) -> Self {
        Self { commands, location }
    }

    /// @ai:intent Render the commands as a single shell line
    /// @ai:effects pure
    pub fn as_shell_line(&self) -> String {
        self.commands.join(" && ")
    }
}

/// @ai:intent Interning table so identical build steps are represented once
/// @ai:effects pure
#[derive(Debug, Default)]
pub struct BuildCommandCache {
    commands: HashSet<Arc<BuildCommand>>,
}

impl BuildCommandCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Return the shared instance for this build command, recording it on first use
    /// @ai:post at most one entry exists per distinct build command
    /// @ai:effects state:write
    pub fn intern(&mut self, command: BuildCommand) -> Arc<BuildCommand> {
        if let Some(existing) = self.commands.get(&command) {
            return Arc::clone(existing);
        }

        tracing::trace!("Recorded build command: {}", command.as_shell_line());
        let shared = Arc::new(command);
        self.commands.insert(Arc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn contains(&self, command: &BuildCommand) -> bool {
        self.commands.contains(command)
    }
}
