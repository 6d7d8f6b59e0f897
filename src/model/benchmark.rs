//! @ai:module:intent Virtual machines, suites and benchmarks resolved from their definitions
//! @ai:module:layer domain
//! @ai:module:public_api VirtualMachine, BenchmarkSuite, Benchmark
//! @ai:module:stateless true

use crate::config::{BenchmarkDetails, SuiteDef, VmDef};
use crate::filter::BenchmarkIdentity;
use crate::model::build_command::{BuildCommand, BuildCommandCache};
use std::sync::Arc;

/// @ai:intent Language implementation that executes benchmarks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachine {
    pub name: String,
    pub path: Option<String>,
    pub binary: String,
    pub args: Option<String>,
    pub build: Option<Arc<BuildCommand>>,
}

impl VirtualMachine {
    /// @ai:intent Resolve a VM definition, interning its build step
    /// @ai:effects state:write
    pub fn from_def(name: &str, def: &VmDef, build_commands: &mut BuildCommandCache) -> Self {
        let build = def
            .build
            .as_ref()
            .map(|commands| build_commands.intern(BuildCommand::new(commands.clone(), def.path.clone())));

        Self {
            name: name.to_string(),
            path: def.path.clone(),
            binary: def.binary.clone(),
            args: def.args.clone(),
            build,
        }
    }

    /// @ai:intent Executable path, joined with the VM directory when given
    /// @ai:effects pure
    pub fn executable(&self) -> String {
        match &self.path {
            Some(path) => format!("{}/{}", path.trim_end_matches('/'), self.binary),
            None => self.binary.clone(),
        }
    }
}

/// @ai:intent Named group of benchmarks sharing a command template and gauge adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSuite {
    pub name: String,
    pub gauge_adapter: String,
    pub command: String,
    pub location: Option<String>,
    pub build: Option<Arc<BuildCommand>>,
}

impl BenchmarkSuite {
    /// @ai:intent Resolve a suite definition, interning its build step
    /// @ai:effects state:write
    pub fn from_def(name: &str, def: &SuiteDef, build_commands: &mut BuildCommandCache) -> Self {
        let build = def.build.as_ref().map(|commands| {
            build_commands.intern(BuildCommand::new(commands.clone(), def.location.clone()))
        });

        Self {
            name: name.to_string(),
            gauge_adapter: def.gauge_adapter.clone(),
            command: def.command.clone(),
            location: def.location.clone(),
            build,
        }
    }
}

/// @ai:intent A benchmark of a suite bound to the VM that executes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Benchmark {
    pub name: String,
    pub suite: Arc<BenchmarkSuite>,
    pub vm: Arc<VirtualMachine>,
    pub extra_args: Option<String>,
    /// Replaces the suite's command template for this benchmark
    pub command: Option<String>,
}

impl Benchmark {
    pub fn new(
        name: &str,
        details: Option<&BenchmarkDetails>,
        suite: Arc<BenchmarkSuite>,
        vm: Arc<VirtualMachine>,
    ) -> Self {
        Self {
            name: name.to_string(),
            suite,
            vm,
            extra_args: details
                .and_then(|d| d.extra_args.as_ref())
                .map(|a| a.to_string()),
            command: details.and_then(|d| d.command.clone()),
        }
    }

    /// @ai:intent Command template in effect for this benchmark
    /// @ai:effects pure
    pub fn command_template(&self) -> &str {
        self.command.as_deref().unwrap_or(&self.suite.command)
    }
}

impl BenchmarkIdentity for Benchmark {
    fn vm_name(&self) -> &str {
        &self.vm.name
    }

    fn suite_name(&self) -> &str {
        &self.suite.name
    }

    fn name(&self) -> &str {
        &self.name
    }
}
