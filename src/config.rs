//! @ai:module:intent Raw configuration document and its loader/validator
//! @ai:module:layer infrastructure
//! @ai:module:public_api RawConfig, SuiteDef, VmDef, ExperimentDef, ExecutionDef, BenchmarkEntry, load_config
//! @ai:module:stateless true

use crate::error::{ConfigError, Result};
use crate::model::RunsOverride;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BUILD_LOG: &str = "build.log";

/// @ai:intent Configuration document as read from YAML
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub runs: Option<RunsOverride>,
    #[serde(default)]
    pub standard_data_file: Option<String>,
    #[serde(default)]
    pub standard_experiment: Option<String>,
    #[serde(default)]
    pub build_log: Option<String>,
    #[serde(default)]
    pub reporting: IndexMap<String, serde_yaml::Value>,
    pub benchmark_suites: IndexMap<String, SuiteDef>,
    pub virtual_machines: IndexMap<String, VmDef>,
    pub experiments: IndexMap<String, ExperimentDef>,
}

/// @ai:intent Benchmark suite definition
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteDef {
    pub gauge_adapter: String,
    /// Template with `%(benchmark)s`, `%(iterations)s` and `%(warmup)s` placeholders
    pub command: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub build: Option<Vec<String>>,
    pub benchmarks: Vec<BenchmarkEntry>,
}

/// @ai:intent Entry of a suite's benchmark list: a bare name or a name with details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BenchmarkEntry {
    Name(String),
    Detailed(IndexMap<String, BenchmarkDetails>),
}

/// @ai:intent Per-benchmark settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkDetails {
    #[serde(default)]
    pub extra_args: Option<ScalarArg>,
    #[serde(default)]
    pub command: Option<String>,
}

/// @ai:intent Scalar command-line argument that YAML may type as text or number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarArg {
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for ScalarArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarArg::Int(v) => write!(f, "{}", v),
            // Debug keeps the fractional part, so 1.0 stays 1.0
            ScalarArg::Float(v) => write!(f, "{:?}", v),
            ScalarArg::Text(v) => write!(f, "{}", v),
        }
    }
}

/// @ai:intent Virtual machine (language implementation) definition
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmDef {
    #[serde(default)]
    pub path: Option<String>,
    pub binary: String,
    #[serde(default)]
    pub args: Option<String>,
    #[serde(default)]
    pub build: Option<Vec<String>>,
}

/// @ai:intent Experiment definition combining executions and suites
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentDef {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data_file: Option<String>,
    #[serde(default)]
    pub runs: Option<RunsOverride>,
    #[serde(default)]
    pub suites: Vec<String>,
    pub executions: Vec<ExecutionDef>,
}

/// @ai:intent Execution entry: a VM name, or VM names mapped to their own suite lists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionDef {
    Vm(String),
    Detailed(IndexMap<String, ExecutionDetails>),
}

/// @ai:intent Per-execution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionDetails {
    #[serde(default)]
    pub suites: Option<Vec<String>>,
}

impl BenchmarkEntry {
    /// @ai:intent List the benchmarks named by this entry with their optional details
    /// @ai:effects pure
    pub fn entries(&self) -> Vec<(&str, Option<&BenchmarkDetails>)> {
        match self {
            BenchmarkEntry::Name(name) => vec![(name.as_str(), None)],
            BenchmarkEntry::Detailed(map) => map
                .iter()
                .map(|(name, details)| (name.as_str(), Some(details)))
                .collect(),
        }
    }
}

impl ExecutionDef {
    /// @ai:intent List the VMs named by this entry with their optional suite lists
    /// @ai:effects pure
    pub fn entries(&self) -> Vec<(&str, Option<&[String]>)> {
        match self {
            ExecutionDef::Vm(name) => vec![(name.as_str(), None)],
            ExecutionDef::Detailed(map) => map
                .iter()
                .map(|(name, details)| (name.as_str(), details.suites.as_deref()))
                .collect(),
        }
    }
}

impl RawConfig {
    /// @ai:intent Parse a configuration document from YAML text
    /// @ai:effects pure
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// @ai:intent Build log file name, falling back to the default
    /// @ai:effects pure
    pub fn build_log(&self) -> &str {
        self.build_log.as_deref().unwrap_or(DEFAULT_BUILD_LOG)
    }

    /// @ai:intent Check cross references between experiments, VMs and suites
    /// @ai:post returns every problem found, empty when valid
    /// @ai:effects pure
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (suite_name, suite) in &self.benchmark_suites {
            if suite.benchmarks.is_empty() {
                errors.push(format!("Suite '{}' defines no benchmarks.", suite_name));
            }
        }

        for (exp_name, exp) in &self.experiments {
            if exp.executions.is_empty() {
                errors.push(format!("Experiment '{}' defines no executions.", exp_name));
            }

            for suite in &exp.suites {
                if !self.benchmark_suites.contains_key(suite) {
                    errors.push(format!(
                        "Experiment '{}' refers to unknown suite '{}'.",
                        exp_name, suite
                    ));
                }
            }

            for execution in &exp.executions {
                for (vm, suites) in execution.entries() {
                    if !self.virtual_machines.contains_key(vm) {
                        errors.push(format!(
                            "Experiment '{}' refers to unknown virtual machine '{}'.",
                            exp_name, vm
                        ));
                    }

                    let suites = suites.unwrap_or(&exp.suites);
                    if suites.is_empty() {
                        errors.push(format!(
                            "Execution of '{}' in experiment '{}' has no suites.",
                            vm, exp_name
                        ));
                    }
                    for suite in suites {
                        if !self.benchmark_suites.contains_key(suite) && !exp.suites.contains(suite)
                        {
                            errors.push(format!(
                                "Execution of '{}' in experiment '{}' refers to unknown suite '{}'.",
                                vm, exp_name, suite
                            ));
                        }
                    }
                }
            }
        }

        errors
    }
}

/// @ai:intent Load the configuration file and verify its structure
/// @ai:pre path exists and is readable
/// @ai:effects fs:read
pub fn load_config(path: &Path) -> Result<RawConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let config = RawConfig::from_yaml(&content, path)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation {
            path: path.to_path_buf(),
            errors,
        });
    }

    tracing::debug!(
        "Loaded {} with {} experiments, {} VMs, {} suites",
        path.display(),
        config.experiments.len(),
        config.virtual_machines.len(),
        config.benchmark_suites.len()
    );

    Ok(config)
}
