//! @ai:module:intent Compile an experiment definition into its filtered set of runs
//! @ai:module:layer domain
//! @ai:module:public_api Experiment, CompileContext
//! @ai:module:stateless false

use crate::config::{ExperimentDef, SuiteDef, VmDef};
use crate::error::{ConfigError, Result};
use crate::filter::RunFilter;
use crate::model::benchmark::{Benchmark, BenchmarkSuite, VirtualMachine};
use crate::model::build_command::BuildCommandCache;
use crate::model::data_store::DataStore;
use crate::model::run_id::RunId;
use crate::model::runs_config::RunsConfig;
use crate::options::CliOptions;
use crate::reporter::Reporter;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// @ai:intent Everything an experiment needs from the surrounding configuration
pub struct CompileContext<'a> {
    pub runs_config: &'a RunsConfig,
    pub virtual_machines: &'a IndexMap<String, VmDef>,
    pub benchmark_suites: &'a IndexMap<String, SuiteDef>,
    pub reporting: &'a IndexMap<String, serde_yaml::Value>,
    pub data_store: &'a mut DataStore,
    pub build_commands: &'a mut BuildCommandCache,
    pub standard_data_file: Option<&'a str>,
    pub clean: bool,
    pub reporter: Option<Arc<dyn Reporter>>,
    pub run_filter: &'a RunFilter,
    pub options: Option<&'a CliOptions>,
}

/// @ai:intent Named unit of work with its compiled runs
#[derive(Debug)]
pub struct Experiment {
    pub name: String,
    pub description: Option<String>,
    pub data_file: Option<String>,
    pub runs_config: RunsConfig,
    pub reporting: IndexMap<String, serde_yaml::Value>,
    pub clean: bool,
    pub reporter: Option<Arc<dyn Reporter>>,
    pub options: Option<CliOptions>,
    runs: Vec<Arc<RunId>>,
}

impl Experiment {
    /// @ai:intent Walk executions, suites and benchmarks and keep the runs the filter admits
    /// @ai:pre every VM and suite referenced by `def` exists in the context tables
    /// @ai:effects state:write
    pub fn compile(name: &str, def: &ExperimentDef, ctx: &mut CompileContext<'_>) -> Result<Self> {
        let runs_config = match &def.runs {
            Some(runs) => ctx.runs_config.combined_with(runs),
            None => *ctx.runs_config,
        };
        let data_file = def
            .data_file
            .clone()
            .or_else(|| ctx.standard_data_file.map(str::to_string));

        let mut vms: HashMap<&str, Arc<VirtualMachine>> = HashMap::new();
        let mut suites: HashMap<&str, Arc<BenchmarkSuite>> = HashMap::new();
        let mut seen = HashSet::new();
        let mut runs = Vec::new();
        let mut filtered = 0usize;

        for execution in &def.executions {
            for (vm_name, suite_names) in execution.entries() {
                let vm = match vms.get(vm_name) {
                    Some(vm) => Arc::clone(vm),
                    None => {
                        let vm_def = ctx.virtual_machines.get(vm_name).ok_or_else(|| {
                            ConfigError::UnknownVm {
                                experiment: name.to_string(),
                                vm: vm_name.to_string(),
                            }
                        })?;
                        let vm = Arc::new(VirtualMachine::from_def(vm_name, vm_def, ctx.build_commands));
                        vms.insert(vm_name, Arc::clone(&vm));
                        vm
                    }
                };

                for suite_name in suite_names.unwrap_or(&def.suites) {
                    let suite_def = ctx.benchmark_suites.get(suite_name).ok_or_else(|| {
                        ConfigError::UnknownSuite {
                            experiment: name.to_string(),
                            suite: suite_name.clone(),
                        }
                    })?;
                    let suite = match suites.get(suite_name.as_str()) {
                        Some(suite) => Arc::clone(suite),
                        None => {
                            let suite = Arc::new(BenchmarkSuite::from_def(
                                suite_name,
                                suite_def,
                                ctx.build_commands,
                            ));
                            suites.insert(suite_name.as_str(), Arc::clone(&suite));
                            suite
                        }
                    };

                    for entry in &suite_def.benchmarks {
                        for (bench_name, details) in entry.entries() {
                            let bench =
                                Benchmark::new(bench_name, details, Arc::clone(&suite), Arc::clone(&vm));
                            if !ctx.run_filter.applies(&bench) {
                                filtered += 1;
                                continue;
                            }

                            let run = ctx.data_store.create_run_id(RunId::new(bench, runs_config));
                            if seen.insert(Arc::clone(&run)) {
                                runs.push(run);
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!(
            "Compiled experiment {}: {} runs, {} excluded by filter",
            name,
            runs.len(),
            filtered
        );

        Ok(Self {
            name: name.to_string(),
            description: def.description.clone(),
            data_file,
            runs_config,
            reporting: ctx.reporting.clone(),
            clean: ctx.clean,
            reporter: ctx.reporter.clone(),
            options: ctx.options.cloned(),
            runs,
        })
    }

    /// @ai:intent Set of runs of this experiment
    /// @ai:effects pure
    pub fn get_runs(&self) -> HashSet<Arc<RunId>> {
        self.runs.iter().cloned().collect()
    }

    /// @ai:intent Runs in definition order
    /// @ai:effects pure
    pub fn runs(&self) -> &[Arc<RunId>] {
        &self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use std::path::Path;

    const CONFIG: &str = r#"
benchmark_suites:
  Suite1:
    gauge_adapter: Time
    command: "s1 %(benchmark)s"
    build: [make]
    benchmarks: [A, B]
  Suite2:
    gauge_adapter: Time
    command: "s2 %(benchmark)s"
    benchmarks: [C]
virtual_machines:
  JRuby:
    binary: jruby
  CRuby:
    binary: ruby
experiments:
  Exp:
    data_file: exp.data
    runs:
      invocations: 7
    suites: [Suite1]
    executions:
      - JRuby
      - CRuby:
          suites: [Suite1, Suite2]
"#;

    fn compile(config: &RawConfig, filter: &RunFilter, store: &mut DataStore) -> Result<Experiment> {
        let runs_config = RunsConfig::default();
        let mut build_commands = BuildCommandCache::new();
        let mut ctx = CompileContext {
            runs_config: &runs_config,
            virtual_machines: &config.virtual_machines,
            benchmark_suites: &config.benchmark_suites,
            reporting: &config.reporting,
            data_store: store,
            build_commands: &mut build_commands,
            standard_data_file: Some("standard.data"),
            clean: true,
            reporter: None,
            run_filter: filter,
            options: None,
        };
        Experiment::compile("Exp", &config.experiments["Exp"], &mut ctx)
    }

    fn config() -> RawConfig {
        RawConfig::from_yaml(CONFIG, Path::new("test.yml")).unwrap()
    }

    #[test]
    fn test_compile_all_runs() {
        let config = config();
        let mut store = DataStore::new();
        let exp = compile(&config, &RunFilter::default(), &mut store).unwrap();

        let names: Vec<String> = exp.runs().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "JRuby Suite1 A",
                "JRuby Suite1 B",
                "CRuby Suite1 A",
                "CRuby Suite1 B",
                "CRuby Suite2 C",
            ]
        );
        assert_eq!(exp.data_file.as_deref(), Some("exp.data"));
        assert_eq!(exp.runs_config.invocations, 7);
        assert!(exp.clean);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_filter_excludes_runs() {
        let config = config();
        let mut store = DataStore::new();
        let filter = RunFilter::parse(&["vm:CRuby", "s:Suite1:B", "s:Suite2"]).unwrap();
        let exp = compile(&config, &filter, &mut store).unwrap();

        let names: Vec<String> = exp.runs().iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["CRuby Suite1 B", "CRuby Suite2 C"]);
    }

    #[test]
    fn test_runs_shared_through_data_store() {
        let config = config();
        let mut store = DataStore::new();
        let first = compile(&config, &RunFilter::default(), &mut store).unwrap();
        let second = compile(&config, &RunFilter::default(), &mut store).unwrap();

        assert!(Arc::ptr_eq(&first.runs()[0], &second.runs()[0]));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_unknown_vm() {
        let mut config = config();
        config.virtual_machines.shift_remove("CRuby");
        let mut store = DataStore::new();

        let err = compile(&config, &RunFilter::default(), &mut store).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVm { ref vm, .. } if vm == "CRuby"));
    }
}
