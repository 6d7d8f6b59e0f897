//! @ai:module:intent Resolve the requested experiments and compile them once per process
//! @ai:module:layer application
//! @ai:module:public_api Configurator, ConfiguratorArgs
//! @ai:module:stateless false

use crate::config::{load_config, RawConfig};
use crate::error::{ConfigError, Result};
use crate::filter::RunFilter;
use crate::model::{
    BuildCommandCache, CompileContext, DataStore, Experiment, RunId, RunsConfig,
};
use crate::niceness::{OsPriorityProbe, PriorityProbe};
use crate::options::{process_cli_options, CliOptions, Verbosity};
use crate::reporter::Reporter;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Experiment name that selects every experiment of the configuration.
pub const ALL_EXPERIMENTS: &str = "all";

/// @ai:intent Optional inputs that refine what the configurator compiles
#[derive(Debug, Default)]
pub struct ConfiguratorArgs {
    pub cli_options: Option<CliOptions>,
    pub reporter: Option<Arc<dyn Reporter>>,
    pub exp_name: Option<String>,
    pub standard_data_file: Option<String>,
    pub run_filter: Vec<String>,
}

/// @ai:intent Owns the loaded configuration and the experiments compiled from it
#[derive(Debug)]
pub struct Configurator {
    raw_config: RawConfig,
    options: Option<CliOptions>,
    verbosity: Verbosity,
    exp_name: Option<String>,
    runs: RunsConfig,
    run_filter: RunFilter,
    build_commands: BuildCommandCache,
    experiments: IndexMap<String, Experiment>,
}

impl Configurator {
    /// @ai:intent Load a configuration file and compile the selected experiments
    /// @ai:effects fs:read, io
    pub fn new(file_name: &Path, data_store: &mut DataStore, args: ConfiguratorArgs) -> Result<Self> {
        Self::with_probe(file_name, data_store, args, &OsPriorityProbe::new())
    }

    /// @ai:intent Like `new`, with an explicit niceness probe
    /// @ai:effects fs:read
    pub fn with_probe(
        file_name: &Path,
        data_store: &mut DataStore,
        args: ConfiguratorArgs,
        probe: &dyn PriorityProbe,
    ) -> Result<Self> {
        let raw_config = load_config(file_name)?;
        Self::from_raw(raw_config, data_store, args, probe)
    }

    /// @ai:intent Compile experiments from an already loaded configuration
    /// @ai:post the experiment map is final; later accessors never recompile
    /// @ai:effects state:write
    pub fn from_raw(
        mut raw_config: RawConfig,
        data_store: &mut DataStore,
        args: ConfiguratorArgs,
        probe: &dyn PriorityProbe,
    ) -> Result<Self> {
        if let Some(data_file) = args.standard_data_file {
            raw_config.standard_data_file = Some(data_file);
        }

        let (options, verbosity) = process_cli_options(args.cli_options, probe);
        let runs = RunsConfig::from_section(raw_config.runs.as_ref());
        let run_filter = RunFilter::parse(&args.run_filter)?;
        let mut build_commands = BuildCommandCache::new();

        let exp_name = args.exp_name;
        let experiments = {
            let selected = Self::select_experiments(&raw_config, exp_name.as_deref())?;
            let mut ctx = CompileContext {
                runs_config: &runs,
                virtual_machines: &raw_config.virtual_machines,
                benchmark_suites: &raw_config.benchmark_suites,
                reporting: &raw_config.reporting,
                data_store,
                build_commands: &mut build_commands,
                standard_data_file: raw_config.standard_data_file.as_deref(),
                clean: options.as_ref().map(|o| o.clean).unwrap_or(false),
                reporter: args.reporter,
                run_filter: &run_filter,
                options: options.as_ref(),
            };

            let mut experiments = IndexMap::with_capacity(selected.len());
            for name in selected {
                let def = &raw_config.experiments[name.as_str()];
                let experiment = Experiment::compile(&name, def, &mut ctx)?;
                experiments.insert(name, experiment);
            }
            experiments
        };

        tracing::info!(
            "Compiled {} experiment(s), {} build command(s)",
            experiments.len(),
            build_commands.len()
        );

        Ok(Self {
            raw_config,
            options,
            verbosity,
            exp_name,
            runs,
            run_filter,
            build_commands,
            experiments,
        })
    }

    /// @ai:intent Resolve the requested name into the experiment keys to compile
    /// @ai:post nothing is compiled when resolution fails
    /// @ai:effects pure
    fn select_experiments(raw_config: &RawConfig, exp_name: Option<&str>) -> Result<Vec<String>> {
        let name = Self::resolve_name(raw_config, exp_name)?;

        if name == ALL_EXPERIMENTS {
            return Ok(raw_config.experiments.keys().cloned().collect());
        }

        if !raw_config.experiments.contains_key(name) {
            return Err(ConfigError::UnknownExperiment(name.to_string()));
        }
        Ok(vec![name.to_string()])
    }

    fn resolve_name<'a>(raw_config: &'a RawConfig, exp_name: Option<&'a str>) -> Result<&'a str> {
        exp_name
            .filter(|n| !n.is_empty())
            .or(raw_config.standard_experiment.as_deref())
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::NoExperimentChosen)
    }

    /// @ai:intent Name of the experiment selection in effect
    /// @ai:effects pure
    pub fn experiment_name(&self) -> Result<&str> {
        Self::resolve_name(&self.raw_config, self.exp_name.as_deref())
    }

    /// @ai:intent All compiled experiments, the same map on every call
    /// @ai:effects pure
    pub fn get_experiments(&self) -> &IndexMap<String, Experiment> {
        &self.experiments
    }

    pub fn get_experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments.get(name)
    }

    /// @ai:intent Union of the runs of every compiled experiment
    /// @ai:effects pure
    pub fn get_runs(&self) -> HashSet<Arc<RunId>> {
        let mut runs = HashSet::new();
        for exp in self.experiments.values() {
            runs.extend(exp.get_runs());
        }
        runs
    }

    pub fn build_log(&self) -> &str {
        self.raw_config.build_log()
    }

    pub fn options(&self) -> Option<&CliOptions> {
        self.options.as_ref()
    }

    pub fn use_nice(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.use_nice)
    }

    pub fn do_builds(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.do_builds)
    }

    /// Verbosity chosen by the debug/verbose options; the caller installs logging at this level.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn runs(&self) -> &RunsConfig {
        &self.runs
    }

    pub fn run_filter(&self) -> &RunFilter {
        &self.run_filter
    }

    pub fn build_commands(&self) -> &BuildCommandCache {
        &self.build_commands
    }

    pub fn standard_data_file(&self) -> Option<&str> {
        self.raw_config.standard_data_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::reporter::CliReporter;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
standard_experiment: Exp1
standard_data_file: default.data
build_log: compile.log
runs:
  invocations: 2
benchmark_suites:
  Suite1:
    gauge_adapter: Time
    command: "s1 %(benchmark)s"
    location: suites/shared
    build: [make]
    benchmarks: [A, B]
  Suite2:
    gauge_adapter: Time
    command: "s2 %(benchmark)s"
    benchmarks: [BenchA, BenchB]
virtual_machines:
  JRuby:
    binary: jruby
  CRuby:
    binary: ruby
    build: [./build.sh]
experiments:
  Exp1:
    suites: [Suite1]
    executions: [JRuby]
  Exp2:
    suites: [Suite1, Suite2]
    executions: [JRuby, CRuby]
  Exp3:
    suites: [Suite2]
    executions: [CRuby]
"#;

    struct AllowNice(bool);

    impl PriorityProbe for AllowNice {
        fn can_set_niceness(&self) -> bool {
            self.0
        }
    }

    fn raw() -> RawConfig {
        RawConfig::from_yaml(CONFIG, Path::new("test.yml")).unwrap()
    }

    fn configure(args: ConfiguratorArgs) -> Result<Configurator> {
        let mut store = DataStore::new();
        Configurator::from_raw(raw(), &mut store, args, &AllowNice(true))
    }

    fn named(name: &str) -> ConfiguratorArgs {
        ConfiguratorArgs {
            exp_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_standard_experiment_is_default() {
        let conf = configure(ConfiguratorArgs::default()).unwrap();
        assert_eq!(conf.experiment_name().unwrap(), "Exp1");
        let names: Vec<_> = conf.get_experiments().keys().cloned().collect();
        assert_eq!(names, vec!["Exp1".to_string()]);
        assert_eq!(conf.verbosity(), Verbosity::Quiet);
        assert_eq!(conf.runs().invocations, 2);
    }

    #[test]
    fn test_all_compiles_every_experiment() {
        let conf = configure(named("all")).unwrap();
        let names: Vec<_> = conf.get_experiments().keys().cloned().collect();
        assert_eq!(names, vec!["Exp1", "Exp2", "Exp3"]);
        assert_eq!(conf.get_experiments().len(), raw().experiments.len());
    }

    #[test]
    fn test_unknown_experiment() {
        let mut store = DataStore::new();
        let err = Configurator::from_raw(raw(), &mut store, named("Missing"), &AllowNice(true))
            .unwrap_err();

        assert!(matches!(err, ConfigError::UnknownExperiment(ref n) if n == "Missing"));
        assert_eq!(err.to_string(), "Requested experiment 'Missing' not available.");
        assert!(store.is_empty());
    }

    #[test]
    fn test_no_experiment_chosen() {
        let mut config = raw();
        config.standard_experiment = None;
        let mut store = DataStore::new();

        let err = Configurator::from_raw(config, &mut store, ConfiguratorArgs::default(), &AllowNice(true))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoExperimentChosen));
    }

    #[test]
    fn test_bad_filter_propagates() {
        let err = configure(ConfiguratorArgs {
            run_filter: vec!["s:only:too:many:parts".to_string()],
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Filter(FilterError::UnknownExpression(ref t)) if t == "s:only:too:many:parts"
        ));
    }

    #[test]
    fn test_experiments_compiled_once() {
        let conf = configure(named("all")).unwrap();
        let first = conf.get_experiments();
        let second = conf.get_experiments();

        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(
            conf.get_experiment("Exp2").unwrap(),
            &second["Exp2"]
        ));
        assert!(conf.get_experiment("Exp9").is_none());
    }

    #[test]
    fn test_get_runs_is_union() {
        let conf = configure(named("all")).unwrap();

        // Exp1's runs are a subset of Exp2's runs
        assert_eq!(conf.get_experiment("Exp1").unwrap().runs().len(), 2);
        assert_eq!(conf.get_experiment("Exp2").unwrap().runs().len(), 8);
        assert_eq!(conf.get_experiment("Exp3").unwrap().runs().len(), 2);
        assert_eq!(conf.get_runs().len(), 8);
    }

    #[test]
    fn test_run_filter_applies_to_all_experiments() {
        let conf = configure(ConfiguratorArgs {
            exp_name: Some("all".to_string()),
            run_filter: vec!["vm:CRuby".to_string(), "s:Suite2:BenchA".to_string()],
            ..Default::default()
        })
        .unwrap();

        let runs: Vec<String> = conf.get_runs().iter().map(|r| r.to_string()).collect();
        assert_eq!(runs, vec!["CRuby Suite2 BenchA".to_string()]);
        assert!(conf.get_experiment("Exp1").unwrap().runs().is_empty());
    }

    #[test]
    fn test_build_commands_shared_across_experiments() {
        let conf = configure(named("all")).unwrap();

        // make in suites/shared and ./build.sh for CRuby
        assert_eq!(conf.build_commands().len(), 2);

        let exp1 = conf.get_experiment("Exp1").unwrap();
        let exp2 = conf.get_experiment("Exp2").unwrap();
        let build1 = exp1.runs()[0].benchmark.suite.build.as_ref().unwrap();
        // CRuby/Suite1/A, compiled with Exp2's own suite instance
        let run = &exp2.runs()[4];
        assert_eq!(run.to_string(), "CRuby Suite1 A");
        let build2 = run.benchmark.suite.build.as_ref().unwrap();
        assert!(Arc::ptr_eq(build1, build2));
    }

    #[test]
    fn test_data_file_override() {
        let conf = configure(ConfiguratorArgs {
            standard_data_file: Some("override.data".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(conf.standard_data_file(), Some("override.data"));
        assert_eq!(
            conf.get_experiment("Exp1").unwrap().data_file.as_deref(),
            Some("override.data")
        );
    }

    #[test]
    fn test_shared_run_keeps_each_experiment_data_file() {
        let content = CONFIG
            .replace(
                "  Exp1:\n    suites: [Suite1]",
                "  Exp1:\n    data_file: a.data\n    suites: [Suite1]",
            )
            .replace(
                "  Exp2:\n    suites: [Suite1, Suite2]",
                "  Exp2:\n    data_file: b.data\n    suites: [Suite1, Suite2]",
            );
        let config = RawConfig::from_yaml(&content, Path::new("test.yml")).unwrap();
        let mut store = DataStore::new();
        let conf = Configurator::from_raw(config, &mut store, named("all"), &AllowNice(true)).unwrap();

        let exp1 = conf.get_experiment("Exp1").unwrap();
        let exp2 = conf.get_experiment("Exp2").unwrap();
        let exp3 = conf.get_experiment("Exp3").unwrap();
        assert_eq!(exp1.data_file.as_deref(), Some("a.data"));
        assert_eq!(exp2.data_file.as_deref(), Some("b.data"));
        assert_eq!(exp3.data_file.as_deref(), Some("default.data"));

        // JRuby/Suite1/A is one run shared by both experiments
        assert!(Arc::ptr_eq(&exp1.runs()[0], &exp2.runs()[0]));
        assert!(exp2.get_runs().contains(&exp1.runs()[0]));
    }

    #[test]
    fn test_cli_options_flow_into_experiments() {
        let reporter: Arc<dyn Reporter> = Arc::new(CliReporter::new(false));
        let mut store = DataStore::new();
        let conf = Configurator::from_raw(
            raw(),
            &mut store,
            ConfiguratorArgs {
                cli_options: Some(CliOptions {
                    debug: true,
                    use_nice: true,
                    do_builds: true,
                    clean: true,
                    ..Default::default()
                }),
                reporter: Some(Arc::clone(&reporter)),
                ..Default::default()
            },
            &AllowNice(false),
        )
        .unwrap();

        assert!(!conf.use_nice());
        assert!(conf.do_builds());
        assert_eq!(conf.verbosity(), Verbosity::Debug);

        let exp = conf.get_experiment("Exp1").unwrap();
        assert!(exp.clean);
        assert!(exp.options.as_ref().is_some_and(|o| !o.use_nice));
        assert!(Arc::ptr_eq(exp.reporter.as_ref().unwrap(), &reporter));
    }

    #[test]
    fn test_without_options() {
        let conf = configure(ConfiguratorArgs::default()).unwrap();
        assert!(conf.options().is_none());
        assert!(!conf.use_nice());
        assert!(!conf.do_builds());
        assert!(!conf.get_experiment("Exp1").unwrap().clean);
        assert_eq!(conf.build_log(), "compile.log");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        let mut store = DataStore::new();

        let conf = Configurator::with_probe(
            file.path(),
            &mut store,
            named("Exp3"),
            &AllowNice(true),
        )
        .unwrap();

        assert_eq!(conf.get_experiments().len(), 1);
        assert_eq!(store.len(), 2);
    }
}
