//! @ai:module:intent CLI for compiling benchmark configurations into runs
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use benchconf::{
    CliOptions, CliReporter, Configurator, ConfiguratorArgs, DataStore, Experiment, Reporter, RunId,
    Verbosity,
};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "benchconf")]
#[command(about = "Compile benchmark configurations into the runs of an experiment")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    config: PathBuf,

    /// Experiment to compile, or "all"; defaults to the configuration's standard experiment
    exp_name: Option<String>,

    /// Run filters: vm:<name>, s:<suite> or s:<suite>:<benchmark>
    filters: Vec<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Together with --debug, log everything
    #[arg(short, long)]
    verbose: bool,

    /// Do not raise the priority of benchmark processes with nice
    #[arg(short = 'N', long)]
    without_nice: bool,

    /// Do not run build commands of VMs and suites
    #[arg(short = 'B', long)]
    without_building: bool,

    /// Discard previously recorded data
    #[arg(short, long)]
    clean: bool,

    /// Override the configuration's standard data file
    #[arg(short = 'f', long)]
    data_file: Option<String>,

    /// Print the compiled runs as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> CliOptions {
        CliOptions {
            debug: self.debug,
            verbose: self.verbose,
            use_nice: !self.without_nice,
            do_builds: !self.without_building,
            clean: self.clean,
        }
    }
}

/// @ai:intent One compiled run as printed by the CLI
#[derive(Serialize)]
struct RunListing {
    experiment: String,
    vm: String,
    suite: String,
    benchmark: String,
    extra_args: Option<String>,
    invocations: u32,
    iterations: u32,
    data_file: Option<String>,
    cmdline: String,
}

impl RunListing {
    fn new(experiment: &Experiment, run: &RunId) -> Self {
        Self {
            experiment: experiment.name.clone(),
            vm: run.benchmark.vm.name.clone(),
            suite: run.benchmark.suite.name.clone(),
            benchmark: run.benchmark.name.clone(),
            extra_args: run.benchmark.extra_args.clone(),
            invocations: run.runs.invocations,
            iterations: run.runs.iterations,
            data_file: experiment.data_file.clone(),
            cmdline: run.cmdline(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.options();

    // The subscriber has to exist before the configuration is loaded, so the
    // verbosity is derived here the same way the configurator derives it.
    let verbosity = Verbosity::from_options(Some(&options));
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(verbosity.level_filter().into())
                .from_env_lossy(),
        )
        .init();

    match run(cli, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// @ai:intent Compile the requested experiments and print their runs
/// @ai:effects fs:read, io
fn run(cli: Cli, options: CliOptions) -> Result<()> {
    let reporter = Arc::new(CliReporter::new(options.verbose));
    let mut data_store = DataStore::new();

    let configurator = Configurator::new(
        &cli.config,
        &mut data_store,
        ConfiguratorArgs {
            cli_options: Some(options),
            reporter: Some(reporter.clone() as Arc<dyn Reporter>),
            exp_name: cli.exp_name.clone(),
            standard_data_file: cli.data_file.clone(),
            run_filter: cli.filters.clone(),
        },
    )
    .with_context(|| format!("Failed to configure from {}", cli.config.display()))?;

    let mut listings = Vec::new();
    for experiment in configurator.get_experiments().values() {
        listings.extend(experiment.runs().iter().map(|run| RunListing::new(experiment, run)));
    }
    listings.sort_by(|a, b| {
        (&a.experiment, &a.vm, &a.suite, &a.benchmark).cmp(&(&b.experiment, &b.vm, &b.suite, &b.benchmark))
    });

    let runs: Vec<_> = configurator.get_runs().into_iter().collect();
    reporter.set_total_number_of_runs(runs.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        for listing in &listings {
            println!(
                "{}  {}  {}  {}  {}",
                listing.experiment, listing.vm, listing.suite, listing.benchmark, listing.cmdline
            );
        }
    }

    tracing::info!(
        "{} unique runs, verbosity {}, build log: {}, builds {}, nice {}",
        runs.len(),
        configurator.verbosity(),
        configurator.build_log(),
        if configurator.do_builds() { "enabled" } else { "disabled" },
        if configurator.use_nice() { "enabled" } else { "disabled" }
    );
    reporter.job_completed(&runs);

    Ok(())
}
