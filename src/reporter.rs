//! @ai:module:intent Progress reporting hooks handed to compiled experiments
//! @ai:module:layer application
//! @ai:module:public_api Reporter, CliReporter
//! @ai:module:stateless false

use crate::model::RunId;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// @ai:intent Receives run lifecycle events; every hook defaults to a no-op
pub trait Reporter: Send + Sync + std::fmt::Debug {
    fn run_failed(&self, _run: &RunId, _cmdline: &str, _return_code: i32, _output: &str) {}

    fn run_completed(&self, _run: &RunId, _cmdline: &str) {}

    fn job_completed(&self, _runs: &[Arc<RunId>]) {}

    fn set_total_number_of_runs(&self, _num_runs: usize) {}

    fn start_run(&self, _run: &RunId) {}
}

/// @ai:intent Reports progress through the log
#[derive(Debug, Default)]
pub struct CliReporter {
    verbose: bool,
    total_runs: AtomicUsize,
    completed_runs: AtomicUsize,
    job_completion_reported: AtomicBool,
}

impl CliReporter {
    /// @ai:intent Create a reporter; verbose mode logs every command line
    /// @ai:effects pure
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Default::default()
        }
    }

    pub fn completed_runs(&self) -> usize {
        self.completed_runs.load(Ordering::Relaxed)
    }

    pub fn total_runs(&self) -> usize {
        self.total_runs.load(Ordering::Relaxed)
    }
}

impl Reporter for CliReporter {
    fn run_failed(&self, run: &RunId, cmdline: &str, return_code: i32, output: &str) {
        tracing::error!(
            "Run failed: {} (return code {})\n{}\n{}",
            run,
            return_code,
            cmdline,
            output
        );
    }

    fn run_completed(&self, run: &RunId, cmdline: &str) {
        let completed = self.completed_runs.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!("[{}/{}] Completed {}", completed, self.total_runs(), run);
        if self.verbose {
            tracing::debug!("{}", cmdline);
        }
    }

    fn job_completed(&self, runs: &[Arc<RunId>]) {
        if self.job_completion_reported.swap(true, Ordering::Relaxed) {
            return;
        }
        tracing::info!("Job completed with {} runs", runs.len());
    }

    fn set_total_number_of_runs(&self, num_runs: usize) {
        self.total_runs.store(num_runs, Ordering::Relaxed);
    }

    fn start_run(&self, run: &RunId) {
        tracing::debug!("Starting {}", run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Benchmark, BenchmarkSuite, RunsConfig, VirtualMachine};

    fn run(name: &str) -> RunId {
        let suite = Arc::new(BenchmarkSuite {
            name: "Suite1".to_string(),
            gauge_adapter: "Time".to_string(),
            command: "harness %(benchmark)s".to_string(),
            location: None,
            build: None,
        });
        let vm = Arc::new(VirtualMachine {
            name: "JRuby".to_string(),
            path: None,
            binary: "jruby".to_string(),
            args: None,
            build: None,
        });
        let bench = Benchmark {
            name: name.to_string(),
            suite,
            vm,
            extra_args: None,
            command: None,
        };
        RunId::new(bench, RunsConfig::default())
    }

    #[derive(Debug)]
    struct SilentReporter;

    impl Reporter for SilentReporter {}

    #[test]
    fn test_run_completed_counts_progress() {
        let reporter = CliReporter::new(true);
        reporter.set_total_number_of_runs(2);

        let first = run("A");
        reporter.start_run(&first);
        reporter.run_completed(&first, &first.cmdline());
        assert_eq!(reporter.completed_runs(), 1);

        let second = run("B");
        reporter.start_run(&second);
        reporter.run_completed(&second, &second.cmdline());
        assert_eq!(reporter.completed_runs(), 2);
        assert_eq!(reporter.total_runs(), 2);
    }

    #[test]
    fn test_failed_run_is_not_counted() {
        let reporter = CliReporter::new(false);
        let failed = run("A");
        reporter.start_run(&failed);
        reporter.run_failed(&failed, &failed.cmdline(), 1, "segfault");
        assert_eq!(reporter.completed_runs(), 0);
    }

    #[test]
    fn test_default_hooks_do_nothing() {
        let reporter: Arc<dyn Reporter> = Arc::new(SilentReporter);
        let r = run("A");
        reporter.set_total_number_of_runs(1);
        reporter.start_run(&r);
        reporter.run_completed(&r, "jruby harness A");
        reporter.run_failed(&r, "jruby harness A", 2, "");
        reporter.job_completed(&[Arc::new(r)]);
    }

    #[test]
    fn test_job_completion_reported_once() {
        let reporter = CliReporter::new(false);
        reporter.job_completed(&[]);
        assert!(reporter.job_completion_reported.load(Ordering::Relaxed));
        reporter.job_completed(&[]);
        assert!(reporter.job_completion_reported.load(Ordering::Relaxed));
    }

    #[test]
    fn test_total_runs() {
        let reporter = CliReporter::new(true);
        reporter.set_total_number_of_runs(4);
        assert_eq!(reporter.total_runs(), 4);
        assert_eq!(reporter.completed_runs(), 0);
    }
}
