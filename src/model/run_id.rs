//! @ai:module:intent Identity of a single run: benchmark, VM, suite and run details
//! @ai:module:layer domain
//! @ai:module:public_api RunId
//! @ai:module:stateless true

use crate::filter::BenchmarkIdentity;
use crate::model::benchmark::Benchmark;
use crate::model::runs_config::RunsConfig;
use regex::{Captures, Regex};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%\((\w+)\)s").expect("placeholder pattern is valid"))
}

/// @ai:intent One (VM, suite, benchmark, configuration) combination to execute
/// @ai:effects pure
#[derive(Debug, Clone)]
pub struct RunId {
    pub benchmark: Benchmark,
    pub runs: RunsConfig,
}

impl RunId {
    pub fn new(benchmark: Benchmark, runs: RunsConfig) -> Self {
        Self { benchmark, runs }
    }

    /// @ai:intent Fields that define run equality
    /// @ai:effects pure
    fn key(&self) -> (&str, &str, &str, Option<&str>, &RunsConfig) {
        (
            self.benchmark.vm_name(),
            self.benchmark.suite_name(),
            self.benchmark.name(),
            self.benchmark.extra_args.as_deref(),
            &self.runs,
        )
    }

    /// @ai:intent Expand the command template into the full command line
    /// @ai:post unknown placeholders are left verbatim
    /// @ai:effects pure
    pub fn cmdline(&self) -> String {
        let bench = &self.benchmark;
        let command = placeholder_pattern().replace_all(bench.command_template(), |caps: &Captures| {
            match &caps[1] {
                "benchmark" => bench.name.clone(),
                "iterations" => self.runs.iterations.to_string(),
                "warmup" => self.runs.warmup.to_string(),
                _ => caps[0].to_string(),
            }
        });

        let mut parts = vec![bench.vm.executable()];
        parts.extend(bench.vm.args.iter().cloned());
        parts.push(command.into_owned());
        parts.extend(bench.extra_args.iter().cloned());

        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// @ai:intent Short identifying columns for listings
    /// @ai:effects pure
    pub fn as_str_list(&self) -> Vec<String> {
        vec![
            self.benchmark.vm.name.clone(),
            self.benchmark.suite.name.clone(),
            self.benchmark.name.clone(),
            self.benchmark.extra_args.clone().unwrap_or_default(),
        ]
    }
}

impl PartialEq for RunId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RunId {}

impl Hash for RunId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str_list().join(" ").trim_end())
    }
}
