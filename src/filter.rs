//! @ai:module:intent Run filter expressions selecting which benchmarks get compiled into runs
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkIdentity, Matcher, RunFilter
//! @ai:module:stateless true
//!
//! Filter tokens come in three shapes: `vm:<name>`, `s:<suite>` and
//! `s:<suite>:<benchmark>`. VM matchers and suite/benchmark matchers live in
//! separate buckets; a benchmark has to satisfy both buckets, and any single
//! matcher satisfies its bucket.

use crate::error::FilterError;

/// @ai:intent Read-only view of a benchmark as seen by run filters
pub trait BenchmarkIdentity {
    fn vm_name(&self) -> &str;
    fn suite_name(&self) -> &str;
    fn name(&self) -> &str;
}

/// @ai:intent Single parsed filter expression
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Vm(String),
    Suite(String),
    Benchmark { suite: String, name: String },
}

impl Matcher {
    /// @ai:intent Parse one filter token into a matcher
    /// @ai:pre token has the shape vm:<name>, s:<suite> or s:<suite>:<benchmark>
    /// @ai:effects pure
    pub fn parse(token: &str) -> Result<Self, FilterError> {
        let parts: Vec<&str> = token.split(':').collect();
        match parts.as_slice() {
            ["vm", vm] => Ok(Matcher::Vm(vm.to_string())),
            ["s", suite] => Ok(Matcher::Suite(suite.to_string())),
            ["s", suite, name] => Ok(Matcher::Benchmark {
                suite: suite.to_string(),
                name: name.to_string(),
            }),
            _ => Err(FilterError::UnknownExpression(token.to_string())),
        }
    }

    /// @ai:intent Check whether the benchmark satisfies this matcher
    /// @ai:effects pure
    pub fn matches<B: BenchmarkIdentity + ?Sized>(&self, bench: &B) -> bool {
        match self {
            Matcher::Vm(vm) => bench.vm_name() == vm,
            Matcher::Suite(suite) => bench.suite_name() == suite,
            Matcher::Benchmark { suite, name } => {
                Matcher::suite_matches(suite, bench) && bench.name() == name
            }
        }
    }

    fn suite_matches<B: BenchmarkIdentity + ?Sized>(suite: &str, bench: &B) -> bool {
        bench.suite_name() == suite
    }

    fn is_vm(&self) -> bool {
        matches!(self, Matcher::Vm(_))
    }
}

/// @ai:intent Combined predicate over VM and suite/benchmark matchers
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    vm_filters: Vec<Matcher>,
    suite_filters: Vec<Matcher>,
}

impl RunFilter {
    /// @ai:intent Build a run filter from filter tokens; no tokens matches everything
    /// @ai:effects pure
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, FilterError> {
        let mut filter = RunFilter::default();

        for token in tokens {
            let matcher = Matcher::parse(token.as_ref())?;
            if matcher.is_vm() {
                filter.vm_filters.push(matcher);
            } else {
                filter.suite_filters.push(matcher);
            }
        }

        Ok(filter)
    }

    /// @ai:intent Decide whether a benchmark passes the filter
    /// @ai:effects pure
    pub fn applies<B: BenchmarkIdentity + ?Sized>(&self, bench: &B) -> bool {
        Self::any_match(&self.vm_filters, bench) && Self::any_match(&self.suite_filters, bench)
    }

    pub fn vm_filters(&self) -> &[Matcher] {
        &self.vm_filters
    }

    pub fn suite_filters(&self) -> &[Matcher] {
        &self.suite_filters
    }

    /// @ai:intent True when no matcher was given at all
    /// @ai:effects pure
    pub fn is_empty(&self) -> bool {
        self.vm_filters.is_empty() && self.suite_filters.is_empty()
    }

    fn any_match<B: BenchmarkIdentity + ?Sized>(filters: &[Matcher], bench: &B) -> bool {
        filters.is_empty() || filters.iter().any(|f| f.matches(bench))
    }
}
