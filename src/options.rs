//! @ai:module:intent Command-line options consumed by the configurator
//! @ai:module:layer application
//! @ai:module:public_api CliOptions, Verbosity, process_cli_options
//! @ai:module:stateless true

use crate::niceness::PriorityProbe;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// @ai:intent Options supplied on the command line that influence compilation
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliOptions {
    pub debug: bool,
    pub verbose: bool,
    pub use_nice: bool,
    pub do_builds: bool,
    pub clean: bool,
}

/// @ai:intent Logging verbosity selected by the debug and verbose flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Everything, including trace output
    All,
    Debug,
    /// Errors only
    #[default]
    Quiet,
}

impl Verbosity {
    /// @ai:intent Derive verbosity from options; no options means quiet
    /// @ai:effects pure
    pub fn from_options(options: Option<&CliOptions>) -> Self {
        match options {
            Some(o) if o.debug && o.verbose => Verbosity::All,
            Some(o) if o.debug => Verbosity::Debug,
            _ => Verbosity::Quiet,
        }
    }

    /// @ai:intent Map verbosity onto a tracing level filter
    /// @ai:effects pure
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::All => LevelFilter::TRACE,
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Quiet => LevelFilter::ERROR,
        }
    }

    /// @ai:intent Convert to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::All => "all",
            Verbosity::Debug => "debug",
            Verbosity::Quiet => "quiet",
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Resolve verbosity and disable niceness when the OS refuses it
/// @ai:post other option fields are returned untouched
/// @ai:effects io
pub fn process_cli_options(
    options: Option<CliOptions>,
    probe: &dyn PriorityProbe,
) -> (Option<CliOptions>, Verbosity) {
    let verbosity = Verbosity::from_options(options.as_ref());

    let Some(mut options) = options else {
        return (None, verbosity);
    };

    match verbosity {
        Verbosity::All => tracing::debug!("Enabled verbose debug output."),
        Verbosity::Debug => tracing::debug!("Enabled debug output."),
        Verbosity::Quiet => {}
    }

    if options.use_nice && !probe.can_set_niceness() {
        tracing::error!(
            "Process niceness cannot be set currently. To execute benchmarks with highest \
             priority, you might need root/admin rights."
        );
        tracing::error!("Deactivated usage of nice command.");
        options.use_nice = false;
    }

    (Some(options), verbosity)
}
