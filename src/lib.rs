//! @ai:module:intent Compile benchmark harness configurations into filtered experiments
//! @ai:module:layer application
//! @ai:module:public_api config, configurator, error, filter, model, niceness, options, reporter

pub mod config;
pub mod configurator;
pub mod error;
pub mod filter;
pub mod model;
pub mod niceness;
pub mod options;
pub mod reporter;

pub use config::{load_config, RawConfig};
pub use configurator::{Configurator, ConfiguratorArgs, ALL_EXPERIMENTS};
pub use error::{ConfigError, FilterError};
pub use filter::{BenchmarkIdentity, Matcher, RunFilter};
pub use model::{DataStore, Experiment, RunId, RunsConfig};
pub use niceness::{OsPriorityProbe, PriorityProbe};
pub use options::{CliOptions, Verbosity};
pub use reporter::{CliReporter, Reporter};
