//! @ai:module:intent Error types for configuration loading and experiment compilation
//! @ai:module:layer domain
//! @ai:module:public_api ConfigError, FilterError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Errors raised while parsing run filter expressions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter expression: {0}")]
    UnknownExpression(String),
}

/// @ai:intent Unified error type for configuration and experiment compilation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("An error occurred on opening the config file ({path}): {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed parsing the config file ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Validation of {path} failed. {}", .errors.join(" "))]
    Validation { path: PathBuf, errors: Vec<String> },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("No experiment chosen.")]
    NoExperimentChosen,

    #[error("Requested experiment '{0}' not available.")]
    UnknownExperiment(String),

    #[error("Experiment '{experiment}' refers to unknown virtual machine '{vm}'")]
    UnknownVm { experiment: String, vm: String },

    #[error("Experiment '{experiment}' refers to unknown benchmark suite '{suite}'")]
    UnknownSuite { experiment: String, suite: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
