//! @ai:module:intent Domain model built from the configuration document
//! @ai:module:layer domain
//! @ai:module:public_api Experiment, RunId, RunsConfig, DataStore, BuildCommandCache

pub mod benchmark;
pub mod build_command;
pub mod data_store;
pub mod experiment;
pub mod run_id;
pub mod runs_config;

pub use benchmark::{Benchmark, BenchmarkSuite, VirtualMachine};
pub use build_command::{BuildCommand, BuildCommandCache};
pub use data_store::DataStore;
pub use experiment::{CompileContext, Experiment};
pub use run_id::RunId;
pub use runs_config::{RunsConfig, RunsOverride};
