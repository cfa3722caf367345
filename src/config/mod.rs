//! Experiment configuration
//!
//! YAML manifests name the data sources and the [`TrainConfig`](crate::train::TrainConfig)
//! of one run. Manifests are validated before any data is loaded.

mod cli;
mod schema;
pub mod validate;

pub use cli::{parse_args, Cli, Command, EvalArgs, HistoryArgs, PlanArgs, ValidateArgs};
pub use schema::{load_config, parse_config, DataSpec, ExperimentSpec};
pub(crate) use schema::source_paths;
pub use validate::{validate_config, ValidationError};
