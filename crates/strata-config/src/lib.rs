//! Configuration for Strata world generation.
//!
//! Settings persist to disk as RON, can be overridden from the command line, and
//! are validated before any decorator is built from them.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CaveSettings, DebugConfig, DistributionKind, DistributionSettings, GenerationConfig,
    OreSettings, WorldConfig, WorldGenConfig,
};
pub use error::ConfigError;
