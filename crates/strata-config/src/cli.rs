//! Command-line argument parsing for Strata tools.

use std::path::PathBuf;

use clap::Parser;

use crate::WorldGenConfig;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `worldgen.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Seeded cave and ore decoration for voxel chunks")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Generate every chunk within this many chunks of the origin.
    #[arg(long, default_value_t = 2)]
    pub radius: u32,

    /// Worker thread count (0 = automatic).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Generate every chunk twice in different orders and compare the results.
    #[arg(long)]
    pub verify: bool,
}

impl WorldGenConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(threads) = args.threads {
            self.generation.threads = threads;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
