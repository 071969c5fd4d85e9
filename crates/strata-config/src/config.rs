//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level world generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldGenConfig {
    /// World seed and chunk geometry.
    pub world: WorldConfig,
    /// Cave carving.
    pub caves: CaveSettings,
    /// Ore veins, applied in list order.
    pub ores: Vec<OreSettings>,
    /// Names of the blocks ore veins may replace.
    pub ore_filter_blocks: Vec<String>,
    /// Worker pool settings.
    pub generation: GenerationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World seed and chunk geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u64,
    pub chunk_size_x: u32,
    pub chunk_size_y: u32,
    pub chunk_size_z: u32,
    /// Height of the flat base terrain surface, in blocks.
    pub surface_height: u32,
    /// Layers of dirt (grass included) above the stone.
    pub dirt_depth: u32,
}

/// How a distribution spreads around its mean.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DistributionKind {
    #[default]
    Uniform,
    Normal,
}

/// Raw `(mean, variance)` pair as written in the config file.
///
/// `variance` is the largest deviation from `mean` a sample may take.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DistributionSettings {
    pub mean: f32,
    pub variance: f32,
    #[serde(default)]
    pub kind: DistributionKind,
}

impl DistributionSettings {
    /// Uniform distribution settings.
    pub const fn new(mean: f32, variance: f32) -> Self {
        Self {
            mean,
            variance,
            kind: DistributionKind::Uniform,
        }
    }

    /// A distribution that always yields `mean`.
    pub const fn fixed(mean: f32) -> Self {
        Self::new(mean, 0.0)
    }

    fn check(&self, field: &str) -> Result<(), ConfigError> {
        if !self.mean.is_finite() {
            return Err(invalid(field, format!("mean {} is not finite", self.mean)));
        }
        if !self.variance.is_finite() || self.variance < 0.0 {
            return Err(invalid(
                field,
                format!("variance {} must be finite and >= 0", self.variance),
            ));
        }
        Ok(())
    }
}

/// Cave decorator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaveSettings {
    pub enabled: bool,
    /// Names of the blocks caves may carve through.
    pub filter_blocks: Vec<String>,
    /// Caves originating per chunk.
    pub frequency: DistributionSettings,
    pub main_cave_radius: DistributionSettings,
    pub main_cave_y_level: DistributionSettings,
    pub tunnel_length: DistributionSettings,
    pub tunnel_radius: DistributionSettings,
}

/// One ore vein type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OreSettings {
    /// Unique ore identifier, e.g. "strata:iron".
    pub id: String,
    /// Name of the block the vein is made of.
    pub block: String,
    pub frequency: DistributionSettings,
    pub cluster_radius: DistributionSettings,
    pub cluster_y_level: DistributionSettings,
    pub branch_frequency: DistributionSettings,
    pub branch_length: DistributionSettings,
    pub segment_radius: DistributionSettings,
    /// Fraction of cells inside the vein that are actually replaced.
    pub block_density: DistributionSettings,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker threads. 0 picks a count from the number of CPUs.
    pub threads: usize,
    /// Maximum queued generation tasks.
    pub queue_capacity: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            chunk_size_x: 16,
            chunk_size_y: 256,
            chunk_size_z: 16,
            surface_height: 64,
            dirt_depth: 4,
        }
    }
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filter_blocks: vec!["stone".to_string(), "dirt".to_string()],
            frequency: DistributionSettings::new(0.1, 0.0),
            main_cave_radius: DistributionSettings::new(4.0, 1.0),
            main_cave_y_level: DistributionSettings::new(36.0, 16.0),
            tunnel_length: DistributionSettings::new(48.0, 16.0),
            tunnel_radius: DistributionSettings::new(2.0, 0.5),
        }
    }
}

impl OreSettings {
    fn vein(id: &str, block: &str, frequency: f32, y_level: f32, radius: f32) -> Self {
        Self {
            id: id.to_string(),
            block: block.to_string(),
            frequency: DistributionSettings::new(frequency, frequency / 2.0),
            cluster_radius: DistributionSettings::new(radius, 0.5),
            cluster_y_level: DistributionSettings::new(y_level, y_level / 2.0),
            branch_frequency: DistributionSettings::new(2.0, 1.0),
            branch_length: DistributionSettings::new(8.0, 4.0),
            segment_radius: DistributionSettings::new(radius / 2.0, 0.25),
            block_density: DistributionSettings::fixed(0.8),
        }
    }
}

impl WorldGenConfig {
    /// The ore set used when the config file does not name any.
    pub fn default_ores() -> Vec<OreSettings> {
        vec![
            OreSettings::vein("strata:coal", "coal_ore", 1.5, 44.0, 2.0),
            OreSettings::vein("strata:iron", "iron_ore", 1.0, 32.0, 1.5),
            OreSettings::vein("strata:gold", "gold_ore", 0.3, 16.0, 1.5),
        ]
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            queue_capacity: 64,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

// --- Validation ---

impl WorldGenConfig {
    /// Default config with the default ore set filled in.
    pub fn with_default_ores() -> Self {
        Self {
            ores: Self::default_ores(),
            ore_filter_blocks: vec!["stone".to_string()],
            ..Self::default()
        }
    }

    /// Check everything that would otherwise fail later, during generation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        for (field, extent) in [
            ("world.chunk_size_x", w.chunk_size_x),
            ("world.chunk_size_y", w.chunk_size_y),
            ("world.chunk_size_z", w.chunk_size_z),
        ] {
            if extent == 0 {
                return Err(invalid(field, "chunk extent must be positive"));
            }
        }
        if w.surface_height > w.chunk_size_y {
            return Err(invalid(
                "world.surface_height",
                format!("{} exceeds chunk height {}", w.surface_height, w.chunk_size_y),
            ));
        }

        let c = &self.caves;
        c.frequency.check("caves.frequency")?;
        c.main_cave_radius.check("caves.main_cave_radius")?;
        c.main_cave_y_level.check("caves.main_cave_y_level")?;
        c.tunnel_length.check("caves.tunnel_length")?;
        c.tunnel_radius.check("caves.tunnel_radius")?;
        if c.enabled && c.filter_blocks.is_empty() {
            return Err(invalid(
                "caves.filter_blocks",
                "caves are enabled but may not carve any block",
            ));
        }
        if !self.ores.is_empty() && self.ore_filter_blocks.is_empty() {
            return Err(invalid(
                "ore_filter_blocks",
                "ores are configured but may not replace any block",
            ));
        }

        let mut seen = HashSet::new();
        for (i, ore) in self.ores.iter().enumerate() {
            let prefix = format!("ores[{i}]");
            if ore.id.is_empty() {
                return Err(invalid(&prefix, "ore id is empty"));
            }
            if !seen.insert(ore.id.as_str()) {
                return Err(invalid(&prefix, format!("duplicate ore id {}", ore.id)));
            }
            for (name, dist) in [
                ("frequency", &ore.frequency),
                ("cluster_radius", &ore.cluster_radius),
                ("cluster_y_level", &ore.cluster_y_level),
                ("branch_frequency", &ore.branch_frequency),
                ("branch_length", &ore.branch_length),
                ("segment_radius", &ore.segment_radius),
                ("block_density", &ore.block_density),
            ] {
                dist.check(&format!("{prefix}.{name}"))?;
            }
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl WorldGenConfig {
    /// Load and validate `worldgen.ron` from the given directory, or create a default one.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("worldgen.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: WorldGenConfig =
                ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded world generation config from {}", config_path.display());
            Ok(config)
        } else {
            let config = WorldGenConfig::with_default_ores();
            config.save(config_dir)?;
            log::info!(
                "Created default world generation config at {}",
                config_path.display()
            );
            Ok(config)
        }
    }

    /// Save config to the given directory as `worldgen.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("worldgen.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("worldgen.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: WorldGenConfig =
            ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("World generation config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
