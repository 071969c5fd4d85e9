//! Cave carving: air-filled veins cut through filtered blocks.

use strata_config::CaveSettings;
use strata_voxel::{BlockId, BlockRegistry};

use super::{
    BlockFilter, ChunkDecorator, DecorationReport, DecoratorError, check_reach, convert, decorate,
};
use crate::distribution::Distribution;
use crate::region::{ChunkAccess, Region};
use crate::veins::{StructureDefinition, VeinsBlockProvider, VeinsConfig, VeinsStructureDefinition};

/// Separates the cave stream from ore streams under the same world seed.
const CAVE_SALT: u64 = 0x00CA_7E00_5A17;

const BRANCH_FREQUENCY: Distribution = Distribution::new_unchecked(4.0, 1.0);
const BRANCH_INCLINATION: Distribution = Distribution::new_unchecked(0.0, 0.1);
const BRANCH_HEIGHT_LIMIT: Distribution = Distribution::new_unchecked(1000.0, 0.0);
const SEGMENT_FORK_FREQUENCY: Distribution = Distribution::new_unchecked(0.0, 0.0);
const SEGMENT_FORK_LENGTH_MULT: Distribution = Distribution::new_unchecked(0.25, 0.0);
const SEGMENT_LENGTH: Distribution = Distribution::new_unchecked(5.0, 0.0);
const SEGMENT_ANGLE: Distribution = Distribution::new_unchecked(0.5, 0.5);
const BLOCK_DENSITY: Distribution = Distribution::new_unchecked(1.0, 0.0);
const BLOCK_RADIUS_MULT: Distribution = Distribution::new_unchecked(1.0, 0.0);

/// Carves a main cave with several tunnels per cave origin.
#[derive(Debug)]
pub struct CaveDecorator {
    filter: BlockFilter,
    definition: VeinsStructureDefinition,
}

impl CaveDecorator {
    pub fn new(
        filter: BlockFilter,
        cave_frequency: Distribution,
        main_cave_radius: Distribution,
        main_cave_y_level: Distribution,
        tunnel_length: Distribution,
        tunnel_radius: Distribution,
        air: BlockId,
    ) -> Self {
        let config = VeinsConfig {
            frequency: cave_frequency,
            mother_lode_radius: main_cave_radius,
            mother_lode_y_level: main_cave_y_level,
            branch_frequency: BRANCH_FREQUENCY,
            branch_inclination: BRANCH_INCLINATION,
            branch_length: tunnel_length,
            branch_height_limit: BRANCH_HEIGHT_LIMIT,
            segment_fork_frequency: SEGMENT_FORK_FREQUENCY,
            segment_fork_length_mult: SEGMENT_FORK_LENGTH_MULT,
            segment_length: SEGMENT_LENGTH,
            segment_angle: SEGMENT_ANGLE,
            segment_radius: tunnel_radius,
            block_density: BLOCK_DENSITY,
            block_radius_mult: BLOCK_RADIUS_MULT,
        };
        Self {
            filter,
            definition: VeinsStructureDefinition::new(
                config,
                VeinsBlockProvider::uniform(air),
                CAVE_SALT,
            ),
        }
    }

    /// Build from config, resolving block names through `blocks`.
    pub fn from_settings(
        settings: &CaveSettings,
        blocks: &BlockRegistry,
    ) -> Result<Self, DecoratorError> {
        if settings.filter_blocks.is_empty() {
            return Err(DecoratorError::EmptyFilter("caves".to_string()));
        }
        let filter = BlockFilter::from_names(&settings.filter_blocks, blocks)?;
        let decorator = Self::new(
            filter,
            convert("caves.frequency", &settings.frequency)?,
            convert("caves.main_cave_radius", &settings.main_cave_radius)?,
            convert("caves.main_cave_y_level", &settings.main_cave_y_level)?,
            convert("caves.tunnel_length", &settings.tunnel_length)?,
            convert("caves.tunnel_radius", &settings.tunnel_radius)?,
            BlockId::AIR,
        );
        check_reach("caves", &decorator.definition)?;
        tracing::info!(
            filter_blocks = ?settings.filter_blocks,
            frequency = settings.frequency.mean,
            "Cave decorator configured"
        );
        Ok(decorator)
    }

    pub fn definition(&self) -> &VeinsStructureDefinition {
        &self.definition
    }
}

impl ChunkDecorator for CaveDecorator {
    fn name(&self) -> &str {
        "caves"
    }

    fn generate_chunk(
        &self,
        chunk: &mut dyn ChunkAccess,
        region: &dyn Region,
    ) -> Result<DecorationReport, DecoratorError> {
        let definition: &dyn StructureDefinition = &self.definition;
        decorate(self.name(), [definition], &self.filter, chunk, region)
    }
}
