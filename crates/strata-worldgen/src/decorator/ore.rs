//! Ore veins and the explicit registry of ore types a world uses.

use hashbrown::HashSet;
use strata_config::OreSettings;
use strata_voxel::{BlockId, BlockRegistry};
use thiserror::Error;

use super::{
    BlockFilter, ChunkDecorator, DecorationReport, DecoratorError, check_reach, convert, decorate,
    resolve_block,
};
use crate::distribution::Distribution;
use crate::region::{ChunkAccess, Region};
use crate::seed::salt_for;
use crate::veins::{StructureDefinition, VeinsBlockProvider, VeinsConfig, VeinsStructureDefinition};

const BRANCH_INCLINATION: Distribution = Distribution::new_unchecked(0.0, 0.4);
const BRANCH_HEIGHT_LIMIT: Distribution = Distribution::new_unchecked(16.0, 0.0);
const SEGMENT_FORK_FREQUENCY: Distribution = Distribution::new_unchecked(0.1, 0.0);
const SEGMENT_FORK_LENGTH_MULT: Distribution = Distribution::new_unchecked(0.5, 0.0);
const SEGMENT_LENGTH: Distribution = Distribution::new_unchecked(3.0, 1.0);
const SEGMENT_ANGLE: Distribution = Distribution::new_unchecked(0.4, 0.4);
const BLOCK_RADIUS_MULT: Distribution = Distribution::new_unchecked(1.0, 0.0);

/// Rejected ore registrations.
#[derive(Debug, Error)]
pub enum OreRegistryError {
    #[error("duplicate ore id: {0}")]
    DuplicateOre(String),
}

/// One ore type: a unique id plus the structures it places.
pub trait OreDefinition: Send + Sync {
    fn ore_id(&self) -> &str;
    fn structure_definition(&self) -> &dyn StructureDefinition;
}

/// An ore laid out as branching veins of a single block.
#[derive(Debug)]
pub struct VeinOre {
    id: String,
    definition: VeinsStructureDefinition,
}

impl VeinOre {
    /// The vein's random stream is salted with `id`, so ores sharing a world seed
    /// never share structures.
    pub fn new(id: impl Into<String>, config: VeinsConfig, block: BlockId) -> Self {
        let id = id.into();
        let definition =
            VeinsStructureDefinition::new(config, VeinsBlockProvider::uniform(block), salt_for(&id));
        Self { id, definition }
    }

    pub fn from_settings(settings: &OreSettings, blocks: &BlockRegistry) -> Result<Self, DecoratorError> {
        let block = resolve_block(blocks, &settings.block)?;
        let field = |name: &str| format!("ores.{}.{name}", settings.id);
        let config = VeinsConfig {
            frequency: convert(&field("frequency"), &settings.frequency)?,
            mother_lode_radius: convert(&field("cluster_radius"), &settings.cluster_radius)?,
            mother_lode_y_level: convert(&field("cluster_y_level"), &settings.cluster_y_level)?,
            branch_frequency: convert(&field("branch_frequency"), &settings.branch_frequency)?,
            branch_inclination: BRANCH_INCLINATION,
            branch_length: convert(&field("branch_length"), &settings.branch_length)?,
            branch_height_limit: BRANCH_HEIGHT_LIMIT,
            segment_fork_frequency: SEGMENT_FORK_FREQUENCY,
            segment_fork_length_mult: SEGMENT_FORK_LENGTH_MULT,
            segment_length: SEGMENT_LENGTH,
            segment_angle: SEGMENT_ANGLE,
            segment_radius: convert(&field("segment_radius"), &settings.segment_radius)?,
            block_density: convert(&field("block_density"), &settings.block_density)?,
            block_radius_mult: BLOCK_RADIUS_MULT,
        };
        let ore = Self::new(settings.id.clone(), config, block);
        check_reach(&settings.id, &ore.definition)?;
        Ok(ore)
    }

    pub fn definition(&self) -> &VeinsStructureDefinition {
        &self.definition
    }
}

impl OreDefinition for VeinOre {
    fn ore_id(&self) -> &str {
        &self.id
    }

    fn structure_definition(&self) -> &dyn StructureDefinition {
        &self.definition
    }
}

/// Ore types keyed by unique id, kept in registration order.
#[derive(Default)]
pub struct OreRegistry {
    ores: Vec<Box<dyn OreDefinition>>,
    ids: HashSet<String>,
}

impl OreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ore: Box<dyn OreDefinition>) -> Result<(), OreRegistryError> {
        if !self.ids.insert(ore.ore_id().to_string()) {
            return Err(OreRegistryError::DuplicateOre(ore.ore_id().to_string()));
        }
        self.ores.push(ore);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn OreDefinition> {
        self.ores
            .iter()
            .find(|ore| ore.ore_id() == id)
            .map(|ore| ore.as_ref())
    }

    /// Ores in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn OreDefinition> {
        self.ores.iter().map(|ore| ore.as_ref())
    }

    pub fn len(&self) -> usize {
        self.ores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ores.is_empty()
    }
}

impl std::fmt::Debug for OreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|ore| ore.ore_id())).finish()
    }
}

/// Places every registered ore into filtered blocks, in registration order.
#[derive(Debug)]
pub struct OreDecorator {
    filter: BlockFilter,
    ores: OreRegistry,
}

impl OreDecorator {
    pub fn new(filter: BlockFilter, ores: OreRegistry) -> Self {
        Self { filter, ores }
    }

    /// Build from config: `filter_blocks` names what veins may replace.
    pub fn from_settings(
        ores: &[OreSettings],
        filter_blocks: &[String],
        blocks: &BlockRegistry,
    ) -> Result<Self, DecoratorError> {
        if !ores.is_empty() && filter_blocks.is_empty() {
            return Err(DecoratorError::EmptyFilter("ores".to_string()));
        }
        let filter = BlockFilter::from_names(filter_blocks, blocks)?;
        let mut registry = OreRegistry::new();
        for settings in ores {
            registry.register(Box::new(VeinOre::from_settings(settings, blocks)?))?;
        }
        Ok(Self::new(filter, registry))
    }

    pub fn ores(&self) -> &OreRegistry {
        &self.ores
    }
}

impl ChunkDecorator for OreDecorator {
    fn name(&self) -> &str {
        "ores"
    }

    fn initialize(&mut self) {
        tracing::info!(ores = ?self.ores, "Ore decorator initialized");
    }

    fn generate_chunk(
        &self,
        chunk: &mut dyn ChunkAccess,
        region: &dyn Region,
    ) -> Result<DecorationReport, DecoratorError> {
        let definitions = self.ores.iter().map(|ore| ore.structure_definition());
        decorate(self.name(), definitions, &self.filter, chunk, region)
    }
}
