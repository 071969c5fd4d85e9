//! Chunk decorators: caves and ore veins applied to an already-filled chunk.
//!
//! A decorator asks its structure definitions for every structure reaching the
//! chunk and renders each through a [`ReplaceGate`], the only path by which a
//! structure can write blocks.

mod cave;
mod ore;

pub use cave::CaveDecorator;
pub use ore::{OreDecorator, OreDefinition, OreRegistry, OreRegistryError, VeinOre};

use std::fmt;
use std::sync::Arc;

use glam::IVec3;
use hashbrown::HashSet;
use strata_voxel::{BlockId, BlockRegistry};
use thiserror::Error;

use crate::distribution::{Distribution, DistributionError};
use crate::region::{ChunkAccess, Region};
use crate::structure::StructureCallback;
use crate::veins::{MAX_REACH, StructureDefinition, VeinsStructureDefinition};

/// Errors raised while building or running a decorator.
#[derive(Debug, Error)]
pub enum DecoratorError {
    /// The region carries no seed facet.
    #[error("region has no seed facet")]
    MissingSeedFacet,

    /// A configured block name is not in the block registry.
    #[error("unknown block: {0}")]
    UnknownBlock(String),

    #[error("invalid distribution for {field}: {source}")]
    InvalidDistribution {
        field: String,
        #[source]
        source: DistributionError,
    },

    /// Structures are configured but the filter accepts no block.
    #[error("{0} decorator has structures but no replaceable blocks")]
    EmptyFilter(String),

    /// The configured shape lets a vein extend further than [`MAX_REACH`].
    #[error("{name} veins reach {reach:.0} blocks, more than the {max:.0} allowed")]
    ReachTooLarge { name: String, reach: f64, max: f64 },

    #[error(transparent)]
    OreRegistry(#[from] OreRegistryError),
}

/// What one decorator did to one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecorationReport {
    /// Structures that reached the chunk.
    pub structures: usize,
    /// Cells actually overwritten.
    pub blocks_replaced: u64,
}

impl std::ops::AddAssign for DecorationReport {
    fn add_assign(&mut self, other: Self) {
        self.structures += other.structures;
        self.blocks_replaced += other.blocks_replaced;
    }
}

/// A world generation pass that mutates chunks in place.
pub trait ChunkDecorator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called once before the first chunk is generated.
    fn initialize(&mut self) {}

    /// Decorate `chunk`. Only cells passing the decorator's filter are written,
    /// never at local y = 0 and never outside the chunk.
    fn generate_chunk(
        &self,
        chunk: &mut dyn ChunkAccess,
        region: &dyn Region,
    ) -> Result<DecorationReport, DecoratorError>;
}

/// Predicate over the block currently occupying a cell.
#[derive(Clone)]
pub struct BlockFilter(Arc<dyn Fn(BlockId) -> bool + Send + Sync>);

impl BlockFilter {
    pub fn new(predicate: impl Fn(BlockId) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Accepts exactly the listed blocks.
    pub fn any_of(blocks: impl IntoIterator<Item = BlockId>) -> Self {
        let blocks: HashSet<BlockId> = blocks.into_iter().collect();
        Self::new(move |block| blocks.contains(&block))
    }

    /// Accepts the blocks named in `names`, resolved through `registry`.
    pub fn from_names(names: &[String], registry: &BlockRegistry) -> Result<Self, DecoratorError> {
        let blocks = names
            .iter()
            .map(|name| resolve_block(registry, name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::any_of(blocks))
    }

    pub fn accepts(&self, block: BlockId) -> bool {
        (self.0)(block)
    }
}

impl fmt::Debug for BlockFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlockFilter(..)")
    }
}

/// The [`StructureCallback`] a decorator hands to its structures.
///
/// Bounds are `[0, x) x [1, y) x [0, z)`; the bottom layer is never replaced.
pub struct ReplaceGate<'a> {
    chunk: &'a mut dyn ChunkAccess,
    filter: &'a BlockFilter,
    replaced: u64,
}

impl<'a> ReplaceGate<'a> {
    pub fn new(chunk: &'a mut dyn ChunkAccess, filter: &'a BlockFilter) -> Self {
        Self {
            chunk,
            filter,
            replaced: 0,
        }
    }

    /// Writes accepted so far.
    pub fn replaced(&self) -> u64 {
        self.replaced
    }
}

impl StructureCallback for ReplaceGate<'_> {
    fn can_replace(&self, x: i32, y: i32, z: i32) -> bool {
        let size = self.chunk.size();
        x >= 0
            && y >= 1
            && z >= 0
            && x < size.x as i32
            && y < size.y as i32
            && z < size.z as i32
            && self.filter.accepts(self.chunk.block(x, y, z))
    }

    fn replace_block(&mut self, position: IVec3, _force: f32, block: BlockId) {
        if self.can_replace(position.x, position.y, position.z) {
            self.chunk.set_block(position, block);
            self.replaced += 1;
        }
    }
}

/// Run every definition against `chunk` in order.
pub(crate) fn decorate<'d>(
    name: &str,
    definitions: impl IntoIterator<Item = &'d dyn StructureDefinition>,
    filter: &BlockFilter,
    chunk: &mut dyn ChunkAccess,
    region: &dyn Region,
) -> Result<DecorationReport, DecoratorError> {
    let seed = region
        .seed_facet()
        .ok_or(DecoratorError::MissingSeedFacet)?;
    let position = chunk.position();
    let size = chunk.size();

    let mut report = DecorationReport::default();
    let mut gate = ReplaceGate::new(chunk, filter);
    for definition in definitions {
        for structure in definition.generate_structures(position, size, seed, region) {
            let before = gate.replaced();
            structure.generate_structure(&mut gate);
            tracing::trace!(
                decorator = name,
                kind = ?structure.kind(),
                nodes = structure.nodes().len(),
                replaced = gate.replaced() - before,
                "Applied structure"
            );
            report.structures += 1;
        }
    }
    report.blocks_replaced = gate.replaced();

    tracing::debug!(
        decorator = name,
        chunk = ?position,
        structures = report.structures,
        blocks_replaced = report.blocks_replaced,
        "Decorated chunk"
    );
    Ok(report)
}

pub(crate) fn resolve_block(registry: &BlockRegistry, name: &str) -> Result<BlockId, DecoratorError> {
    registry
        .lookup_by_name(name)
        .ok_or_else(|| DecoratorError::UnknownBlock(name.to_string()))
}

pub(crate) fn convert(
    field: &str,
    settings: &strata_config::DistributionSettings,
) -> Result<Distribution, DecoratorError> {
    Distribution::try_from(settings).map_err(|source| DecoratorError::InvalidDistribution {
        field: field.to_string(),
        source,
    })
}

/// Rejects definitions whose veins could reach further than [`MAX_REACH`].
pub(crate) fn check_reach(
    name: &str,
    definition: &VeinsStructureDefinition,
) -> Result<(), DecoratorError> {
    let reach = definition.reach();
    if reach > MAX_REACH {
        return Err(DecoratorError::ReachTooLarge {
            name: name.to_string(),
            reach,
            max: MAX_REACH,
        });
    }
    Ok(())
}
