//! Host-facing views: the read-only generation region and the writable chunk.

use glam::IVec3;
use strata_voxel::{BlockId, Chunk, ChunkSize};

use crate::seed::derive_chunk_seed;

/// Seed data the host attaches to every region it generates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeedFacet {
    world_seed: u64,
}

impl SeedFacet {
    pub fn new(world_seed: u64) -> Self {
        Self { world_seed }
    }

    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// Seed of the chunk at `position`.
    pub fn chunk_seed(&self, position: IVec3) -> u64 {
        derive_chunk_seed(self.world_seed, position)
    }
}

/// Read-only context supplied with each chunk generation call.
///
/// Shared between worker threads, so implementations must be `Sync`.
pub trait Region: Sync {
    /// The seed facet, or `None` when the host did not provide one.
    fn seed_facet(&self) -> Option<&SeedFacet>;
}

/// Minimal [`Region`] for hosts that only carry a seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationRegion {
    seed: Option<SeedFacet>,
}

impl GenerationRegion {
    /// A region carrying a seed facet for `world_seed`.
    pub fn new(world_seed: u64) -> Self {
        Self {
            seed: Some(SeedFacet::new(world_seed)),
        }
    }

    /// A region without any facets.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Region for GenerationRegion {
    fn seed_facet(&self) -> Option<&SeedFacet> {
        self.seed.as_ref()
    }
}

/// Block access a decorator needs from the chunk it is decorating.
///
/// Coordinates are chunk-local. Implementations are only ever written through
/// the decorator's replace gate.
pub trait ChunkAccess {
    /// Position in chunk coordinates.
    fn position(&self) -> IVec3;
    fn size(&self) -> ChunkSize;
    fn block(&self, x: i32, y: i32, z: i32) -> BlockId;
    fn set_block(&mut self, position: IVec3, block: BlockId);
}

impl ChunkAccess for Chunk {
    fn position(&self) -> IVec3 {
        Chunk::position(self)
    }

    fn size(&self) -> ChunkSize {
        Chunk::size(self)
    }

    fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.get(x, y, z)
    }

    fn set_block(&mut self, position: IVec3, block: BlockId) {
        self.set(position.x, position.y, position.z, block);
    }
}
