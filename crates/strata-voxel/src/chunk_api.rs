//! Positioned chunk with bounds-checked access and mutation tracking.
//!
//! [`Chunk`] wraps [`ChunkData`] with its position in chunk coordinates and a
//! version counter. Out-of-bounds access is handled without panics.

use glam::IVec3;

use crate::chunk::{ChunkData, ChunkSize};
use crate::registry::BlockId;

/// A chunk of the world, owned by whoever is currently generating or storing it.
///
/// Out-of-bounds reads return air and out-of-bounds writes are ignored with a
/// warning log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Position in chunk coordinates (not blocks).
    position: IVec3,
    data: ChunkData,
    /// Incremented on every mutation.
    version: u64,
}

impl Chunk {
    /// Creates an air-filled chunk at `position`.
    pub fn new(position: IVec3, size: ChunkSize) -> Self {
        Self::new_filled(position, size, BlockId::AIR)
    }

    /// Creates a chunk at `position` filled with `block`.
    pub fn new_filled(position: IVec3, size: ChunkSize, block: BlockId) -> Self {
        Self {
            position,
            data: ChunkData::new(size, block),
            version: 0,
        }
    }

    /// Position in chunk coordinates.
    pub fn position(&self) -> IVec3 {
        self.position
    }

    /// Chunk dimensions.
    pub fn size(&self) -> ChunkSize {
        self.data.size()
    }

    /// World-space block coordinate of local cell `(0, 0, 0)`.
    pub fn world_origin(&self) -> IVec3 {
        self.position * self.size().as_ivec3()
    }

    /// Returns the block at `(x, y, z)`, or air if out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !self.size().contains(x, y, z) {
            tracing::warn!("Chunk::get out of bounds: ({}, {}, {})", x, y, z);
            return BlockId::AIR;
        }
        self.data.get(x as usize, y as usize, z as usize)
    }

    /// Sets the block at `(x, y, z)`. No-op with a warning if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockId) {
        if !self.size().contains(x, y, z) {
            tracing::warn!("Chunk::set out of bounds: ({}, {}, {})", x, y, z);
            return;
        }
        self.data.set(x as usize, y as usize, z as usize, block);
        self.version += 1;
    }

    /// Fills every cell with `block`.
    pub fn fill(&mut self, block: BlockId) {
        self.data.fill(block);
        self.version += 1;
    }

    /// Number of mutations applied since creation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The underlying block grid.
    pub fn data(&self) -> &ChunkData {
        &self.data
    }

    /// Mutable access to the grid. Bypasses version tracking.
    pub fn data_mut(&mut self) -> &mut ChunkData {
        &mut self.data
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Chunk {
        Chunk::new(IVec3::new(2, 0, -1), ChunkSize::new(8, 16, 8))
    }

    #[test]
    fn test_empty_chunk_returns_air() {
        let chunk = small();
        assert_eq!(chunk.get(0, 0, 0), BlockId::AIR);
        assert_eq!(chunk.get(7, 15, 7), BlockId::AIR);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut chunk = small();
        chunk.set(3, 9, 4, BlockId(7));
        assert_eq!(chunk.get(3, 9, 4), BlockId(7));
        assert_eq!(chunk.version(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_harmless() {
        let mut chunk = small();
        assert_eq!(chunk.get(8, 0, 0), BlockId::AIR);
        assert_eq!(chunk.get(-1, 0, 0), BlockId::AIR);
        chunk.set(0, 16, 0, BlockId(5));
        chunk.set(0, 0, -3, BlockId(5));
        assert_eq!(chunk.version(), 0);
        assert_eq!(chunk.data().count(BlockId(5)), 0);
    }

    #[test]
    fn test_world_origin_scales_by_size() {
        let chunk = small();
        assert_eq!(chunk.world_origin(), IVec3::new(16, 0, -8));
    }
}
