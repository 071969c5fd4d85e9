//! Dense block storage for chunk volumes of arbitrary dimensions.
//!
//! World generation writes nearly every cell of a fresh chunk, so cells are stored
//! as one flat `Vec<BlockId>` rather than palette-compressed.

use serde::{Deserialize, Serialize};

use crate::registry::BlockId;

/// Dimensions of a chunk in blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl ChunkSize {
    /// Creates a size from its three extents.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells.
    pub const fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Returns `true` if `(x, y, z)` addresses a cell inside the volume.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.x
            && (y as u32) < self.y
            && (z as u32) < self.z
    }

    /// Extents as a signed vector.
    pub fn as_ivec3(&self) -> glam::IVec3 {
        glam::IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

impl Default for ChunkSize {
    /// 16 × 256 × 16.
    fn default() -> Self {
        Self::new(16, 256, 16)
    }
}

/// Flat block grid for one chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkData {
    size: ChunkSize,
    blocks: Vec<BlockId>,
}

impl ChunkData {
    /// Creates a chunk filled entirely with `fill`.
    pub fn new(size: ChunkSize, fill: BlockId) -> Self {
        Self {
            size,
            blocks: vec![fill; size.volume()],
        }
    }

    /// Creates a chunk filled with air.
    pub fn new_air(size: ChunkSize) -> Self {
        Self::new(size, BlockId::AIR)
    }

    /// Chunk dimensions.
    pub fn size(&self) -> ChunkSize {
        self.size
    }

    /// Returns the block at `(x, y, z)`.
    ///
    /// Each coordinate must be inside [`ChunkData::size`].
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[self.linear_index(x, y, z)]
    }

    /// Sets the block at `(x, y, z)`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) {
        let index = self.linear_index(x, y, z);
        self.blocks[index] = block;
    }

    /// Overwrites every cell with `block`.
    pub fn fill(&mut self, block: BlockId) {
        self.blocks.fill(block);
    }

    /// Number of cells holding `block`.
    pub fn count(&self, block: BlockId) -> usize {
        self.blocks.iter().filter(|&&b| b == block).count()
    }

    /// All cells in storage order (x fastest, then y, then z).
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        let (sx, sy, sz) = (
            self.size.x as usize,
            self.size.y as usize,
            self.size.z as usize,
        );
        debug_assert!(x < sx && y < sy && z < sz);
        x + y * sx + z * sx * sy
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
