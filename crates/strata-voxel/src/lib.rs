//! Host-side voxel storage for world generation: block registry, dense chunk grids and
//! positioned chunks with mutation tracking.

pub mod chunk;
pub mod chunk_api;
pub mod registry;

pub use chunk::{ChunkData, ChunkSize};
pub use chunk_api::Chunk;
pub use registry::{BlockDef, BlockId, BlockRegistry, BlockRegistryError, CoreBlocks};
