//! Seeded world decoration: branching vein structures for caves and ores,
//! the decorators that place them, biome records, and a threaded chunk
//! generation pipeline.

mod distribution;
mod region;
mod seed;
mod structure;
mod veins;

pub mod async_generation;
pub mod biome;
pub mod decorator;
pub mod pipeline;

pub use async_generation::{ChunkGenerationPool, GenerationResult, default_thread_count};
pub use biome::{BiomeDef, BiomeId, BiomeRegistry, BiomeRegistryError, SweetSpot, SweetSpotAxis};
pub use decorator::{
    BlockFilter, CaveDecorator, ChunkDecorator, DecorationReport, DecoratorError, OreDecorator,
    OreDefinition, OreRegistry, OreRegistryError, ReplaceGate, VeinOre,
};
pub use distribution::{Distribution, DistributionError, DistributionKind};
pub use pipeline::{BaseTerrain, GeneratedChunk, GenerationTask, WorldPipeline, generate_chunk_sync};
pub use region::{ChunkAccess, GenerationRegion, Region, SeedFacet};
pub use seed::{cell_unit, chunk_rng, derive_chunk_seed, hash_chunk, salt_for, salted_seed};
pub use structure::{Structure, StructureCallback, StructureKind, StructureNode};
pub use veins::{
    MAX_REACH, StructureDefinition, VeinsBlockProvider, VeinsConfig, VeinsStructureDefinition,
};
