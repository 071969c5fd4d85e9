//! Biome records: static climate data consumed by biome selection.
//!
//! Biomes carry no behaviour. Parents are referenced by id and resolved through
//! [`BiomeRegistry`].

mod def;
mod registry;

pub use def::{BiomeDef, BiomeId, SweetSpot, SweetSpotAxis, desert};
pub use registry::{BiomeRegistry, BiomeRegistryError};
