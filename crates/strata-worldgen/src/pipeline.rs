//! Chunk generation pipeline: a flat layered base terrain followed by the
//! registered decorators, in registration order.

use glam::IVec3;
use strata_config::{WorldConfig, WorldGenConfig};
use strata_voxel::{BlockId, BlockRegistry, Chunk, ChunkSize, CoreBlocks};

use crate::decorator::{CaveDecorator, ChunkDecorator, DecorationReport, DecoratorError, OreDecorator};
use crate::region::GenerationRegion;

/// Layered fill every chunk starts from.
///
/// World y = 0 is bedrock, then stone, then dirt capped by a single grass layer at
/// `surface_height - 1`. Everything above is air.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseTerrain {
    blocks: CoreBlocks,
    surface_height: i32,
    dirt_depth: i32,
}

impl BaseTerrain {
    pub fn new(blocks: CoreBlocks, surface_height: u32, dirt_depth: u32) -> Self {
        Self {
            blocks,
            surface_height: surface_height as i32,
            dirt_depth: dirt_depth as i32,
        }
    }

    pub fn from_config(world: &WorldConfig, blocks: CoreBlocks) -> Self {
        Self::new(blocks, world.surface_height, world.dirt_depth)
    }

    /// Block at world height `y`.
    pub fn block_at(&self, y: i32) -> BlockId {
        let b = &self.blocks;
        if y <= 0 {
            b.bedrock
        } else if y >= self.surface_height {
            b.air
        } else if y == self.surface_height - 1 {
            b.grass
        } else if y >= self.surface_height - self.dirt_depth {
            b.dirt
        } else {
            b.stone
        }
    }

    pub fn fill(&self, chunk: &mut Chunk) {
        let origin = chunk.world_origin();
        let size = chunk.size();
        for ly in 0..size.y as i32 {
            let block = self.block_at(origin.y + ly);
            if block == self.blocks.air {
                continue;
            }
            for lx in 0..size.x as i32 {
                for lz in 0..size.z as i32 {
                    chunk.set(lx, ly, lz, block);
                }
            }
        }
    }
}

/// A request to generate a single chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenerationTask {
    /// Chunk coordinates.
    pub position: IVec3,
    pub world_seed: u64,
}

/// A generated chunk and what the decorators did to it.
#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub chunk: Chunk,
    pub report: DecorationReport,
}

/// Base terrain plus the decorators applied on top of it.
pub struct WorldPipeline {
    size: ChunkSize,
    base: BaseTerrain,
    decorators: Vec<Box<dyn ChunkDecorator>>,
}

impl WorldPipeline {
    pub fn new(size: ChunkSize, base: BaseTerrain) -> Self {
        Self {
            size,
            base,
            decorators: Vec::new(),
        }
    }

    /// Caves first, then ores, as configured.
    pub fn from_config(
        config: &WorldGenConfig,
        blocks: &BlockRegistry,
        core: CoreBlocks,
    ) -> Result<Self, DecoratorError> {
        let w = &config.world;
        let size = ChunkSize::new(w.chunk_size_x, w.chunk_size_y, w.chunk_size_z);
        let mut pipeline = Self::new(size, BaseTerrain::from_config(w, core));
        if config.caves.enabled {
            pipeline.add_decorator(Box::new(CaveDecorator::from_settings(&config.caves, blocks)?));
        }
        pipeline.add_decorator(Box::new(OreDecorator::from_settings(
            &config.ores,
            &config.ore_filter_blocks,
            blocks,
        )?));
        Ok(pipeline)
    }

    /// Initialize and append a decorator.
    pub fn add_decorator(&mut self, mut decorator: Box<dyn ChunkDecorator>) {
        decorator.initialize();
        self.decorators.push(decorator);
    }

    pub fn size(&self) -> ChunkSize {
        self.size
    }

    pub fn decorator_names(&self) -> Vec<&str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }
}

impl std::fmt::Debug for WorldPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldPipeline")
            .field("size", &self.size)
            .field("base", &self.base)
            .field("decorators", &self.decorator_names())
            .finish()
    }
}

/// Generate a chunk on the calling thread.
pub fn generate_chunk_sync(
    task: &GenerationTask,
    pipeline: &WorldPipeline,
) -> Result<GeneratedChunk, DecoratorError> {
    let mut chunk = Chunk::new(task.position, pipeline.size);
    pipeline.base.fill(&mut chunk);

    let region = GenerationRegion::new(task.world_seed);
    let mut report = DecorationReport::default();
    for decorator in &pipeline.decorators {
        report += decorator.generate_chunk(&mut chunk, &region)?;
    }
    Ok(GeneratedChunk { chunk, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::hash_chunk;

    fn layered() -> (BaseTerrain, CoreBlocks) {
        let (_, core) = BlockRegistry::with_core_blocks();
        (BaseTerrain::new(core, 64, 4), core)
    }

    #[test]
    fn test_base_layers() {
        let (base, core) = layered();
        assert_eq!(base.block_at(0), core.bedrock);
        assert_eq!(base.block_at(1), core.stone);
        assert_eq!(base.block_at(59), core.stone);
        assert_eq!(base.block_at(60), core.dirt);
        assert_eq!(base.block_at(62), core.dirt);
        assert_eq!(base.block_at(63), core.grass);
        assert_eq!(base.block_at(64), core.air);
    }

    #[test]
    fn test_fill_uses_world_height() {
        let (base, core) = layered();
        let mut chunk = Chunk::new(IVec3::new(0, 1, 0), ChunkSize::new(2, 32, 2));
        base.fill(&mut chunk);
        // Local y = 31 is world y = 63.
        assert_eq!(chunk.get(1, 31, 1), core.grass);
        assert_eq!(chunk.get(0, 0, 0), core.stone);
    }

    #[test]
    fn test_pipeline_without_decorators_is_base_terrain() {
        let (base, core) = layered();
        let pipeline = WorldPipeline::new(ChunkSize::new(16, 128, 16), base);
        let task = GenerationTask {
            position: IVec3::new(3, 0, 3),
            world_seed: 1,
        };
        let generated = generate_chunk_sync(&task, &pipeline).unwrap();
        assert_eq!(generated.report, DecorationReport::default());
        assert_eq!(generated.chunk.data().count(core.bedrock), 16 * 16);
        assert_eq!(generated.chunk.data().count(core.grass), 16 * 16);
        assert_eq!(generated.chunk.position(), task.position);
    }

    #[test]
    fn test_default_pipeline_is_deterministic() {
        let (blocks, core) = BlockRegistry::with_core_blocks();
        let pipeline =
            WorldPipeline::from_config(&WorldGenConfig::with_default_ores(), &blocks, core).unwrap();
        assert_eq!(pipeline.decorator_names(), ["caves", "ores"]);

        let task = GenerationTask {
            position: IVec3::new(-1, 0, 2),
            world_seed: 42,
        };
        let a = generate_chunk_sync(&task, &pipeline).unwrap();
        let b = generate_chunk_sync(&task, &pipeline).unwrap();
        assert_eq!(hash_chunk(a.chunk.data()), hash_chunk(b.chunk.data()));
        assert_eq!(a.report, b.report);
        // The bedrock floor is never touched.
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(a.chunk.get(x, 0, z), core.bedrock);
            }
        }
        assert!(a.chunk.data().blocks().iter().all(|b| blocks.get(*b).is_some()));
    }
}
