//! Generates a square of decorated chunks around the origin and reports what
//! the cave and ore decorators did.
//!
//! Configuration is loaded from `worldgen.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo -- --seed 7 --radius 3 --verify`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::IVec3;
use strata_config::{CliArgs, WorldGenConfig};
use strata_voxel::{BlockId, BlockRegistry, ChunkData};
use strata_worldgen::biome::{self, BiomeRegistry};
use strata_worldgen::{
    ChunkGenerationPool, DecorationReport, GenerationTask, WorldPipeline, generate_chunk_sync,
    hash_chunk,
};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("strata"))
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let mut config = WorldGenConfig::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        WorldGenConfig::with_default_ores()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(code) = run(&config, args.radius as i32, args.verify) {
        std::process::exit(code);
    }
}

fn run(config: &WorldGenConfig, radius: i32, verify: bool) -> Result<(), i32> {
    let mut biomes = BiomeRegistry::new();
    if let Err(e) = biomes.register(biome::desert()) {
        error!("Failed to register core biomes: {e}");
        return Err(1);
    }
    info!(count = biomes.len(), "Registered core biomes");

    let (blocks, core) = BlockRegistry::with_core_blocks();
    let pipeline = match WorldPipeline::from_config(config, &blocks, core) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            error!("Invalid world generation setup: {e}");
            return Err(2);
        }
    };
    info!(?pipeline, seed = config.world.seed, radius, "World pipeline ready");

    let pool = match ChunkGenerationPool::from_config(Arc::clone(&pipeline), &config.generation) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to start generation workers: {e}");
            return Err(3);
        }
    };

    let tasks: Vec<GenerationTask> = (-radius..=radius)
        .flat_map(|x| (-radius..=radius).map(move |z| IVec3::new(x, 0, z)))
        .map(|position| GenerationTask {
            position,
            world_seed: config.world.seed,
        })
        .collect();

    let start = Instant::now();
    let mut pending = tasks.iter().copied();
    let mut next = pending.next();
    let mut hashes = BTreeMap::new();
    let mut totals = DecorationReport::default();
    let mut block_counts = vec![0usize; blocks.len()];
    let mut failed = 0usize;

    while hashes.len() + failed < tasks.len() {
        while let Some(task) = next {
            match pool.submit(task) {
                Ok(()) => next = pending.next(),
                Err(_) => break,
            }
        }

        for result in pool.drain_results() {
            match result.outcome {
                Ok(generated) => {
                    totals += generated.report;
                    count_blocks(generated.chunk.data(), &mut block_counts);
                    hashes.insert(key(result.position), hash_chunk(generated.chunk.data()));
                }
                Err(e) => {
                    error!(chunk = ?result.position, "Generation failed: {e}");
                    failed += 1;
                }
            }
        }
        std::thread::sleep(Duration::from_millis(2));
    }

    info!(
        chunks = hashes.len(),
        failed,
        structures = totals.structures,
        blocks_replaced = totals.blocks_replaced,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Generation finished"
    );
    for (id, count) in block_counts.iter().enumerate() {
        if *count > 0
            && let Some(def) = blocks.get(BlockId(id as u16))
        {
            info!(block = %def.name, count, "Block totals");
        }
    }

    if failed > 0 {
        return Err(4);
    }

    if verify {
        let mismatches = tasks
            .iter()
            .rev()
            .filter(|task| match generate_chunk_sync(task, &pipeline) {
                Ok(generated) => {
                    hashes.get(&key(task.position)) != Some(&hash_chunk(generated.chunk.data()))
                }
                Err(_) => true,
            })
            .count();
        if mismatches > 0 {
            warn!(mismatches, "Reverse-order regeneration differs from pooled output");
            return Err(5);
        }
        info!(chunks = tasks.len(), "Verified: pooled and sequential output match");
    }
    Ok(())
}

fn key(position: IVec3) -> (i32, i32, i32) {
    (position.x, position.y, position.z)
}

fn count_blocks(data: &ChunkData, counts: &mut [usize]) {
    for block in data.blocks() {
        if let Some(count) = counts.get_mut(block.0 as usize) {
            *count += 1;
        }
    }
}
