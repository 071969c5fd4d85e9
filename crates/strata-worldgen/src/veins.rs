//! Branching vein generation: a spherical mother lode per vein plus tunnels of
//! randomly bending segments that may fork.
//!
//! Every vein belongs to the chunk column (x, z) its origin falls in and is
//! generated from that column's seeded RNG alone, at an absolute world height.
//! To decorate a chunk, the definition replays every column close enough to
//! reach it, so features cross chunk seams on all three axes without depending
//! on which side is generated first.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DVec3, IVec2, IVec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use strata_voxel::{BlockId, ChunkSize};

use crate::distribution::Distribution;
use crate::region::{Region, SeedFacet};
use crate::seed::{chunk_rng, det_cos, det_sin, salted_seed};
use crate::structure::{Structure, StructureKind, StructureNode};

/// Forks of forks stop after this many levels.
const MAX_FORK_DEPTH: u32 = 4;

/// Shortest distance between two nodes along a segment, in blocks.
const MIN_NODE_SPACING: f64 = 0.5;

/// Furthest a vein may extend from its origin, in blocks.
pub const MAX_REACH: f64 = 1024.0;

/// Produces the structures of one feature class for a chunk.
pub trait StructureDefinition: Send + Sync {
    /// Structures that can reach the chunk at `chunk` (chunk coordinates).
    ///
    /// Pure in its arguments. The returned order is stable for a given seed.
    fn generate_structures(
        &self,
        chunk: IVec3,
        size: ChunkSize,
        seed: &SeedFacet,
        region: &dyn Region,
    ) -> Vec<Structure>;
}

/// Which blocks a vein is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VeinsBlockProvider {
    cluster: BlockId,
    branch: BlockId,
}

impl VeinsBlockProvider {
    pub const fn new(cluster: BlockId, branch: BlockId) -> Self {
        Self { cluster, branch }
    }

    /// The same block for clusters and branches.
    pub const fn uniform(block: BlockId) -> Self {
        Self::new(block, block)
    }

    /// Block for a cluster cell `distance_from_center` blocks from the lode's centre.
    pub fn cluster_block(&self, _distance_from_center: f32) -> BlockId {
        self.cluster
    }

    pub fn branch_block(&self) -> BlockId {
        self.branch
    }
}

/// Shape parameters of a vein family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VeinsConfig {
    /// Veins originating per chunk.
    pub frequency: Distribution,
    pub mother_lode_radius: Distribution,
    /// World y of a vein's origin.
    pub mother_lode_y_level: Distribution,
    /// Branches leaving each mother lode.
    pub branch_frequency: Distribution,
    /// Initial pitch of a branch, in radians.
    pub branch_inclination: Distribution,
    pub branch_length: Distribution,
    /// How far above or below its origin a branch may wander.
    pub branch_height_limit: Distribution,
    /// Forks spawned per segment.
    pub segment_fork_frequency: Distribution,
    /// Fork length as a fraction of the parent's remaining length.
    pub segment_fork_length_mult: Distribution,
    pub segment_length: Distribution,
    /// Turn applied per segment to yaw and pitch, in radians.
    pub segment_angle: Distribution,
    pub segment_radius: Distribution,
    /// Fraction of covered cells that are replaced.
    pub block_density: Distribution,
    /// Scales every radius.
    pub block_radius_mult: Distribution,
}

/// Seeded vein generator. Immutable after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct VeinsStructureDefinition {
    config: VeinsConfig,
    blocks: VeinsBlockProvider,
    salt: u64,
}

/// A fork waiting to be grown once its parent branch is complete.
struct PendingFork {
    start: DVec3,
    yaw: f64,
    pitch: f64,
    length: f64,
}

impl VeinsStructureDefinition {
    /// `salt` separates the random streams of definitions sharing a world seed.
    pub fn new(config: VeinsConfig, blocks: VeinsBlockProvider, salt: u64) -> Self {
        Self {
            config,
            blocks,
            salt,
        }
    }

    pub fn config(&self) -> &VeinsConfig {
        &self.config
    }

    pub fn blocks(&self) -> VeinsBlockProvider {
        self.blocks
    }

    /// Furthest any cell of a vein can lie from its origin, in blocks.
    pub fn reach(&self) -> f64 {
        let c = &self.config;
        let radius_mult = c.block_radius_mult.max().max(0.0) as f64;
        let fork_growth = (c.segment_fork_length_mult.max() as f64).max(1.0);
        let path = c.branch_length.max().max(0.0) as f64 * fork_growth.powi(MAX_FORK_DEPTH as i32);
        c.mother_lode_radius.max().max(0.0) as f64 * radius_mult
            + path
            + c.segment_length.max().max(0.0) as f64
            + c.segment_radius.max().max(0.0) as f64 * radius_mult
    }

    /// How many chunk columns away (on x and z) a vein origin can still reach a
    /// chunk. Reach is capped at [`MAX_REACH`].
    pub fn search_range(&self, size: ChunkSize) -> i32 {
        let horizontal = size.x.min(size.z).max(1) as f64;
        (self.reach().min(MAX_REACH) / horizontal).ceil() as i32
    }

    /// Every structure whose origin lies in chunk column `column` (chunk x, z),
    /// in world block space.
    ///
    /// Depends only on the world seed, the definition and `column`.
    pub fn structures_from_origin(
        &self,
        world_seed: u64,
        column: IVec2,
        size: ChunkSize,
    ) -> Vec<Structure> {
        let c = &self.config;
        let mut rng = chunk_rng(
            salted_seed(world_seed, self.salt),
            IVec3::new(column.x, 0, column.y),
        );
        let base_x = column.x as f64 * size.x as f64;
        let base_z = column.y as f64 * size.z as f64;
        let mut out = Vec::new();

        let veins = c.frequency.sample_count(&mut rng);
        for _ in 0..veins {
            let center = DVec3::new(
                base_x + rng.random::<f64>() * size.x as f64,
                c.mother_lode_y_level.sample(&mut rng) as f64,
                base_z + rng.random::<f64>() * size.z as f64,
            );
            let radius = (c.mother_lode_radius.sample(&mut rng)
                * c.block_radius_mult.sample(&mut rng)) as f64;
            let density = c.block_density.sample(&mut rng);
            let density_seed = rng.random::<u64>();
            if radius > 0.0 {
                out.push(Structure::new(
                    StructureKind::Cluster,
                    vec![StructureNode { center, radius }],
                    self.blocks,
                    density,
                    density_seed,
                ));
            }

            let branches = c.branch_frequency.sample_count(&mut rng);
            for _ in 0..branches {
                let yaw = rng.random::<f64>() * TAU;
                let pitch = c.branch_inclination.sample(&mut rng) as f64;
                let length = c.branch_length.sample(&mut rng) as f64;
                let height_limit = c.branch_height_limit.sample(&mut rng).abs() as f64;
                let y_range = (center.y - height_limit, center.y + height_limit);
                self.grow_branch(&mut rng, center, yaw, pitch, length, y_range, 0, &mut out);
            }
        }
        out
    }

    /// Walk one branch segment by segment, then grow its forks.
    #[allow(clippy::too_many_arguments)]
    fn grow_branch(
        &self,
        rng: &mut ChaCha8Rng,
        start: DVec3,
        mut yaw: f64,
        mut pitch: f64,
        length: f64,
        y_range: (f64, f64),
        depth: u32,
        out: &mut Vec<Structure>,
    ) {
        let c = &self.config;
        let density = c.block_density.sample(rng);
        let density_seed = rng.random::<u64>();

        let mut nodes = Vec::new();
        let mut forks = Vec::new();
        let mut position = start;
        let mut travelled = 0.0;

        while travelled < length {
            let segment = c.segment_length.sample(rng) as f64;
            if segment <= 0.0 {
                break;
            }
            let radius =
                (c.segment_radius.sample(rng) * c.block_radius_mult.sample(rng)) as f64;
            yaw += signed_turn(rng, &c.segment_angle);
            pitch = (pitch + signed_turn(rng, &c.segment_angle)).clamp(-FRAC_PI_2, FRAC_PI_2);

            let direction = DVec3::new(
                det_cos(pitch) * det_cos(yaw),
                det_sin(pitch),
                det_cos(pitch) * det_sin(yaw),
            );
            let end = position + direction * segment;
            if end.y < y_range.0 || end.y > y_range.1 {
                break;
            }

            if radius > 0.0 {
                let steps = (segment / (radius / 2.0).max(MIN_NODE_SPACING)).ceil().max(1.0);
                if nodes.is_empty() {
                    nodes.push(StructureNode {
                        center: position,
                        radius,
                    });
                }
                for i in 1..=steps as u32 {
                    nodes.push(StructureNode {
                        center: position.lerp(end, i as f64 / steps),
                        radius,
                    });
                }
            }

            travelled += segment;
            let remaining = (length - travelled).max(0.0);
            let fork_count = c.segment_fork_frequency.sample_count(rng);
            for _ in 0..fork_count {
                let fork_yaw = yaw + (rng.random::<f64>() - 0.5) * PI;
                let fork_length = remaining * c.segment_fork_length_mult.sample(rng) as f64;
                forks.push(PendingFork {
                    start: end,
                    yaw: fork_yaw,
                    pitch,
                    length: fork_length,
                });
            }
            position = end;
        }

        if !nodes.is_empty() {
            out.push(Structure::new(
                StructureKind::Branch,
                nodes,
                self.blocks,
                density,
                density_seed,
            ));
        }

        if depth < MAX_FORK_DEPTH {
            for fork in forks {
                if fork.length > 0.0 {
                    self.grow_branch(
                        rng,
                        fork.start,
                        fork.yaw,
                        fork.pitch,
                        fork.length,
                        y_range,
                        depth + 1,
                        out,
                    );
                }
            }
        }
    }
}

impl StructureDefinition for VeinsStructureDefinition {
    fn generate_structures(
        &self,
        chunk: IVec3,
        size: ChunkSize,
        seed: &SeedFacet,
        _region: &dyn Region,
    ) -> Vec<Structure> {
        let range = self.search_range(size);
        let frame_origin = chunk * size.as_ivec3();
        let mut structures = Vec::new();

        for dx in -range..=range {
            for dz in -range..=range {
                let column = IVec2::new(chunk.x.wrapping_add(dx), chunk.z.wrapping_add(dz));
                structures.extend(
                    self.structures_from_origin(seed.world_seed(), column, size)
                        .into_iter()
                        .filter(|s| s.touches_chunk(frame_origin, size))
                        .map(|s| s.in_frame(frame_origin)),
                );
            }
        }
        structures
    }
}

/// A turn of `angle` radians in a random direction.
fn signed_turn(rng: &mut ChaCha8Rng, angle: &Distribution) -> f64 {
    let turn = angle.sample(rng) as f64;
    if rng.random::<bool>() { turn } else { -turn }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::GenerationRegion;

    const SIZE: ChunkSize = ChunkSize::new(16, 256, 16);

    fn d(mean: f32, variance: f32) -> Distribution {
        Distribution::new(mean, variance).unwrap()
    }

    fn test_config() -> VeinsConfig {
        VeinsConfig {
            frequency: d(1.0, 0.0),
            mother_lode_radius: d(3.0, 1.0),
            mother_lode_y_level: d(40.0, 10.0),
            branch_frequency: d(3.0, 1.0),
            branch_inclination: d(0.0, 0.2),
            branch_length: d(24.0, 8.0),
            branch_height_limit: d(100.0, 0.0),
            segment_fork_frequency: d(0.2, 0.0),
            segment_fork_length_mult: d(0.5, 0.0),
            segment_length: d(4.0, 1.0),
            segment_angle: d(0.3, 0.3),
            segment_radius: d(1.5, 0.5),
            block_density: d(1.0, 0.0),
            block_radius_mult: d(1.0, 0.0),
        }
    }

    fn definition() -> VeinsStructureDefinition {
        VeinsStructureDefinition::new(
            test_config(),
            VeinsBlockProvider::uniform(BlockId(1)),
            0x5EED,
        )
    }

    #[test]
    fn test_same_seed_same_structures() {
        let def = definition();
        let region = GenerationRegion::new(42);
        let seed = SeedFacet::new(42);
        let a = def.generate_structures(IVec3::new(3, 0, -2), SIZE, &seed, &region);
        let b = def.generate_structures(IVec3::new(3, 0, -2), SIZE, &seed, &region);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let def = definition();
        let a = def.structures_from_origin(1, IVec2::ZERO, SIZE);
        let b = def.structures_from_origin(2, IVec2::ZERO, SIZE);
        assert_ne!(a, b);
    }

    #[test]
    fn test_salt_separates_definitions() {
        let a = definition().structures_from_origin(42, IVec2::ZERO, SIZE);
        let other = VeinsStructureDefinition::new(
            test_config(),
            VeinsBlockProvider::uniform(BlockId(1)),
            0xBEEF,
        );
        let b = other.structures_from_origin(42, IVec2::ZERO, SIZE);
        assert_ne!(a, b);
    }

    #[test]
    fn test_one_cluster_per_vein_first() {
        let structures = definition().structures_from_origin(7, IVec2::new(1, 1), SIZE);
        assert_eq!(structures[0].kind(), StructureKind::Cluster);
        let clusters = structures
            .iter()
            .filter(|s| s.kind() == StructureKind::Cluster)
            .count();
        assert_eq!(clusters, 1, "frequency (1, 0) yields exactly one vein");
        let center = structures[0].nodes()[0].center;
        assert!((16.0..32.0).contains(&center.x));
        assert!((16.0..32.0).contains(&center.z));
        assert!((30.0..=50.0).contains(&center.y));
    }

    #[test]
    fn test_branches_respect_height_limit() {
        let mut config = test_config();
        config.branch_height_limit = d(3.0, 0.0);
        config.branch_inclination = d(1.2, 0.0);
        let def = VeinsStructureDefinition::new(config, VeinsBlockProvider::uniform(BlockId(1)), 1);
        for seed in 0..20 {
            let structures = def.structures_from_origin(seed, IVec2::ZERO, SIZE);
            let origin_y = structures[0].nodes()[0].center.y;
            for s in structures.iter().filter(|s| s.kind() == StructureKind::Branch) {
                for node in s.nodes() {
                    assert!(
                        (node.center.y - origin_y).abs() <= 3.0 + 1e-9,
                        "node at y={} strays from origin y={origin_y}",
                        node.center.y
                    );
                }
            }
        }
    }

    #[test]
    fn test_branch_length_bounds_path() {
        let def = definition();
        let max_path = test_config().branch_length.max() as f64 + test_config().segment_length.max() as f64;
        for seed in 0..10 {
            let structures = def.structures_from_origin(seed, IVec2::ZERO, SIZE);
            let origin = structures[0].nodes()[0].center;
            for s in &structures {
                for node in s.nodes() {
                    assert!(node.center.distance(origin) <= max_path + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_zero_frequency_generates_nothing() {
        let mut config = test_config();
        config.frequency = Distribution::constant(0.0);
        let def = VeinsStructureDefinition::new(config, VeinsBlockProvider::uniform(BlockId(1)), 1);
        let region = GenerationRegion::new(5);
        let structures = def.generate_structures(IVec3::ZERO, SIZE, &SeedFacet::new(5), &region);
        assert!(structures.is_empty());
    }

    #[test]
    fn test_search_range_covers_reach() {
        let def = definition();
        // reach = 4 + 32 + 5 + 2 = 43 blocks → 3 chunks of 16
        assert_eq!(def.search_range(SIZE), 3);
    }

    #[test]
    fn test_origin_geometry_independent_of_target_chunk() {
        let def = definition();
        let region = GenerationRegion::new(9);
        let seed = SeedFacet::new(9);
        let left = def.generate_structures(IVec3::ZERO, SIZE, &seed, &region);
        let right = def.generate_structures(IVec3::new(1, 0, 0), SIZE, &seed, &region);

        let mut shared = 0;
        for s in &left {
            if let Some(twin) = right.iter().find(|t| t.nodes() == s.nodes()) {
                assert_eq!(twin.frame_origin() - s.frame_origin(), IVec3::new(16, 0, 0));
                shared += 1;
            }
        }
        for s in left.iter().filter(|s| s.touches_chunk(IVec3::new(16, 0, 0), SIZE)) {
            assert!(right.iter().any(|t| t.nodes() == s.nodes()));
        }
        assert!(shared > 0, "adjacent chunks should share seam-crossing structures");
    }

    #[test]
    fn test_returned_structures_touch_target() {
        let def = definition();
        let region = GenerationRegion::new(3);
        let chunk = IVec3::new(-4, 0, 7);
        let origin = chunk * SIZE.as_ivec3();
        for s in def.generate_structures(chunk, SIZE, &SeedFacet::new(3), &region) {
            assert!(s.touches_chunk(origin, SIZE));
            assert_eq!(s.frame_origin(), origin);
        }
    }

    #[test]
    fn test_stacked_chunks_share_column_origins() {
        let size = ChunkSize::new(16, 32, 16);
        let def = definition();
        let region = GenerationRegion::new(11);
        let seed = SeedFacet::new(11);
        let lower = def.generate_structures(IVec3::new(2, 0, 2), size, &seed, &region);
        let upper = def.generate_structures(IVec3::new(2, 1, 2), size, &seed, &region);
        let seam = IVec3::new(32, 32, 32);

        let crossing: Vec<_> = lower
            .iter()
            .filter(|s| s.touches_chunk(seam, size))
            .collect();
        assert!(!crossing.is_empty(), "veins around y=40 should cross y=32");
        for s in crossing {
            assert!(upper.iter().any(|t| t.nodes() == s.nodes()));
        }
    }

    #[test]
    fn test_origin_height_is_absolute() {
        let def = definition();
        let region = GenerationRegion::new(5);
        let seed = SeedFacet::new(5);
        let far_above = def.generate_structures(IVec3::new(0, 40, 0), SIZE, &seed, &region);
        assert!(far_above.is_empty());
    }

    #[test]
    fn test_search_range_capped_by_max_reach() {
        let mut config = test_config();
        config.branch_length = d(1.0e8, 0.0);
        let def = VeinsStructureDefinition::new(config, VeinsBlockProvider::uniform(BlockId(1)), 1);
        assert!(def.reach() > MAX_REACH);
        assert_eq!(def.search_range(SIZE), (MAX_REACH / 16.0).ceil() as i32);
    }
}
