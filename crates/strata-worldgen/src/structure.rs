//! Generated structures and the narrow write capability they render through.
//!
//! A [`Structure`] is a transient list of radius-weighted nodes. It never touches
//! chunk storage itself: [`Structure::generate_structure`] asks a
//! [`StructureCallback`] whether each covered cell may be replaced and, if so,
//! requests the replacement.

use glam::{DVec3, IVec3};
use strata_voxel::{BlockId, ChunkSize};

use crate::seed::cell_unit;
use crate::veins::VeinsBlockProvider;

/// Write gate a structure renders into. Coordinates are chunk-local.
pub trait StructureCallback {
    /// Whether the cell at `(x, y, z)` may be overwritten.
    fn can_replace(&self, x: i32, y: i32, z: i32) -> bool;

    /// Replace the cell at `position` with `block`.
    ///
    /// `force` is in `(0, 1]`: 1 on a node's centre, falling to 0 at its edge.
    fn replace_block(&mut self, position: IVec3, force: f32, block: BlockId);
}

/// What part of a vein a structure is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructureKind {
    /// The spherical mother lode at a vein's origin.
    Cluster,
    /// A tunnel of connected segments.
    Branch,
}

/// One sample point of a structure, in world block space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureNode {
    pub center: DVec3,
    pub radius: f64,
}

/// One generated feature instance, bound to the chunk it will be applied to.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    kind: StructureKind,
    nodes: Vec<StructureNode>,
    /// World block coordinate of the target chunk's local `(0, 0, 0)`.
    frame_origin: IVec3,
    blocks: VeinsBlockProvider,
    density: f32,
    density_seed: u64,
}

impl Structure {
    pub(crate) fn new(
        kind: StructureKind,
        nodes: Vec<StructureNode>,
        blocks: VeinsBlockProvider,
        density: f32,
        density_seed: u64,
    ) -> Self {
        Self {
            kind,
            nodes,
            frame_origin: IVec3::ZERO,
            blocks,
            density,
            density_seed,
        }
    }

    /// Rebind to the chunk whose local frame starts at `frame_origin`.
    pub(crate) fn in_frame(mut self, frame_origin: IVec3) -> Self {
        self.frame_origin = frame_origin;
        self
    }

    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    /// Nodes in world block space, in placement order.
    pub fn nodes(&self) -> &[StructureNode] {
        &self.nodes
    }

    pub fn frame_origin(&self) -> IVec3 {
        self.frame_origin
    }

    /// Centre of node `index` in the target chunk's local frame.
    pub fn local_center(&self, index: usize) -> Option<DVec3> {
        self.nodes
            .get(index)
            .map(|node| node.center - self.frame_origin.as_dvec3())
    }

    /// Fraction of covered cells that get replaced.
    pub fn density(&self) -> f32 {
        self.density
    }

    /// World-space axis-aligned bounds covering every node.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        self.nodes.iter().fold(None, |acc, node| {
            let lo = node.center - DVec3::splat(node.radius);
            let hi = node.center + DVec3::splat(node.radius);
            Some(match acc {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            })
        })
    }

    /// Whether any node can reach a cell of the chunk at `frame_origin`.
    pub fn touches_chunk(&self, frame_origin: IVec3, size: ChunkSize) -> bool {
        let Some((min, max)) = self.bounds() else {
            return false;
        };
        let chunk_min = frame_origin.as_dvec3();
        let chunk_max = chunk_min + size.as_ivec3().as_dvec3();
        min.x < chunk_max.x
            && max.x > chunk_min.x
            && min.y < chunk_max.y
            && max.y > chunk_min.y
            && min.z < chunk_max.z
            && max.z > chunk_min.z
    }

    /// Render into `callback`.
    ///
    /// Nodes are visited in order, and the cells of each node's bounding box in
    /// x, y, z order. A cell is covered when its centre lies within the node's
    /// radius.
    pub fn generate_structure(&self, callback: &mut dyn StructureCallback) {
        for node in &self.nodes {
            if node.radius <= 0.0 {
                continue;
            }
            let lo = (node.center - DVec3::splat(node.radius)).floor().as_ivec3();
            let hi = (node.center + DVec3::splat(node.radius)).floor().as_ivec3();

            for wx in lo.x..=hi.x {
                for wy in lo.y..=hi.y {
                    for wz in lo.z..=hi.z {
                        let world = IVec3::new(wx, wy, wz);
                        let distance = (world.as_dvec3() + DVec3::splat(0.5)).distance(node.center);
                        if distance > node.radius {
                            continue;
                        }
                        let local = world - self.frame_origin;
                        if !callback.can_replace(local.x, local.y, local.z) {
                            continue;
                        }
                        if self.density < 1.0 && cell_unit(self.density_seed, world) >= self.density
                        {
                            continue;
                        }
                        let force = (1.0 - distance / node.radius) as f32;
                        let block = match self.kind {
                            StructureKind::Cluster => self.blocks.cluster_block(distance as f32),
                            StructureKind::Branch => self.blocks.branch_block(),
                        };
                        callback.replace_block(local, force, block);
                    }
                }
            }
        }
    }
}
