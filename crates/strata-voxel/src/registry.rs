//! Block type registry: maps compact [`BlockId`] values to [`BlockDef`] metadata.
//!
//! The registry is built once before world generation starts. Air is always ID 0
//! so that a zero-initialized chunk represents empty space.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored inside every chunk cell (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The air block. Always registered first.
    pub const AIR: Self = Self(0);
}

/// Descriptor for a block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Unique name (e.g. "stone", "iron_ore").
    pub name: String,
    /// Whether the block fills its cell.
    pub solid: bool,
}

impl BlockDef {
    /// A solid block with the given name.
    pub fn solid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: true,
        }
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum BlockRegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All 65 536 slots have been consumed.
    #[error("block registry is full (max 65536 types)")]
    RegistryFull,
}

/// IDs of the blocks every generated world relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreBlocks {
    pub air: BlockId,
    pub bedrock: BlockId,
    pub stone: BlockId,
    pub dirt: BlockId,
    pub grass: BlockId,
    pub sand: BlockId,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] to [`BlockDef`] with O(1) lookup in both directions.
pub struct BlockRegistry {
    /// Dense array where `index == BlockId.0`.
    blocks: Vec<BlockDef>,
    name_to_id: FxHashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a new registry with air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            solid: false,
        };

        let mut name_to_id = FxHashMap::default();
        name_to_id.insert(air.name.clone(), BlockId::AIR);

        Self {
            blocks: vec![air],
            name_to_id,
        }
    }

    /// Creates a registry holding the core terrain blocks plus the default ore blocks.
    pub fn with_core_blocks() -> (Self, CoreBlocks) {
        let mut registry = Self::new();
        // Names are distinct and well below the ID limit, so registration is infallible here.
        let mut add = |name: &str| {
            let id = BlockId(registry.blocks.len() as u16);
            registry.name_to_id.insert(name.to_string(), id);
            registry.blocks.push(BlockDef::solid(name));
            id
        };
        let core = CoreBlocks {
            air: BlockId::AIR,
            bedrock: add("bedrock"),
            stone: add("stone"),
            dirt: add("dirt"),
            grass: add("grass"),
            sand: add("sand"),
        };
        for ore in ["coal_ore", "iron_ore", "gold_ore"] {
            add(ore);
        }
        (registry, core)
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns [`BlockRegistryError::DuplicateName`] if the name is taken, or
    /// [`BlockRegistryError::RegistryFull`] once every ID is in use.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, BlockRegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(BlockRegistryError::DuplicateName(def.name));
        }
        if self.blocks.len() > u16::MAX as usize {
            return Err(BlockRegistryError::RegistryFull);
        }

        let id = BlockId(self.blocks.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.blocks.push(def);
        Ok(id)
    }

    /// Returns the definition for an ID, or `None` for IDs this registry never issued.
    pub fn get(&self, id: BlockId) -> Option<&BlockDef> {
        self.blocks.get(id.0 as usize)
    }

    /// Returns the ID for a named block.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Total number of registered blocks, air included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }

    /// Returns `true` if the block is solid. Unknown IDs count as not solid.
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get(id).is_some_and(|def| def.solid)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_id_zero() {
        let registry = BlockRegistry::new();
        let air = registry.get(BlockId::AIR).unwrap();
        assert_eq!(air.name, "air");
        assert!(!air.solid);
        assert_eq!(registry.lookup_by_name("air"), Some(BlockId(0)));
    }

    #[test]
    fn test_register_returns_sequential_ids() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockDef::solid("stone")).unwrap();
        let dirt = registry.register(BlockDef::solid("dirt")).unwrap();
        assert_eq!(stone, BlockId(1));
        assert_eq!(dirt, BlockId(2));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = BlockRegistry::new();
        registry.register(BlockDef::solid("stone")).unwrap();
        let result = registry.register(BlockDef::solid("stone"));
        assert!(matches!(result, Err(BlockRegistryError::DuplicateName(_))));
    }

    #[test]
    fn test_core_blocks_resolvable_by_name() {
        let (registry, core) = BlockRegistry::with_core_blocks();
        assert_eq!(registry.lookup_by_name("stone"), Some(core.stone));
        assert_eq!(registry.lookup_by_name("bedrock"), Some(core.bedrock));
        assert!(registry.lookup_by_name("iron_ore").is_some());
        assert!(registry.is_solid(core.stone));
        assert!(!registry.is_solid(core.air));
    }

    #[test]
    fn test_unknown_id_is_not_solid() {
        let registry = BlockRegistry::new();
        assert!(registry.get(BlockId(999)).is_none());
        assert!(!registry.is_solid(BlockId(999)));
    }
}
