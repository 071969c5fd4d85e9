//! Biome registry: resolves [`BiomeId`] references, including parent links.

use hashbrown::HashMap;

use super::{BiomeDef, BiomeId};

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this id is already registered.
    #[error("duplicate biome id: {0}")]
    DuplicateId(BiomeId),
    /// The biome names a parent that has not been registered.
    #[error("biome {biome} has unknown parent {parent}")]
    UnknownParent { biome: BiomeId, parent: BiomeId },
}

/// Stores biome definitions in registration order.
///
/// Parents must be registered before their children, so parent chains are
/// always finite.
#[derive(Debug, Default)]
pub struct BiomeRegistry {
    biomes: Vec<BiomeDef>,
    index: HashMap<BiomeId, usize>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a biome definition.
    ///
    /// # Errors
    ///
    /// [`BiomeRegistryError::DuplicateId`] if the id is taken, or
    /// [`BiomeRegistryError::UnknownParent`] if the parent is not registered yet.
    pub fn register(&mut self, def: BiomeDef) -> Result<(), BiomeRegistryError> {
        if self.index.contains_key(&def.id) {
            return Err(BiomeRegistryError::DuplicateId(def.id));
        }
        if let Some(parent) = &def.parent
            && !self.index.contains_key(parent)
        {
            return Err(BiomeRegistryError::UnknownParent {
                biome: def.id.clone(),
                parent: parent.clone(),
            });
        }
        self.index.insert(def.id.clone(), self.biomes.len());
        self.biomes.push(def);
        Ok(())
    }

    pub fn get(&self, id: &BiomeId) -> Option<&BiomeDef> {
        self.index.get(id).map(|&i| &self.biomes[i])
    }

    /// The parent definition of `id`, if it has one.
    pub fn parent_of(&self, id: &BiomeId) -> Option<&BiomeDef> {
        self.get(id)?.parent.as_ref().and_then(|parent| self.get(parent))
    }

    /// Parent chain of `id`, nearest first. Empty for roots and unknown ids.
    pub fn ancestors(&self, id: &BiomeId) -> Vec<&BiomeDef> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(def) = current {
            chain.push(def);
            current = self.parent_of(&def.id);
        }
        chain
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BiomeDef> {
        self.biomes.iter()
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::desert;

    fn child(id: &str, parent: &str) -> BiomeDef {
        BiomeDef {
            id: BiomeId::new(id),
            name: id.to_string(),
            parent: Some(BiomeId::new(parent)),
            ..desert()
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = BiomeRegistry::new();
        registry.register(desert()).unwrap();
        let id = BiomeId::new("AnotherWorld:Desert");
        assert_eq!(registry.get(&id).map(|b| b.name.as_str()), Some("Desert"));
        assert_eq!(registry.len(), 1);
        assert!(registry.parent_of(&id).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = BiomeRegistry::new();
        registry.register(desert()).unwrap();
        assert!(matches!(
            registry.register(desert()),
            Err(BiomeRegistryError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut registry = BiomeRegistry::new();
        let err = registry.register(child("Test:Dunes", "Test:Missing")).unwrap_err();
        assert!(matches!(err, BiomeRegistryError::UnknownParent { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut registry = BiomeRegistry::new();
        registry.register(desert()).unwrap();
        registry.register(child("Test:Dunes", "AnotherWorld:Desert")).unwrap();
        registry.register(child("Test:Erg", "Test:Dunes")).unwrap();

        let chain: Vec<_> = registry
            .ancestors(&BiomeId::new("Test:Erg"))
            .into_iter()
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(chain, ["Test:Dunes", "AnotherWorld:Desert"]);

        let order: Vec<_> = registry.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(order, ["AnotherWorld:Desert", "Test:Dunes", "Test:Erg"]);
    }
}
