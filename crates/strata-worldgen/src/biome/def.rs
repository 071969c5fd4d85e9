//! Biome definition: describes the properties of a single biome type.

use std::fmt;

/// Namespaced biome identifier, e.g. `"AnotherWorld:Desert"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub String);

impl BiomeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Preferred value of one climate axis and how strongly it counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweetSpotAxis {
    /// Ideal value, in `[0, 1]`.
    pub target: f32,
    /// Weight of this axis when scoring a location. 0 ignores the axis.
    pub weight: f32,
}

impl SweetSpotAxis {
    pub const fn new(target: f32, weight: f32) -> Self {
        Self { target, weight }
    }

    /// Weighted distance of `value` from the target.
    pub fn distance(&self, value: f32) -> f32 {
        (value - self.target).abs() * self.weight
    }
}

/// The climate a biome is most likely to appear in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweetSpot {
    pub humidity: SweetSpotAxis,
    pub temperature: SweetSpotAxis,
    pub terrain: SweetSpotAxis,
    pub above_sea_level: SweetSpotAxis,
}

impl SweetSpot {
    /// Weighted distance of a climate sample from this sweet spot; smaller is a
    /// better fit.
    pub fn distance(&self, humidity: f32, temperature: f32, terrain: f32, above_sea_level: f32) -> f32 {
        self.humidity.distance(humidity)
            + self.temperature.distance(temperature)
            + self.terrain.distance(terrain)
            + self.above_sea_level.distance(above_sea_level)
    }
}

/// Full descriptor for a biome type.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDef {
    pub id: BiomeId,
    /// Human-readable name.
    pub name: String,
    /// Biome this one inherits climate defaults from. `None` for roots.
    pub parent: Option<BiomeId>,
    /// Relative selection weight among competing biomes.
    pub rarity: f32,
    pub sweet_spot: SweetSpot,
    /// Fog density.
    pub fog: f32,
}

/// Hot, dry and preferably flat.
pub fn desert() -> BiomeDef {
    BiomeDef {
        id: BiomeId::new("AnotherWorld:Desert"),
        name: "Desert".to_string(),
        parent: None,
        rarity: 0.4,
        sweet_spot: SweetSpot {
            humidity: SweetSpotAxis::new(0.0, 0.4),
            temperature: SweetSpotAxis::new(1.0, 0.4),
            terrain: SweetSpotAxis::new(0.0, 0.2),
            above_sea_level: SweetSpotAxis::new(0.0, 0.0),
        },
        fog: 0.1,
    }
}
