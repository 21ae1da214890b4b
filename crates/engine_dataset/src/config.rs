//! Dataset configuration.

use serde::{Deserialize, Serialize};

/// Default exclusive upper bound on entity indices.
pub const DEFAULT_MAX_ENTITIES: u32 = 1 << 24;

/// Default number of entity rows reserved up front.
pub const DEFAULT_INITIAL_ENTITY_CAPACITY: usize = 1024;

/// Tunables for an [`EntityComponentDataset`](crate::EntityComponentDataset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Entity indices must be below this bound.
    pub max_entities: u32,
    /// Entity rows reserved in the bitsets at construction.
    pub initial_entity_capacity: usize,
}

impl DatasetConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the entity index bound.
    #[must_use]
    pub fn with_max_entities(mut self, max_entities: u32) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Override the number of rows reserved up front.
    #[must_use]
    pub fn with_initial_entity_capacity(mut self, capacity: usize) -> Self {
        self.initial_entity_capacity = capacity;
        self
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            initial_entity_capacity: DEFAULT_INITIAL_ENTITY_CAPACITY,
        }
    }
}
