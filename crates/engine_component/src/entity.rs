//! Entity handle.
//!
//! An [`Entity`] is a plain row index into a dataset. Existence is tracked by
//! the dataset, not by the handle: a removed index may be handed out again by
//! a later allocation.

use serde::{Deserialize, Serialize};

/// A row handle in an entity/component dataset.
///
/// Entities carry no data of their own. Components attached to the entity
/// give it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u32);

impl Entity {
    /// Create an entity from a raw `u32` index.
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize`, suitable for addressing columns and
    /// bitsets.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Entity {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
